//! Core data models for the bucket gateway.
//!
//! Everything here is request-scoped: canonical storage keys produced by
//! normalization and the child entries the listing endpoint returns. The
//! entries serialize naturally as JSON via `serde`.

pub mod entry;
pub mod key;
