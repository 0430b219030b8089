//! Service layer: the storage backend contract, the bucket-facing core
//! operations, and the rate-limit gate.

pub mod bucket_service;
pub mod rate_limiter;
pub mod store;
