//! Streams objects out of the bucket with derived download headers.

use crate::{
    errors::AppError,
    models::key::StorageKey,
    services::{bucket_service::BucketService, store::StoredObject},
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Uri, header},
    response::Response,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters kept verbatim in the RFC 5987 `filename*` value; everything
/// else is percent-encoded as UTF-8.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// GET catch-all — serve one object addressed by the request path.
///
/// The root path serves the configured index document when present; a missing
/// index is a 400 (no key supplied), deliberately distinct from a 404 at a
/// real key. The raw URI path is normalized here rather than taken from a
/// path extractor, which would have decoded it already.
pub async fn serve_object(
    State(service): State<BucketService>,
    uri: Uri,
) -> Result<Response, AppError> {
    let key = StorageKey::normalize(uri.path());

    if key.is_root() {
        let Some(object) = service.open_index().await? else {
            return Err(AppError::bad_request("No key specified"));
        };
        return Ok(index_response(object));
    }

    let Some(object) = service.open_object(&key).await? else {
        return Err(AppError::not_found("File not found"));
    };
    Ok(object_response(&key, object))
}

/// Root document response: always HTML, body streamed.
fn index_response(object: StoredObject) -> Response {
    let StoredObject { meta, body } = object;
    let mut response = Response::new(Body::from_stream(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html;charset=UTF-8"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.size));
    response
}

/// Direct object response with Content-Type, Content-Length, Last-Modified
/// and Content-Disposition derived from backend metadata.
fn object_response(key: &StorageKey, object: StoredObject) -> Response {
    let StoredObject { meta, body } = object;
    let content_type = meta
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let filename = display_filename(key.as_str());

    let mut response = Response::new(Body::from_stream(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.size));
    if let Ok(value) = HeaderValue::from_str(&meta.uploaded.to_rfc2822()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    if let Ok(value) = HeaderValue::from_str(&content_disposition(filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// Last `/`-separated segment of the key, or `file` when there is none.
fn display_filename(key: &str) -> &str {
    match key.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => "file",
    }
}

/// Build the Content-Disposition value for a derived filename.
///
/// ASCII names use the plain quoted form. Names with any character outside
/// 7-bit ASCII carry both the verbatim quoted form and the RFC 5987
/// `filename*` parameter: older clients still see a usable name while newer
/// ones pick the correctly encoded one.
fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        format!("inline; filename=\"{filename}\"")
    } else {
        let encoded = utf8_percent_encode(filename, FILENAME_ENCODE_SET);
        format!("inline; filename=\"{filename}\"; filename*=UTF-8''{encoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_last_segment() {
        assert_eq!(display_filename("docs/readme.md"), "readme.md");
        assert_eq!(display_filename("readme.md"), "readme.md");
        assert_eq!(display_filename("docs/"), "file");
    }

    #[test]
    fn ascii_disposition_is_plain_quoted() {
        assert_eq!(
            content_disposition("report.pdf"),
            "inline; filename=\"report.pdf\""
        );
    }

    #[test]
    fn non_ascii_disposition_carries_both_forms() {
        let value = content_disposition("résumé.pdf");
        assert_eq!(
            value,
            "inline; filename=\"résumé.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
        );
    }

    #[test]
    fn encode_set_matches_uri_component_rules() {
        let value = content_disposition("年報 (final).pdf");
        assert!(value.contains("filename*=UTF-8''%E5%B9%B4%E5%A0%B1%20(final).pdf"));
    }
}
