use axum::response::Response;
use http_body_util::BodyExt;
use image_upload_backend::upload_key::{RANDOM_SUFFIX_LEN, UPLOAD_KEY_PREFIX};
use rand::RngCore;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Asserts the `uploads/<millis>-<suffix>.<ext>` key layout and returns the extension
pub fn assert_upload_key_layout(key: &str) -> String {
    let rest = key
        .strip_prefix(UPLOAD_KEY_PREFIX)
        .unwrap_or_else(|| panic!("key {key} is missing the upload prefix"));
    let (stem, extension) = rest
        .rsplit_once('.')
        .unwrap_or_else(|| panic!("key {key} has no extension"));
    let (millis, suffix) = stem
        .split_once('-')
        .unwrap_or_else(|| panic!("key {key} has no random suffix"));

    assert!(millis.parse::<i64>().is_ok(), "timestamp in {key} is not numeric");
    assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN, "suffix in {key} has the wrong length");
    assert!(
        suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
        "suffix in {key} is not lowercase alphanumeric"
    );

    extension.to_string()
}

/// Generate random image-like bytes of the given size
pub fn generate_test_image(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}
