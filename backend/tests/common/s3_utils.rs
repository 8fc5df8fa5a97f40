use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};

/// Upload data to S3 using a presigned URL and the headers it was signed with
pub async fn upload_to_s3(
    presigned_url: &str,
    data: &[u8],
    signed_headers: &BTreeMap<String, String>,
) -> Result<reqwest::Response, reqwest::Error> {
    let headers = create_upload_headers(data.len(), signed_headers);

    let client = reqwest::Client::new();
    client
        .put(presigned_url)
        .headers(headers)
        .body(data.to_vec())
        .send()
        .await
}

/// Download data from an object URL using HTTP
pub async fn download_from_url(url: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client.get(url).send().await?;

    if response.status().is_success() {
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    } else {
        Err(format!("Failed to download from {}: HTTP {}", url, response.status()).into())
    }
}

/// Create headers for an S3 upload from the headers returned alongside the URL
pub fn create_upload_headers(
    content_length: usize,
    signed_headers: &BTreeMap<String, String>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
    for (name, value) in signed_headers {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }

    headers
}
