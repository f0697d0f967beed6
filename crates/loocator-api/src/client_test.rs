use super::*;

fn test_client(base_url: &str) -> SearchClient {
    SearchClient::with_base_url(base_url, 15, "loocator-test/0.1")
        .expect("client construction should not fail")
}

#[test]
fn build_url_appends_path_to_base() {
    let client = test_client("https://api.example.dz/api/v1");
    let url = client.build_url(MARKERS_PATH, &[]).unwrap();
    assert_eq!(url.as_str(), "https://api.example.dz/api/v1/toilets/map");
}

#[test]
fn build_url_strips_trailing_slashes() {
    let client = test_client("https://api.example.dz/api/v1//");
    let url = client
        .build_url(TOILETS_PATH, &[("page", "1".to_string())])
        .unwrap();
    assert_eq!(url.as_str(), "https://api.example.dz/api/v1/toilets?page=1");
}

#[test]
fn build_url_encodes_array_keys() {
    let client = test_client("https://api.example.dz");
    let url = client
        .build_url(TOILETS_PATH, &[("amenities[]", "baby change".to_string())])
        .unwrap();
    assert!(
        url.as_str().contains("amenities%5B%5D=baby+change"),
        "array key should be percent-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = SearchClient::with_base_url("not a url", 15, "ua").unwrap_err();
    assert!(
        matches!(err, SearchError::InvalidBaseUrl { .. }),
        "expected InvalidBaseUrl, got: {err:?}"
    );
}

#[test]
fn debug_does_not_print_token() {
    let client = test_client("https://api.example.dz")
        .with_token_provider(Arc::new(|| Some("s3cr3t".to_string())));
    let debug = format!("{client:?}");
    assert!(!debug.contains("s3cr3t"));
    assert!(debug.contains("token_provider: true"));
}
