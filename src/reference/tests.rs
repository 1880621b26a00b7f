use super::*;

#[test]
fn classifies_http_and_https_urls() {
    assert_eq!(
        classify("http://example.com/a.jpg").unwrap(),
        ReferenceKind::Url
    );
    assert_eq!(
        classify("https://example.com/photos/me.png?size=large").unwrap(),
        ReferenceKind::Url
    );
}

#[test]
fn classifies_ftp_urls() {
    assert_eq!(
        classify("ftp://files.example.com/face.jpeg").unwrap(),
        ReferenceKind::Url
    );
}

#[test]
fn url_scheme_is_case_insensitive() {
    assert_eq!(
        classify("HTTPS://EXAMPLE.COM/a.jpg").unwrap(),
        ReferenceKind::Url
    );
}

#[test]
fn classifies_data_uris() {
    assert_eq!(
        classify("data:image/png;base64,aGVsbG8=").unwrap(),
        ReferenceKind::InlineEncoded
    );
    assert_eq!(
        classify("data:image/jpeg;base64,/9j/4AAQ").unwrap(),
        ReferenceKind::InlineEncoded
    );
}

#[test]
fn rejects_non_image_data_uris() {
    assert!(classify("data:text/plain;base64,aGVsbG8=").is_err());
    assert!(classify("data:application/pdf;base64,aGVsbG8=").is_err());
}

#[test]
fn rejects_bare_words_and_empty_strings() {
    assert!(classify("").is_err());
    assert!(classify("not-a-url").is_err());
    assert!(classify("/local/path.jpg").is_err());
    assert!(classify("file:///etc/passwd").is_err());
}

#[test]
fn rejects_url_with_whitespace_or_empty_remainder() {
    assert!(classify("http://").is_err());
    assert!(classify("http://exa mple.com/a.jpg").is_err());
}

#[test]
fn rejects_data_uri_without_payload() {
    assert!(classify("data:image/png;base64,").is_err());
    assert!(classify("data:image/;base64,aGVsbG8=").is_err());
}

#[test]
fn inline_payload_extracts_encoded_portion() {
    assert_eq!(
        inline_payload("data:image/png;base64,aGVsbG8="),
        Some("aGVsbG8=")
    );
    assert_eq!(inline_payload("https://example.com/a.jpg"), None);
}

#[test]
fn image_reference_echoes_raw_value() {
    let reference = ImageReference::classify("https://example.com/a.jpg").unwrap();
    assert_eq!(reference.raw(), "https://example.com/a.jpg");
    assert_eq!(reference.kind(), ReferenceKind::Url);
}
