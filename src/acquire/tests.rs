use super::*;
use crate::reference::ImageReference;
use axum::{Router, routing::get};
use std::collections::HashSet;
use std::time::Duration;

const ONE_MB: u64 = 1024 * 1024;

fn acquirer(max_bytes: u64) -> ImageAcquirer {
    ImageAcquirer::new(Duration::from_secs(5), max_bytes).unwrap()
}

/// Serves `bytes` at `/face.jpg` on an ephemeral port, returning the URL.
async fn serve_bytes(bytes: Vec<u8>) -> String {
    let app = Router::new().route(
        "/face.jpg",
        get(move || {
            let bytes = bytes.clone();
            async move { bytes }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/face.jpg")
}

fn transient_files() -> HashSet<PathBuf> {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(TEMP_PREFIX))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn url_extension_ignores_query_and_fragment() {
    assert_eq!(url_extension("https://x.com/a/b/photo.JPG?v=2"), ".jpg");
    assert_eq!(url_extension("https://x.com/face.png#top"), ".png");
    assert_eq!(url_extension("https://x.com/face.jpeg"), ".jpeg");
}

#[test]
fn url_extension_empty_when_path_has_none() {
    assert_eq!(url_extension("https://x.com/face"), "");
}

#[tokio::test]
async fn gif_url_is_rejected_before_any_network_access() {
    let reference = ImageReference::classify("https://example.invalid/face.gif").unwrap();
    let err = acquirer(ONE_MB).acquire(&reference).await.unwrap_err();
    match err {
        AcquireError::UnsupportedFormat { ref extension } => assert_eq!(extension, ".gif"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
    assert!(err_mentions_format(&err));
}

#[tokio::test]
async fn extensionless_url_is_rejected() {
    let reference = ImageReference::classify("https://example.invalid/face").unwrap();
    let err = acquirer(ONE_MB).acquire(&reference).await.unwrap_err();
    assert!(matches!(err, AcquireError::UnsupportedFormat { .. }));
}

#[tokio::test]
async fn remote_fetch_streams_bytes_to_a_transient_file() {
    let payload = vec![7u8; 2048];
    let url = serve_bytes(payload.clone()).await;
    let reference = ImageReference::classify(&url).unwrap();

    let acquired = acquirer(ONE_MB).acquire(&reference).await.unwrap();
    assert_eq!(std::fs::read(&acquired.local_path).unwrap(), payload);
    assert_eq!(acquired.byte_size, 2048);
    assert_eq!(acquired.format, ".jpg");
    assert_eq!(acquired.origin_reference, url);

    std::fs::remove_file(&acquired.local_path).unwrap();
}

#[tokio::test]
async fn oversized_remote_fetch_fails_instead_of_truncating() {
    let url = serve_bytes(vec![0u8; 8 * 1024]).await;
    let reference = ImageReference::classify(&url).unwrap();

    let before = transient_files();
    let err = acquirer(1024).acquire(&reference).await.unwrap_err();
    match err {
        AcquireError::TooLarge { size, limit } => {
            assert!(size > limit, "reported size {size} within limit {limit}");
            assert_eq!(limit, 1024);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }

    // The partial download must not survive. Concurrent tests create their
    // own transient files and remove them promptly, hence the retry loop.
    for _ in 0..50 {
        if transient_files().is_subset(&before) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let leaked: Vec<_> = transient_files().difference(&before).cloned().collect();
    panic!("leaked transient files: {leaked:?}");
}

#[tokio::test]
async fn unreachable_url_surfaces_download_error() {
    let reference = ImageReference::classify("http://127.0.0.1:1/face.jpg").unwrap();
    let err = acquirer(ONE_MB).acquire(&reference).await.unwrap_err();
    assert!(matches!(err, AcquireError::Download { .. }));
}

#[tokio::test]
async fn inline_payload_round_trips_exactly() {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    let original: Vec<u8> = (0u8..=255).collect();
    let raw = format!("data:image/jpeg;base64,{}", STANDARD.encode(&original));
    let reference = ImageReference::classify(&raw).unwrap();

    let acquired = acquirer(ONE_MB).acquire(&reference).await.unwrap();
    let bytes = std::fs::read(&acquired.local_path).unwrap();
    assert_eq!(bytes, original);
    assert_eq!(acquired.byte_size, original.len() as u64);
    assert_eq!(acquired.format, ".jpg");
    assert_eq!(acquired.origin_reference, raw);

    std::fs::remove_file(&acquired.local_path).unwrap();
}

#[tokio::test]
async fn malformed_base64_surfaces_decode_error() {
    let reference = ImageReference::classify("data:image/png;base64,@@@not-base64@@@").unwrap();
    let err = acquirer(ONE_MB).acquire(&reference).await.unwrap_err();
    assert!(matches!(err, AcquireError::Decode { .. }));
}

#[tokio::test]
async fn oversized_inline_payload_is_rejected() {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    let raw = format!("data:image/png;base64,{}", STANDARD.encode(vec![0u8; 64]));
    let reference = ImageReference::classify(&raw).unwrap();

    let err = acquirer(16).acquire(&reference).await.unwrap_err();
    match err {
        AcquireError::TooLarge { size, limit } => {
            assert_eq!(size, 64);
            assert_eq!(limit, 16);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

fn err_mentions_format(err: &AcquireError) -> bool {
    err.to_string().to_ascii_lowercase().contains("format")
}
