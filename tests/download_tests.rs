//! Download endpoint integration tests.

use axum::http::{StatusCode, header};

mod common;
use common::{Fixture, get, text};

#[tokio::test]
async fn test_download_returns_exact_bytes() {
    let fx = Fixture::new();
    let contents: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();
    fx.write("sub/blob.bin", &contents);

    let (status, headers, body) = fx.get("/download/sub/blob.bin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], &contents[..]);
    assert_eq!(headers[header::CONTENT_LENGTH], contents.len().to_string());
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"blob.bin\""
    );
}

#[tokio::test]
async fn test_download_infers_content_type() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("page.html", "<p>hi</p>");

    let (_, headers, body) = fx.get("/download/a.txt").await;
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(text(&body), "hello");

    let (_, headers, _) = fx.get("/download/page.html").await;
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
}

#[tokio::test]
async fn test_download_missing_file() {
    let fx = Fixture::new();
    fx.write("present.txt", "SECRET-CONTENT");

    let (status, _, body) = fx.get("/download/absent.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!text(&body).contains("SECRET-CONTENT"));

    let (status, _, _) = fx.get("/download/present.txt/child").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_directory_is_rejected() {
    let fx = Fixture::new();
    fx.write("sub/a.txt", "a");

    let (status, _, _) = fx.get("/download/sub").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = fx.get("/download/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let fx = Fixture::new();
    std::fs::write(fx.outside().join("outside.txt"), "OUTSIDE").unwrap();

    for uri in [
        "/download/../outside.txt",
        "/download/sub/../../outside.txt",
        "/download/%2e%2e/outside.txt",
        "/download/..%2foutside.txt",
        "/download/../../../../etc/passwd",
    ] {
        let (status, _, body) = fx.get(uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert!(!text(&body).contains("OUTSIDE"), "{uri}");
    }
}

#[tokio::test]
async fn test_download_rejects_sibling_with_shared_prefix() {
    let fx = Fixture::new();
    let sibling = fx.outside().join("data-secret");
    std::fs::create_dir_all(&sibling).unwrap();
    std::fs::write(sibling.join("key.txt"), "PRIVATE").unwrap();

    let (status, _, body) = fx.get("/download/../data-secret/key.txt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!text(&body).contains("PRIVATE"));
}

#[tokio::test]
async fn test_download_inner_parent_segments_stay_inside() {
    let fx = Fixture::new();
    fx.write("a.txt", "root file");
    fx.mkdir("sub");

    let (status, _, body) = fx.get("/download/sub/../a.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body), "root file");
}

#[cfg(unix)]
#[tokio::test]
async fn test_download_rejects_symlink_escape() {
    use std::os::unix::fs::symlink;

    let fx = Fixture::new();
    let secret = fx.outside().join("secret.txt");
    std::fs::write(&secret, "TOP SECRET").unwrap();
    symlink(&secret, fx.root.join("link.txt")).unwrap();

    let (status, _, body) = fx.get("/download/link.txt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!text(&body).contains("TOP SECRET"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_download_symlink_loop_is_not_found() {
    use std::os::unix::fs::symlink;

    let fx = Fixture::new();
    symlink(fx.root.join("loop"), fx.root.join("loop")).unwrap();
    symlink(fx.root.join("ping"), fx.root.join("pong")).unwrap();
    symlink(fx.root.join("pong"), fx.root.join("ping")).unwrap();

    for uri in ["/download/loop", "/download/ping", "/download/loop/inner.txt"] {
        let (status, _, body) = fx.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(text(&body).contains("NOT_FOUND"), "{uri}");
    }
}

#[tokio::test]
async fn test_concurrent_listing_and_download() {
    let fx = Fixture::new();
    let big: Vec<u8> = (0..=255u8).cycle().take(1 << 20).collect();
    fx.write("files/big.bin", &big);
    fx.write("docs/readme.md", "# readme");
    fx.mkdir("docs/notes");

    let (download, listing, other) = tokio::join!(
        get(&fx.app, "/download/files/big.bin"),
        get(&fx.app, "/docs"),
        get(&fx.app, "/download/docs/readme.md"),
    );

    assert_eq!(download.0, StatusCode::OK);
    assert_eq!(&download.2[..], &big[..]);

    assert_eq!(listing.0, StatusCode::OK);
    let html = text(&listing.2);
    assert!(html.contains(r#"href="/download/docs/readme.md""#));
    assert!(html.contains(r#"<a href="/docs/notes">notes</a>"#));
    assert!(!html.contains("big.bin"));

    assert_eq!(other.0, StatusCode::OK);
    assert_eq!(text(&other.2), "# readme");
}
