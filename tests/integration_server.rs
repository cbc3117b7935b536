use httpmock::prelude::*;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use zip::write::SimpleFileOptions;

use docjar::mirrors::MirrorList;
use docjar::server::handlers::NOT_FOUND_BODY;
use docjar::{DocService, DocsConfig};

/// Javadoc jar with an index page and one class page
fn javadoc_jar(title: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("index.html", SimpleFileOptions::default())
        .unwrap();
    write!(writer, "<html><title>{title}</title></html>").unwrap();
    writer
        .start_file("org/example/Widget.html", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<html>Widget</html>").unwrap();
    writer
        .start_file("script.js", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"var x = 1;").unwrap();
    writer.finish().unwrap().into_inner()
}

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(cache_root: &Path, mirrors: &[String]) -> Self {
        let config = DocsConfig::new(cache_root).with_mirrors(MirrorList::from_urls(mirrors.iter().cloned()));
        let service = DocService::new(&config).await.unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(docjar::server::serve(listener, Arc::new(service)));

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        TestServer { addr, client }
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("http://{}{path}", self.addr))
            .send()
            .await
            .unwrap()
    }

    async fn get_text(&self, path: &str) -> (u16, String) {
        let response = self.get(path).await;
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }
}

#[tokio::test]
async fn test_falls_back_to_second_mirror_and_caches() {
    let dir = TempDir::new().unwrap();
    let m1 = MockServer::start_async().await;
    let m2 = MockServer::start_async().await;
    let m1_any = m1
        .mock_async(|when, then| {
            when.method(GET).path_contains("/repo/");
            then.status(404);
        })
        .await;
    let m2_jar = m2
        .mock_async(|when, then| {
            when.method(GET).path("/repo/g/a/1.0/a-1.0-javadoc.jar");
            then.status(200).body(javadoc_jar("a 1.0"));
        })
        .await;

    let server = TestServer::start(dir.path(), &[m1.url("/repo"), m2.url("/repo")]).await;

    let response = server.get("/g/a/1.0/index.html").await;
    assert_eq!(response.status().as_u16(), 200);
    let headers = response.headers().clone();
    assert_eq!(headers["content-type"], "text/html");
    assert_eq!(headers["cache-control"], "max-age=604800");
    let first = response.bytes().await.unwrap();
    assert_eq!(&first[..], b"<html><title>a 1.0</title></html>");
    assert_eq!(headers["content-length"], first.len().to_string());

    assert!(dir.path().join("g/a/1.0/a-1.0-javadoc.jar").is_file());
    assert_eq!(m1_any.hits_async().await, 1);
    assert_eq!(m2_jar.hits_async().await, 1);

    // second request is served from the cache
    let second = server.get("/g/a/1.0/index.html").await.bytes().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(m1_any.hits_async().await, 1);
    assert_eq!(m2_jar.hits_async().await, 1);

    let (status, body) = server.get_text("/g/a/1.0/script.js").await;
    assert_eq!(status, 200);
    assert_eq!(body, "var x = 1;");
}

#[tokio::test]
async fn test_release_version_resolves_and_defaults_to_index() {
    let dir = TempDir::new().unwrap();
    let mirror = MockServer::start_async().await;
    let metadata = mirror
        .mock_async(|when, then| {
            when.method(GET).path("/repo/org/example/widget/maven-metadata.xml");
            then.status(200).body(
                "<metadata><versioning><latest>2.4-SNAPSHOT</latest><release>2.3</release></versioning></metadata>",
            );
        })
        .await;
    mirror
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repo/org/example/widget/2.3/widget-2.3-javadoc.jar");
            then.status(200).body(javadoc_jar("widget 2.3"));
        })
        .await;

    let server = TestServer::start(dir.path(), &[mirror.url("/repo")]).await;

    let (status, body) = server.get_text("/org.example/widget/release/").await;
    assert_eq!(status, 200);
    assert_eq!(body, "<html><title>widget 2.3</title></html>");

    let (status, body) = server
        .get_text("/org.example/widget/release/org/example/Widget.html")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body, "<html>Widget</html>");

    // memoised after the first resolution
    assert_eq!(metadata.hits_async().await, 1);
    assert!(dir.path().join("org.example/widget/2.3/widget-2.3-javadoc.jar").is_file());
}

#[tokio::test]
async fn test_listings_browse_the_cache_tree() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("org.vaadin/grid/1.0")).unwrap();
    std::fs::create_dir_all(dir.path().join("org.vaadin/grid/2.0")).unwrap();
    std::fs::create_dir_all(dir.path().join("com.example/tools")).unwrap();
    std::fs::create_dir_all(dir.path().join(".staging")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"not a group").unwrap();

    let server = TestServer::start(dir.path(), &[]).await;

    let (status, body) = server.get_text("/").await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        "<html><head><title>Groups</title></head><body><h1>Groups</h1>\
         <a href='com.example/'>com.example</a><br>\
         <a href='org.vaadin/'>org.vaadin</a><br></body></html>"
    );

    let (status, body) = server.get_text("/org.vaadin/").await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>Artifacts for org.vaadin</h1>"));
    assert!(body.contains("<a href='grid/'>grid</a>"));

    let (status, body) = server.get_text("/org.vaadin/grid/").await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>Versions for grid</h1>"));
    assert!(body.find("'1.0/'").unwrap() < body.find("'2.0/'").unwrap());
}

#[tokio::test]
async fn test_every_failure_is_the_same_not_found() {
    let dir = TempDir::new().unwrap();
    let mirror = MockServer::start_async().await;
    mirror
        .mock_async(|when, then| {
            when.method(GET).path("/repo/g/a/1.0/a-1.0-javadoc.jar");
            then.status(200).body(javadoc_jar("a"));
        })
        .await;

    let server = TestServer::start(dir.path(), &[mirror.url("/repo")]).await;

    for path in [
        "/missing/",
        "/g/missing/",
        "/g/a/9.9/index.html",
        "/g/a/1.0/no-such-page.html",
        "/g/a/x%5Cy/index.html",
    ] {
        let (status, body) = server.get_text(path).await;
        assert_eq!(status, 404, "{path}");
        assert_eq!(body, NOT_FOUND_BODY, "{path}");
    }

    assert!(!dir.path().join("g/a/9.9/a-9.9-javadoc.jar").exists());
}

#[tokio::test]
async fn test_levels_without_trailing_slash_redirect() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start(dir.path(), &[]).await;

    for (path, location) in [("/g", "./g/"), ("/g/a", "./a/"), ("/g/a/1.0", "./1.0/")] {
        let response = server.get(path).await;
        assert_eq!(response.status().as_u16(), 308, "{path}");
        assert_eq!(response.headers()["location"], location);
    }
}

#[tokio::test]
async fn test_double_slash_lists_groups_and_stays_on_site() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("g/a/1.0")).unwrap();
    let mirror = MockServer::start_async().await;
    let any = mirror
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body(javadoc_jar("a"));
        })
        .await;

    let server = TestServer::start(dir.path(), &[mirror.url("/repo")]).await;
    let groups = "<html><head><title>Groups</title></head><body><h1>Groups</h1>\
                  <a href='g/'>g</a><br></body></html>";

    let response = server.get("//evil.example").await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().get("location").is_none());
    assert_eq!(response.text().await.unwrap(), groups);

    let (status, body) = server.get_text("//g/a/1.0/index.html").await;
    assert_eq!(status, 200);
    assert_eq!(body, groups);

    assert_eq!(any.hits_async().await, 0);
}
