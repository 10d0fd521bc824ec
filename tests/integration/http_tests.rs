//! HTTP downloader and end-to-end crawls against wiremock servers

use depthcrawl::config::{Config, CrawlerConfig, HttpConfig, UserAgentConfig};
use depthcrawl::crawler::run_crawl;
use depthcrawl::{crawl, Document, Downloader, ErrorKind, HttpDownloader, PageError};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestCrawler".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
        contact_email: "admin@example.com".to_string(),
    }
}

fn downloader() -> HttpDownloader {
    HttpDownloader::new(&user_agent(), &HttpConfig::default()).unwrap()
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_download_html_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_regex("user-agent", "^TestCrawler/1.0"))
        .respond_with(html(r#"<a href="/next">next</a>"#))
        .mount(&server)
        .await;

    let url = format!("{}/", server.uri());
    let document = downloader().download(&url).await.unwrap();

    assert_eq!(document.url, url);
    assert!(document.is_html());
    assert_eq!(
        document.extract_links().unwrap(),
        vec![format!("{}/next", server.uri())]
    );
}

#[tokio::test]
async fn test_not_found_is_download_error() {
    let server = MockServer::start().await;

    let err = downloader()
        .download(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err, PageError::Download("HTTP 404".to_string()));
}

#[tokio::test]
async fn test_server_error_is_download_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = downloader().download(&server.uri()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DownloadError);
    assert!(err.message().contains("503"));
}

#[tokio::test]
async fn test_redirect_resolves_against_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/new"))
        .mount(&server)
        .await;
    mount_html(&server, "/docs/new", r#"<a href="page">page</a>"#).await;

    let document = downloader()
        .download(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(document.url, format!("{}/docs/new", server.uri()));
    assert_eq!(
        document.extract_links().unwrap(),
        vec![format!("{}/docs/page", server.uri())]
    );
}

#[tokio::test]
async fn test_redirect_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let http = HttpConfig {
        max_redirects: 2,
        ..HttpConfig::default()
    };
    let downloader = HttpDownloader::new(&user_agent(), &http).unwrap();
    let err = downloader
        .download(&format!("{}/loop", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DownloadError);
}

#[tokio::test]
async fn test_non_html_download_fails_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let document = downloader()
        .download(&format!("{}/file.pdf", server.uri()))
        .await
        .unwrap();

    assert!(!document.is_html());
    assert!(matches!(document.extract_links(), Err(PageError::Extract(_))));
}

#[tokio::test]
async fn test_end_to_end_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<html><body>
            <a href="/page1">one</a>
            <a href="/page2#section">two</a>
            <a href="/file.pdf">pdf</a>
            <a href="mailto:someone@example.com">mail</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/page1", r#"<a href="/missing">gone</a><a href="/">home</a>"#).await;
    mount_html(&server, "/page2", r#"<a href="/deep">deep</a>"#).await;
    mount_html(&server, "/deep", r#"<a href="/deeper">deeper</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let seed = format!("{}/", base);
    let result = crawl(downloader(), &seed, 3, 4, 2, 2).await.unwrap();

    let mut downloaded = result.downloaded.clone();
    downloaded.sort();
    let mut expected = vec![
        seed.clone(),
        format!("{}/deep", base),
        format!("{}/file.pdf", base),
        format!("{}/page1", base),
        format!("{}/page2", base),
    ];
    expected.sort();
    assert_eq!(downloaded, expected);

    assert_eq!(result.errors.len(), 2);
    assert_eq!(
        result.error_kind(&format!("{}/missing", base)),
        Some(ErrorKind::DownloadError)
    );
    assert_eq!(
        result.error_kind(&format!("{}/file.pdf", base)),
        Some(ErrorKind::ExtractError)
    );
    assert!(!result.errors.contains_key(&format!("{}/deeper", base)));
}

#[tokio::test]
async fn test_run_crawl_from_config() {
    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    mount_html(&server, "/a", r#"<a href="/b">b</a>"#).await;
    mount_html(&server, "/b", "<p>leaf</p>").await;

    let config = Config {
        crawler: CrawlerConfig {
            max_depth: 2,
            downloaders: 2,
            extractors: 1,
            per_host: 1,
        },
        user_agent: user_agent(),
        http: HttpConfig::default(),
    };

    let result = run_crawl(&config, &format!("{}/", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.downloaded.len(), 3);
    assert!(result.errors.is_empty());
}
