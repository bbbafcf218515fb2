//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! full crawl cycle end-to-end with the static renderer and the in-memory
//! sink.

use magpie::crawler::{build_http_client, CrawlConfig, CrawlEngine, CrawlReport, StaticRenderer};
use magpie::sink::MemorySink;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page at the given path
async fn mount_html(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.to_string().into_bytes(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Runs a crawl against the mock server and returns the report and sink
async fn run_crawl(
    seed: &str,
    ignore: Vec<String>,
    max_depth: u32,
) -> (CrawlReport, MemorySink) {
    let config = CrawlConfig::new(seed, ignore, max_depth)
        .expect("valid crawl config")
        .with_collection("test");

    let renderer = StaticRenderer::new(build_http_client(5).expect("http client"));
    let sink = MemorySink::new();

    // MemorySink records through interior mutability, so sharing a
    // reference with the engine is enough to inspect writes afterwards.
    let report = {
        let engine = CrawlEngine::new(config, renderer, &sink).expect("engine");
        engine.run().await.expect("crawl")
    };

    (report, sink)
}

#[tokio::test]
async fn test_seed_and_single_child_are_both_visited() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/a",
        &format!(r#"<html><body><p>Page A content</p><a href="{}/b">B</a></body></html>"#, base),
    )
    .await;
    mount_html(&server, "/b", "<html><body><p>Page B content</p></body></html>").await;

    let (report, sink) = run_crawl(&format!("{}/a", base), vec![], 1).await;

    let url_a = format!("{}/a", base);
    let url_b = format!("{}/b", base);

    assert_eq!(report.visited.len(), 2);
    assert!(report.visited[&url_a] > 0);
    assert!(report.visited[&url_b] > 0);

    // The ledger records exactly what the sink reported writing
    let records = sink.records();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.collection, "test");
        assert_eq!(report.visited[&record.url], record.len);
    }
}

#[tokio::test]
async fn test_failed_seed_is_recorded_empty_with_no_children() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (report, sink) = run_crawl(&format!("{}/a", base), vec![], 2).await;

    assert_eq!(report.visited.len(), 1);
    assert_eq!(report.visited[&format!("{}/a", base)], 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_cross_origin_links_are_never_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/a",
        r#"<html><body><p>Home</p><a href="https://other.test/x">External</a></body></html>"#,
    )
    .await;

    let (report, _sink) = run_crawl(&format!("{}/a", base), vec![], 2).await;

    assert_eq!(report.visited.len(), 1);
    assert!(!report.visited.keys().any(|url| url.contains("other.test")));
}

#[tokio::test]
async fn test_trailing_slash_and_bare_form_are_one_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/a",
        &format!(
            r#"<html><body><p>Home</p>
            <a href="{0}/b">B</a>
            <a href="{0}/b/">B again</a>
            <a href="{0}/a#section">Self</a>
            </body></html>"#,
            base
        ),
    )
    .await;
    mount_html(&server, "/b", "<html><body><p>B content</p></body></html>").await;

    let (report, _sink) = run_crawl(&format!("{}/a", base), vec![], 3).await;

    // /b and /b/ collapse to one key; /a#section collapses into the seed
    assert_eq!(report.visited.len(), 2);
    assert!(report.visited.contains_key(&format!("{}/b", base)));
    assert!(!report.visited.contains_key(&format!("{}/b/", base)));

    // Each page was fetched exactly once: one GET for classification plus
    // one render fetch
    let requests = server.received_requests().await.unwrap();
    let b_fetches = requests
        .iter()
        .filter(|r| r.url.path().trim_end_matches('/') == "/b")
        .count();
    assert_eq!(b_fetches, 2);
}

#[tokio::test]
async fn test_depth_ceiling_stops_traversal() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/a",
        &format!(r#"<html><body><p>A</p><a href="{}/b">B</a></body></html>"#, base),
    )
    .await;
    mount_html(
        &server,
        "/b",
        &format!(r#"<html><body><p>B</p><a href="{}/c">C</a></body></html>"#, base),
    )
    .await;
    mount_html(&server, "/c", "<html><body><p>C</p></body></html>").await;

    let (report, _sink) = run_crawl(&format!("{}/a", base), vec![], 1).await;

    // Depth 0 = /a, depth 1 = /b; /c would be depth 2
    assert_eq!(report.visited.len(), 2);
    assert!(!report.visited.contains_key(&format!("{}/c", base)));
}

#[tokio::test]
async fn test_ignore_patterns_prevent_fetching() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/a",
        &format!(
            r#"<html><body><p>A</p>
            <a href="{0}/keep">Keep</a>
            <a href="{0}/admin/panel">Admin</a>
            </body></html>"#,
            base
        ),
    )
    .await;
    mount_html(&server, "/keep", "<html><body><p>Kept page</p></body></html>").await;

    let (report, _sink) = run_crawl(&format!("{}/a", base), vec!["/admin/".to_string()], 2).await;

    assert_eq!(report.visited.len(), 2);
    assert!(!report.visited.keys().any(|url| url.contains("/admin/")));

    // The ignored URL was never requested at all
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().contains("/admin/")));
}

#[tokio::test]
async fn test_unsupported_content_type_is_empty_visit() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"col1,col2\n1,2\n".to_vec(), "text/csv"),
        )
        .mount(&server)
        .await;

    let (report, sink) = run_crawl(&format!("{}/data", base), vec![], 0).await;

    assert_eq!(report.visited[&format!("{}/data", base)], 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_pdf_child_is_persisted_as_binary() {
    let server = MockServer::start().await;
    let base = server.uri();

    let pdf_bytes = b"%PDF-1.4 fake report".to_vec();

    mount_html(
        &server,
        "/a",
        &format!(r#"<html><body><p>A</p><a href="{}/report">Report</a></body></html>"#, base),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(pdf_bytes.clone(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let (report, sink) = run_crawl(&format!("{}/a", base), vec![], 1).await;

    let report_url = format!("{}/report", base);
    assert_eq!(report.visited[&report_url], pdf_bytes.len() as u64);

    let records = sink.records();
    let pdf_record = records.iter().find(|r| r.url == report_url).unwrap();
    assert_eq!(pdf_record.kind, magpie::ContentKind::Pdf);
    assert!(pdf_record.text.is_none());
    assert_eq!(pdf_record.depth, 1);
}

#[tokio::test]
async fn test_empty_page_counts_as_visited_without_following_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    // The page renders to nothing but still carries a link
    mount_html(
        &server,
        "/empty",
        &format!(
            r#"<html><body><div>   </div><a href="{}/hidden">   </a></body></html>"#,
            base
        ),
    )
    .await;
    mount_html(&server, "/hidden", "<html><body><p>Hidden</p></body></html>").await;

    let (report, sink) = run_crawl(&format!("{}/empty", base), vec![], 2).await;

    assert_eq!(report.visited.len(), 1);
    assert_eq!(report.visited[&format!("{}/empty", base)], 0);
    assert!(!report.visited.contains_key(&format!("{}/hidden", base)));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_persisted_text_carries_metadata_header() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/guides/icap",
        "<html><body><p>Guidance content</p></body></html>",
    )
    .await;

    let (_report, sink) = run_crawl(&format!("{}/guides/icap", base), vec![], 0).await;

    let records = sink.records();
    assert_eq!(records.len(), 1);

    let text = records[0].text.as_deref().unwrap();
    assert!(text.starts_with("# Metadata for this file:"));
    assert!(text.contains("- title: icap"));
    assert!(text.contains(&format!("- source: {}/guides/icap", base)));
    assert!(text.contains("Guidance content"));
}
