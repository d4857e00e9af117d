use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use serpsight::fetch::{FetchConfig, Fetcher};
use serpsight::pipeline::{self, AnalyzeOptions};
use serpsight::report::SearchResultEntry;

const GUIDE_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Python Guide</title><script>tracker();</script></head>
  <body>
    <h1>Python Guide</h1>
    <h2>Getting Started</h2>
    <h2>Installation</h2>
    <p>Learning python step by step with examples</p>
  </body>
</html>
"#;

const TIPS_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Python Tips</title></head>
  <body>
    <h1>Python Tips</h1>
    <h2>Getting Started</h2>
    <p>Short tips</p>
  </body>
</html>
"#;

fn spawn_docs_server() -> (String, mpsc::Sender<()>, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let base_url = format!("http://{}", server.server_addr());
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(_) => break,
            };

            let (status, body) = match request.url() {
                "/blog/guide" => (200, GUIDE_PAGE),
                "/blog/tips" => (200, TIPS_PAGE),
                _ => (404, "not found"),
            };
            let _ =
                request.respond(tiny_http::Response::from_string(body).with_status_code(status));
        }
    });

    (base_url, shutdown_tx, handle)
}

fn entry(position: u32, title: &str, link: String) -> SearchResultEntry {
    SearchResultEntry {
        position,
        title: title.to_owned(),
        link,
        snippet: None,
    }
}

fn test_fetcher() -> Fetcher {
    Fetcher::new(FetchConfig {
        retry_delay: Duration::from_millis(10),
        ..FetchConfig::default()
    })
    .expect("build fetcher")
}

fn test_options() -> AnalyzeOptions {
    AnalyzeOptions {
        max_retries: 0,
        ..AnalyzeOptions::default()
    }
}

#[tokio::test]
async fn pipeline_produces_report_and_skips_failed_documents() -> anyhow::Result<()> {
    let (base_url, shutdown, handle) = spawn_docs_server();

    let results = vec![
        entry(1, "How to Learn Python", format!("{base_url}/blog/guide")),
        entry(2, "Best Python Books", format!("{base_url}/blog/tips")),
        entry(3, "Python Tutorial for Beginners", format!("{base_url}/docs/guide")),
    ];

    let report = pipeline::analyze_serp(
        &test_fetcher(),
        "learn python",
        &results,
        &test_options(),
        &CancellationToken::new(),
    )
    .await?;

    assert_eq!(report.keyword, "learn python");
    assert_eq!(report.total_results, 3);
    // The /docs/guide fetch 404s and is skipped, not fatal.
    assert_eq!(report.analyzed_documents, 2);

    // Guide page flattens to 14 words (title included), tips page to 8.
    assert_eq!(report.content_metrics.min_word_count, 8);
    assert_eq!(report.content_metrics.max_word_count, 14);
    assert_eq!(report.content_metrics.avg_word_count, 11);

    // "Getting Started" appears on both fetched pages.
    assert_eq!(report.common_headings.h2[0], "getting started");
    assert_eq!(
        report.common_headings.h1,
        vec!["python guide", "python tips"]
    );

    // Title and URL signals come from the full result list.
    assert!(
        report
            .title_patterns
            .common_formats
            .contains(&"How to...".to_owned())
    );
    assert!(
        !report
            .title_patterns
            .common_formats
            .contains(&"Questions".to_owned())
    );
    assert_eq!(report.url_patterns.avg_path_depth, 2.0);
    assert!(report.url_patterns.common_paths.contains(&"blog".to_owned()));

    let _ = shutdown.send(());
    let _ = handle.join();
    Ok(())
}

#[tokio::test]
async fn results_beyond_the_document_cap_still_shape_title_signals() -> anyhow::Result<()> {
    let (base_url, shutdown, handle) = spawn_docs_server();

    let mut results = Vec::new();
    for position in 1..=5 {
        results.push(entry(
            position,
            "Python Guide Pages",
            format!("{base_url}/blog/guide"),
        ));
    }
    // Rank 6 is never fetched; a dead link proves it.
    results.push(entry(
        6,
        "Zygomorphic Flowers Explained",
        "http://127.0.0.1:9/unfetched".to_owned(),
    ));

    let report = pipeline::analyze_serp(
        &test_fetcher(),
        "python",
        &results,
        &test_options(),
        &CancellationToken::new(),
    )
    .await?;

    assert_eq!(report.analyzed_documents, 5);
    assert!(
        report
            .title_patterns
            .common_words
            .contains(&"zygomorphic".to_owned())
    );

    let _ = shutdown.send(());
    let _ = handle.join();
    Ok(())
}

#[tokio::test]
async fn report_degrades_to_zero_metrics_when_every_fetch_fails() -> anyhow::Result<()> {
    // Bind a port, then shut the server down so every fetch is refused.
    let (base_url, shutdown, handle) = spawn_docs_server();
    let _ = shutdown.send(());
    let _ = handle.join();

    let results = vec![
        entry(1, "How to Learn Python", format!("{base_url}/blog/guide")),
        entry(2, "Best Python Books", format!("{base_url}/blog/tips")),
    ];

    let report = pipeline::analyze_serp(
        &test_fetcher(),
        "learn python",
        &results,
        &test_options(),
        &CancellationToken::new(),
    )
    .await?;

    assert_eq!(report.analyzed_documents, 0);
    assert_eq!(report.content_metrics.avg_word_count, 0);
    assert_eq!(report.content_metrics.min_word_count, 0);
    assert_eq!(report.content_metrics.max_word_count, 0);
    assert!(report.common_headings.is_empty());

    // Title and URL mining still run over the supplied result list.
    assert!(!report.title_patterns.common_words.is_empty());
    assert_eq!(report.url_patterns.avg_path_depth, 2.0);

    Ok(())
}

#[tokio::test]
async fn invalid_result_urls_are_skipped_not_fatal() -> anyhow::Result<()> {
    let (base_url, shutdown, handle) = spawn_docs_server();

    let results = vec![
        entry(1, "Broken Link", "not a url at all".to_owned()),
        entry(2, "Python Guide", format!("{base_url}/blog/guide")),
    ];

    let report = pipeline::analyze_serp(
        &test_fetcher(),
        "python",
        &results,
        &test_options(),
        &CancellationToken::new(),
    )
    .await?;

    assert_eq!(report.analyzed_documents, 1);
    assert_eq!(report.content_metrics.min_word_count, 14);

    let _ = shutdown.send(());
    let _ = handle.join();
    Ok(())
}
