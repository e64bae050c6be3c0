//! End-to-end resolution tests against a scripted transport.
//!
//! No network: the fake implements the `Transport` trait and serves canned
//! responses keyed by URL, recording every request so the tests can assert
//! exactly how many outbound fetches the pipeline issued.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use trackback::cdx::build_query_url;
use trackback::config::Config;
use trackback::fetch::{Transport, TransportResponse};
use trackback::models::Resolution;
use trackback::resolve::resolve;

const WAYBACK_BASE: &str = "https://web.archive.org/web";

#[derive(Clone)]
enum Canned {
    Status(u16, &'static str),
    ConnectionError,
}

struct FakeTransport {
    responses: Mutex<HashMap<String, VecDeque<Canned>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn on(self, url: &str, canned: Canned) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(canned);
        self
    }

    /// Repeat the same canned response for every request to `url`.
    fn on_repeat(self, url: &str, canned: Canned, times: usize) -> Self {
        let mut this = self;
        for _ in 0..times {
            this = this.on(url, canned.clone());
        }
        this
    }

    fn snapshot_fetch_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.starts_with(WAYBACK_BASE))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> anyhow::Result<TransportResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        let canned = self
            .responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| panic!("unexpected request: {}", url));
        match canned {
            Canned::Status(status, body) => Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            Canned::ConnectionError => Err(anyhow::anyhow!("connection reset by peer")),
        }
    }
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn snapshot_url(timestamp: &str, video_id: &str) -> String {
    format!("{}/{}/{}", WAYBACK_BASE, timestamp, watch_url(video_id))
}

/// CDX body with three candidates, newest first.
const THREE_CANDIDATES: &str = r#"[
    ["original","timestamp","mimetype","statuscode","digest"],
    ["https://www.youtube.com/watch?v=abc123","20210301000000","text/html","200","D1"],
    ["https://www.youtube.com/watch?v=abc123","20200601000000","text/html","200","D2"],
    ["https://www.youtube.com/watch?v=abc123","20190915000000","text/html","200","D3"]
]"#;

const HEADER_ONLY: &str = r#"[["original","timestamp","mimetype","statuscode","digest"]]"#;

const HTML_NO_TITLE: &str = "<html><body><p>This video is unavailable.</p></body></html>";

const HTML_WITH_TITLE: &str = concat!(
    r#"<html><head><meta property="og:title" content="Lost Classic"></head>"#,
    "<body></body></html>",
);

fn cdx_url(config: &Config, video_id: &str) -> String {
    build_query_url(&config.archive, video_id).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_first_extractable_candidate_wins() {
    let config = Config::default();
    let transport = FakeTransport::new()
        .on(&cdx_url(&config, "abc123"), Canned::Status(200, THREE_CANDIDATES))
        // Candidate 1: permanent fetch failure — skipped after one attempt.
        .on(
            &snapshot_url("20210301000000", "abc123"),
            Canned::Status(404, ""),
        )
        // Candidate 2: fetches fine but carries no title.
        .on(
            &snapshot_url("20200601000000", "abc123"),
            Canned::Status(200, HTML_NO_TITLE),
        )
        // Candidate 3: fetches and extracts.
        .on(
            &snapshot_url("20190915000000", "abc123"),
            Canned::Status(200, HTML_WITH_TITLE),
        );

    let resolution = resolve(&transport, &config, "abc123").await;

    assert_eq!(
        resolution,
        Resolution::Found {
            title: "Lost Classic".to_string(),
            rule: "og:title".to_string(),
            timestamp: "20190915000000".to_string(),
            url: snapshot_url("20190915000000", "abc123"),
        }
    );
    assert_eq!(transport.snapshot_fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_index_failure_is_failed_with_no_snapshot_fetches() {
    let config = Config::default();
    // CDX stays busy through every retry (default policy: 3 attempts).
    let transport = FakeTransport::new().on_repeat(
        &cdx_url(&config, "abc123"),
        Canned::Status(503, ""),
        3,
    );

    let resolution = resolve(&transport, &config, "abc123").await;

    match resolution {
        Resolution::Failed { error } => {
            assert!(error.contains("abc123"));
            assert!(error.contains("3 attempts"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(transport.snapshot_fetch_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_candidates_is_not_found_immediately() {
    let config = Config::default();
    let transport =
        FakeTransport::new().on(&cdx_url(&config, "abc123"), Canned::Status(200, HEADER_ONLY));

    let resolution = resolve(&transport, &config, "abc123").await;

    assert_eq!(resolution, Resolution::NotFound);
    assert_eq!(transport.snapshot_fetch_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_all_candidates_exhausted_is_not_found() {
    let config = Config::default();
    let transport = FakeTransport::new()
        .on(&cdx_url(&config, "abc123"), Canned::Status(200, THREE_CANDIDATES))
        .on(
            &snapshot_url("20210301000000", "abc123"),
            Canned::Status(200, HTML_NO_TITLE),
        )
        .on(
            &snapshot_url("20200601000000", "abc123"),
            Canned::Status(404, ""),
        )
        .on(
            &snapshot_url("20190915000000", "abc123"),
            Canned::Status(200, HTML_NO_TITLE),
        );

    let resolution = resolve(&transport, &config, "abc123").await;

    assert_eq!(resolution, Resolution::NotFound);
    assert_eq!(transport.snapshot_fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transient_snapshot_failure_retries_then_extracts() {
    let config = Config::default();
    let transport = FakeTransport::new()
        .on(&cdx_url(&config, "abc123"), Canned::Status(200, THREE_CANDIDATES))
        // Candidate 1 recovers on the second attempt.
        .on(&snapshot_url("20210301000000", "abc123"), Canned::ConnectionError)
        .on(
            &snapshot_url("20210301000000", "abc123"),
            Canned::Status(200, HTML_WITH_TITLE),
        );

    let resolution = resolve(&transport, &config, "abc123").await;

    match resolution {
        Resolution::Found {
            title, timestamp, ..
        } => {
            assert_eq!(title, "Lost Classic");
            assert_eq!(timestamp, "20210301000000");
        }
        other => panic!("expected Found, got {:?}", other),
    }
    // Two requests to the same snapshot, no other candidate touched.
    assert_eq!(transport.snapshot_fetch_count(), 2);
}
