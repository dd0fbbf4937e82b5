use async_trait::async_trait;
use std::collections::HashMap;
use tempfile::TempDir;
use volume_tracker::core::ranges::format_ranges;
use volume_tracker::{
    LocalStorage, NotionStore, PageFetcher, Result, TrackerConfig, TrackerEngine, TrackerError,
};

/// Serves canned page text per URL; unknown URLs fail like an exhausted fetch.
struct MockFetcher {
    pages: HashMap<String, String>,
}

impl MockFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, text)| (url.to_string(), text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| TrackerError::FetchError {
                url: url.to_string(),
                attempts: 3,
                source: Box::new(TrackerError::TimeoutError {
                    stage: "navigation",
                    seconds: 180,
                }),
            })
    }
}

fn config_without_store(output_path: &str) -> TrackerConfig {
    let content = format!(
        r#"
[report]
output_path = "{output_path}"

[[series]]
name = "Series A"
url = "http://x/a"
owned = [1, 2, 4]

[[series]]
name = "Series B"
url = "http://x/b"
owned = []
"#
    );
    TrackerConfig::from_toml_str(&content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_reconciliation_and_reports() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let fetcher = MockFetcher::new(&[
        ("http://x/a", "New arrivals: #1 #2 #3 #4 #6"),
        ("http://x/b", "Volumes #1 #2 #3 #7 #8 #10 in stock"),
    ]);
    let storage = LocalStorage::new(output_path.clone());
    let config = config_without_store(&output_path);

    let engine = TrackerEngine::<_, _, NotionStore>::new(fetcher, storage, None, config);
    let reports = engine.run().await.unwrap();

    assert_eq!(reports.len(), 2);

    let a = &reports[0];
    assert_eq!(a.name, "Series A");
    assert_eq!(a.existing, vec![1, 2, 3, 4, 6]);
    assert_eq!(a.missing, vec![3, 6]);
    assert_eq!(a.missing_count, 2);
    assert_eq!(format_ranges(&a.missing), "3, 6");

    let b = &reports[1];
    assert_eq!(b.existing, vec![1, 2, 3, 7, 8, 10]);
    assert_eq!(b.missing, vec![1, 2, 3, 7, 8, 10]);
    assert_eq!(format_ranges(&b.missing), "1–3, 7–8, 10");

    // structured report on disk
    let json_path = temp_dir.path().join("results.json");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["Series A"]["missing"], serde_json::json!([3, 6]));
    assert_eq!(json["Series A"]["missing_count"], 2);
    assert_eq!(json["Series B"]["url"], "http://x/b");

    // narrative report on disk
    let markdown = std::fs::read_to_string(temp_dir.path().join("results.md")).unwrap();
    assert!(markdown.contains("# Volume Tracker"));
    assert!(markdown.contains("## Series A"));
    assert!(markdown.contains("- Missing (2): 3, 6"));
    assert!(markdown.contains("- Missing (6): 1–3, 7–8, 10"));
}

#[tokio::test]
async fn test_report_order_follows_config_order() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let fetcher = MockFetcher::new(&[("http://x/a", "#1"), ("http://x/b", "#2")]);
    let storage = LocalStorage::new(output_path.clone());
    let config = config_without_store(&output_path);

    let engine = TrackerEngine::<_, _, NotionStore>::new(fetcher, storage, None, config);
    let reports = engine.run().await.unwrap();

    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Series A", "Series B"]);

    let json = std::fs::read_to_string(temp_dir.path().join("results.json")).unwrap();
    assert!(json.find("Series A").unwrap() < json.find("Series B").unwrap());
}

#[tokio::test]
async fn test_fetch_failure_aborts_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    // no canned page for Series A
    let fetcher = MockFetcher::new(&[("http://x/b", "#2")]);
    let storage = LocalStorage::new(output_path.clone());
    let config = config_without_store(&output_path);

    let engine = TrackerEngine::<_, _, NotionStore>::new(fetcher, storage, None, config);
    let result = engine.run().await;

    assert!(matches!(
        result,
        Err(TrackerError::FetchError { attempts: 3, .. })
    ));
    // aborted before any report was written
    assert!(!temp_dir.path().join("results.json").exists());
}

#[tokio::test]
async fn test_page_with_no_volume_tokens_yields_empty_sets() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let content = format!(
        r#"
[report]
output_path = "{output_path}"

[[series]]
name = "Quiet"
url = "http://x/quiet"
owned = [1]
"#
    );
    let config = TrackerConfig::from_toml_str(&content).unwrap();

    let fetcher = MockFetcher::new(&[("http://x/quiet", "nothing announced here")]);
    let storage = LocalStorage::new(output_path);

    let engine = TrackerEngine::<_, _, NotionStore>::new(fetcher, storage, None, config);
    let reports = engine.run().await.unwrap();

    assert_eq!(reports[0].existing, Vec::<u32>::new());
    assert_eq!(reports[0].missing, Vec::<u32>::new());
    assert_eq!(reports[0].missing_count, 0);
}
