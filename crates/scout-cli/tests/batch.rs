use pretty_assertions::assert_eq;
use scout_cli::cli::load_seeds;
use scout_cli::render::session_text;
use scout_core::{GenerateOptions, ScoutConfig};
use scout_test_utils::{gallery_locator, photo_locator, session, FakeExists};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_seeds(json: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const SEEDS: &str = r#"[
    {"id": "AB100", "source_url": "https://shop.example/p/AB100", "title": "花組 Goethe"},
    {"id": "AB101", "source_url": "https://shop.example/p/AB101", "title": "月組 revue"},
    {"id": "PG20240315", "source_url": "https://shop.example/p/PG", "title": "花組 programme"}
]"#;

#[test]
fn seeds_file_is_filtered_by_title() {
    let file = write_seeds(SEEDS);
    let seeds = load_seeds(file.path(), Some("花組")).unwrap();

    let ids: Vec<&str> = seeds.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["AB100", "PG20240315"]);
}

#[test]
fn malformed_seeds_file_is_an_error() {
    let file = write_seeds("{ not json");
    let err = load_seeds(file.path(), None).unwrap_err();
    assert!(format!("{err:#}").contains("parsing seeds"));
}

#[tokio::test]
async fn batch_renders_as_text() {
    let file = write_seeds(SEEDS);
    let seeds = load_seeds(file.path(), None).unwrap();

    let config = ScoutConfig::new().with_generate(GenerateOptions::new().with_range(1, 2));
    let fake = Arc::new(FakeExists::found([
        photo_locator("AB100"),
        gallery_locator("AB100", 1),
        gallery_locator("AB100", 2),
    ]));
    let output = session(&config).run(seeds, fake).await;
    let text = session_text(&output);

    // dated seed first, then codes by number
    let order: Vec<&str> = output.catalog.per_seed.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["PG20240315", "AB101", "AB100"]);

    assert!(text.contains("AB100 [花 Flower]\n  direct\n    https://shop.example/goods/AB100.jpg"));
    assert!(text.contains("  goods-gallery AB100 (+0d, 2 hits)"));
    assert!(text.contains("AB101 [月 Moon]\n  none found"));
    assert!(text.contains("3 verified"));
}
