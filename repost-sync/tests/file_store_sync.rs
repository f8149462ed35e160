use repost_core::{feed, AppConfig};
use repost_sync::{fields, run_batch, FileStore, MemoryStore, SyncEngine, SyncOptions};
use tempfile::TempDir;

const FEED: &str = r#"{
  "posts": [
    {
      "postId": "501",
      "urlSlug": "wellness-week",
      "title": "Wellness week",
      "description": "A week of wellness events.",
      "postSourceType": "Blog",
      "provider": "Newsroom",
      "modifiedDate": "2024-04-02T10:00:00Z",
      "publishDate": "2024-04-01T09:00:00Z",
      "categories": [{ "id": 4, "name": "Health & Wellness" }],
      "images": { "box960": { "url": "https://cdn.example.com/wellness.jpg" } }
    }
  ]
}"#;

fn seed(dir: &std::path::Path) {
    let seeded = MemoryStore::new()
        .with_group("news-health", 21)
        .with_term("ts", "Health & Wellness", "t-health")
        .with_field("Site Pages", fields::SOURCE_CATEGORIES, "f-cat");
    FileStore::from((dir.to_path_buf(), seeded))
        .persist()
        .expect("seed store");
}

fn config() -> AppConfig {
    AppConfig {
        categories_term_set_id: "ts".to_string(),
        ..AppConfig::starter()
    }
}

#[test]
fn resync_after_reopen_is_a_no_op() {
    let dir = TempDir::new().expect("store dir");
    seed(dir.path());
    let posts = feed::parse_str(FEED).expect("feed");

    let store = FileStore::open(dir.path()).expect("open");
    let mut engine = SyncEngine::new(store, config(), SyncOptions::default()).expect("engine");
    let report = run_batch(&mut engine, &posts).expect("first run");
    assert_eq!(report.created(), 1);

    let store = FileStore::open(dir.path()).expect("reopen");
    let mut engine = SyncEngine::new(store, config(), SyncOptions::default()).expect("engine");
    let report = run_batch(&mut engine, &posts).expect("second run");
    assert_eq!(report.unchanged(), 1);
    assert_eq!(engine.store().inner().calls().writes(), 0);

    let page = engine
        .store()
        .inner()
        .pages()
        .next()
        .expect("page persisted");
    assert_eq!(page.name.0, "wellness-week.aspx");
    assert!(page.published);
}

#[test]
fn dry_run_leaves_store_file_untouched() {
    let dir = TempDir::new().expect("store dir");
    seed(dir.path());
    let before = std::fs::read_to_string(dir.path().join("store.json")).expect("read");
    let posts = feed::parse_str(FEED).expect("feed");

    let store = FileStore::open(dir.path()).expect("open");
    let mut engine =
        SyncEngine::new(store, config(), SyncOptions { dry_run: true }).expect("engine");
    run_batch(&mut engine, &posts).expect("dry run");

    let after = std::fs::read_to_string(dir.path().join("store.json")).expect("read");
    assert_eq!(before, after);
}
