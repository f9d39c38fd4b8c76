use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use shortcut_index::match_type::MatchType;
use shortcut_index::{
    AddOutcome, BackendConfig, BackendState, DeletionInfo, HistoryServiceObserver,
    ShortcutsBackend, ShortcutsBackendObserver, Suggestion, UrlRow,
};
use tempfile::tempdir;
use url::Url;

#[derive(Default)]
struct LoadCounter(AtomicUsize);

impl ShortcutsBackendObserver for LoadCounter {
    fn on_shortcuts_loaded(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("url")
}

fn wikipedia() -> Suggestion {
    Suggestion::new(MatchType::UrlWhatYouTyped, url("https://wikipedia.org/"))
        .with_description("Wikipedia, the free encyclopedia")
}

fn open_loaded(db: &Path) -> ShortcutsBackend {
    let mut backend = ShortcutsBackend::new(BackendConfig::sqlite(db)).expect("backend");
    backend.init().expect("init");
    backend.wait_for_load().expect("load");
    assert_eq!(backend.state(), BackendState::Initialized);
    backend
}

#[test]
fn learned_shortcuts_survive_restart() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("profile").join("shortcuts.db");

    let id = {
        let mut backend = open_loaded(&db);
        let AddOutcome::Created(id) = backend.add_or_update("wi", &wikipedia()).expect("add") else {
            panic!("expected a new shortcut");
        };
        backend.add_or_update("w", &wikipedia()).expect("rematch");
        id
    };

    let mut backend = ShortcutsBackend::new(BackendConfig::sqlite(&db)).expect("backend");
    let loads = Arc::new(LoadCounter::default());
    backend.add_observer(loads.clone());
    backend.init().expect("init");
    backend.wait_for_load().expect("load");

    assert_eq!(loads.0.load(Ordering::SeqCst), 1);
    let restored = backend.get(&id).expect("restored shortcut");
    assert_eq!(restored.text, "wikipedia");
    assert_eq!(restored.number_of_hits, 2);
    assert_eq!(restored.match_core.match_type, MatchType::HistoryUrl);
    assert_eq!(restored.match_core.destination_url, url("https://wikipedia.org/"));
    assert_eq!(backend.prefix_matches("WIKI").len(), 1);
}

#[test]
fn deletions_are_persisted() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("shortcuts.db");

    {
        let mut backend = open_loaded(&db);
        backend.add_or_update("wi", &wikipedia()).expect("add");
        backend
            .add_or_update(
                "docs",
                &Suggestion::new(MatchType::HistoryUrl, url("https://docs.example/guide"))
                    .with_description("Docs"),
            )
            .expect("add docs");
        backend
            .add_or_update(
                "news",
                &Suggestion::new(MatchType::HistoryUrl, url("https://news.example/"))
                    .with_description("News"),
            )
            .expect("add news");

        backend
            .delete_shortcuts_beginning_with_url(&url("https://docs.example/"))
            .expect("prefix delete");
        backend.on_urls_deleted(&DeletionInfo::for_urls(vec![UrlRow::new(url(
            "https://news.example/",
        ))]));
    }

    let mut backend = open_loaded(&db);
    let remaining = backend
        .index()
        .iter()
        .map(|(key, _)| key.to_string())
        .collect::<Vec<_>>();
    assert_eq!(remaining, vec!["wikipedia".to_string()]);

    backend.on_urls_deleted(&DeletionInfo::for_all_history());
    drop(backend);

    assert!(open_loaded(&db).is_empty());
}

#[test]
fn exact_url_deletions_before_handoff_are_persisted() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("shortcuts.db");
    let doomed = Suggestion::new(MatchType::HistoryUrl, url("https://doomed.example/"));
    {
        let mut backend = open_loaded(&db);
        backend.add_or_update("doomed", &doomed).expect("add doomed");
        backend.add_or_update("wi", &wikipedia()).expect("add wikipedia");
    }

    {
        let mut backend = ShortcutsBackend::new(BackendConfig::sqlite(&db)).expect("backend");
        backend.init().expect("init");
        backend
            .delete_by_url(&doomed.destination_url, true)
            .expect("delete while loading");
        backend.wait_for_load().expect("load");
        assert_eq!(backend.len(), 1);
    }
    assert_eq!(open_loaded(&db).len(), 1);

    {
        let mut backend = open_loaded(&db);
        backend.add_or_update("doomed", &doomed).expect("add doomed again");
    }
    let mut backend = ShortcutsBackend::new(BackendConfig::sqlite(&db)).expect("backend");
    backend
        .delete_by_url(&doomed.destination_url, true)
        .expect("delete before init");
    backend.init().expect("init");
    backend.wait_for_load().expect("load");
    assert_eq!(backend.len(), 1);
    drop(backend);
    assert_eq!(open_loaded(&db).len(), 1);
}
