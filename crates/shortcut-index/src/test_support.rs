use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use url::Url;

use crate::error::{Result, ShortcutsError};
use crate::match_type::MatchType;
use crate::models::{MatchCore, Shortcut, ShortcutId};
use crate::store::ShortcutStore;
use crate::suggestion::Suggestion;

pub(crate) fn url(raw: &str) -> Url {
    Url::parse(raw).expect("url")
}

pub(crate) fn suggestion(destination: &str, description: &str) -> Suggestion {
    Suggestion::new(MatchType::HistoryUrl, url(destination)).with_description(description)
}

pub(crate) fn shortcut(text: &str, destination: &str) -> Shortcut {
    Shortcut::new(
        ShortcutId::new_random(),
        text,
        MatchCore::from_suggestion(&suggestion(destination, "")),
        Utc::now(),
        1,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreOp {
    Initialize,
    Add(ShortcutId),
    Update(ShortcutId, String),
    DeleteByIds(Vec<ShortcutId>),
    DeleteByUrl(String),
    DeleteByUrlPrefix(String),
    DeleteAll,
    Released,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StoreLog(Arc<Mutex<Vec<StoreOp>>>);

impl StoreLog {
    fn push(&self, op: StoreOp) {
        self.0.lock().expect("store log").push(op);
    }

    pub(crate) fn snapshot(&self) -> Vec<StoreOp> {
        self.0.lock().expect("store log").clone()
    }
}

/// In-memory store that records every successful call.
pub(crate) struct RecordingStore {
    rows: HashMap<ShortcutId, Shortcut>,
    log: StoreLog,
    fail: bool,
    load_gate: Option<Receiver<()>>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            rows: HashMap::new(),
            log: StoreLog::default(),
            fail: false,
            load_gate: None,
        }
    }

    pub(crate) fn with_shortcuts(shortcuts: impl IntoIterator<Item = Shortcut>) -> Self {
        let mut store = Self::new();
        store.rows = shortcuts.into_iter().map(|s| (s.id, s)).collect();
        store
    }

    pub(crate) fn failing() -> Self {
        let mut store = Self::new();
        store.fail = true;
        store
    }

    /// `load_all` blocks until the returned sender fires or is dropped.
    pub(crate) fn gated(mut self) -> (Self, Sender<()>) {
        let (open, gate) = mpsc::channel();
        self.load_gate = Some(gate);
        (self, open)
    }

    pub(crate) fn log(&self) -> StoreLog {
        self.log.clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(ShortcutsError::Internal("recording store set to fail".to_string()));
        }
        Ok(())
    }
}

impl ShortcutStore for RecordingStore {
    fn initialize(&mut self) -> Result<()> {
        self.check()?;
        self.log.push(StoreOp::Initialize);
        Ok(())
    }

    fn load_all(&mut self) -> Result<HashMap<ShortcutId, Shortcut>> {
        self.check()?;
        if let Some(gate) = self.load_gate.take() {
            let _ = gate.recv();
        }
        Ok(self.rows.clone())
    }

    fn add(&mut self, shortcut: &Shortcut) -> Result<()> {
        self.check()?;
        self.rows.insert(shortcut.id, shortcut.clone());
        self.log.push(StoreOp::Add(shortcut.id));
        Ok(())
    }

    fn update(&mut self, shortcut: &Shortcut) -> Result<()> {
        self.check()?;
        self.rows.insert(shortcut.id, shortcut.clone());
        self.log
            .push(StoreOp::Update(shortcut.id, shortcut.text.clone()));
        Ok(())
    }

    fn delete_by_ids(&mut self, ids: &[ShortcutId]) -> Result<()> {
        self.check()?;
        for id in ids {
            self.rows.remove(id);
        }
        self.log.push(StoreOp::DeleteByIds(ids.to_vec()));
        Ok(())
    }

    fn delete_by_url(&mut self, url: &str) -> Result<()> {
        self.check()?;
        self.rows
            .retain(|_, s| s.match_core.destination_url.as_str() != url);
        self.log.push(StoreOp::DeleteByUrl(url.to_string()));
        Ok(())
    }

    fn delete_by_url_prefix(&mut self, url_prefix: &str) -> Result<()> {
        self.check()?;
        self.rows
            .retain(|_, s| !s.match_core.destination_url.as_str().starts_with(url_prefix));
        self.log
            .push(StoreOp::DeleteByUrlPrefix(url_prefix.to_string()));
        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        self.check()?;
        self.rows.clear();
        self.log.push(StoreOp::DeleteAll);
        Ok(())
    }
}

impl Drop for RecordingStore {
    fn drop(&mut self) {
        self.log.push(StoreOp::Released);
    }
}
