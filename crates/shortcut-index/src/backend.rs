use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use chrono::Utc;
use url::Url;

use crate::config::{BackendConfig, StorageMode};
use crate::error::{Result, ShortcutsError};
use crate::expand::expand_to_full_word;
use crate::history::{DeletionInfo, HistoryServiceObserver};
use crate::models::{MatchCore, Shortcut, ShortcutId};
use crate::observer::{ObserverId, ObserverList, ShortcutsBackendObserver};
use crate::prefix_index::PrefixIndex;
use crate::store::{ShortcutStore, SqliteShortcutStore};
use crate::suggestion::Suggestion;
use crate::worker::{PersistenceWorker, WorkerTask};

/// Chars of an existing shortcut kept past the newly typed text on a re-match.
const STABILIZING_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    NotInitialized,
    Initializing,
    Initialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created(ShortcutId),
    Updated(ShortcutId),
    /// Excluded suggestion category or blank text; nothing changed.
    Skipped,
}

/// Live shortcut index plus its persistence worker.
///
/// The value itself is the owning context: every `&mut self` call mutates the
/// live index and notifies observers synchronously, then queues the same
/// change for the worker without waiting on it. Loading builds a separate
/// index on the worker which replaces the live one wholesale when the owner
/// calls [`poll_load`](Self::poll_load) or [`wait_for_load`](Self::wait_for_load).
pub struct ShortcutsBackend {
    state: BackendState,
    index: PrefixIndex,
    observers: ObserverList,
    worker: Option<PersistenceWorker>,
    pending_load: Option<Receiver<PrefixIndex>>,
    // URL deletions accepted before the handoff; replayed onto the loaded index.
    deferred_url_deletions: Vec<(Url, bool)>,
    expansion_enabled: bool,
}

impl std::fmt::Debug for ShortcutsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcutsBackend")
            .field("state", &self.state)
            .field("len", &self.index.len())
            .field("memory_only", &self.worker.is_none())
            .finish_non_exhaustive()
    }
}

impl ShortcutsBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let worker = match config.storage {
            StorageMode::Sqlite(path) => Some(PersistenceWorker::spawn(Box::new(
                SqliteShortcutStore::new(path),
            ))?),
            StorageMode::MemoryOnly => None,
        };
        Ok(Self::with_worker(worker, config.expansion_enabled))
    }

    /// Backend persisting into a caller-provided store.
    pub fn with_store(store: Box<dyn ShortcutStore>, expansion_enabled: bool) -> Result<Self> {
        let worker = PersistenceWorker::spawn(store)?;
        Ok(Self::with_worker(Some(worker), expansion_enabled))
    }

    fn with_worker(worker: Option<PersistenceWorker>, expansion_enabled: bool) -> Self {
        Self {
            state: BackendState::NotInitialized,
            index: PrefixIndex::new(),
            observers: ObserverList::default(),
            worker,
            pending_load: None,
            deferred_url_deletions: Vec::new(),
            expansion_enabled,
        }
    }

    #[must_use]
    pub const fn state(&self) -> BackendState {
        self.state
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state == BackendState::Initialized
    }

    #[must_use]
    pub const fn index(&self) -> &PrefixIndex {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ShortcutId) -> Option<&Shortcut> {
        self.index.get_by_id(id)
    }

    /// Shortcuts whose text starts with `text`, case-insensitively, in key order.
    #[must_use]
    pub fn prefix_matches(&self, text: &str) -> Vec<&Shortcut> {
        let key = text.to_lowercase();
        self.index
            .prefix_scan(&key)
            .map(|(_, shortcut)| shortcut)
            .collect()
    }

    pub fn add_observer(&mut self, observer: Arc<dyn ShortcutsBackendObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Starts loading stored shortcuts. Only valid once, from `NotInitialized`.
    ///
    /// Memory-only backends become `Initialized` immediately.
    pub fn init(&mut self) -> Result<()> {
        if self.state != BackendState::NotInitialized {
            return Err(ShortcutsError::AlreadyInitialized);
        }

        let Some(worker) = self.worker.as_ref() else {
            tracing::debug!("shortcuts backend running memory-only");
            self.deferred_url_deletions.clear();
            self.state = BackendState::Initialized;
            self.observers.notify_loaded();
            return Ok(());
        };

        let (reply, handoff) = mpsc::channel();
        worker.post(WorkerTask::Load { reply })?;
        self.pending_load = Some(handoff);
        self.state = BackendState::Initializing;
        tracing::debug!("shortcuts load dispatched");
        Ok(())
    }

    /// Installs the loaded index if the worker has posted it. Returns whether
    /// the backend is initialized afterwards.
    pub fn poll_load(&mut self) -> bool {
        let Some(handoff) = self.pending_load.as_ref() else {
            return self.is_initialized();
        };
        match handoff.try_recv() {
            Ok(loaded) => self.complete_load(loaded),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("persistence worker exited before loading; starting empty");
                self.complete_load(PrefixIndex::new());
            }
        }
        true
    }

    /// Blocks until a dispatched load is installed.
    pub fn wait_for_load(&mut self) -> Result<()> {
        match self.state {
            BackendState::Initialized => return Ok(()),
            BackendState::NotInitialized => return Err(ShortcutsError::NotReady),
            BackendState::Initializing => {}
        }
        let loaded = match self.pending_load.as_ref().map(Receiver::recv) {
            Some(Ok(loaded)) => loaded,
            Some(Err(_)) | None => {
                tracing::warn!("persistence worker exited before loading; starting empty");
                PrefixIndex::new()
            }
        };
        self.complete_load(loaded);
        Ok(())
    }

    fn complete_load(&mut self, mut loaded: PrefixIndex) {
        for (url, exact) in std::mem::take(&mut self.deferred_url_deletions) {
            remove_with_url(&mut loaded, &url, exact);
        }
        self.index = loaded;
        self.pending_load = None;
        self.state = BackendState::Initialized;
        self.observers.notify_loaded();
    }

    /// Learns that typing `text` led to `suggestion`.
    ///
    /// An existing shortcut whose text starts with `text` and that leads to the
    /// same destination is updated in place (only the first such shortcut in
    /// key order); otherwise a new shortcut is created.
    pub fn add_or_update(&mut self, text: &str, suggestion: &Suggestion) -> Result<AddOutcome> {
        if suggestion.match_type.is_excluded_from_shortcuts() {
            return Ok(AddOutcome::Skipped);
        }

        let typed = if self.expansion_enabled {
            text.trim_end()
        } else {
            text
        };
        if typed.trim_end().is_empty() {
            return Ok(AddOutcome::Skipped);
        }
        self.ensure_initialized()?;

        let key = typed.to_lowercase();
        let now = Utc::now();
        let description = suggestion.shortcut_description();

        let rematch = self
            .index
            .prefix_scan(&key)
            .find(|(_, existing)| {
                existing.match_core.destination_url == suggestion.destination_url
            })
            .map(|(_, existing)| (existing.id, existing.text.clone(), existing.number_of_hits));

        if let Some((id, existing_text, hits)) = rematch {
            let carried = existing_text
                .chars()
                .skip(typed.chars().count())
                .take(STABILIZING_CHARS)
                .collect::<String>();
            let stabilized = format!("{typed}{carried}");
            let new_text = if self.expansion_enabled {
                expand_to_full_word(&stabilized, description)
            } else {
                stabilized
            };
            self.update_shortcut(Shortcut::new(
                id,
                new_text,
                MatchCore::from_suggestion(suggestion),
                now,
                hits.saturating_add(1),
            ))?;
            return Ok(AddOutcome::Updated(id));
        }

        let new_text = if self.expansion_enabled {
            expand_to_full_word(text, description)
        } else {
            text.to_string()
        };
        let id = ShortcutId::new_random();
        self.add_shortcut(Shortcut::new(
            id,
            new_text,
            MatchCore::from_suggestion(suggestion),
            now,
            1,
        ))?;
        Ok(AddOutcome::Created(id))
    }

    pub fn delete_by_ids(&mut self, ids: &[ShortcutId]) -> Result<()> {
        self.ensure_initialized()?;
        for id in ids {
            self.index.remove_by_id(id);
        }
        self.observers.notify_changed();
        self.persist(WorkerTask::DeleteByIds(ids.to_vec()))
    }

    /// Deletes shortcuts leading exactly to `url`.
    pub fn delete_shortcuts_with_url(&mut self, url: &Url) -> Result<()> {
        self.ensure_initialized()?;
        self.delete_by_url(url, true)
    }

    /// Deletes shortcuts whose destination starts with `url`.
    pub fn delete_shortcuts_beginning_with_url(&mut self, url: &Url) -> Result<()> {
        self.ensure_initialized()?;
        self.delete_by_url(url, false)
    }

    /// Deletes by destination, either exactly or by URL prefix.
    ///
    /// Accepted in every state. The store always receives the deletion by URL;
    /// one made before the handoff is also replayed onto the loaded index.
    pub fn delete_by_url(&mut self, url: &Url, exact: bool) -> Result<()> {
        if self.state != BackendState::Initialized {
            self.deferred_url_deletions.push((url.clone(), exact));
        }
        remove_with_url(&mut self.index, url, exact);
        self.observers.notify_changed();

        let destination = url.as_str().to_string();
        let task = if exact {
            WorkerTask::DeleteByUrl(destination)
        } else {
            WorkerTask::DeleteByUrlPrefix(destination)
        };
        self.persist(task)
    }

    pub fn delete_all(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.index.clear();
        self.observers.notify_changed();
        self.persist(WorkerTask::DeleteAll)
    }

    fn add_shortcut(&mut self, shortcut: Shortcut) -> Result<()> {
        self.ensure_initialized()?;
        self.index.insert(shortcut.clone());
        self.observers.notify_changed();
        self.persist(WorkerTask::Add(shortcut))
    }

    fn update_shortcut(&mut self, shortcut: Shortcut) -> Result<()> {
        self.ensure_initialized()?;
        self.index.upsert(shortcut.clone());
        self.observers.notify_changed();
        self.persist(WorkerTask::Update(shortcut))
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ShortcutsError::NotReady)
        }
    }

    fn persist(&self, task: WorkerTask) -> Result<()> {
        match self.worker.as_ref() {
            Some(worker) => worker.post(task),
            None => Ok(()),
        }
    }
}

impl HistoryServiceObserver for ShortcutsBackend {
    fn on_urls_deleted(&mut self, deletion: &DeletionInfo) {
        if !self.is_initialized() {
            return;
        }

        let result = if deletion.is_all_history() {
            self.delete_all()
        } else {
            let ids = self
                .index
                .iter()
                .filter(|(_, shortcut)| deletion.contains_url(&shortcut.match_core.destination_url))
                .map(|(_, shortcut)| shortcut.id)
                .collect::<Vec<_>>();
            self.delete_by_ids(&ids)
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "history deletion sync failed");
        }
    }
}

fn remove_with_url(index: &mut PrefixIndex, url: &Url, exact: bool) {
    let prefix = url.as_str();
    let removed = index.remove_where(|shortcut| {
        let destination = &shortcut.match_core.destination_url;
        if exact {
            destination == url
        } else {
            destination.as_str().starts_with(prefix)
        }
    });
    tracing::debug!(count = removed.len(), exact, "removed shortcuts by url");
}
