use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::error::{Result, ShortcutsError};
use crate::models::{Shortcut, ShortcutId};
use crate::prefix_index::PrefixIndex;
use crate::store::ShortcutStore;

const WORKER_THREAD_NAME: &str = "shortcuts-db";

pub(crate) enum WorkerTask {
    /// Reads every record and hands a freshly built index back through `reply`.
    Load { reply: Sender<PrefixIndex> },
    Add(Shortcut),
    Update(Shortcut),
    DeleteByIds(Vec<ShortcutId>),
    DeleteByUrl(String),
    DeleteByUrlPrefix(String),
    DeleteAll,
}

impl WorkerTask {
    const fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Add(_) => "add",
            Self::Update(_) => "update",
            Self::DeleteByIds(_) => "delete_by_ids",
            Self::DeleteByUrl(_) => "delete_by_url",
            Self::DeleteByUrlPrefix(_) => "delete_by_url_prefix",
            Self::DeleteAll => "delete_all",
        }
    }
}

/// Owns the store on a dedicated thread and runs tasks in submission order.
///
/// The store is opened before the first task, whichever task that is; a store
/// that fails to open is retried on the next task.
///
/// Dropping the worker closes the queue; the thread drains every task already
/// queued, then releases the store, and the drop waits for that to finish.
pub(crate) struct PersistenceWorker {
    tasks: Option<Sender<WorkerTask>>,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PersistenceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceWorker").finish_non_exhaustive()
    }
}

impl PersistenceWorker {
    pub(crate) fn spawn(store: Box<dyn ShortcutStore>) -> Result<Self> {
        let (tasks, inbox) = mpsc::channel();
        let thread = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run(store, inbox))?;
        Ok(Self {
            tasks: Some(tasks),
            thread: Some(thread),
        })
    }

    /// Fire-and-forget submission.
    pub(crate) fn post(&self, task: WorkerTask) -> Result<()> {
        let name = task.name();
        let sender = self.tasks.as_ref().ok_or(ShortcutsError::WorkerUnavailable)?;
        sender.send(task).map_err(|_| {
            tracing::warn!(task = name, "persistence worker is gone; dropping task");
            ShortcutsError::WorkerUnavailable
        })
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        drop(self.tasks.take());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("persistence worker panicked before release");
        }
    }
}

fn run(mut store: Box<dyn ShortcutStore>, inbox: Receiver<WorkerTask>) {
    let mut opened = false;
    for task in inbox {
        let name = task.name();
        if !opened {
            opened = match store.initialize() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        task = name,
                        error = %err,
                        "shortcut store failed to initialize"
                    );
                    false
                }
            };
        }
        if !opened {
            abandon(task);
            continue;
        }
        if let Err(err) = execute(store.as_mut(), task) {
            tracing::warn!(task = name, error = %err, "shortcut persistence failed");
        }
    }
    drop(store);
    tracing::debug!("shortcut store released");
}

fn execute(store: &mut dyn ShortcutStore, task: WorkerTask) -> Result<()> {
    match task {
        WorkerTask::Load { reply } => {
            let index = load_index(store);
            tracing::debug!(count = index.len(), "shortcuts loaded");
            // A closed reply channel means the backend went away mid-load.
            let _ = reply.send(index);
            Ok(())
        }
        WorkerTask::Add(shortcut) => store.add(&shortcut),
        WorkerTask::Update(shortcut) => store.update(&shortcut),
        WorkerTask::DeleteByIds(ids) => store.delete_by_ids(&ids),
        WorkerTask::DeleteByUrl(url) => store.delete_by_url(&url),
        WorkerTask::DeleteByUrlPrefix(prefix) => store.delete_by_url_prefix(&prefix),
        WorkerTask::DeleteAll => store.delete_all(),
    }
}

/// Drops a task the unopened store cannot run. A load still hands off an
/// empty index so the backend finishes initializing.
fn abandon(task: WorkerTask) {
    if let WorkerTask::Load { reply } = task {
        let _ = reply.send(PrefixIndex::new());
    }
}

/// Builds a private index from storage. A store that cannot be read yields an
/// empty index.
fn load_index(store: &mut dyn ShortcutStore) -> PrefixIndex {
    match store.load_all() {
        Ok(shortcuts) => PrefixIndex::from_shortcuts(shortcuts.into_values()),
        Err(err) => {
            tracing::warn!(error = %err, "loading shortcuts failed");
            PrefixIndex::new()
        }
    }
}
