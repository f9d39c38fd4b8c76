use std::sync::Arc;

/// Receives backend notifications on the owning context.
pub trait ShortcutsBackendObserver: Send + Sync {
    /// Called once, after the stored shortcuts become visible.
    fn on_shortcuts_loaded(&self) {}

    /// Called after every accepted mutation.
    fn on_shortcuts_changed(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<(ObserverId, Arc<dyn ShortcutsBackendObserver>)>,
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl ObserverList {
    pub(crate) fn add(&mut self, observer: Arc<dyn ShortcutsBackendObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn notify_loaded(&self) {
        for observer in self.snapshot() {
            observer.on_shortcuts_loaded();
        }
    }

    pub(crate) fn notify_changed(&self) {
        for observer in self.snapshot() {
            observer.on_shortcuts_changed();
        }
    }

    // Fan-out iterates a copy so the registry may change while callbacks run.
    fn snapshot(&self) -> Vec<Arc<dyn ShortcutsBackendObserver>> {
        self.entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }
}
