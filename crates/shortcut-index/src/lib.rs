// Public fallible APIs in this crate share one concrete error contract (`ShortcutsError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod backend;
pub mod config;
pub mod error;
pub mod expand;
pub mod history;
pub mod match_type;
pub mod models;
pub mod observer;
pub mod prefix_index;
pub mod store;
pub mod suggestion;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod worker;

pub use backend::{AddOutcome, BackendState, ShortcutsBackend};
pub use config::{BackendConfig, StorageMode};
pub use error::{Result, ShortcutsError};
pub use history::{DeletionInfo, HistoryServiceObserver, UrlRow};
pub use models::{MatchCore, Shortcut, ShortcutId};
pub use observer::{ObserverId, ShortcutsBackendObserver};
pub use prefix_index::{PrefixIndex, ShortcutHandle};
pub use store::{ShortcutStore, SqliteShortcutStore};
pub use suggestion::Suggestion;
