use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRow {
    pub url: Url,
    pub title: String,
}

impl UrlRow {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            title: String::new(),
        }
    }
}

/// What a history-of-visits deletion removed: everything, or specific rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionInfo {
    all_history: bool,
    deleted_rows: Vec<UrlRow>,
}

impl DeletionInfo {
    #[must_use]
    pub fn for_all_history() -> Self {
        Self {
            all_history: true,
            deleted_rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn for_urls(deleted_rows: Vec<UrlRow>) -> Self {
        Self {
            all_history: false,
            deleted_rows,
        }
    }

    #[must_use]
    pub const fn is_all_history(&self) -> bool {
        self.all_history
    }

    #[must_use]
    pub fn deleted_rows(&self) -> &[UrlRow] {
        &self.deleted_rows
    }

    #[must_use]
    pub fn contains_url(&self, url: &Url) -> bool {
        self.deleted_rows.iter().any(|row| row.url == *url)
    }
}

/// Push-based consumer of the history deletion feed.
pub trait HistoryServiceObserver {
    fn on_urls_deleted(&mut self, deletion: &DeletionInfo);
}
