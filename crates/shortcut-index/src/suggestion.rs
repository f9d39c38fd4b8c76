use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ShortcutsError};
use crate::match_type::{ClassificationStyle, DocumentType, MatchType, PageTransition};

/// A styled run starting at `offset` (in chars) and extending to the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub offset: usize,
    pub style: ClassificationStyle,
}

impl Classification {
    #[must_use]
    pub const fn new(offset: usize, style: ClassificationStyle) -> Self {
        Self { offset, style }
    }
}

/// A navigation suggestion as produced by ranking, before it is learned as a shortcut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub match_type: MatchType,
    pub destination_url: Url,
    pub fill_into_edit: String,
    pub document_type: DocumentType,
    pub contents: String,
    pub contents_class: Vec<Classification>,
    pub description: String,
    pub description_class: Vec<Classification>,
    /// Overrides `description` for shortcut purposes when non-empty.
    #[serde(default)]
    pub description_for_shortcuts: String,
    #[serde(default)]
    pub description_class_for_shortcuts: Vec<Classification>,
    pub transition: PageTransition,
    #[serde(default)]
    pub keyword: String,
    /// Query text for search suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<String>,
}

impl Suggestion {
    #[must_use]
    pub fn new(match_type: MatchType, destination_url: Url) -> Self {
        let fill_into_edit = destination_url.to_string();
        Self {
            match_type,
            contents: fill_into_edit.clone(),
            fill_into_edit,
            destination_url,
            document_type: DocumentType::None,
            contents_class: vec![Classification::new(0, ClassificationStyle::URL)],
            description: String::new(),
            description_class: Vec::new(),
            description_for_shortcuts: String::new(),
            description_class_for_shortcuts: Vec::new(),
            transition: PageTransition::TYPED,
            keyword: String::new(),
            search_terms: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self.description_class = vec![Classification::new(0, ClassificationStyle::empty())];
        self
    }

    #[must_use]
    pub fn with_search_terms(mut self, terms: impl Into<String>) -> Self {
        self.search_terms = Some(terms.into());
        self
    }

    /// The description a shortcut should remember.
    #[must_use]
    pub fn shortcut_description(&self) -> &str {
        if self.description_for_shortcuts.is_empty() {
            &self.description
        } else {
            &self.description_for_shortcuts
        }
    }

    #[must_use]
    pub fn shortcut_description_class(&self) -> &[Classification] {
        if self.description_class_for_shortcuts.is_empty() {
            &self.description_class
        } else {
            &self.description_class_for_shortcuts
        }
    }
}

/// Drops query-match highlighting and merges the runs that become identical.
#[must_use]
pub fn strip_match_markers(classes: &[Classification]) -> Vec<Classification> {
    let mut unmatched: Vec<Classification> = Vec::with_capacity(classes.len());
    for class in classes {
        let style = class.style - ClassificationStyle::MATCH;
        if unmatched.last().is_some_and(|last| last.style == style) {
            continue;
        }
        unmatched.push(Classification::new(class.offset, style));
    }
    unmatched
}

#[must_use]
pub fn classifications_to_string(classes: &[Classification]) -> String {
    classes
        .iter()
        .map(|class| format!("{},{}", class.offset, class.style.bits()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn classifications_from_string(raw: &str) -> Result<Vec<Classification>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parts = raw.split(',').map(str::trim).collect::<Vec<_>>();
    if parts.len() % 2 != 0 {
        return Err(ShortcutsError::Validation(format!(
            "classification string has an odd number of fields: {raw}"
        )));
    }
    parts
        .chunks_exact(2)
        .map(|pair| -> Result<Classification> {
            let offset = pair[0].parse::<usize>().map_err(|_| {
                ShortcutsError::Validation(format!("invalid classification offset: {}", pair[0]))
            })?;
            let bits = pair[1].parse::<u32>().map_err(|_| {
                ShortcutsError::Validation(format!("invalid classification style: {}", pair[1]))
            })?;
            Ok(Classification::new(
                offset,
                ClassificationStyle::from_bits_truncate(bits),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests;
