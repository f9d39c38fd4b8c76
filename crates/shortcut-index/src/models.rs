use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::match_type::{ClassificationStyle, DocumentType, MatchType, PageTransition};
use crate::suggestion::{
    Classification, Suggestion, classifications_to_string, strip_match_markers,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcutId(Uuid);

impl ShortcutId {
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

}

impl fmt::Display for ShortcutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ShortcutId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}

/// Highlight-free payload of a learned suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCore {
    pub fill_into_edit: String,
    pub destination_url: Url,
    pub document_type: DocumentType,
    pub contents: String,
    pub contents_class: String,
    pub description: String,
    pub description_class: String,
    pub transition: PageTransition,
    pub match_type: MatchType,
    pub keyword: String,
}

impl MatchCore {
    /// Builds the stored form of `suggestion`, recording its type the way the
    /// shortcut was learned rather than how the suggestion was classified.
    #[must_use]
    pub fn from_suggestion(suggestion: &Suggestion) -> Self {
        let match_type = suggestion.match_type.for_shortcut();

        if suggestion.match_type.is_specialized_search_type()
            && let Some(terms) = suggestion.search_terms.as_deref()
        {
            // Entity/tail/personalized decorations are dropped; the shortcut
            // replays as the plain query, keyword-launched or generated.
            let transition = if suggestion.transition.core_type_is(PageTransition::KEYWORD) {
                PageTransition::KEYWORD
            } else {
                PageTransition::GENERATED
            };
            return Self {
                fill_into_edit: terms.to_string(),
                destination_url: suggestion.destination_url.clone(),
                document_type: suggestion.document_type,
                contents: terms.to_string(),
                contents_class: classifications_to_string(&[Classification::new(
                    0,
                    ClassificationStyle::empty(),
                )]),
                description: String::new(),
                description_class: String::new(),
                transition,
                match_type,
                keyword: suggestion.keyword.clone(),
            };
        }

        Self {
            fill_into_edit: suggestion.fill_into_edit.clone(),
            destination_url: suggestion.destination_url.clone(),
            document_type: suggestion.document_type,
            contents: suggestion.contents.clone(),
            contents_class: classifications_to_string(&strip_match_markers(
                &suggestion.contents_class,
            )),
            description: suggestion.shortcut_description().to_string(),
            description_class: classifications_to_string(&strip_match_markers(
                suggestion.shortcut_description_class(),
            )),
            transition: suggestion.transition,
            match_type,
            keyword: suggestion.keyword.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: ShortcutId,
    /// Typed text that triggers this shortcut; matched case-insensitively.
    pub text: String,
    pub match_core: MatchCore,
    pub last_access_time: DateTime<Utc>,
    pub number_of_hits: u32,
}

impl Shortcut {
    #[must_use]
    pub fn new(
        id: ShortcutId,
        text: impl Into<String>,
        match_core: MatchCore,
        last_access_time: DateTime<Utc>,
        number_of_hits: u32,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            match_core,
            last_access_time,
            number_of_hits,
        }
    }

    /// Key under which the prefix index files this shortcut.
    #[must_use]
    pub fn index_key(&self) -> String {
        self.text.to_lowercase()
    }
}
