use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Category of a navigation suggestion. Discriminants are the persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MatchType {
    UrlWhatYouTyped = 0,
    HistoryUrl = 1,
    HistoryTitle = 2,
    HistoryBody = 3,
    HistoryKeyword = 4,
    Navsuggest = 5,
    SearchWhatYouTyped = 6,
    SearchHistory = 7,
    SearchSuggest = 8,
    SearchSuggestEntity = 9,
    SearchSuggestTail = 10,
    SearchSuggestPersonalized = 11,
    SearchSuggestProfile = 12,
    SearchOtherEngine = 13,
    BookmarkTitle = 16,
    NavsuggestPersonalized = 17,
    Calculator = 18,
    ClipboardUrl = 19,
    VoiceSuggest = 20,
    DocumentSuggestion = 24,
    ClipboardText = 26,
    TileSuggestion = 28,
    HistoryCluster = 29,
}

impl MatchType {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn from_i32(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::UrlWhatYouTyped,
            1 => Self::HistoryUrl,
            2 => Self::HistoryTitle,
            3 => Self::HistoryBody,
            4 => Self::HistoryKeyword,
            5 => Self::Navsuggest,
            6 => Self::SearchWhatYouTyped,
            7 => Self::SearchHistory,
            8 => Self::SearchSuggest,
            9 => Self::SearchSuggestEntity,
            10 => Self::SearchSuggestTail,
            11 => Self::SearchSuggestPersonalized,
            12 => Self::SearchSuggestProfile,
            13 => Self::SearchOtherEngine,
            16 => Self::BookmarkTitle,
            17 => Self::NavsuggestPersonalized,
            18 => Self::Calculator,
            19 => Self::ClipboardUrl,
            20 => Self::VoiceSuggest,
            24 => Self::DocumentSuggestion,
            26 => Self::ClipboardText,
            28 => Self::TileSuggestion,
            29 => Self::HistoryCluster,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn is_search_type(self) -> bool {
        matches!(
            self,
            Self::SearchWhatYouTyped
                | Self::SearchHistory
                | Self::SearchSuggest
                | Self::SearchOtherEngine
                | Self::SearchSuggestEntity
                | Self::SearchSuggestTail
                | Self::SearchSuggestPersonalized
                | Self::SearchSuggestProfile
                | Self::VoiceSuggest
        )
    }

    /// Search suggestions whose presentation differs from a plain query suggestion.
    #[must_use]
    pub const fn is_specialized_search_type(self) -> bool {
        matches!(
            self,
            Self::SearchSuggestEntity
                | Self::SearchSuggestTail
                | Self::SearchSuggestPersonalized
                | Self::SearchSuggestProfile
        )
    }

    /// Categories that must never become shortcuts.
    #[must_use]
    pub const fn is_excluded_from_shortcuts(self) -> bool {
        matches!(self, Self::HistoryCluster)
    }

    /// Type recorded on a shortcut learned from a suggestion of this type.
    #[must_use]
    pub const fn for_shortcut(self) -> Self {
        match self {
            Self::UrlWhatYouTyped | Self::Navsuggest | Self::NavsuggestPersonalized => {
                Self::HistoryUrl
            }
            Self::SearchOtherEngine => self,
            _ if self.is_search_type() => Self::SearchHistory,
            _ => self,
        }
    }
}

/// Navigation provenance. The low byte is the core type; upper bits are qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageTransition(u32);

impl PageTransition {
    pub const LINK: Self = Self(0);
    pub const TYPED: Self = Self(1);
    pub const AUTO_BOOKMARK: Self = Self(2);
    pub const GENERATED: Self = Self(5);
    pub const RELOAD: Self = Self(8);
    pub const KEYWORD: Self = Self(9);

    const CORE_MASK: u32 = 0xFF;

    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn core_type_is(self, other: Self) -> bool {
        (self.0 & Self::CORE_MASK) == (other.0 & Self::CORE_MASK)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DocumentType {
    #[default]
    None = 0,
    DriveDocs = 1,
    DriveForms = 2,
    DriveSheets = 3,
    DriveSlides = 4,
    DriveImage = 5,
    DrivePdf = 6,
    DriveVideo = 7,
    DriveFolder = 8,
    DriveOther = 9,
}

impl DocumentType {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn from_i32(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::None,
            1 => Self::DriveDocs,
            2 => Self::DriveForms,
            3 => Self::DriveSheets,
            4 => Self::DriveSlides,
            5 => Self::DriveImage,
            6 => Self::DrivePdf,
            7 => Self::DriveVideo,
            8 => Self::DriveFolder,
            9 => Self::DriveOther,
            _ => return None,
        })
    }
}

bitflags! {
    /// Rendering style of a run of suggestion text.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ClassificationStyle: u32 {
        const URL = 1 << 0;
        /// Characters that matched the user's query. Never persisted.
        const MATCH = 1 << 1;
        const DIM = 1 << 2;
    }
}
