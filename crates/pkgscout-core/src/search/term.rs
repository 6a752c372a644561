//! Search terms

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a search term matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchTermKind {
    /// Exact tag match
    Tag,
    /// Free text over id, title, description and tags
    FreeText,
    /// Exact package id
    Id,
    /// Package type (`dependency`, `tool`, ...)
    PackageType,
    /// Id prefix, as typed so far
    AutoComplete,
    /// Id wildcard pattern using `*` and `?`
    LegacyPattern,
    /// Substring of id, title or description
    Contains,
}

impl SearchTermKind {
    fn as_str(&self) -> &'static str {
        match self {
            SearchTermKind::Tag => "tag",
            SearchTermKind::FreeText => "text",
            SearchTermKind::Id => "id",
            SearchTermKind::PackageType => "type",
            SearchTermKind::AutoComplete => "autocomplete",
            SearchTermKind::LegacyPattern => "pattern",
            SearchTermKind::Contains => "contains",
        }
    }

    /// Kinds that constrain which package ids may appear in a result
    pub fn is_name_filter(&self) -> bool {
        !matches!(self, SearchTermKind::Contains)
    }
}

/// One unit of query intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    kind: SearchTermKind,
    text: String,
}

impl SearchTerm {
    pub fn new(kind: SearchTermKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn tag(text: impl Into<String>) -> Self {
        Self::new(SearchTermKind::Tag, text)
    }

    pub fn free_text(text: impl Into<String>) -> Self {
        Self::new(SearchTermKind::FreeText, text)
    }

    pub fn id(text: impl Into<String>) -> Self {
        Self::new(SearchTermKind::Id, text)
    }

    pub fn package_type(text: impl Into<String>) -> Self {
        Self::new(SearchTermKind::PackageType, text)
    }

    pub fn auto_complete(text: impl Into<String>) -> Self {
        Self::new(SearchTermKind::AutoComplete, text)
    }

    pub fn legacy_pattern(text: impl Into<String>) -> Self {
        Self::new(SearchTermKind::LegacyPattern, text)
    }

    pub fn contains(text: impl Into<String>) -> Self {
        Self::new(SearchTermKind::Contains, text)
    }

    pub fn kind(&self) -> SearchTermKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.text)
    }
}
