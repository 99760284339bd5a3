//! Search filters and result limits for the fetch stage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which messages to search for in the selected mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchFilter {
    /// Every message in the mailbox.
    #[default]
    All,
    /// Messages whose `From` matches the given address.
    From(String),
}

impl SearchFilter {
    /// Builds a filter from a sender setting. Only the exact string `"All"`
    /// selects every message; anything else is searched as a sender.
    pub fn from_sender(sender: &str) -> Self {
        if sender == "All" {
            SearchFilter::All
        } else {
            SearchFilter::From(sender.to_string())
        }
    }

    /// Returns the IMAP SEARCH criteria string.
    pub fn query(&self) -> String {
        match self {
            SearchFilter::All => "All".to_string(),
            SearchFilter::From(sender) => format!("(FROM {})", sender),
        }
    }
}

impl From<String> for SearchFilter {
    fn from(value: String) -> Self {
        SearchFilter::from_sender(&value)
    }
}

impl From<SearchFilter> for String {
    fn from(value: SearchFilter) -> Self {
        match value {
            SearchFilter::All => "All".to_string(),
            SearchFilter::From(sender) => sender,
        }
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFilter::All => write!(f, "all messages"),
            SearchFilter::From(sender) => write!(f, "messages from {}", sender),
        }
    }
}

/// Bound applied to the list of search results before fetching.
///
/// The bound is an end index with slice semantics: a non-negative value `n`
/// keeps the first `n` results, a negative value `-n` keeps everything
/// except the last `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum Limit {
    #[default]
    Unbounded,
    First(usize),
    AllButLast(usize),
}

impl Limit {
    /// Interprets a signed end index.
    pub fn from_index(index: i64) -> Self {
        if index >= 0 {
            Limit::First(usize::try_from(index).unwrap_or(usize::MAX))
        } else {
            Limit::AllButLast(usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX))
        }
    }

    /// Returns the leading slice of `items` selected by this limit.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = match *self {
            Limit::Unbounded => items.len(),
            Limit::First(n) => n.min(items.len()),
            Limit::AllButLast(n) => items.len().saturating_sub(n),
        };
        &items[..end]
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Limit::AllButLast(_))
    }
}

impl From<Option<i64>> for Limit {
    fn from(value: Option<i64>) -> Self {
        value.map(Limit::from_index).unwrap_or_default()
    }
}

impl From<Limit> for Option<i64> {
    fn from(value: Limit) -> Self {
        match value {
            Limit::Unbounded => None,
            Limit::First(n) => Some(i64::try_from(n).unwrap_or(i64::MAX)),
            Limit::AllButLast(n) => Some(-i64::try_from(n).unwrap_or(i64::MAX)),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unbounded => write!(f, "unbounded"),
            Limit::First(n) => write!(f, "first {}", n),
            Limit::AllButLast(n) => write!(f, "all but the last {}", n),
        }
    }
}
