//! Search comparison prefixes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::query::IndexKind;

/// How a search value bounds the indexed value.
///
/// Codes and meanings follow https://hl7.org/fhir/search.html#prefix. A value
/// written without a code compares with `eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPrefix {
    /// The value and the indexed value are the same (or one range holds the other).
    #[default]
    Eq,
    /// Negation of `eq`.
    Ne,
    /// The indexed value is above the value.
    Gt,
    /// The indexed value is below the value.
    Lt,
    /// `gt` or `eq`.
    Ge,
    /// `lt` or `eq`.
    Le,
    /// The indexed range starts after the value.
    Sa,
    /// The indexed range ends before the value.
    Eb,
    /// Within the configured approximation of the value.
    Ap,
}

impl fmt::Display for SearchPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SearchPrefix {
    type Err = SearchError;

    /// Codes are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchPrefix::ALL
            .into_iter()
            .find(|prefix| prefix.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| SearchError::UnknownPrefix {
                prefix: s.to_string(),
            })
    }
}

impl SearchPrefix {
    /// Every prefix, in FHIR search order.
    pub const ALL: [SearchPrefix; 9] = [
        SearchPrefix::Eq,
        SearchPrefix::Ne,
        SearchPrefix::Gt,
        SearchPrefix::Lt,
        SearchPrefix::Ge,
        SearchPrefix::Le,
        SearchPrefix::Sa,
        SearchPrefix::Eb,
        SearchPrefix::Ap,
    ];

    /// The two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            SearchPrefix::Eq => "eq",
            SearchPrefix::Ne => "ne",
            SearchPrefix::Gt => "gt",
            SearchPrefix::Lt => "lt",
            SearchPrefix::Ge => "ge",
            SearchPrefix::Le => "le",
            SearchPrefix::Sa => "sa",
            SearchPrefix::Eb => "eb",
            SearchPrefix::Ap => "ap",
        }
    }

    /// Extracts a prefix from the beginning of a value string.
    ///
    /// Returns the prefix and the remaining value. Values without a
    /// recognized prefix are returned whole with [`SearchPrefix::Eq`].
    pub fn extract(value: &str) -> (Self, &str) {
        if let (Some(head), Some(rest)) = (value.get(..2), value.get(2..)) {
            if let Ok(p) = head.parse() {
                return (p, rest);
            }
        }
        (SearchPrefix::Eq, value)
    }

    /// Returns true if this prefix is valid for the given index kind.
    pub fn is_valid_for(&self, kind: IndexKind) -> bool {
        match self {
            SearchPrefix::Eq | SearchPrefix::Ne => true,
            _ => matches!(
                kind,
                IndexKind::Number | IndexKind::Quantity | IndexKind::Date
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefix() {
        assert_eq!(SearchPrefix::extract("ge5.4"), (SearchPrefix::Ge, "5.4"));
        assert_eq!(SearchPrefix::extract("AP2024"), (SearchPrefix::Ap, "2024"));
        assert_eq!(SearchPrefix::extract("5.4"), (SearchPrefix::Eq, "5.4"));
        assert_eq!(SearchPrefix::extract("e"), (SearchPrefix::Eq, "e"));
    }

    #[test]
    fn test_extract_does_not_split_multibyte() {
        assert_eq!(SearchPrefix::extract("é1"), (SearchPrefix::Eq, "é1"));
    }

    #[test]
    fn test_prefix_validity() {
        assert!(SearchPrefix::Gt.is_valid_for(IndexKind::Date));
        assert!(SearchPrefix::Ap.is_valid_for(IndexKind::Quantity));
        assert!(SearchPrefix::Ne.is_valid_for(IndexKind::String));
        assert!(!SearchPrefix::Gt.is_valid_for(IndexKind::Token));
        assert!(!SearchPrefix::Sa.is_valid_for(IndexKind::Reference));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            "xx".parse::<SearchPrefix>(),
            Err(SearchError::UnknownPrefix {
                prefix: "xx".to_string()
            })
        );
    }

    #[test]
    fn test_display_roundtrip() {
        for prefix in SearchPrefix::ALL {
            assert_eq!(prefix.to_string().parse::<SearchPrefix>().unwrap(), prefix);
        }
        assert_eq!("GE".parse::<SearchPrefix>().unwrap(), SearchPrefix::Ge);
    }
}
