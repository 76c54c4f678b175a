//! Macro tokens
//!
//! The four case-sensitive placeholders recognized in query text.

use serde::{Deserialize, Serialize};

/// A time macro placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroToken {
    /// `$__timeFilter`: full range condition on the time column
    TimeFilter,
    /// `$__timeField`: the time column name
    TimeField,
    /// `$__timeFrom`: start of the range as a literal
    TimeFrom,
    /// `$__timeTo`: end of the range as a literal
    TimeTo,
}

impl MacroToken {
    /// Common prefix of every token, used for the cheap pre-check
    pub const PREFIX: &'static str = "$__time";

    /// Get all tokens for iteration
    pub fn all() -> &'static [MacroToken] {
        &[
            MacroToken::TimeFilter,
            MacroToken::TimeField,
            MacroToken::TimeFrom,
            MacroToken::TimeTo,
        ]
    }

    /// Literal text of the token
    pub fn as_str(&self) -> &'static str {
        match self {
            MacroToken::TimeFilter => "$__timeFilter",
            MacroToken::TimeField => "$__timeField",
            MacroToken::TimeFrom => "$__timeFrom",
            MacroToken::TimeTo => "$__timeTo",
        }
    }

    /// Length of the token text in bytes
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Whether the token renders a range bound (as opposed to the column name)
    pub fn needs_range(&self) -> bool {
        !matches!(self, MacroToken::TimeField)
    }
}

impl std::fmt::Display for MacroToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_share_prefix() {
        for token in MacroToken::all() {
            assert!(token.as_str().starts_with(MacroToken::PREFIX));
            assert_eq!(token.len(), token.as_str().len());
        }
    }

    #[test]
    fn test_no_token_is_prefix_of_another() {
        for a in MacroToken::all() {
            for b in MacroToken::all() {
                if a != b {
                    assert!(!a.as_str().starts_with(b.as_str()));
                }
            }
        }
    }
}
