//! Macro scanner
//!
//! Splits query text into plain text and macro tokens. A token only matches
//! as a whole word: the characters immediately before and after it must not
//! be word characters (`[A-Za-z0-9_]`), so `my$__timeField` and
//! `$__timeField_extra` are left untouched.
//!
//! The query is otherwise opaque: string literals and comments are scanned
//! like any other text.

use super::token::MacroToken;

/// A piece of scanned query text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Macro(MacroToken),
}

/// Iterator over the segments of a query
#[derive(Debug, Clone)]
pub struct MacroScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> MacroScanner<'a> {
    /// Create a scanner over `input`
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Iterate over the macro tokens only
    pub fn tokens(self) -> impl Iterator<Item = MacroToken> + 'a {
        self.filter_map(|segment| match segment {
            Segment::Macro(token) => Some(token),
            Segment::Text(_) => None,
        })
    }
}

impl<'a> Iterator for MacroScanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        match find_macro(self.input, self.pos) {
            Some((start, token)) if start == self.pos => {
                self.pos += token.len();
                Some(Segment::Macro(token))
            }
            Some((start, _)) => {
                let text = &self.input[self.pos..start];
                self.pos = start;
                Some(Segment::Text(text))
            }
            None => {
                let text = &self.input[self.pos..];
                self.pos = self.input.len();
                Some(Segment::Text(text))
            }
        }
    }
}

/// Whether `query` contains at least one macro token
///
/// Cheap enough to gate the whole pipeline: a substring pre-check rejects
/// most queries before any boundary checks run.
pub fn contains_macros(query: &str) -> bool {
    query.contains(MacroToken::PREFIX) && find_macro(query, 0).is_some()
}

/// Find the next whole-word macro token at or after byte offset `from`
fn find_macro(input: &str, from: usize) -> Option<(usize, MacroToken)> {
    let bytes = input.as_bytes();
    let mut search = from;

    while let Some(offset) = input[search..].find(MacroToken::PREFIX) {
        let start = search + offset;

        if start == 0 || !is_word_byte(bytes[start - 1]) {
            let rest = &input[start..];
            let matched = MacroToken::all().iter().find(|token| {
                rest.starts_with(token.as_str())
                    && bytes
                        .get(start + token.len())
                        .map_or(true, |next| !is_word_byte(*next))
            });

            if let Some(token) = matched {
                return Some((start, *token));
            }
        }

        // `$` is a single byte, so this stays on a char boundary
        search = start + 1;
    }

    None
}

/// Word characters for boundary checks; non-ASCII bytes never count
fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(input: &str) -> Vec<Segment<'_>> {
        MacroScanner::new(input).collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            segments("SELECT 1"),
            vec![Segment::Text("SELECT 1")]
        );
        assert!(segments("").is_empty());
        assert!(!contains_macros("SELECT * FROM t"));
    }

    #[test]
    fn test_single_macro() {
        assert_eq!(
            segments("SELECT * FROM t WHERE $__timeFilter"),
            vec![
                Segment::Text("SELECT * FROM t WHERE "),
                Segment::Macro(MacroToken::TimeFilter),
            ]
        );
    }

    #[test]
    fn test_all_tokens() {
        let tokens: Vec<MacroToken> =
            MacroScanner::new("$__timeField BETWEEN $__timeFrom AND $__timeTo OR $__timeFilter")
                .tokens()
                .collect();
        assert_eq!(
            tokens,
            vec![
                MacroToken::TimeField,
                MacroToken::TimeFrom,
                MacroToken::TimeTo,
                MacroToken::TimeFilter,
            ]
        );
    }

    #[test]
    fn test_punctuation_is_a_boundary() {
        let tokens: Vec<MacroToken> = MacroScanner::new("($__timeFrom,$__timeTo)")
            .tokens()
            .collect();
        assert_eq!(tokens, vec![MacroToken::TimeFrom, MacroToken::TimeTo]);
    }

    #[test]
    fn test_longer_identifier_is_not_a_match() {
        assert!(!contains_macros("SELECT my_timeField_extra FROM t"));
        assert!(!contains_macros("SELECT $__timeField_extra FROM t"));
        assert!(!contains_macros("SELECT x$__timeField FROM t"));
        assert!(!contains_macros("SELECT $__timeFilters FROM t"));
        assert!(!contains_macros("SELECT $__timestamp FROM t"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!contains_macros("WHERE $__TIMEFILTER"));
        assert!(!contains_macros("WHERE $__timefilter"));
    }

    #[test]
    fn test_rejected_candidate_then_match() {
        assert_eq!(
            segments("$__timeFieldX $__timeTo"),
            vec![
                Segment::Text("$__timeFieldX "),
                Segment::Macro(MacroToken::TimeTo),
            ]
        );
    }

    #[test]
    fn test_adjacent_tokens() {
        // The second token is glued to a word character and is not a match
        assert_eq!(
            segments("$__timeTo$__timeFrom"),
            vec![
                Segment::Macro(MacroToken::TimeTo),
                Segment::Text("$__timeFrom"),
            ]
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            segments("-- zeitraum über $__timeFilter ✓"),
            vec![
                Segment::Text("-- zeitraum über "),
                Segment::Macro(MacroToken::TimeFilter),
                Segment::Text(" ✓"),
            ]
        );
        assert!(contains_macros("é$__timeFilter"));
    }
}
