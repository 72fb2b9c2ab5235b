//! Redis `MATCH` glob evaluation for stores without native pattern support.

use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;
use rtcache_core::KeyPattern;

/// Compiled Redis-style glob.
///
/// Supports `*`, `?`, `[abc]`, `[^abc]`, `[a-z]` and backslash escapes.
/// An unterminated class runs to the end of the pattern.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    regex: Regex,
}

impl GlobMatcher {
    /// Compiles a key pattern.
    pub fn new(pattern: &KeyPattern) -> Result<Self, regex::Error> {
        Self::from_glob(pattern.as_str())
    }

    /// Compiles raw glob text.
    pub fn from_glob(glob: &str) -> Result<Self, regex::Error> {
        Ok(GlobMatcher {
            regex: Regex::new(&translate(glob))?,
        })
    }

    /// Whether the whole key matches.
    #[inline]
    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

fn translate(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push_str("(?s)^");
    let mut chars = glob.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => push_literal(&mut out, chars.next().unwrap_or('\\')),
            '[' => translate_class(&mut chars, &mut out),
            other => push_literal(&mut out, other),
        }
    }
    out.push('$');
    out
}

fn translate_class(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut members = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            ']' => break,
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut members, escaped);
                }
            }
            '-' if !members.is_empty() && chars.peek().is_some_and(|next| *next != ']') => {
                members.push('-');
            }
            other => push_literal(&mut members, other),
        }
    }
    match (members.is_empty(), negated) {
        // `[]` matches nothing, `[^]` any single character.
        (true, false) => out.push_str("(?:$.)"),
        (true, true) => out.push('.'),
        (false, false) => {
            out.push('[');
            out.push_str(&members);
            out.push(']');
        }
        (false, true) => {
            out.push_str("[^");
            out.push_str(&members);
            out.push(']');
        }
    }
}

fn push_literal(out: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(pattern: &str) -> GlobMatcher {
        GlobMatcher::from_glob(pattern).unwrap()
    }

    #[test]
    fn star_and_question_mark() {
        assert!(glob("ns:*").is_match("ns:/a:query=none"));
        assert!(glob("h?llo").is_match("hello"));
        assert!(!glob("h?llo").is_match("hllo"));
        assert!(!glob("ns:*").is_match("other:/a"));
    }

    #[test]
    fn classes() {
        assert!(glob("h[ae]llo").is_match("hallo"));
        assert!(!glob("h[ae]llo").is_match("hillo"));
        assert!(glob("h[^e]llo").is_match("hallo"));
        assert!(!glob("h[^e]llo").is_match("hello"));
        assert!(glob("h[a-c]llo").is_match("hbllo"));
        assert!(!glob("h[a-c]llo").is_match("hdllo"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(glob("a.b+(c)").is_match("a.b+(c)"));
        assert!(!glob("a.b").is_match("axb"));
    }

    #[test]
    fn escaped_pattern_matches_only_its_path() {
        let pattern = KeyPattern::for_path("ns", "/search/*");
        let matcher = GlobMatcher::new(&pattern).unwrap();
        assert!(matcher.is_match("ns:/search/*:query=none"));
        assert!(!matcher.is_match("ns:/search/all:query=none"));
    }

    #[test]
    fn path_prefix_is_not_enough() {
        let matcher = GlobMatcher::new(&KeyPattern::for_path("items", "/items/1")).unwrap();
        assert!(matcher.is_match("items:/items/1:query=none"));
        assert!(matcher.is_match("items:/items/1:query=0cc175b9c0f1b6a831c399e269772661"));
        assert!(!matcher.is_match("items:/items/10:query=none"));
        assert!(!matcher.is_match("other:/items/1:query=none"));
    }

    #[test]
    fn empty_class_matches_nothing() {
        assert!(!glob("a[]b").is_match("ab"));
        assert!(glob("a[^]b").is_match("axb"));
    }
}
