//! RFC 6901 JSON Pointer.
//!
//! `""` is the whole document; every other pointer is a `/`-separated list
//! of reference tokens with `~1` standing for `/` and `~0` for `~`.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointerError {
    #[error("pointer must be empty or start with '/'")]
    NotAbsolute,

    #[error("invalid escape in token '{0}'")]
    BadEscape(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    pub fn root() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn parse(pointer: &str) -> Result<Self, PointerError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let rest = pointer.strip_prefix('/').ok_or(PointerError::NotAbsolute)?;
        let tokens = rest
            .split('/')
            .map(unescape)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Parent tokens and the final token, `None` for the root
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.tokens
            .split_last()
            .map(|(last, parent)| (parent, last.as_str()))
    }

    /// True when `self` is a proper ancestor of `other`
    pub fn is_ancestor_of(&self, other: &JsonPointer) -> bool {
        self.tokens.len() < other.tokens.len() && other.tokens.starts_with(&self.tokens)
    }

    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", token.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

fn unescape(token: &str) -> Result<String, PointerError> {
    if !token.contains('~') {
        return Ok(token.to_string());
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PointerError::BadEscape(token.to_string())),
        }
    }
    Ok(out)
}

/// Decimal array index without leading zeros
pub fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

/// Follow `tokens` from `value`
pub fn resolve<'a>(value: &'a Value, tokens: &[String]) -> Option<&'a Value> {
    tokens.iter().try_fold(value, |current, token| match current {
        Value::Object(map) => map.get(token),
        Value::Array(items) => parse_index(token).and_then(|i| items.get(i)),
        _ => None,
    })
}

pub fn resolve_mut<'a>(value: &'a mut Value, tokens: &[String]) -> Option<&'a mut Value> {
    tokens.iter().try_fold(value, |current, token| match current {
        Value::Object(map) => map.get_mut(token),
        Value::Array(items) => parse_index(token).and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_display() {
        let pointer = JsonPointer::parse("/a~1b/m~0n/0").unwrap();
        assert_eq!(pointer.tokens(), &["a/b", "m~n", "0"]);
        assert_eq!(pointer.to_string(), "/a~1b/m~0n/0");

        assert!(JsonPointer::parse("").unwrap().is_root());
        assert_eq!(JsonPointer::parse("/").unwrap().tokens(), &[""]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(JsonPointer::parse("hero").unwrap_err(), PointerError::NotAbsolute);
        assert!(matches!(
            JsonPointer::parse("/a~2").unwrap_err(),
            PointerError::BadEscape(_)
        ));
        assert!(JsonPointer::parse("/a~").is_err());
    }

    #[test]
    fn test_escape_order() {
        // "~01" is "~1" literally, not "/"
        assert_eq!(JsonPointer::parse("/~01").unwrap().tokens(), &["~1"]);
    }

    #[test]
    fn test_index_rules() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("1e2"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn test_resolve() {
        let doc = json!({ "usps": [{ "text": "a" }, { "text": "b" }], "a/b": 1 });

        let tokens = JsonPointer::parse("/usps/1/text").unwrap();
        assert_eq!(resolve(&doc, tokens.tokens()), Some(&json!("b")));

        let tokens = JsonPointer::parse("/a~1b").unwrap();
        assert_eq!(resolve(&doc, tokens.tokens()), Some(&json!(1)));

        let tokens = JsonPointer::parse("/usps/2").unwrap();
        assert_eq!(resolve(&doc, tokens.tokens()), None);

        let tokens = JsonPointer::parse("/usps/01").unwrap();
        assert_eq!(resolve(&doc, tokens.tokens()), None);
    }

    #[test]
    fn test_ancestor() {
        let hero = JsonPointer::parse("/hero").unwrap();
        let headline = JsonPointer::parse("/hero/headline").unwrap();
        let hero2 = JsonPointer::parse("/hero2").unwrap();

        assert!(hero.is_ancestor_of(&headline));
        assert!(!headline.is_ancestor_of(&hero));
        assert!(!hero.is_ancestor_of(&hero));
        assert!(!hero.is_ancestor_of(&hero2));
        assert_eq!(hero.child("cta").to_string(), "/hero/cta");
    }
}
