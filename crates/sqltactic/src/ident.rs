//! Identifier validation and quoting.
//!
//! Mapping names are validated once, when the mapping is built, so dialect
//! formatters can quote them without failing:
//!
//! - names must be non-empty and must not contain NUL
//! - the closing delimiter is escaped by doubling it (`]` → `]]`, `"` → `""`)
//!
//! # Example
//! ```ignore
//! use sqltactic::ident::{QuoteStyle, quote};
//!
//! assert_eq!(quote("Order Lines", QuoteStyle::Bracket), "[Order Lines]");
//! assert_eq!(quote("Name", QuoteStyle::DoubleQuote), r#""Name""#);
//! ```

use crate::error::{TacticError, TacticResult};

/// How a dialect delimits identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `[name]` (SQL Server, ODBC)
    Bracket,
    /// `"name"` (ANSI, SQLite)
    DoubleQuote,
}

impl QuoteStyle {
    const fn delimiters(self) -> (char, char) {
        match self {
            QuoteStyle::Bracket => ('[', ']'),
            QuoteStyle::DoubleQuote => ('"', '"'),
        }
    }
}

/// Check that `name` can be used as an identifier.
pub fn validate(name: &str) -> TacticResult<()> {
    if name.is_empty() {
        return Err(TacticError::InvalidIdentifier(
            "Identifier cannot be empty".to_string(),
        ));
    }
    if name.contains('\0') {
        return Err(TacticError::InvalidIdentifier(format!(
            "Identifier cannot contain NUL character: {name:?}"
        )));
    }
    Ok(())
}

/// Check that `alias` is a bare alias: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Aliases are emitted unquoted, so they are held to the unquoted rules.
pub fn validate_alias(alias: &str) -> TacticResult<()> {
    let mut chars = alias.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(TacticError::InvalidIdentifier(format!(
                "Invalid alias start character: '{c}'"
            )));
        }
        None => {
            return Err(TacticError::InvalidIdentifier(
                "Alias cannot be empty".to_string(),
            ));
        }
    }
    if let Some(c) = chars.find(|c| !(*c == '_' || c.is_ascii_alphanumeric())) {
        return Err(TacticError::InvalidIdentifier(format!(
            "Invalid character in alias: '{c}'"
        )));
    }
    Ok(())
}

/// Render `name` as a quoted identifier.
pub fn quote(name: &str, style: QuoteStyle) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name, style);
    out
}

pub(crate) fn write_quoted(out: &mut String, name: &str, style: QuoteStyle) {
    let (open, close) = style.delimiters();
    out.push(open);
    for ch in name.chars() {
        if ch == close {
            out.push(close);
        }
        out.push(ch);
    }
    out.push(close);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_simple() {
        assert_eq!(quote("Widgets", QuoteStyle::Bracket), "[Widgets]");
    }

    #[test]
    fn bracket_escapes_closing() {
        assert_eq!(quote("a]b", QuoteStyle::Bracket), "[a]]b]");
        assert_eq!(quote("a[b", QuoteStyle::Bracket), "[a[b]");
    }

    #[test]
    fn double_quote_escapes() {
        assert_eq!(quote(r#"has"quote"#, QuoteStyle::DoubleQuote), r#""has""quote""#);
    }

    #[test]
    fn spaces_survive_quoting() {
        assert_eq!(quote("Order Lines", QuoteStyle::Bracket), "[Order Lines]");
    }

    #[test]
    fn rejects_empty() {
        assert!(validate("").is_err());
    }

    #[test]
    fn rejects_nul() {
        assert!(validate("a\0b").is_err());
    }

    #[test]
    fn alias_rules() {
        assert!(validate_alias("t0").is_ok());
        assert!(validate_alias("_x").is_ok());
        assert!(validate_alias("0t").is_err());
        assert!(validate_alias("t 0").is_err());
        assert!(validate_alias("").is_err());
    }
}
