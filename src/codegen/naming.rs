use proc_macro2::Span;
use syn::Ident;

use crate::error::SqlTypegenError;

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

pub(crate) fn new_id(id: &str) -> Ident {
    Ident::new(id, Span::call_site())
}

fn words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let boundary = c.is_ascii_uppercase()
            && i > 0
            && (chars[i - 1].is_ascii_lowercase()
                || chars[i - 1].is_ascii_digit()
                || (chars[i - 1].is_ascii_uppercase()
                    && chars.get(i + 1).is_some_and(char::is_ascii_lowercase)));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Type name for a logical statement or table name: `$$order_lines` => `OrderLines`.
///
/// # Errors
/// Returns `SqlTypegenError::GenerationError` if no identifier can be derived.
pub fn class_name(logical: &str) -> Result<String, SqlTypegenError> {
    let mut name: String = words(&logical.replace("$$", ""))
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect();
    if name.is_empty() {
        return Err(SqlTypegenError::GenerationError(format!(
            "cannot derive a type name from '{logical}'"
        )));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'T');
    }
    if name == "Self" {
        name.push('_');
    }
    Ok(name)
}

/// `OrdersTuple` => `orders_tuple`, `xValue` => `x_value`.
#[must_use]
pub fn snake_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Field, parameter or method identifier for an arbitrary name.
#[must_use]
pub fn member_ident(name: &str) -> Ident {
    let mut id = snake_case(name);
    if id.is_empty() {
        id.push_str("column");
    }
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    if RUST_KEYWORDS.contains(&id.as_str()) {
        id.push('_');
    }
    new_id(&id)
}

/// Identifier for a derived type name.
///
/// # Errors
/// Returns `SqlTypegenError::GenerationError` if `name` is not a valid identifier.
pub fn type_ident(name: &str) -> Result<Ident, SqlTypegenError> {
    syn::parse_str::<Ident>(name).map_err(|e| {
        SqlTypegenError::GenerationError(format!("'{name}' is not a valid type name: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_class_names() {
        assert_eq!(class_name("orders").unwrap(), "Orders");
        assert_eq!(class_name("$$order_lines").unwrap(), "OrderLines");
        assert_eq!(class_name("CountOrders").unwrap(), "CountOrders");
        assert_eq!(class_name("2fa codes").unwrap(), "T2faCodes");
        assert!(class_name("$$").is_err());
    }

    #[test]
    fn snake_cases_names() {
        assert_eq!(snake_case("OrdersTuple"), "orders_tuple");
        assert_eq!(snake_case("xValue"), "x_value");
        assert_eq!(snake_case("HTTPStatus"), "http_status");
        assert_eq!(snake_case("COUNT(*)"), "count");
    }

    #[test]
    fn member_idents_avoid_keywords() {
        assert_eq!(member_ident("type").to_string(), "type_");
        assert_eq!(member_ident("abstract").to_string(), "abstract_");
        assert_eq!(member_ident("become").to_string(), "become_");
        assert_eq!(member_ident("1st").to_string(), "_1st");
        assert_eq!(member_ident("*").to_string(), "column");
    }
}
