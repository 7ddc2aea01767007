/// Sanitizing Module
///
/// Pure helpers for composing SQL text: identifier stripping for names that
/// cannot be bound as parameters, and literal quoting for values that end
/// up inlined in condition fragments.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use std::fmt::Write;
use std::hash::Hash;

static FIELD_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^_a-zA-Z0-9.]").unwrap());
static NAME_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^_a-zA-Z0-9]").unwrap());

/// Quote character used around table and database identifiers
const IDENTIFIER_QUOTE: char = '`';

/// Strips every character outside `[A-Za-z0-9_.]` from a field reference.
///
/// Dots survive so that qualified references like `u.id` stay usable. The
/// result is not quoted.
pub fn sanitize_field(field: &str) -> String {
    FIELD_DISALLOWED.replace_all(field, "").into_owned()
}

/// Strips every character outside `[A-Za-z0-9_]` and wraps the table name
/// in identifier quotes.
///
/// ```
/// use clitools::core::db::sanitize_table_name;
///
/// assert_eq!(sanitize_table_name("users; DROP"), "`usersDROP`");
/// ```
pub fn sanitize_table_name(table: &str) -> String {
    quote_identifier(table)
}

/// Strips every character outside `[A-Za-z0-9_]` and wraps the database
/// (schema) name in identifier quotes.
pub fn sanitize_database_name(database: &str) -> String {
    quote_identifier(database)
}

fn quote_identifier(name: &str) -> String {
    let stripped = NAME_DISALLOWED.replace_all(name, "");
    format!("{q}{stripped}{q}", q = IDENTIFIER_QUOTE)
}

/// Renders a value as an SQL literal.
///
/// Follows SQLite's `quote()` function: text is single-quoted with embedded
/// quotes doubled, numbers are written bare, blobs become `X'..'` and NULL
/// stays `NULL`.
pub fn quote<V: Into<Value>>(value: V) -> String {
    quote_value(&value.into())
}

/// Renders a borrowed value as an SQL literal. See [`quote`].
pub fn quote_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) if f.is_nan() => "NULL".to_string(),
        Value::Real(f) if f.is_infinite() => {
            if *f > 0.0 { "9.0e+999".to_string() } else { "-9.0e+999".to_string() }
        }
        // Debug keeps the fractional part so reals stay reals
        Value::Real(f) => format!("{:?}", f),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(b) => {
            let mut hex = String::with_capacity(b.len() * 2 + 3);
            hex.push_str("X'");
            for byte in b {
                let _ = write!(hex, "{:02X}", byte);
            }
            hex.push('\'');
            hex
        }
    }
}

/// Quotes every member of a sequence, keeping the original order.
pub fn quote_sequence<I, V>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    values.into_iter().map(quote).collect()
}

/// Quotes every value of a keyed map, keeping keys and their order.
pub fn quote_map<K, V>(values: IndexMap<K, V>) -> IndexMap<K, String>
where
    K: Hash + Eq,
    V: Into<Value>,
{
    values.into_iter().map(|(k, v)| (k, quote(v))).collect()
}
