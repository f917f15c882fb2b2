//! Key rules for the table store
//!
//! Partition and row keys may not contain `/`, `\`, `#`, `?` or control
//! characters and are limited to 1 KiB. Unique-field values become row keys,
//! so every value goes through [`key_string`], which stringifies it
//! canonically and escapes anything the store would reject.
//!
//! ## Escaping
//!
//! Each reserved character, plus `%` itself, is written as `%XX` for every
//! byte of its UTF-8 encoding. Escaping `%` keeps the mapping injective:
//! `"a/b"` becomes `"a%2Fb"`, and a literal `"a%2Fb"` becomes `"a%252Fb"`.

use crate::error::CoreError;
use crate::value::Value;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::SecondsFormat;
use std::fmt::Write;

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 1024;

/// Table names must be between these lengths (inclusive)
pub const TABLE_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=63;

/// True for characters the store does not accept in key columns
pub fn is_reserved(c: char) -> bool {
    matches!(c, '/' | '\\' | '#' | '?') || c.is_control()
}

/// Escape a raw string so it is a legal key
pub fn escape_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut buf = [0u8; 4];
    for c in raw.chars() {
        if c == '%' || is_reserved(c) {
            for b in c.encode_utf8(&mut buf).bytes() {
                // Writing to a String cannot fail
                let _ = write!(out, "%{:02X}", b);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Canonical, escaped row-key form of a value
///
/// - `Guid`: hyphenated lowercase
/// - `Int32` / `Int64`: decimal
/// - `Bool`: `true` / `false`
/// - `DateTime`: RFC 3339, UTC, nanosecond precision
/// - `Double`: shortest round-trip form, with `-0.0` written as `0`
/// - `Binary`: URL-safe base64 without padding
/// - `String`: the string itself
pub fn key_string(value: &Value) -> String {
    let raw = match value {
        Value::Binary(b) => URL_SAFE_NO_PAD.encode(b),
        Value::Bool(b) => b.to_string(),
        Value::DateTime(t) => t.to_rfc3339_opts(SecondsFormat::Nanos, true),
        Value::Guid(g) => g.hyphenated().to_string(),
        Value::Int32(i) => i.to_string(),
        Value::Int64(i) => i.to_string(),
        Value::Double(d) if *d == 0.0 => 0.0f64.to_string(),
        Value::Double(d) => d.to_string(),
        Value::String(s) => s.clone(),
    };
    escape_key(&raw)
}

/// Check that a key is accepted by the store
pub fn validate_key(key: &str) -> Result<(), CoreError> {
    if key.len() > MAX_KEY_LEN {
        return Err(CoreError::InvalidKey {
            key: key.chars().take(32).collect(),
            reason: format!("longer than {} bytes", MAX_KEY_LEN),
        });
    }
    if let Some(c) = key.chars().find(|c| is_reserved(*c)) {
        return Err(CoreError::InvalidKey {
            key: key.to_string(),
            reason: format!("contains reserved character {:?}", c),
        });
    }
    Ok(())
}

/// Check that a name is a valid table name
///
/// ASCII alphanumeric, starting with a letter, 3 to 63 characters.
pub fn validate_table_name(name: &str) -> Result<(), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidTableName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if !TABLE_NAME_LEN.contains(&name.len()) {
        return Err(invalid("must be 3 to 63 characters long"));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("must start with a letter"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("must be alphanumeric"));
    }
    Ok(())
}
