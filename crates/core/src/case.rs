//! Key-case transcoding between the wire and internal key-spaces.
//!
//! Request and response bodies travel with word-separated keys
//! (`planned_start_date`); everything past the HTTP boundary works with
//! compact capitalised keys (`plannedStartDate`).
//!
//! - [`decode`] rewrites wire keys into internal keys.
//! - [`encode`] rewrites internal keys into wire keys.
//!
//! Both walk every nested object and array. Only object keys change; strings,
//! numbers, booleans and nulls pass through untouched, and numeric-looking keys
//! are never rewritten. A key with a digit right after a case boundary
//! (`page2Count`) does not round-trip; no field in the registry is named that way.

use serde_json::{Map, Value};

/// Rewrite every object key from wire form (`smp_name`) to internal form (`smpName`).
pub fn decode(value: Value) -> Value {
    transcode(value, decode_key)
}

/// Rewrite every object key from internal form (`smpName`) to wire form (`smp_name`).
pub fn encode(value: Value) -> Value {
    transcode(value, encode_key)
}

/// Convert a single word-separated key into compact form.
///
/// Each `_`-separated token after the first gets an upper-case initial, the
/// separators are dropped, and the first character of the result is
/// lower-cased.
///
/// ```
/// use smp_core::case::decode_key;
/// assert_eq!(decode_key("planned_start_date"), "plannedStartDate");
/// assert_eq!(decode_key("id"), "id");
/// ```
pub fn decode_key(key: &str) -> String {
    if is_numeric_key(key) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len());
    for token in key.split('_') {
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }

    lower_first(out)
}

/// Convert a single compact key into word-separated form.
///
/// Every ASCII capital letter except a leading one starts a new `_`-joined
/// token; the result is lower-cased.
///
/// ```
/// use smp_core::case::encode_key;
/// assert_eq!(encode_key("plannedStartDate"), "planned_start_date");
/// assert_eq!(encode_key("hasMore"), "has_more");
/// ```
pub fn encode_key(key: &str) -> String {
    if is_numeric_key(key) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn transcode(value: Value, rewrite: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(rewrite(&key), transcode(inner, rewrite));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| transcode(v, rewrite)).collect())
        }
        leaf => leaf,
    }
}

fn lower_first(mut s: String) -> String {
    if let Some(first) = s.get_mut(0..1) {
        first.make_ascii_lowercase();
    }
    s
}

/// Keys such as `"0"`, `"-1"` or `"2.5"` are indices, not field names.
fn is_numeric_key(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    if digits.is_empty() {
        return false;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}
