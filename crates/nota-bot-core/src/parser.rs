//! Payload parsers.
//!
//! Extract the nota number from `print nota`, the customer fields from a
//! customer-data message and the `key: value` pairs of a line item. All
//! parsers work on the original (case-preserving) text.

use crate::session::{Customer, Item};
use lazy_regex::lazy_regex;

/// Value used for customer fields that are missing from the message
pub const MISSING_FIELD: &str = "-";

/// Extracts the nota number from `print nota : <number>/<label>`.
///
/// Returns `None` when the colon or the payload is missing, or when the part
/// before the first `/` is blank.
///
/// # Examples
///
/// ```
/// use nota_bot_core::parser::parse_print_nota;
///
/// assert_eq!(parse_print_nota("print nota : 45/kak fitriadi").as_deref(), Some("45"));
/// assert_eq!(parse_print_nota("print nota"), None);
/// ```
#[must_use]
pub fn parse_print_nota(text: &str) -> Option<String> {
    static RE_PRINT_NOTA: lazy_regex::Lazy<regex::Regex> =
        lazy_regex!(r"(?i)print nota\s*:\s*(.+)");

    let payload = RE_PRINT_NOTA.captures(text)?.get(1)?.as_str();
    let nota_no = payload.split('/').next().unwrap_or_default().trim();
    if nota_no.is_empty() {
        None
    } else {
        Some(nota_no.to_string())
    }
}

/// Extracts `nama`, `alamat` and `telepon` from a customer-data message.
///
/// Each field is matched independently, first occurrence wins, and a
/// missing field becomes [`MISSING_FIELD`].
#[must_use]
pub fn parse_customer(text: &str) -> Customer {
    static RE_NAMA: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)nama\s*:\s*(.+)");
    static RE_ALAMAT: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)alamat\s*:\s*(.+)");
    static RE_TELEPON: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)telepon\s*:\s*(.+)");

    let field = |re: &regex::Regex| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|value| !value.is_empty())
            .unwrap_or(MISSING_FIELD)
            .to_string()
    };

    Customer {
        nama: field(&RE_NAMA),
        alamat: field(&RE_ALAMAT),
        telepon: field(&RE_TELEPON),
    }
}

/// Parses the `key: value` lines of an item message.
///
/// Lines are split at the first `:`; keys are lower-cased and both sides
/// trimmed. Lines with an empty key or value (including header lines such
/// as `Barang1`) are dropped.
#[must_use]
pub fn parse_item(text: &str) -> Item {
    let mut item = Item::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        item.insert(key.to_lowercase(), value.to_string());
    }
    item
}
