use nota_bot_core::classifier::{classify, Intent, RULES};
use nota_bot_core::parser::{parse_customer, parse_item, parse_print_nota, MISSING_FIELD};
use proptest::prelude::*;

/// Randomly re-cases ASCII letters of `s` using `mask`.
fn recase(s: &str, mask: &[bool]) -> String {
    s.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

proptest! {
    /// Classification never panics on arbitrary input.
    #[test]
    fn does_not_crash(s in "\\PC*") {
        let _ = classify(&s);
        let _ = parse_print_nota(&s);
        let _ = parse_customer(&s);
        let _ = parse_item(&s);
    }

    /// `list bot` is recognised in any casing and with surrounding whitespace.
    #[test]
    fn menu_any_casing(
        mask in proptest::collection::vec(proptest::bool::ANY, 1..8),
        pad_left in "[ \t\n]{0,3}",
        pad_right in "[ \t\n]{0,3}",
    ) {
        let text = format!("{pad_left}{}{pad_right}", recase("list bot", &mask));
        prop_assert_eq!(classify(&text), Intent::Menu);
    }

    /// The classified intent is always the first matching rule in the table.
    #[test]
    fn first_rule_wins(s in "(list bot|print nota|barang|tidak|nama|alamat|telepon|print|buat|1|2| |:|x){0,6}") {
        let normalized = s.trim().to_lowercase();
        let expected = RULES
            .iter()
            .find(|rule| (rule.matches)(&normalized))
            .map_or(Intent::Unrecognized, |rule| rule.intent);
        prop_assert_eq!(classify(&s), expected);
    }

    /// The nota number is whatever precedes the first slash, trimmed.
    #[test]
    fn print_nota_number(number in "[0-9]{1,6}", label in "[a-z ]{0,12}") {
        let text = format!("print nota : {number}/{label}");
        prop_assert_eq!(parse_print_nota(&text), Some(number));
    }

    /// Customer fields never come back empty.
    #[test]
    fn customer_fields_never_empty(s in "(nama|alamat|telepon| |:|[a-z0-9]|\n){0,20}") {
        let customer = parse_customer(&s);
        for value in [&customer.nama, &customer.alamat, &customer.telepon] {
            prop_assert!(!value.is_empty());
            prop_assert!(value == MISSING_FIELD || value.trim() == value.as_str());
        }
    }

    /// Every parsed item key is lower-case and every value non-empty.
    #[test]
    fn item_keys_lowercase(lines in proptest::collection::vec("[A-Za-z ]{0,6}:?[A-Za-z0-9 ]{0,6}", 0..6)) {
        let item = parse_item(&lines.join("\n"));
        for (key, value) in &item {
            prop_assert_eq!(key, &key.to_lowercase());
            prop_assert!(!key.is_empty());
            prop_assert!(!value.is_empty());
        }
    }
}
