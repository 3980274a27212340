//! Message classifier.
//!
//! Maps raw inbound text to an [`Intent`] with an ordered table of predicates.
//! The first rule that matches wins, so the order of [`RULES`] is part of the
//! contract: customer data is detected before item entry and menu choices
//! even when the text incidentally contains their keywords.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified meaning of an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// `list bot`: show the main menu
    Menu,
    /// `print nota : N/label`: render an existing nota
    PrintDirect,
    /// Message carrying `nama`, `alamat` and `telepon`
    CustomerData,
    /// `barang...`: one line item
    ItemEntry,
    /// `tidak`: no more items, save the order
    Finalize,
    /// Menu option 1 (print an existing nota)
    MenuChoicePrint,
    /// Menu option 2 (create a new nota)
    MenuChoiceCreate,
    /// Anything else; silently ignored
    Unrecognized,
}

impl Intent {
    /// Whether the message counts as a user command in the journal.
    ///
    /// Menu choices only count when typed as the bare numeral. Text that
    /// merely starts with `list bot` counts too, even though it does not
    /// open the menu.
    #[must_use]
    pub fn is_command(self, normalized: &str) -> bool {
        match self {
            Self::Menu
            | Self::PrintDirect
            | Self::CustomerData
            | Self::ItemEntry
            | Self::Finalize => true,
            Self::MenuChoicePrint | Self::MenuChoiceCreate | Self::Unrecognized => {
                matches!(normalized, "1" | "2") || normalized.starts_with("list bot")
            }
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Menu => "menu",
            Self::PrintDirect => "print_direct",
            Self::CustomerData => "customer_data",
            Self::ItemEntry => "item_entry",
            Self::Finalize => "finalize",
            Self::MenuChoicePrint => "menu_choice_print",
            Self::MenuChoiceCreate => "menu_choice_create",
            Self::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// One classification rule: a predicate over the trimmed, lower-cased text.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Intent produced when the predicate matches
    pub intent: Intent,
    /// Human readable description, used in tests and debug logs
    pub description: &'static str,
    /// Predicate over the normalized text
    pub matches: fn(&str) -> bool,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("intent", &self.intent)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered classification table, evaluated first-match-wins.
pub const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Menu,
        description: "equals \"list bot\"",
        matches: |t| t == "list bot",
    },
    Rule {
        intent: Intent::PrintDirect,
        description: "starts with \"print nota\"",
        matches: |t| t.starts_with("print nota"),
    },
    Rule {
        intent: Intent::CustomerData,
        description: "contains \"nama\", \"alamat\" and \"telepon\"",
        matches: |t| t.contains("nama") && t.contains("alamat") && t.contains("telepon"),
    },
    Rule {
        intent: Intent::ItemEntry,
        description: "starts with \"barang\"",
        matches: |t| t.starts_with("barang"),
    },
    Rule {
        intent: Intent::Finalize,
        description: "equals \"tidak\"",
        matches: |t| t == "tidak",
    },
    Rule {
        intent: Intent::MenuChoicePrint,
        description: "equals \"1\" or contains \"print\"",
        matches: |t| t == "1" || t.contains("print"),
    },
    Rule {
        intent: Intent::MenuChoiceCreate,
        description: "equals \"2\" or contains \"buat\"",
        matches: |t| t == "2" || t.contains("buat"),
    },
];

/// Trims and lower-cases text for matching.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Classifies raw message text.
///
/// # Examples
///
/// ```
/// use nota_bot_core::classifier::{classify, Intent};
///
/// assert_eq!(classify("  List Bot "), Intent::Menu);
/// assert_eq!(classify("print nota : 45/kak fitriadi"), Intent::PrintDirect);
/// assert_eq!(classify("halo"), Intent::Unrecognized);
/// ```
#[must_use]
pub fn classify(raw: &str) -> Intent {
    classify_normalized(&normalize(raw))
}

/// Classifies text that has already gone through [`normalize`].
#[must_use]
pub fn classify_normalized(normalized: &str) -> Intent {
    RULES
        .iter()
        .find(|rule| (rule.matches)(normalized))
        .map_or(Intent::Unrecognized, |rule| rule.intent)
}
