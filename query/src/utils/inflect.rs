//! English inflection for relationship hops and entity names
//!
//! Hops in a field path are association names (`comments`, `sku`,
//! `receive_order_items`). The table a hop lands on is its plural form.

use convert_case::{Case, Casing};

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("ox", "oxen"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

/// Pluralize a snake_case identifier
///
/// Only the last underscore-separated word is inflected, so
/// `receive_order_item` becomes `receive_order_items`. Words that already
/// look plural are returned unchanged.
pub fn pluralize(identifier: &str) -> String {
    match identifier.rsplit_once('_') {
        Some((prefix, last)) if !last.is_empty() => format!("{}_{}", prefix, pluralize_word(last)),
        _ => pluralize_word(identifier),
    }
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if word.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower == *singular {
            return (*plural).to_string();
        }
        if lower == *plural {
            return word.to_string();
        }
    }

    if lower == "axis" || lower == "testis" {
        return format!("{}es", &word[..word.len() - 2]);
    }
    if lower.ends_with("bus") || lower.ends_with("alias") || lower.ends_with("status") {
        return format!("{}es", word);
    }
    if lower.ends_with("octopus") || lower.ends_with("virus") {
        return format!("{}i", &word[..word.len() - 2]);
    }
    if let Some(stem) = lower.strip_suffix("sis") {
        return format!("{}ses", &word[..stem.len()]);
    }
    if lower.ends_with("ss") || lower.ends_with('x') || lower.ends_with("ch") || lower.ends_with("sh")
    {
        return format!("{}es", word);
    }
    // anything else ending in s is taken as already plural
    if lower.ends_with('s') {
        return word.to_string();
    }
    if lower == "quiz" {
        return format!("{}zes", word);
    }
    if let Some(stem) = lower.strip_suffix('y')
        && (stem.ends_with("qu") || !stem.ends_with(['a', 'e', 'i', 'o', 'u', 'y']))
    {
        return format!("{}ies", &word[..stem.len()]);
    }
    format!("{}s", word)
}

/// Name of the inverse reference a child holds to its parent entity
///
/// `ReceiveOrder` becomes `receive_order`.
pub fn reference_name(entity: &str) -> String {
    entity.to_case(Case::Snake)
}
