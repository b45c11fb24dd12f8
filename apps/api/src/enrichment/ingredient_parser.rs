//! Ingredient parsing: turns loosely structured ingredient lines into
//! `{quantity, unit, item}`.
//!
//! Parsing never fails: anything that cannot be split sensibly comes back
//! verbatim as the item with quantity "as needed".

use tracing::{debug, warn};

use crate::models::recipe::ParsedIngredient;

pub const AS_NEEDED: &str = "as needed";
const UNSPECIFIED_ITEM: &str = "unspecified ingredient";

/// Unit vocabulary. A token counts as a unit when it contains one of these,
/// case-insensitively.
const UNITS: &[&str] = &[
    "cup",
    "cups",
    "tbsp",
    "tsp",
    "tablespoon",
    "teaspoon",
    "pound",
    "lb",
    "oz",
    "ounce",
    "bunch",
    "bunches",
    "pinch",
    "clove",
    "quart",
];

const WRAPPING_CHARS: &[char] = &['[', ']', '\'', '"'];

/// Parses one raw ingredient fragment.
pub fn parse_ingredient(raw: &str) -> ParsedIngredient {
    match split_fields(raw) {
        Some(parsed) => parsed,
        None => {
            warn!("Could not parse ingredient {raw:?}; keeping it verbatim");
            verbatim(raw)
        }
    }
}

/// Parses every fragment of an ingredient list, preserving order.
pub fn parse_ingredients<S: AsRef<str>>(fragments: &[S]) -> Vec<ParsedIngredient> {
    fragments
        .iter()
        .map(|f| parse_ingredient(f.as_ref()))
        .collect()
}

fn verbatim(raw: &str) -> ParsedIngredient {
    let item = raw.trim();
    ParsedIngredient {
        quantity: AS_NEEDED.to_string(),
        unit: String::new(),
        item: if item.is_empty() {
            UNSPECIFIED_ITEM.to_string()
        } else {
            item.to_string()
        },
    }
}

fn split_fields(raw: &str) -> Option<ParsedIngredient> {
    let cleaned = raw.trim().trim_matches(WRAPPING_CHARS).trim();

    let (main_clause, prep_notes) = match cleaned.split_once(',') {
        Some((main, rest)) => (main.trim(), Some(rest.trim())),
        None => (cleaned, None),
    };

    if main_clause.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = main_clause.split_whitespace().collect();
    let mut idx = 0;

    let quantity_end = tokens.iter().take_while(|t| looks_numeric(t)).count();
    let quantity = tokens[..quantity_end].join(" ");
    idx += quantity_end;

    let unit_end = idx + tokens[idx..].iter().take_while(|t| is_unit(t)).count();
    let unit = tokens[idx..unit_end].join(" ");
    idx = unit_end;

    let mut item = tokens[idx..].join(" ");
    if item.is_empty() {
        item = main_clause.to_string();
    }
    if let Some(notes) = prep_notes.filter(|n| !n.is_empty()) {
        item = format!("{item} ({notes})");
    }

    debug!("Parsed ingredient {raw:?} -> quantity={quantity:?} unit={unit:?} item={item:?}");

    Some(ParsedIngredient {
        quantity: if quantity.is_empty() {
            AS_NEEDED.to_string()
        } else {
            quantity
        },
        unit,
        item,
    })
}

fn looks_numeric(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || is_vulgar_fraction(c))
        || token.contains('/')
}

fn is_vulgar_fraction(c: char) -> bool {
    matches!(c, '¼' | '½' | '¾' | '⅓' | '⅔' | '⅛')
}

fn is_unit(token: &str) -> bool {
    let lower = token.to_lowercase();
    UNITS.iter().any(|u| lower.contains(u))
}

/// Splits a dataset ingredient field into fragments.
///
/// Accepts list-literal text (`['1 cup flour, sifted', "confectioners' sugar"]`),
/// where each quoted entry is one fragment, and plain comma-separated text.
pub fn split_ingredient_list(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let quoted = quoted_entries(&trimmed[1..trimmed.len() - 1]);
        if !quoted.is_empty() {
            return quoted;
        }
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn quoted_entries(inner: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            continue;
        }
        let quote = c;
        let mut current = String::new();
        while let Some(next) = chars.next() {
            match next {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                n if n == quote => break,
                n => current.push(n),
            }
        }
        let entry = current.trim();
        if !entry.is_empty() {
            entries.push(entry.to_string());
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_unit_item_with_prep_notes() {
        let parsed = parse_ingredient("2 cups flour, sifted");
        assert_eq!(parsed.quantity, "2");
        assert_eq!(parsed.unit, "cups");
        assert_eq!(parsed.item, "flour (sifted)");
    }

    #[test]
    fn test_bare_item_gets_as_needed() {
        let parsed = parse_ingredient("salt");
        assert_eq!(parsed.quantity, "as needed");
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.item, "salt");
    }

    #[test]
    fn test_fraction_and_mixed_quantity() {
        let parsed = parse_ingredient("1 1/2 tbsp olive oil");
        assert_eq!(parsed.quantity, "1 1/2");
        assert_eq!(parsed.unit, "tbsp");
        assert_eq!(parsed.item, "olive oil");
    }

    #[test]
    fn test_unit_match_is_case_insensitive() {
        let parsed = parse_ingredient("3 Tbsp. butter");
        assert_eq!(parsed.unit, "Tbsp.");
        assert_eq!(parsed.item, "butter");
    }

    #[test]
    fn test_unknown_unit_stays_in_item() {
        let parsed = parse_ingredient("1 can chickpeas");
        assert_eq!(parsed.quantity, "1");
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.item, "can chickpeas");
    }

    #[test]
    fn test_strips_list_literal_quotes() {
        let parsed = parse_ingredient("['1 lb chicken thighs'");
        assert_eq!(parsed.quantity, "1");
        assert_eq!(parsed.unit, "lb");
        assert_eq!(parsed.item, "chicken thighs");
    }

    #[test]
    fn test_multiple_prep_clauses_are_kept_together() {
        let parsed = parse_ingredient("1 bunch cilantro, washed, chopped");
        assert_eq!(parsed.item, "cilantro (washed, chopped)");
    }

    #[test]
    fn test_quantity_and_unit_only_falls_back_to_main_clause() {
        let parsed = parse_ingredient("2 cups");
        assert_eq!(parsed.quantity, "2");
        assert_eq!(parsed.unit, "cups");
        assert_eq!(parsed.item, "2 cups");
    }

    #[test]
    fn test_empty_main_clause_is_verbatim() {
        let parsed = parse_ingredient(", finely diced");
        assert_eq!(parsed.quantity, "as needed");
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.item, ", finely diced");
    }

    #[test]
    fn test_item_is_never_empty() {
        for raw in ["", "   ", "[]", "''", ",", "1/2", "½ cup", "\"\""] {
            let parsed = parse_ingredient(raw);
            assert!(!parsed.item.is_empty(), "empty item for {raw:?}");
            assert!(!parsed.quantity.is_empty(), "empty quantity for {raw:?}");
        }
    }

    #[test]
    fn test_split_plain_comma_text() {
        let fragments = split_ingredient_list("1 can chickpeas, 2 tbsp curry powder, salt");
        assert_eq!(
            fragments,
            vec!["1 can chickpeas", "2 tbsp curry powder", "salt"]
        );
    }

    #[test]
    fn test_split_list_literal_keeps_inner_commas() {
        let fragments = split_ingredient_list(
            r#"['2 cups flour, sifted', "1/2 cup confectioners' sugar", '']"#,
        );
        assert_eq!(
            fragments,
            vec!["2 cups flour, sifted", "1/2 cup confectioners' sugar"]
        );
    }

    #[test]
    fn test_split_skips_blank_fragments() {
        assert_eq!(split_ingredient_list("salt, , pepper,"), vec!["salt", "pepper"]);
        assert!(split_ingredient_list("   ").is_empty());
    }

    #[test]
    fn test_parse_ingredients_preserves_order() {
        let parsed = parse_ingredients(&["salt", "2 cups rice", "1 oz basil"]);
        let items: Vec<_> = parsed.iter().map(|p| p.item.as_str()).collect();
        assert_eq!(items, vec!["salt", "rice", "basil"]);
    }
}
