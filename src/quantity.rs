//! # Quantity Aggregation Module
//!
//! This module merges free-text quantity strings into one human-readable
//! string for shopping-list display.
//!
//! ## Features
//!
//! - Numeric quantities with matching units are summed: `["400g", "200g"]`
//!   becomes `"600g"`, `["2", "3"]` becomes `"5"`
//! - Distinct units are kept apart and joined with `" + "`: `["400g",
//!   "1 tin"]` becomes `"400g + 1 tin"`
//! - Unparseable text degrades gracefully to frequency counting:
//!   `["a handful", "a handful"]` becomes `"a handful ×2"`
//!
//! No unit conversion is attempted; "g" and "kg" are different units and are
//! never merged.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

/// A quantity string split into numeric value and unit suffix
#[derive(Debug, Clone, PartialEq)]
struct ParsedQuantity {
    /// The leading numeric value
    value: f64,
    /// The trimmed unit suffix; may be empty for bare counts like "2"
    unit: String,
    /// Whether the source text had whitespace between number and unit
    /// ("2 slices" vs "2slices")
    has_space: bool,
}

// Matches an optional-decimal numeric prefix, optional whitespace, then a
// free-text unit suffix. Strings like "1.2.3" pass the pattern but fail the
// float parse and count as unparseable.
const QUANTITY_PATTERN: &str = r"^([\d.]+)(\s*)(.*)$";

lazy_static! {
    static ref QUANTITY_REGEX: Regex =
        Regex::new(QUANTITY_PATTERN).expect("Quantity pattern should be valid");
}

/// Parse a single trimmed quantity string, or `None` if it does not start
/// with a usable number.
fn parse_quantity(text: &str) -> Option<ParsedQuantity> {
    let captures = QUANTITY_REGEX.captures(text)?;
    let value: f64 = captures[1].parse().ok()?;
    let has_space = !captures[2].is_empty();
    let unit = captures[3].trim().to_string();

    trace!("Parsed quantity '{text}' -> value={value}, unit='{unit}', has_space={has_space}");
    Some(ParsedQuantity {
        value,
        unit,
        has_space,
    })
}

/// Render a summed unit group, dropping the decimal point for whole totals.
fn format_total(total: f64, unit: &str, has_space: bool) -> String {
    let number = if total.fract() == 0.0 {
        format!("{}", total as i64)
    } else {
        total.to_string()
    };

    if unit.is_empty() {
        number
    } else {
        let spacer = if has_space { " " } else { "" };
        format!("{number}{spacer}{unit}")
    }
}

/// Aggregate a list of quantity strings into a readable format.
///
/// When every input parses as `<number><optional space><unit>`, values are
/// grouped by exact unit text (case-sensitive, trimmed) and summed; groups
/// appear in first-seen order and each group reuses the spacing of its first
/// occurrence. If any input fails to parse, the whole call falls back to
/// frequency-counting the raw strings.
///
/// An empty input yields an empty string; a single input is returned
/// unchanged, with no reformatting.
///
/// # Examples
///
/// ```rust
/// use mealplanner::quantity::aggregate_quantities;
///
/// assert_eq!(aggregate_quantities(&["1", "1", "1", "1"]), "4");
/// assert_eq!(aggregate_quantities(&["2 slices", "2 slices", "2 slices"]), "6 slices");
/// assert_eq!(aggregate_quantities(&["400g", "200g"]), "600g");
/// assert_eq!(aggregate_quantities(&["400g", "1 tin"]), "400g + 1 tin");
/// assert_eq!(aggregate_quantities(&["a handful", "a handful"]), "a handful ×2");
/// ```
pub fn aggregate_quantities<S: AsRef<str>>(quantities: &[S]) -> String {
    if quantities.is_empty() {
        return String::new();
    }
    if quantities.len() == 1 {
        return quantities[0].as_ref().to_string();
    }

    let parsed: Vec<Option<ParsedQuantity>> = quantities
        .iter()
        .map(|q| parse_quantity(q.as_ref().trim()))
        .collect();

    if parsed.iter().all(Option::is_some) {
        // Group by unit text in first-seen order; each group keeps the
        // spacing preference of its first occurrence.
        let mut groups: Vec<(String, bool, f64)> = Vec::new();
        for quantity in parsed.into_iter().flatten() {
            match groups.iter_mut().find(|(unit, _, _)| *unit == quantity.unit) {
                Some((_, _, total)) => *total += quantity.value,
                None => groups.push((quantity.unit, quantity.has_space, quantity.value)),
            }
        }

        debug!("Aggregated {} quantities into {} unit groups", quantities.len(), groups.len());
        let results: Vec<String> = groups
            .iter()
            .map(|(unit, has_space, total)| format_total(*total, unit, *has_space))
            .collect();
        return results.join(" + ");
    }

    // Fall back to counting duplicate raw strings
    debug!("Unparseable quantity present, falling back to frequency counting");
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for quantity in quantities {
        let text = quantity.as_ref();
        match counts.iter_mut().find(|(seen, _)| *seen == text) {
            Some((_, count)) => *count += 1,
            None => counts.push((text, 1)),
        }
    }

    counts
        .iter()
        .map(|(text, count)| {
            if *count > 1 {
                format!("{text} ×{count}")
            } else {
                text.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let quantities: [&str; 0] = [];
        assert_eq!(aggregate_quantities(&quantities), "");
    }

    #[test]
    fn test_single_input_returned_unchanged() {
        assert_eq!(aggregate_quantities(&["1 pinch"]), "1 pinch");
        assert_eq!(aggregate_quantities(&["a handful"]), "a handful");
        // No reformatting, even of odd spacing
        assert_eq!(aggregate_quantities(&[" 2  cups "]), " 2  cups ");
    }

    #[test]
    fn test_bare_numbers_are_summed() {
        assert_eq!(aggregate_quantities(&["2", "3"]), "5");
        assert_eq!(aggregate_quantities(&["1", "1", "1", "1"]), "4");
        assert_eq!(aggregate_quantities(&["1", "2", "3"]), "6");
    }

    #[test]
    fn test_same_unit_is_summed() {
        assert_eq!(aggregate_quantities(&["400g", "200g"]), "600g");
        assert_eq!(
            aggregate_quantities(&["2 slices", "2 slices", "2 slices"]),
            "6 slices"
        );
    }

    #[test]
    fn test_spacing_follows_first_occurrence() {
        // First occurrence has no space, so the sum has none either
        assert_eq!(aggregate_quantities(&["400g", "200 g"]), "600g");
        // And the other way round
        assert_eq!(aggregate_quantities(&["200 g", "400g"]), "600 g");
    }

    #[test]
    fn test_mixed_units_joined_in_first_seen_order() {
        assert_eq!(aggregate_quantities(&["400g", "1 tin"]), "400g + 1 tin");
        assert_eq!(
            aggregate_quantities(&["400g", "1 tin", "200g"]),
            "600g + 1 tin"
        );
    }

    #[test]
    fn test_units_are_case_sensitive() {
        // "G" and "g" are distinct units and never merged
        assert_eq!(aggregate_quantities(&["400g", "200G"]), "400g + 200G");
    }

    #[test]
    fn test_decimal_sums() {
        assert_eq!(aggregate_quantities(&["1.5 cups", "1.5 cups"]), "3 cups");
        assert_eq!(aggregate_quantities(&["0.5 cup", "0.25 cup"]), "0.75 cup");
    }

    #[test]
    fn test_inputs_are_trimmed_before_parsing() {
        assert_eq!(aggregate_quantities(&[" 2 ", "3"]), "5");
    }

    #[test]
    fn test_fallback_counts_duplicates() {
        assert_eq!(
            aggregate_quantities(&["a handful", "a handful"]),
            "a handful ×2"
        );
        assert_eq!(
            aggregate_quantities(&["a splash", "to taste", "a splash"]),
            "a splash ×2, to taste"
        );
    }

    #[test]
    fn test_one_unparseable_forces_fallback() {
        // "some" fails to parse, so the parseable "400g" strings are not summed
        assert_eq!(
            aggregate_quantities(&["400g", "400g", "some"]),
            "400g ×2, some"
        );
    }

    #[test]
    fn test_malformed_number_is_unparseable() {
        // Passes the numeric prefix pattern but fails the float parse
        assert_eq!(
            aggregate_quantities(&["1.2.3", "1.2.3"]),
            "1.2.3 ×2"
        );
    }

    #[test]
    fn test_aggregation_is_associative_for_matching_units() {
        let all_at_once = aggregate_quantities(&["100g", "200g", "300g"]);
        let pairwise = aggregate_quantities(&[
            aggregate_quantities(&["100g", "200g"]),
            "300g".to_string(),
        ]);
        assert_eq!(all_at_once, pairwise);
        assert_eq!(all_at_once, "600g");
    }

    #[test]
    fn test_aggregation_is_commutative_for_matching_units() {
        assert_eq!(
            aggregate_quantities(&["100g", "200g"]),
            aggregate_quantities(&["200g", "100g"])
        );
    }
}
