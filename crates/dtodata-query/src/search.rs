//! Per-column search grammar.
//!
//! A column search string such as `>=21 and <65` is split on one boolean
//! combinator, each part is rewritten through the `OperatorMap`, and every
//! part with a recognised operator becomes `<field> <op> <literal>`. Input
//! without any operator becomes a plain equality on the whole value.

use dtodata_core::column::{ColumnDescriptor, ValueType};

use crate::operators::{scan, Operator, OperatorMap, OperatorMatch};
use crate::value::format_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn glue(self) -> &'static str {
        match self {
            Combinator::And => " and ",
            Combinator::Or => " or ",
        }
    }
}

/// Checked in this order; the first one present splits the input.
const COMBINATORS: [(&str, Combinator); 4] = [
    ("and", Combinator::And),
    ("&&", Combinator::And),
    ("||", Combinator::Or),
    ("or", Combinator::Or),
];

/// Split `input` on the first combinator found, in `COMBINATORS` order.
///
/// Matching is plain substring matching, so `"Sandra"` splits on `and`.
pub fn split_combinator(input: &str) -> (Combinator, Vec<&str>) {
    for (needle, combinator) in COMBINATORS {
        if input.contains(needle) {
            return (combinator, input.split(needle).collect());
        }
    }
    (Combinator::And, vec![input])
}

enum Part {
    Clause(String),
    Bare(String),
}

/// Build the filter clause for one column search value.
///
/// Returns `None` when nothing can be emitted: an empty value, or every
/// operator-bearing part was ambiguous.
pub fn transform_search(
    map: &OperatorMap,
    field: &str,
    raw: &str,
    value_type: ValueType,
) -> Option<String> {
    let (combinator, pieces) = split_combinator(raw);
    let mut found = false;
    let mut parts = Vec::with_capacity(pieces.len());

    for piece in pieces {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }

        let rewritten = map.translate(piece);
        match scan(&rewritten) {
            OperatorMatch::Found { op, at } => {
                found = true;
                let rhs = &rewritten[at + op.as_str().len()..];
                parts.push(Part::Clause(comparison(field, op, rhs, value_type)));
            }
            OperatorMatch::Ambiguous(op) => {
                found = true;
                tracing::debug!(%field, %op, clause = %rewritten, "ambiguous search clause dropped");
            }
            OperatorMatch::NotFound => parts.push(Part::Bare(piece.to_string())),
        }
    }

    if !found {
        let whole = raw.trim();
        if whole.is_empty() {
            return None;
        }
        return Some(comparison(field, Operator::Eq, whole, value_type));
    }

    let clauses: Vec<String> = parts
        .into_iter()
        .map(|p| match p {
            Part::Clause(c) => c,
            Part::Bare(v) => comparison(field, Operator::Eq, &v, value_type),
        })
        .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(combinator.glue()))
    }
}

fn comparison(field: &str, op: Operator, rhs: &str, value_type: ValueType) -> String {
    format!("{field} {op} {}", format_value(rhs, value_type))
}

/// `<method>(<field>,<literal>)` for columns with a custom search function.
pub fn custom_search(method: &str, field: &str, raw: &str, value_type: ValueType) -> String {
    format!("{method}({field},{})", format_value(raw, value_type))
}

/// Clause for one searched column, honouring its custom search function.
pub fn column_clause(column: &ColumnDescriptor, raw: &str, map: &OperatorMap) -> Option<String> {
    match column.search_method.as_deref() {
        Some(method) => Some(custom_search(method, &column.field, raw, column.value_type)),
        None => transform_search(map, &column.field, raw, column.value_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(field: &str, raw: &str, ty: ValueType) -> Option<String> {
        transform_search(&OperatorMap::default(), field, raw, ty)
    }

    #[test]
    fn comparison_with_numeric_literal() {
        assert_eq!(
            search("age", "age>=21", ValueType::Numeric).as_deref(),
            Some("age ge 21")
        );
        assert_eq!(
            search("age", ">=21", ValueType::Numeric).as_deref(),
            Some("age ge 21")
        );
    }

    #[test]
    fn left_hand_text_is_replaced_by_the_field() {
        assert_eq!(
            search("Age", "years > 3", ValueType::Numeric).as_deref(),
            Some("Age gt 3")
        );
    }

    #[test]
    fn bare_value_falls_back_to_equality() {
        assert_eq!(
            search("lastname", "smith", ValueType::Text).as_deref(),
            Some("lastname eq 'smith'")
        );
        assert_eq!(
            search("id", " 42 ", ValueType::Numeric).as_deref(),
            Some("id eq 42")
        );
    }

    #[test]
    fn combinator_inside_a_word_still_falls_back_on_whole_value() {
        assert_eq!(
            search("name", "Sandra", ValueType::Text).as_deref(),
            Some("name eq 'Sandra'")
        );
    }

    #[test]
    fn and_splits_into_two_clauses() {
        let out = search("age", "'john' and age>18", ValueType::Text).unwrap();
        let clauses: Vec<&str> = out.split(" and ").collect();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0], "age eq ''john''");
        assert_eq!(clauses[1], "age gt '18'");
    }

    #[test]
    fn ampersands_join_with_and() {
        assert_eq!(
            search("age", ">=21 && <65", ValueType::Numeric).as_deref(),
            Some("age ge 21 and age lt 65")
        );
    }

    #[test]
    fn or_and_pipes_join_with_or() {
        assert_eq!(
            search("age", "<18 || >65", ValueType::Numeric).as_deref(),
            Some("age lt 18 or age gt 65")
        );
        assert_eq!(
            search("age", "<18 or >65", ValueType::Numeric).as_deref(),
            Some("age lt 18 or age gt 65")
        );
    }

    #[test]
    fn and_is_checked_before_or() {
        let (c, parts) = split_combinator("a or b and c");
        assert_eq!(c, Combinator::And);
        assert_eq!(parts, vec!["a or b ", " c"]);
    }

    #[test]
    fn list_order_decides_between_operators() {
        // Both `lt` and `ge` are present; `ge` precedes `lt` in the list.
        assert_eq!(
            search("x", "<3 ge 1", ValueType::Numeric).as_deref(),
            Some("x ge 1")
        );
    }

    #[test]
    fn ambiguous_part_is_dropped_without_fallback() {
        assert_eq!(search("x", ">1 >2", ValueType::Numeric), None);
        assert_eq!(
            search("x", ">1 >2 and <9", ValueType::Numeric).as_deref(),
            Some("x lt 9")
        );
    }

    #[test]
    fn empty_value_yields_nothing() {
        assert_eq!(search("x", "   ", ValueType::Text), None);
    }

    #[test]
    fn has_operator_is_kept_as_word() {
        assert_eq!(
            search("Flags", "has Sales", ValueType::Text).as_deref(),
            Some("Flags has 'Sales'")
        );
    }

    #[test]
    fn custom_search_method_wraps_field_and_literal() {
        let column = ColumnDescriptor {
            index: 0,
            field: "Name".into(),
            value_type: ValueType::Text,
            search_method: Some("contains".into()),
            positional: false,
        };
        assert_eq!(
            column_clause(&column, "ann>", &OperatorMap::default()).as_deref(),
            Some("contains(Name,'ann>')")
        );
    }
}
