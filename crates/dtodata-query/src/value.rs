//! Literal rendering for `$filter` values.

use dtodata_core::column::ValueType;

/// Render `raw` as a protocol literal: numeric columns stay bare, everything
/// else is single-quoted. Surrounding whitespace is trimmed.
///
/// Embedded quotes are passed through unescaped, so `O'Brien` yields a
/// malformed literal. Callers that need escaping must sanitize first.
pub fn format_value(raw: &str, value_type: ValueType) -> String {
    let v = raw.trim();
    match value_type {
        ValueType::Numeric => v.to_string(),
        ValueType::Text => format!("'{v}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_types_pass_through_trimmed() {
        for declared in ["number", "numeric"] {
            let t = ValueType::from_declared(declared);
            assert_eq!(format_value(" 21 ", t), "21");
            assert_eq!(format_value("abc", t), "abc");
        }
    }

    #[test]
    fn other_types_are_trimmed_then_quoted() {
        for declared in ["string", "date", "html", ""] {
            let t = ValueType::from_declared(declared);
            assert_eq!(format_value("  smith ", t), "'smith'");
        }
    }

    #[test]
    fn embedded_quotes_are_not_escaped() {
        assert_eq!(format_value("O'Brien", ValueType::Text), "'O'Brien'");
    }
}
