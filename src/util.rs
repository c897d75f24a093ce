// Utility helpers for parsing and basic statistics.
//
// All the "dirty" cell handling lives here so the rest of the code can work
// with `Option<f64>` and plain strings.
use num_format::{Locale, ToFormattedString};

/// Parse a cell into `f64`, returning `None` for anything unusable.
///
/// - Trims whitespace.
/// - Any `","` makes the cell missing: `"85,5"` and `"1,250"` are ambiguous
///   between decimal commas and thousands separators.
/// - Rejects `NaN` and infinities so downstream sums stay finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() || s.contains(',') {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Trimmed categorical cell; blank cells count as missing.
pub fn clean_label(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Mean of the present values, or `None` when there are none.
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Sum of the present values; missing values are skipped.
pub fn sum_present<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages and the narrative (e.g., `9,855 trainees`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some("10")), Some(10.0));
        assert_eq!(parse_f64_safe(Some(" 20.5 ")), Some(20.5));
        assert_eq!(parse_f64_safe(Some("1,250")), None);
        assert_eq!(parse_f64_safe(Some("85,5")), None);
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label(Some("  North ")), Some("North".to_string()));
        assert_eq!(clean_label(Some("   ")), None);
        assert_eq!(clean_label(None), None);
    }

    #[test]
    fn test_mean_and_sum_skip_missing() {
        let v = vec![Some(10.0), None, None, Some(20.5)];
        assert_eq!(sum_present(v.clone()), 30.5);
        assert_eq!(mean_present(v), Some(15.25));
        assert_eq!(mean_present(vec![None, None]), None);
        assert_eq!(sum_present(Vec::new()), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(71.428571), 71.43);
        assert_eq!(round2(70.0), 70.0);
    }

    #[test]
    fn test_format_int() {
        assert_eq!(format_int(12345i64), "12,345");
        assert_eq!(format_int(0i64), "0");
    }
}
