//! Textual rewrite: substitute `<integer> <FROM>` occurrences in opaque text
//! with the converted amount and target symbol.

use regex::Regex;

use crate::error::Error;

/// Replaces every `<one-or-more-digits> <from>` occurrence with the amount
/// multiplied by `rate`, formatted to three decimal places, followed by `to`.
/// All surrounding text passes through untouched and ordering is preserved.
/// An amount that does not fit an integer fails the whole rewrite; a partial
/// result is never returned.
pub fn rewrite(text: &str, from: &str, to: &str, rate: f64) -> Result<String, Error> {
    // The symbol is data, not pattern: escape it so symbols containing regex
    // metacharacters match literally.
    let pattern = format!(r"(\d+) {}", regex::escape(from));
    let re = Regex::new(&pattern)
        .map_err(|e| Error::ConfigInvalid(format!("unusable currency symbol {from}: {e}")))?;

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re.find_iter(text) {
        let digits = m.as_str().split(' ').next().unwrap_or_default();
        let amount: u64 = digits.parse().map_err(|e| {
            Error::PayloadMalformed(format!("could not parse amount {digits}: {e}"))
        })?;
        out.push_str(&text[last..m.start()]);
        out.push_str(&format!("{:.3} {}", amount as f64 * rate, to));
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_matches_converted_in_order() {
        let out = rewrite("amount: 10 CHF and 5 CHF", "CHF", "XES", 2.0).unwrap();
        assert_eq!(out, "amount: 20.000 XES and 10.000 XES");
    }

    #[test]
    fn test_unmatched_text_passes_through() {
        let out = rewrite("no amounts here", "CHF", "XES", 2.0).unwrap();
        assert_eq!(out, "no amounts here");
    }

    #[test]
    fn test_other_symbols_untouched() {
        let out = rewrite("3 EUR and 10 CHF", "CHF", "USD", 1.5).unwrap();
        assert_eq!(out, "3 EUR and 15.000 USD");
    }

    #[test]
    fn test_equal_symbols_rate_one_keeps_magnitude() {
        let out = rewrite("pay 10 CHF", "CHF", "CHF", 1.0).unwrap();
        assert_eq!(out, "pay 10.000 CHF");
    }

    #[test]
    fn test_symbol_with_metacharacters_is_escaped() {
        let out = rewrite("worth 4 C++ today", "C++", "USD", 0.5).unwrap();
        assert_eq!(out, "worth 2.000 USD today");
    }

    #[test]
    fn test_overflowing_amount_aborts() {
        let text = "99999999999999999999999999 CHF";
        let result = rewrite(text, "CHF", "XES", 2.0);
        assert!(matches!(result, Err(Error::PayloadMalformed(_))));
    }

    #[test]
    fn test_fractional_rate_formatting() {
        let out = rewrite("1 CHF", "CHF", "XES", 0.3333).unwrap();
        assert_eq!(out, "0.333 XES");
    }
}
