//! Numeric parsing: result amounts, risk percentages and risk:reward ratios.

use std::ops::Range;
use std::str::FromStr;

use rust_decimal::Decimal;

use regex::Regex;

use super::patterns::{
    AMOUNT_CURRENCY, AMOUNT_LABELED, AMOUNT_PERCENT, CLOCK_TIME, DATE_DMY, DATE_YMD,
    NUMERIC_BODY, PAIR_DASH, PAIR_SLASH, RISK_LABELED, RR_LABELED, RR_PAIR,
};

const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "usd", "eur", "gbp"];

/// Parse a human-formatted number ("1,5", "1.250,00", "-5.2 %", "$ 120", "(3.1)").
///
/// Returns `None` for anything that is not a number once percent signs,
/// currency markers, an `R`/`x` multiple suffix and whitespace are removed.
pub fn parse_number(value: &str) -> Option<Decimal> {
    let mut body: String = value.trim().to_string();
    for code in CURRENCY_CODES {
        body = body.replace(code, "");
    }
    body.retain(|c| !c.is_whitespace() && !matches!(c, '%' | '$' | '€' | '£' | '+'));

    let mut negative = false;
    if body.starts_with('(') && body.ends_with(')') && body.len() > 2 {
        negative = true;
        body = body[1..body.len() - 1].to_string();
    }
    if let Some(rest) = body.strip_prefix(['-', '−']) {
        negative = true;
        body = rest.to_string();
    }
    if let Some(rest) = body.strip_suffix(['R', 'r', 'x', 'X']) {
        body = rest.to_string();
    }

    if !NUMERIC_BODY.is_match(&body) {
        return None;
    }

    let amount = Decimal::from_str(&normalize_separators(&body)).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Decide which of `,` and `.` is the decimal separator and drop the other.
fn normalize_separators(body: &str) -> String {
    let commas = body.matches(',').count();
    let dots = body.matches('.').count();

    match (commas, dots) {
        (0, 0) | (0, 1) => body.to_string(),
        (1, 0) => body.replace(',', "."),
        (_, 0) => body.replace(',', ""),
        (0, _) => body.replace('.', ""),
        _ => {
            // Both present: the one that comes last is the decimal separator
            let comma_pos = body.rfind(',');
            let dot_pos = body.rfind('.');
            match (comma_pos, dot_pos) {
                (Some(c), Some(d)) if c > d => body.replace('.', "").replace(',', "."),
                _ => body.replace(',', ""),
            }
        }
    }
}

/// Result amount mentioned in a line, as an absolute value.
///
/// Labeled amounts win over bare percentages, which win over currency
/// amounts. Percentages that belong to a risk label are skipped.
pub fn extract_result_amount(line: &str) -> Option<Decimal> {
    if let Some(caps) = AMOUNT_LABELED.captures(line) {
        if let Some(amount) = parse_number(&caps[1]) {
            return Some(amount.abs());
        }
    }

    let risk_spans = spans(line, &[&*RISK_LABELED]);
    for caps in AMOUNT_PERCENT.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if overlaps(&risk_spans, whole.range()) {
            continue;
        }
        if let Some(amount) = parse_number(&caps[1]) {
            return Some(amount.abs());
        }
    }

    // A pair's base code or a date's digits next to a code are not amounts
    let masked = spans(line, &[&*PAIR_SLASH, &*PAIR_DASH, &*DATE_YMD, &*DATE_DMY]);
    for caps in AMOUNT_CURRENCY.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if overlaps(&masked, whole.range()) {
            continue;
        }
        let Some(value) = caps.get(1).or_else(|| caps.get(2)) else { continue };
        if let Some(amount) = parse_number(value.as_str()) {
            return Some(amount.abs());
        }
    }

    None
}

fn spans(line: &str, patterns: &[&Regex]) -> Vec<Range<usize>> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.find_iter(line).map(|m| m.range()))
        .collect()
}

fn overlaps(spans: &[Range<usize>], range: Range<usize>) -> bool {
    spans
        .iter()
        .any(|span| range.start < span.end && span.start < range.end)
}

/// Risk percentage from a `risk`/`riesgo` labeled value.
pub fn extract_risk(line: &str) -> Option<Decimal> {
    RISK_LABELED
        .captures(line)
        .and_then(|caps| parse_number(&caps[1]))
        .map(|risk| risk.abs())
}

/// Risk:reward from a labeled value (`r:r 2`, `RR 1:3`) or a bare `N:M` ratio.
///
/// A ratio `N:M` yields `M / N`. Clock times such as `09:30` are not ratios.
pub fn extract_risk_reward(line: &str) -> Option<Decimal> {
    if let Some(caps) = RR_LABELED.captures(line) {
        let reward = parse_number(&caps[2])?;
        return match caps.get(1) {
            Some(risk) => ratio(parse_number(risk.as_str())?, reward),
            None => Some(reward),
        };
    }

    for caps in RR_PAIR.captures_iter(line) {
        let text = format!("{}:{}", &caps[1], &caps[2]);
        if CLOCK_TIME.is_match(&text) {
            continue;
        }
        if let (Some(risk), Some(reward)) = (parse_number(&caps[1]), parse_number(&caps[2])) {
            if let Some(rr) = ratio(risk, reward) {
                return Some(rr);
            }
        }
    }

    None
}

fn ratio(risk: Decimal, reward: Decimal) -> Option<Decimal> {
    if risk.is_zero() {
        return None;
    }
    reward
        .checked_div(risk)
        .map(|rr| rr.round_dp(2).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_number_formats() {
        assert_eq!(parse_number("5.2"), Some(dec("5.2")));
        assert_eq!(parse_number("-5.2"), Some(dec("-5.2")));
        assert_eq!(parse_number("1,5"), Some(dec("1.5")));
        assert_eq!(parse_number("1.250,50"), Some(dec("1250.50")));
        assert_eq!(parse_number("1,250.50"), Some(dec("1250.50")));
        assert_eq!(parse_number(" 2 % "), Some(dec("2")));
        assert_eq!(parse_number("$120"), Some(dec("120")));
        assert_eq!(parse_number("(3.1)"), Some(dec("-3.1")));
        assert_eq!(parse_number("2.5R"), Some(dec("2.5")));
    }

    #[test]
    fn test_parse_number_rejects_text() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("2024-01-15"), None);
    }

    #[test]
    fn test_result_amount_skips_risk_percentage() {
        let line = "GBP/USD Short, riesgo 1.5%, r:r 2, ganancia 3%";
        assert_eq!(extract_result_amount(line), Some(dec("3")));

        let line = "riesgo 1%, cerrado +2.4%";
        assert_eq!(extract_result_amount(line), Some(dec("2.4")));
    }

    #[test]
    fn test_result_amount_currency_and_labels() {
        assert_eq!(extract_result_amount("pnl: -45.5"), Some(dec("45.5")));
        assert_eq!(extract_result_amount("closed at $ 120"), Some(dec("120")));
        assert_eq!(extract_result_amount("net 80 USD"), Some(dec("80")));
        assert_eq!(extract_result_amount("no numbers"), None);
    }

    #[test]
    fn test_pair_and_date_digits_are_not_amounts() {
        assert_eq!(extract_result_amount("2024-01-15 EUR/USD long"), None);
        assert_eq!(extract_result_amount("15/01/2024 EUR/USD long"), None);
        assert_eq!(extract_result_amount("15/01/2024 GBP-USD short"), None);
        assert_eq!(
            extract_result_amount("2024-01-15 EUR/USD closed 80 USD"),
            Some(dec("80"))
        );
    }

    #[test]
    fn test_extract_risk() {
        assert_eq!(extract_risk("riesgo 1.5%"), Some(dec("1.5")));
        assert_eq!(extract_risk("Risk: 2"), Some(dec("2")));
        assert_eq!(extract_risk("risk:reward 3"), None);
    }

    #[test]
    fn test_extract_risk_reward() {
        assert_eq!(extract_risk_reward("r:r 2"), Some(dec("2")));
        assert_eq!(extract_risk_reward("RR 1:3"), Some(dec("3")));
        assert_eq!(extract_risk_reward("target 1:2.5"), Some(dec("2.5")));
        assert_eq!(extract_risk_reward("2:6 setup"), Some(dec("3")));
        assert_eq!(extract_risk_reward("entrada 09:30"), None);
        assert_eq!(extract_risk_reward("nothing"), None);
    }

    #[test]
    fn test_risk_reward_overflow_is_not_a_ratio() {
        let line = "0.0000000000000000000000000001:9999999999999999999999999999";
        assert_eq!(extract_risk_reward(line), None);
        assert_eq!(extract_risk_reward("RR 0:3"), None);
    }
}
