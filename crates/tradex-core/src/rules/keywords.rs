//! Pair symbols, direction and result keywords, setup labels.

use crate::models::{Direction, TradeResult};

use super::patterns::{
    DIRECTION_LONG, DIRECTION_SHORT, PAIR_DASH, PAIR_LABELED, PAIR_SLASH, RESULT_BREAKEVEN,
    RESULT_LOSS, RESULT_WIN, SETUP_LABELED,
};

/// Trading pair mentioned in a line, normalized to `XXX/YYY`.
pub fn extract_pair(line: &str) -> Option<String> {
    [&*PAIR_SLASH, &*PAIR_DASH, &*PAIR_LABELED]
        .iter()
        .find_map(|pattern| pattern.captures(line))
        .map(|caps| format!("{}/{}", &caps[1], &caps[2]).to_uppercase())
}

/// Direction keyword in a line. Long keywords are checked first.
pub fn extract_direction(line: &str) -> Option<Direction> {
    if DIRECTION_LONG.is_match(line) {
        Some(Direction::Long)
    } else if DIRECTION_SHORT.is_match(line) {
        Some(Direction::Short)
    } else {
        None
    }
}

/// Result keyword in a line: win, then loss, then breakeven.
pub fn extract_result(line: &str) -> Option<TradeResult> {
    if RESULT_WIN.is_match(line) {
        Some(TradeResult::Win)
    } else if RESULT_LOSS.is_match(line) {
        Some(TradeResult::Loss)
    } else if RESULT_BREAKEVEN.is_match(line) {
        Some(TradeResult::Breakeven)
    } else {
        None
    }
}

/// Labeled setup name (`setup: Breakout`, `estrategia: London open`).
pub fn extract_setup(line: &str) -> Option<String> {
    SETUP_LABELED
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
        .filter(|setup| !setup.is_empty())
}

/// Direction from a spreadsheet cell. Unrecognized values stay unset.
pub fn infer_direction_cell(value: &str) -> Option<Direction> {
    let value = value.trim().to_lowercase();
    if value.contains("long") || value.contains("compra") || value == "l" || value == "buy" {
        Some(Direction::Long)
    } else if value.contains("short") || value.contains("venta") || value == "s" || value == "sell"
    {
        Some(Direction::Short)
    } else {
        None
    }
}

/// Result from a spreadsheet cell. Anything that is not a loss or a
/// breakeven marker counts as a win.
pub fn infer_result_cell(value: &str) -> TradeResult {
    let value = value.trim().to_lowercase();
    let is_loss = ["loss", "perdida", "pérdida", "lose"]
        .iter()
        .any(|marker| value.contains(marker))
        || value == "l";

    if is_loss {
        TradeResult::Loss
    } else if value.contains("breakeven") || value.contains("empate") || value == "be" {
        TradeResult::Breakeven
    } else {
        TradeResult::Win
    }
}
