//! Common regex patterns for trade journal extraction (Spanish and English).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Trading pairs (EUR/USD, EUR-USD, "par: EURUSD")
    pub static ref PAIR_SLASH: Regex = Regex::new(
        r"\b([A-Z]{3})/([A-Z]{3})\b"
    ).unwrap();

    pub static ref PAIR_DASH: Regex = Regex::new(
        r"\b([A-Z]{3})-([A-Z]{3})\b"
    ).unwrap();

    pub static ref PAIR_LABELED: Regex = Regex::new(
        r"(?i:\b(?:par|pair|symbol|s[ií]mbolo|activo))[:：=\s]+([A-Z]{3})/?([A-Z]{3})\b"
    ).unwrap();

    // Dates
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})\b"
    ).unwrap();

    pub static ref DATE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:fecha|date)[:：=\s]+(\d{1,2})[-/.](\d{1,2})[-/.](\d{2,4})\b"
    ).unwrap();

    pub static ref DATE_SPANISH_LONG: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(?:de\s+)?(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\s+(?:de\s+|del\s+)?(\d{4})\b"
    ).unwrap();

    pub static ref DATE_ENGLISH_LONG: Regex = Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_RELATIVE: Regex = Regex::new(
        r"(?i)\b(hoy|today|ayer|yesterday)\b"
    ).unwrap();

    // Direction
    pub static ref DIRECTION_LONG: Regex = Regex::new(
        r"(?i)\b(long|compra|buy|alcista)\b"
    ).unwrap();

    pub static ref DIRECTION_SHORT: Regex = Regex::new(
        r"(?i)\b(short|venta|sell|bajista)\b"
    ).unwrap();

    // Result
    pub static ref RESULT_WIN: Regex = Regex::new(
        r"(?i)\b(win|ganancia|profit|gan[ée]|ganado|exitoso)\b"
    ).unwrap();

    pub static ref RESULT_LOSS: Regex = Regex::new(
        r"(?i)\b(loss|p[ée]rdida|perd[íi]|perdido|fallido)\b"
    ).unwrap();

    pub static ref RESULT_BREAKEVEN: Regex = Regex::new(
        r"(?i)\b(breakeven|break-even|empate|neutro|cero)\b"
    ).unwrap();

    // Result amounts
    pub static ref AMOUNT_LABELED: Regex = Regex::new(
        r"(?i)\b(?:resultado|result|amount|cantidad|ganancia|p[ée]rdida|perdida|profit|loss|pnl|monto)[:：=\s]+[+\-]?\s?[$€£]?\s?(\d+(?:[.,]\d+)*)"
    ).unwrap();

    pub static ref AMOUNT_PERCENT: Regex = Regex::new(
        r"[+\-]?(\d+(?:[.,]\d+)*)\s*%"
    ).unwrap();

    pub static ref AMOUNT_CURRENCY: Regex = Regex::new(
        r"[$€£]\s?(\d+(?:[.,]\d+)*)|(\d+(?:[.,]\d+)*)\s?(?:USD|EUR|GBP|usd|eur|gbp|[$€£])"
    ).unwrap();

    // Risk percentage
    pub static ref RISK_LABELED: Regex = Regex::new(
        r"(?i)\b(?:risk|riesgo)(?:\s*%)?[:：=\s]+(\d+(?:[.,]\d+)*)\s*%?"
    ).unwrap();

    // Risk:reward
    pub static ref RR_LABELED: Regex = Regex::new(
        r"(?i)(?:\br:r|\brr|\brrr|\brisk[\s:/\-]?reward|\bratio)[:：=\s]*(?:(\d+(?:\.\d+)?)\s*[:/]\s*)?(\d+(?:\.\d+)?)"
    ).unwrap();

    pub static ref RR_PAIR: Regex = Regex::new(
        r"(?:^|[^\d.:])(\d+(?:\.\d+)?)\s*:\s*(\d+(?:\.\d+)?)(?:$|[^\d:])"
    ).unwrap();

    // Setup label
    pub static ref SETUP_LABELED: Regex = Regex::new(
        r"(?i)\b(?:setup|configuraci[óo]n|estrategia|strategy|tipo)[:：=\s]+([\p{L}][\p{L}\s'\-]*)"
    ).unwrap();

    // Entry and exit times
    pub static ref TIME_ENTRY: Regex = Regex::new(
        r"(?i)\b(?:entrada|entry)\b[^\d\n]{0,15}(\d{1,2}):(\d{2})\b"
    ).unwrap();

    pub static ref TIME_EXIT: Regex = Regex::new(
        r"(?i)\b(?:salida|exit)\b[^\d\n]{0,15}(\d{1,2}):(\d{2})\b"
    ).unwrap();

    pub static ref CLOCK_TIME: Regex = Regex::new(
        r"^\d{1,2}:\d{2}$"
    ).unwrap();

    // Numeric spreadsheet cell once decorations are removed
    pub static ref NUMERIC_BODY: Regex = Regex::new(
        r"^(?:\d+(?:[.,]\d+)*|[.,]\d+)$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_patterns() {
        assert!(PAIR_SLASH.is_match("Trade EUR/USD long"));
        assert!(PAIR_DASH.is_match("GBP-JPY"));
        assert!(PAIR_LABELED.is_match("Par: EURUSD"));
        assert!(!PAIR_SLASH.is_match("eur/usd"));
    }

    #[test]
    fn test_rr_labeled_captures_ratio_and_value() {
        let caps = RR_LABELED.captures("R:R 1:3").unwrap();
        assert_eq!(&caps[1], "1");
        assert_eq!(&caps[2], "3");

        let caps = RR_LABELED.captures("r:r 2").unwrap();
        assert!(caps.get(1).is_none());
        assert_eq!(&caps[2], "2");
    }

    #[test]
    fn test_risk_does_not_match_risk_reward_label() {
        assert!(!RISK_LABELED.is_match("risk:reward 2"));
        assert!(RISK_LABELED.is_match("riesgo 1.5%"));
    }
}
