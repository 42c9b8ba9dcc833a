//! AI-assisted extraction: prompt construction and lenient reply parsing.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::{ExtractionSource, TradeExtractor};
use crate::ai::CompletionClient;
use crate::error::{AiError, ExtractError};
use crate::models::{CandidateRecord, TradeResult};
use crate::rules::{
    coerce_date, decode_time, extract_risk_reward, fraction_to_hhmm, infer_direction_cell,
    parse_number,
};

const PROMPT_HEADER: &str = "\
You extract trading journal entries from unstructured text, which may be in Spanish or English.

Find EVERY trade in the text below. For each trade identify:
1. pair: currency pair or symbol (e.g. EUR/USD, GBP/JPY)
2. trade_date: date of the trade as YYYY-MM-DD
3. direction: Long or Short
4. risk_percentage: risked percentage of the account
5. risk_reward: risk/reward ratio as a number
6. result: win, loss or breakeven
7. result_amount: size of the result as a positive number
8. setup: name of the setup or strategy
9. notes: any additional comments
10. entry_time: entry time as HH:MM, if present
11. exit_time: exit time as HH:MM, if present

Text to analyze:
";

const PROMPT_FOOTER: &str = r#"

Reply ONLY with a valid JSON array where each object is one trade. Use exactly this format:

[
  {
    "pair": "EUR/USD",
    "trade_date": "2024-01-15",
    "direction": "Long",
    "risk_percentage": 2.0,
    "risk_reward": 2.5,
    "result": "win",
    "result_amount": 5.0,
    "setup": "Breakout",
    "notes": "Clean retest of the range high",
    "entry_time": "09:30",
    "exit_time": "14:45"
  }
]

Use null or omit any field you cannot find. If there are no trades, return an empty array [].

IMPORTANT: reply with the JSON array only, with no text before or after it."#;

/// Build the extraction prompt for a text.
pub fn build_prompt(text: &str) -> String {
    format!("{}{}{}", PROMPT_HEADER, text.trim(), PROMPT_FOOTER)
}

/// Parse the first array-shaped substring of a reply into candidates.
///
/// Objects are converted leniently: numbers may be JSON numbers or strings,
/// dates and times are revalidated, unknown enum values are dropped. Objects
/// with neither a pair nor a trade date are discarded, and an array left
/// without any object is [`AiError::EmptyResult`].
pub fn parse_response(reply: &str) -> Result<Vec<CandidateRecord>, AiError> {
    let (Some(start), Some(end)) = (reply.find('['), reply.rfind(']')) else {
        return Err(AiError::MalformedResponse("no JSON array in reply".to_string()));
    };
    if end < start {
        return Err(AiError::MalformedResponse("no JSON array in reply".to_string()));
    }

    let items: Vec<Value> = serde_json::from_str(&reply[start..=end])
        .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

    let candidates: Vec<CandidateRecord> = items
        .iter()
        .filter_map(Value::as_object)
        .map(candidate_from_json)
        .filter(CandidateRecord::has_identity)
        .collect();

    if candidates.is_empty() {
        return Err(AiError::EmptyResult);
    }
    Ok(candidates)
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    let number = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => parse_number(s).or_else(|| extract_risk_reward(s)),
        _ => None,
    };
    number.map(|d| d.abs())
}

fn time_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().and_then(fraction_to_hhmm),
        Value::String(s) => decode_time(s),
        _ => None,
    }
}

fn result_value(value: &Value) -> Option<TradeResult> {
    match value.as_str()?.trim().to_lowercase().as_str() {
        "win" | "ganancia" => Some(TradeResult::Win),
        "loss" | "pérdida" | "perdida" => Some(TradeResult::Loss),
        "breakeven" | "break-even" | "be" => Some(TradeResult::Breakeven),
        _ => None,
    }
}

fn candidate_from_json(object: &Map<String, Value>) -> CandidateRecord {
    let mut candidate = CandidateRecord::new();

    candidate.pair = lookup(object, &["pair", "symbol"])
        .and_then(text_value)
        .map(|pair| pair.to_uppercase());
    candidate.trade_date = lookup(object, &["trade_date", "tradeDate", "date"])
        .and_then(text_value)
        .and_then(|date| coerce_date(&date));
    candidate.direction = lookup(object, &["direction"])
        .and_then(Value::as_str)
        .and_then(infer_direction_cell);
    candidate.risk_percentage =
        lookup(object, &["risk_percentage", "riskPercentage"]).and_then(decimal_value);
    candidate.risk_reward = lookup(object, &["risk_reward", "riskReward"]).and_then(decimal_value);
    candidate.result = lookup(object, &["result"]).and_then(result_value);
    candidate.result_amount =
        lookup(object, &["result_amount", "resultAmount"]).and_then(decimal_value);
    candidate.setup = lookup(object, &["setup"]).and_then(text_value);
    candidate.notes = lookup(object, &["notes"]).and_then(text_value);
    candidate.entry_time = lookup(object, &["entry_time", "entryTime"]).and_then(time_value);
    candidate.exit_time = lookup(object, &["exit_time", "exitTime"]).and_then(time_value);

    trace!("AI candidate: {:?}", candidate);
    candidate
}

/// Extractor backed by a completion client.
pub struct AiExtractor<C: CompletionClient> {
    client: C,
}

impl<C: CompletionClient> AiExtractor<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Prompt the service and parse its reply.
    pub async fn extract_text(&self, text: &str) -> Result<Vec<CandidateRecord>, AiError> {
        let prompt = build_prompt(text);
        debug!("Sending {} chars to the AI extractor", prompt.len());
        let reply = self.client.complete(&prompt).await?;
        parse_response(&reply)
    }
}

#[async_trait]
impl<C: CompletionClient> TradeExtractor for AiExtractor<C> {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Ai
    }

    async fn extract(&self, text: &str) -> Result<Vec<CandidateRecord>, ExtractError> {
        Ok(self.extract_text(text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct Scripted {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for Scripted {
        async fn complete(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|_| AiError::Network("unreachable".to_string()))
        }
    }

    #[test]
    fn test_prompt_contains_text_schema_and_instruction() {
        let prompt = build_prompt("EUR/USD long");
        assert!(prompt.contains("EUR/USD long"));
        assert!(prompt.contains("\"risk_reward\""));
        assert!(prompt.contains("JSON array only"));
    }

    #[test]
    fn test_parse_reply_wrapped_in_prose_and_fences() {
        let reply = "Here you go:\n```json\n[{\"pair\": \"eur/usd\", \"trade_date\": \"2024-01-15\", \"direction\": \"Short\", \"result\": \"loss\", \"result_amount\": -5.2, \"risk_reward\": \"1:2\", \"entry_time\": \"9:30\"}]\n```";
        let candidates = parse_response(reply).unwrap();

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.pair.as_deref(), Some("EUR/USD"));
        assert_eq!(candidate.trade_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(candidate.direction, Some(Direction::Short));
        assert_eq!(candidate.result, Some(TradeResult::Loss));
        assert_eq!(candidate.result_amount, Some(Decimal::from_str("5.2").unwrap()));
        assert_eq!(candidate.risk_reward, Some(Decimal::from(2)));
        assert_eq!(candidate.entry_time.as_deref(), Some("09:30"));
    }

    #[test]
    fn test_parse_drops_invalid_values() {
        let reply = r#"[{"pair": "GBP/USD", "trade_date": "yesterday-ish", "result": "maybe", "risk_percentage": "two"}]"#;
        let candidates = parse_response(reply).unwrap();
        assert_eq!(candidates[0].trade_date, None);
        assert_eq!(candidates[0].result, None);
        assert_eq!(candidates[0].risk_percentage, None);
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            parse_response("I could not find any trades."),
            Err(AiError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response("[not json]"),
            Err(AiError::MalformedResponse(_))
        ));
        assert!(matches!(parse_response("[]"), Err(AiError::EmptyResult)));
        assert!(matches!(parse_response("[{}, 3]"), Err(AiError::EmptyResult)));
        assert!(matches!(
            parse_response(r#"[{"direction": "Long", "notes": "something"}]"#),
            Err(AiError::EmptyResult)
        ));
    }

    #[tokio::test]
    async fn test_extractor_sends_prompt_and_parses_reply() {
        let client = Scripted::replying(r#"[{"pair": "EUR/USD", "trade_date": "2024-01-15"}]"#);
        let extractor = AiExtractor::new(client);

        let candidates = extractor.extract("EUR/USD 15/01/2024").await.unwrap();
        assert_eq!(candidates.len(), 1);

        let prompts = extractor.client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("EUR/USD 15/01/2024"));
    }

    #[tokio::test]
    async fn test_extractor_surfaces_client_errors() {
        let client = Scripted {
            reply: Err(()),
            prompts: Mutex::new(Vec::new()),
        };
        let extractor = AiExtractor::new(client);
        assert!(matches!(
            extractor.extract("EUR/USD").await,
            Err(ExtractError::Ai(AiError::Network(_)))
        ));
    }
}
