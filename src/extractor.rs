use crate::consts::{DEFAULT_QUANTITY, TRANSCRIPT_WINDOW_CHARS, UNKNOWN};
use crate::error::ProviderError;
use crate::json_text::{is_truthy, to_text};
use crate::provider::CompletionProvider;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Bumped whenever the instruction below changes, so stored records can be traced back to the
/// contract that produced them.
pub const EXTRACTION_PROMPT_VERSION: &str = "v1";

pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are an AI that extracts order details from a \
phone call transcript. Return a JSON with these fields: caller_name, phone_number, order, \
quantity. Use 'Unknown' if something is missing.";

/// The four fields pulled out of a transcript.  Always fully populated.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub caller_name: String,
    pub phone_number: String,
    pub order: String,
    pub quantity: i64,
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self {
            caller_name: UNKNOWN.to_string(),
            phone_number: UNKNOWN.to_string(),
            order: UNKNOWN.to_string(),
            quantity: DEFAULT_QUANTITY,
        }
    }
}

impl ExtractionResult {
    /// Coerce a parsed reply into the four fields.  Text fields keep any truthy value; quantity
    /// keeps anything with a leading base-10 integer.
    pub fn from_json(value: &Value) -> Self {
        Self {
            caller_name: text_field(value.get("caller_name")),
            phone_number: text_field(value.get("phone_number")),
            order: text_field(value.get("order")),
            quantity: value
                .get("quantity")
                .and_then(parse_int_prefix)
                .unwrap_or(DEFAULT_QUANTITY),
        }
    }
}

/// Result of one extraction attempt, with the failure reason kept for logging.
#[derive(Debug)]
pub enum ExtractionOutcome {
    Success(ExtractionResult),
    CapabilityError(ProviderError),
    ParseError(String),
}

impl ExtractionOutcome {
    pub fn into_result(self) -> ExtractionResult {
        match self {
            ExtractionOutcome::Success(fields) => fields,
            ExtractionOutcome::CapabilityError(_) | ExtractionOutcome::ParseError(_) => {
                ExtractionResult::default()
            }
        }
    }
}

#[derive(Clone)]
pub struct Extractor {
    provider: Arc<dyn CompletionProvider>,
}

impl Extractor {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Extract the order fields from a transcript.  Never fails; any problem yields defaults.
    pub async fn extract(&self, raw_transcript: &str) -> ExtractionResult {
        let outcome = self.extract_outcome(raw_transcript).await;
        match &outcome {
            ExtractionOutcome::Success(fields) => info!(?fields, "extracted order fields"),
            ExtractionOutcome::CapabilityError(e) => {
                warn!(error=%e, "extraction api failed; using defaults")
            }
            ExtractionOutcome::ParseError(raw) => {
                warn!(raw=%raw, "extraction api reply was not a json object; using defaults")
            }
        }
        outcome.into_result()
    }

    pub async fn extract_outcome(&self, raw_transcript: &str) -> ExtractionOutcome {
        let window = transcript_window(raw_transcript, TRANSCRIPT_WINDOW_CHARS);
        debug!(
            prompt_version = EXTRACTION_PROMPT_VERSION,
            window_chars = window.chars().count(),
            "sending transcript to extraction api"
        );
        let user_prompt = format!("Transcript:\n\n{window}");
        let raw = match self
            .provider
            .complete_json(EXTRACTION_SYSTEM_PROMPT, &user_prompt)
            .await
        {
            Ok(raw) => raw,
            Err(e) => return ExtractionOutcome::CapabilityError(e),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => {
                ExtractionOutcome::Success(ExtractionResult::from_json(&value))
            }
            _ => ExtractionOutcome::ParseError(raw),
        }
    }
}

/// The last `max_chars` characters of `transcript`.
pub fn transcript_window(transcript: &str, max_chars: usize) -> &str {
    let total = transcript.chars().count();
    if total <= max_chars {
        return transcript;
    }
    match transcript.char_indices().nth(total - max_chars) {
        Some((idx, _)) => &transcript[idx..],
        None => transcript,
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(v) if is_truthy(v) => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Leading base-10 integer of the value's textual form (arrays are joined with `,`): optional
/// whitespace, optional sign, digits, anything after is ignored.  `None` when there are no
/// digits or the number does not fit.
fn parse_int_prefix(value: &Value) -> Option<i64> {
    let text = to_text(value);
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let digits = &rest[..digits_len];
    let parsed = if negative {
        format!("-{digits}").parse::<i64>()
    } else {
        digits.parse::<i64>()
    };
    parsed.ok()
}
