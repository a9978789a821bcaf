use crate::extractor::ExtractionResult;
use crate::normalizer::NormalizedCall;

use serde::Serialize;
use time::OffsetDateTime;

/// One row of `vapi_call`.  Built once per finished call and handed to a store.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CallRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub extraction: ExtractionResult,
    pub business_name: String,
    pub call_length: i64,
    pub raw_transcript: String,
}

impl CallRecord {
    pub fn new(call: NormalizedCall, extraction: ExtractionResult) -> Self {
        Self {
            created_at: call.created_at,
            extraction,
            business_name: call.business_name,
            call_length: i64::try_from(call.call_length).unwrap_or(i64::MAX),
            raw_transcript: call.raw_transcript,
        }
    }
}
