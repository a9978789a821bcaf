use crate::db_types::CallRecord;
use crate::error::StoreError;
use crate::extractor::Extractor;
use crate::normalizer::{normalize, NotActionable, Normalized};
use crate::store::CallStore;
use crate::vapi_types::CallEvent;

use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info};

/// What the webhook reports back for one event.
#[derive(Debug)]
pub enum Acknowledgment {
    Ignored(NotActionable),
    Stored(CallRecord),
    Failed(StoreError),
}

/// Normalize, extract, store.  Holds no per-call state; one instance serves every request.
#[derive(Clone)]
pub struct CallPipeline {
    extractor: Extractor,
    store: Arc<dyn CallStore>,
}

impl CallPipeline {
    pub fn new(extractor: Extractor, store: Arc<dyn CallStore>) -> Self {
        Self { extractor, store }
    }

    pub async fn process(&self, event: Option<CallEvent>) -> Acknowledgment {
        let event = event.unwrap_or_default();
        let call = match normalize(&event, OffsetDateTime::now_utc()) {
            Normalized::Call(call) => call,
            Normalized::NotActionable(reason) => {
                info!(reason=%reason, "ignoring event");
                return Acknowledgment::Ignored(reason);
            }
        };
        info!(
            call_length = call.call_length,
            business_name = %call.business_name,
            "extracting structured data from transcript"
        );

        let extraction = self.extractor.extract(&call.raw_transcript).await;
        let record = CallRecord::new(call, extraction);
        debug!(record=?record, "final data to insert");

        match self.store.insert(&record).await {
            Ok(()) => {
                info!("call record stored");
                Acknowledgment::Stored(record)
            }
            Err(e) => Acknowledgment::Failed(e),
        }
    }
}
