//! Development transmitters for the Xerox send step.
//!
//! The production file builder lives in the host application; these adapters
//! stand in for it in tests and local runs.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use etd_core::CompanyId;
use etd_xerox::{DocumentTransmitter, EntityKind, TransmissionSet};

/// One `build_and_send` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transmission {
    pub company_id: CompanyId,
    pub documents: TransmissionSet,
    pub sent_at: DateTime<Utc>,
}

/// Keeps every transmission in memory.
#[derive(Debug, Default)]
pub struct RecordingTransmitter {
    sent: RwLock<Vec<Transmission>>,
}

impl RecordingTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every transmission so far, also after a panic poisoned the log.
    pub fn transmissions(&self) -> Vec<Transmission> {
        self.sent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn companies(&self) -> Vec<CompanyId> {
        self.transmissions().iter().map(|t| t.company_id).collect()
    }
}

impl DocumentTransmitter for RecordingTransmitter {
    fn build_and_send(
        &self,
        company: CompanyId,
        documents: &TransmissionSet,
    ) -> anyhow::Result<()> {
        let mut sent = self
            .sent
            .write()
            .map_err(|_| anyhow::anyhow!("transmission log lock poisoned"))?;
        sent.push(Transmission {
            company_id: company,
            documents: documents.clone(),
            sent_at: Utc::now(),
        });
        Ok(())
    }
}

/// Logs the `{model: ids}` payload instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTransmitter;

impl DocumentTransmitter for LoggingTransmitter {
    fn build_and_send(
        &self,
        company: CompanyId,
        documents: &TransmissionSet,
    ) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&documents.as_map())?;
        info!(
            company = %company,
            routes = documents.len(EntityKind::Route),
            invoices = documents.len(EntityKind::Invoice),
            pickings = documents.len(EntityKind::Picking),
            batches = documents.len(EntityKind::BatchPicking),
            payload = %payload,
            "xerox transmission (dry run)"
        );
        Ok(())
    }
}
