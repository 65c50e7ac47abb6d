//! Operator panel session: the one pending booking record and the status
//! line shown beside it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::{BookingRecord, FillReport, StatusLine};
use crate::services::page::PageError;
use crate::services::parser::{self, ExtractError};

pub const EXTRACTED: &str =
    "Data extracted successfully. Click \"Fill Form\" to autofill the booking form.";
pub const RECORD_UPDATED: &str =
    "Record updated. Click \"Fill Form\" to autofill the booking form.";
pub const FILLED: &str = "Form filled successfully!";

/// Channel from the panel to the page. One request, one reply.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn fill_form(&self, record: &BookingRecord) -> Result<FillReport, PageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Please paste the email content first.")]
    NothingPasted,

    #[error("Please extract data first.")]
    NothingExtracted,

    #[error("Error filling form: {0}")]
    Transport(#[from] PageError),
}

#[derive(Default)]
struct SessionState {
    pending: Option<BookingRecord>,
    status: StatusLine,
}

pub struct PanelSession {
    transport: Arc<dyn PageTransport>,
    state: Mutex<SessionState>,
}

impl PanelSession {
    pub fn new(transport: Arc<dyn PageTransport>) -> Self {
        Self {
            transport,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Parses pasted email text and replaces the pending record with the
    /// result. Returns the record with the status line it set.
    pub async fn extract(&self, text: &str) -> Result<(BookingRecord, StatusLine), PanelError> {
        let mut state = self.state.lock().await;
        match parser::parse(text) {
            Ok(record) => {
                state.pending = Some(record.clone());
                state.status = StatusLine::success(EXTRACTED);
                Ok((record, state.status.clone()))
            }
            Err(ExtractError::EmptyInput) => {
                let err = PanelError::NothingPasted;
                state.status = StatusLine::error(err.to_string());
                Err(err)
            }
        }
    }

    /// Replaces the pending record with an operator-edited one, normalized
    /// the same way as an extracted record.
    pub async fn replace_record(&self, mut record: BookingRecord) -> (BookingRecord, StatusLine) {
        parser::normalize(&mut record);
        let mut state = self.state.lock().await;
        state.pending = Some(record.clone());
        state.status = StatusLine::success(RECORD_UPDATED);
        info!("pending record replaced by operator");
        (record, state.status.clone())
    }

    /// Sends the pending record to the page and waits for its reply.
    ///
    /// The session stays locked for the whole round-trip, so a second fill
    /// waits for the first to finish.
    pub async fn fill(&self) -> Result<(FillReport, StatusLine), PanelError> {
        let mut state = self.state.lock().await;
        let Some(record) = state.pending.clone() else {
            let err = PanelError::NothingExtracted;
            state.status = StatusLine::error(err.to_string());
            return Err(err);
        };

        match self.transport.fill_form(&record).await {
            Ok(report) => {
                state.status = if report.success {
                    StatusLine::success(FILLED)
                } else {
                    StatusLine::error(format!(
                        "Form filling completed with issues: {}",
                        report.message
                    ))
                };
                Ok((report, state.status.clone()))
            }
            Err(e) => {
                let err = PanelError::from(e);
                warn!(error = %err, "fill request failed");
                state.status = StatusLine::error(err.to_string());
                Err(err)
            }
        }
    }

    /// The pending record and status line, read together.
    pub async fn current(&self) -> (Option<BookingRecord>, StatusLine) {
        let state = self.state.lock().await;
        (state.pending.clone(), state.status.clone())
    }
}
