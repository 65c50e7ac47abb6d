//! The page-resident side of the panel/page channel.
//!
//! One task owns the loaded page and serves requests one at a time, so the
//! document only ever has a single writer.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dom::Document;
use crate::models::{BookingRecord, FillReport};
use crate::services::panel::PageTransport;
use crate::services::resolver::FieldResolver;

const QUEUE_DEPTH: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("no booking page is loaded")]
    NoPage,

    #[error("page agent is not running")]
    AgentGone,

    #[error("page agent dropped the request")]
    NoReply,
}

enum PageRequest {
    FillForm {
        record: Box<BookingRecord>,
        reply: oneshot::Sender<Result<FillReport, PageError>>,
    },
    Load {
        html: String,
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Option<String>>,
    },
}

struct PageAgent {
    resolver: FieldResolver,
    document: Option<Document>,
    requests: mpsc::Receiver<PageRequest>,
}

impl PageAgent {
    async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            match request {
                PageRequest::FillForm { record, reply } => {
                    let result = self.fill_form(&record).await;
                    if reply.send(result).is_err() {
                        debug!("fill requester went away before the reply");
                    }
                }
                PageRequest::Load { html, reply } => {
                    self.document = Some(Document::parse(&html));
                    info!(bytes = html.len(), "booking page loaded");
                    let _ = reply.send(());
                }
                PageRequest::Snapshot { reply } => {
                    let _ = reply.send(self.document.as_ref().map(Document::to_html));
                }
            }
        }
        info!("page agent stopped");
    }

    async fn fill_form(&mut self, record: &BookingRecord) -> Result<FillReport, PageError> {
        let request_id = Uuid::new_v4();
        let Some(document) = self.document.as_mut() else {
            warn!(%request_id, "fillForm with no page loaded");
            return Err(PageError::NoPage);
        };
        info!(%request_id, "fillForm received");
        let report = self.resolver.fill_form(record, document).await;
        info!(%request_id, success = report.success, "fillForm finished");
        Ok(report)
    }
}

/// Starts the page agent, optionally with a page already loaded.
pub fn spawn(resolver: FieldResolver, page: Option<String>) -> (PageHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    let agent = PageAgent {
        resolver,
        document: page.as_deref().map(Document::parse),
        requests: rx,
    };
    let task = tokio::spawn(agent.run());
    (PageHandle { tx }, task)
}

/// Sending half of the channel to the page agent.
#[derive(Clone)]
pub struct PageHandle {
    tx: mpsc::Sender<PageRequest>,
}

impl PageHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> PageRequest,
    ) -> Result<T, PageError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| PageError::AgentGone)?;
        response.await.map_err(|_| PageError::NoReply)
    }

    pub async fn load(&self, html: String) -> Result<(), PageError> {
        self.request(|reply| PageRequest::Load { html, reply }).await
    }

    /// The page as it stands now, filled values included.
    pub async fn snapshot(&self) -> Result<Option<String>, PageError> {
        self.request(|reply| PageRequest::Snapshot { reply }).await
    }
}

#[async_trait]
impl PageTransport for PageHandle {
    async fn fill_form(&self, record: &BookingRecord) -> Result<FillReport, PageError> {
        let record = Box::new(record.clone());
        self.request(|reply| PageRequest::FillForm { record, reply })
            .await?
    }
}
