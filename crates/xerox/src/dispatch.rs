//! Per-company generation and sending of the Xerox files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use etd_core::{CompanyId, CompanyOwned, DomainResult, RouteId};

use crate::collaborators::{DocumentPredicates, DocumentTransmitter, RecordStore};
use crate::model::Route;
use crate::selector::{DocumentSelector, SendOptions};

/// Unit of work for a background send: the routes and the run flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFilesRequest {
    pub route_ids: Vec<RouteId>,
    #[serde(default)]
    pub options: SendOptions,
}

impl SendFilesRequest {
    pub fn new(route_ids: Vec<RouteId>, options: SendOptions) -> Self {
        Self { route_ids, options }
    }
}

/// Groups records by owning company, companies in first-seen order.
pub fn partition_by_company<R>(records: &[R]) -> IndexMap<CompanyId, Vec<R>>
where
    R: CompanyOwned + Clone,
{
    let mut partitions: IndexMap<CompanyId, Vec<R>> = IndexMap::new();
    for record in records {
        partitions
            .entry(record.company_id())
            .or_default()
            .push(record.clone());
    }
    partitions
}

/// Sends the Xerox files of day routes, one transmission per company.
#[derive(Debug, Clone)]
pub struct XeroxDispatcher<S, P, T> {
    selector: DocumentSelector<S, P>,
    transmitter: T,
}

impl<S, P, T> XeroxDispatcher<S, P, T>
where
    S: RecordStore,
    P: DocumentPredicates,
    T: DocumentTransmitter,
{
    pub fn new(selector: DocumentSelector<S, P>, transmitter: T) -> Self {
        Self {
            selector,
            transmitter,
        }
    }

    pub fn selector(&self) -> &DocumentSelector<S, P> {
        &self.selector
    }

    /// Generate and send the Xerox files for `routes`. One call per company.
    pub fn send_files(&self, routes: &[Route], force: bool) -> DomainResult<()> {
        self.send_files_with(
            routes,
            SendOptions {
                force,
                ..SendOptions::default()
            },
        )
    }

    pub fn send_files_with(&self, routes: &[Route], options: SendOptions) -> DomainResult<()> {
        for (company, company_routes) in partition_by_company(routes) {
            let documents = self.selector.select_for_send(&company_routes, options)?;
            info!(
                company = %company,
                routes = documents.routes.len(),
                invoices = documents.invoices.len(),
                pickings = documents.pickings.len(),
                batches = documents.batches.len(),
                force = options.force,
                "sending xerox files"
            );
            self.transmitter.build_and_send(company, &documents)?;
        }
        Ok(())
    }

    /// Button action: send pending documents.
    // TODO: skip the send when no route has documents, and enqueue through the
    // job queue instead of sending inline.
    pub fn action_send_files(&self, routes: &[Route]) -> DomainResult<()> {
        self.send_files(routes, false)
    }

    /// Button action: resend everything, signed documents included.
    pub fn action_send_files_force(&self, routes: &[Route]) -> DomainResult<()> {
        self.send_files(routes, true)
    }

    /// Run a queued request: load its routes, then send.
    pub fn run_request(&self, request: &SendFilesRequest) -> DomainResult<()> {
        let routes = request
            .route_ids
            .iter()
            .map(|id| self.selector.store().route(*id))
            .collect::<DomainResult<Vec<_>>>()?;
        debug!(routes = routes.len(), "running queued xerox send");
        self.send_files_with(&routes, request.options)
    }
}
