//! Collaborators supplied by the host application.
//!
//! - [`RecordStore`]: read-only queries against the business database.
//! - [`DocumentPredicates`]: builds the search filters that decide which
//!   documents are pending for Xerox.
//! - [`DocumentTransmitter`]: generates and ships the Xerox files.
//!
//! [`SigningPredicates`] is the stock predicate builder used when the host does
//! not provide its own rules.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use etd_core::{
    BatchPickingId, CategoryId, CompanyId, DomainResult, PickingId, ProductId, RouteId,
    SaleLineId, UomId,
};

use crate::model::{
    BatchPicking, Invoice, Picking, PickingKind, Product, ProductCategory, Route, SaleLine,
    ShipmentLine, TransmissionSet, UnitOfMeasure,
};

/// Opaque search filter over records of type `T`.
pub struct Filter<T> {
    label: String,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Filter<T> {
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Filter accepting every record.
    pub fn all() -> Self {
        Self::new("all", |_| true)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, record: &T) -> bool {
        (self.predicate)(record)
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("label", &self.label).finish()
    }
}

/// Read-only access to the business records.
///
/// Lookups by id return `DomainError::NotFound` for unknown ids. Searches
/// return matches in store order.
pub trait RecordStore: Send + Sync {
    fn route(&self, id: RouteId) -> DomainResult<Route>;
    fn pickings_of_batch(&self, id: BatchPickingId) -> DomainResult<Vec<Picking>>;
    fn moves_of_picking(&self, id: PickingId) -> DomainResult<Vec<ShipmentLine>>;
    fn product(&self, id: ProductId) -> DomainResult<Product>;
    fn uom(&self, id: UomId) -> DomainResult<UnitOfMeasure>;
    fn category(&self, id: CategoryId) -> DomainResult<ProductCategory>;
    fn sale_line(&self, id: SaleLineId) -> DomainResult<SaleLine>;

    fn search_invoices(&self, filter: &Filter<Invoice>) -> DomainResult<Vec<Invoice>>;
    fn search_pickings(&self, filter: &Filter<Picking>) -> DomainResult<Vec<Picking>>;
    fn search_batches(&self, filter: &Filter<BatchPicking>) -> DomainResult<Vec<BatchPicking>>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn route(&self, id: RouteId) -> DomainResult<Route> {
        (**self).route(id)
    }

    fn pickings_of_batch(&self, id: BatchPickingId) -> DomainResult<Vec<Picking>> {
        (**self).pickings_of_batch(id)
    }

    fn moves_of_picking(&self, id: PickingId) -> DomainResult<Vec<ShipmentLine>> {
        (**self).moves_of_picking(id)
    }

    fn product(&self, id: ProductId) -> DomainResult<Product> {
        (**self).product(id)
    }

    fn uom(&self, id: UomId) -> DomainResult<UnitOfMeasure> {
        (**self).uom(id)
    }

    fn category(&self, id: CategoryId) -> DomainResult<ProductCategory> {
        (**self).category(id)
    }

    fn sale_line(&self, id: SaleLineId) -> DomainResult<SaleLine> {
        (**self).sale_line(id)
    }

    fn search_invoices(&self, filter: &Filter<Invoice>) -> DomainResult<Vec<Invoice>> {
        (**self).search_invoices(filter)
    }

    fn search_pickings(&self, filter: &Filter<Picking>) -> DomainResult<Vec<Picking>> {
        (**self).search_pickings(filter)
    }

    fn search_batches(&self, filter: &Filter<BatchPicking>) -> DomainResult<Vec<BatchPicking>> {
        (**self).search_batches(filter)
    }
}

/// Builds the filters selecting documents pending for Xerox.
///
/// Errors are the host's own and are propagated as-is by the selector.
pub trait DocumentPredicates: Send + Sync {
    fn invoice_filter(&self, force: bool, routes: &[RouteId]) -> anyhow::Result<Filter<Invoice>>;

    /// `kind = None` selects the default delivery pickings.
    fn picking_filter(
        &self,
        force: bool,
        routes: &[RouteId],
        kind: Option<PickingKind>,
    ) -> anyhow::Result<Filter<Picking>>;

    fn batch_filter(
        &self,
        force: bool,
        batches: &[BatchPickingId],
    ) -> anyhow::Result<Filter<BatchPicking>>;
}

impl<P> DocumentPredicates for Arc<P>
where
    P: DocumentPredicates + ?Sized,
{
    fn invoice_filter(&self, force: bool, routes: &[RouteId]) -> anyhow::Result<Filter<Invoice>> {
        (**self).invoice_filter(force, routes)
    }

    fn picking_filter(
        &self,
        force: bool,
        routes: &[RouteId],
        kind: Option<PickingKind>,
    ) -> anyhow::Result<Filter<Picking>> {
        (**self).picking_filter(force, routes, kind)
    }

    fn batch_filter(
        &self,
        force: bool,
        batches: &[BatchPickingId],
    ) -> anyhow::Result<Filter<BatchPicking>> {
        (**self).batch_filter(force, batches)
    }
}

/// Generates the Xerox files for one company and sends them.
pub trait DocumentTransmitter: Send + Sync {
    fn build_and_send(&self, company: CompanyId, documents: &TransmissionSet)
    -> anyhow::Result<()>;
}

impl<T> DocumentTransmitter for Arc<T>
where
    T: DocumentTransmitter + ?Sized,
{
    fn build_and_send(
        &self,
        company: CompanyId,
        documents: &TransmissionSet,
    ) -> anyhow::Result<()> {
        (**self).build_and_send(company, documents)
    }
}

/// Stock selection rules: documents linked to the routes that are still
/// unsigned. `force` also selects documents already signed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigningPredicates;

impl DocumentPredicates for SigningPredicates {
    fn invoice_filter(&self, force: bool, routes: &[RouteId]) -> anyhow::Result<Filter<Invoice>> {
        let routes: HashSet<RouteId> = routes.iter().copied().collect();
        Ok(Filter::new(
            format!("invoices(force={force}, routes={})", routes.len()),
            move |invoice: &Invoice| {
                invoice.route_id.is_some_and(|r| routes.contains(&r)) && (force || !invoice.signed)
            },
        ))
    }

    fn picking_filter(
        &self,
        force: bool,
        routes: &[RouteId],
        kind: Option<PickingKind>,
    ) -> anyhow::Result<Filter<Picking>> {
        let routes: HashSet<RouteId> = routes.iter().copied().collect();
        let kind = kind.unwrap_or(PickingKind::Outgoing);
        Ok(Filter::new(
            format!("pickings(force={force}, routes={}, kind={kind:?})", routes.len()),
            move |picking: &Picking| {
                picking.route_id.is_some_and(|r| routes.contains(&r))
                    && picking.kind == kind
                    && (force || !picking.signed)
            },
        ))
    }

    fn batch_filter(
        &self,
        force: bool,
        batches: &[BatchPickingId],
    ) -> anyhow::Result<Filter<BatchPicking>> {
        let batches: HashSet<BatchPickingId> = batches.iter().copied().collect();
        Ok(Filter::new(
            format!("batches(force={force}, candidates={})", batches.len()),
            move |batch: &BatchPicking| batches.contains(&batch.id) && (force || !batch.signed),
        ))
    }
}
