//! Test fixtures: a vector-backed record store and record builders.

use std::sync::Mutex;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use etd_core::{
    BatchPickingId, CategoryId, CompanyId, DomainError, DomainResult, InvoiceId, MoveId,
    PickingId, ProductId, RouteId, SaleLineId, UomId,
};

use crate::collaborators::{DocumentTransmitter, Filter, RecordStore};
use crate::model::{
    BatchPicking, DocumentClass, Invoice, Picking, PickingKind, Product, ProductCategory, Route,
    SaleLine, ShipmentLine, TransmissionSet, UnitOfMeasure,
};

#[derive(Debug, Default)]
pub(crate) struct VecStore {
    pub routes: Vec<Route>,
    pub invoices: Vec<Invoice>,
    pub pickings: Vec<Picking>,
    pub batches: Vec<BatchPicking>,
    pub moves: Vec<ShipmentLine>,
    pub products: Vec<Product>,
    pub categories: Vec<ProductCategory>,
    pub uoms: Vec<UnitOfMeasure>,
    pub sale_lines: Vec<SaleLine>,
}

fn find<T: Clone>(
    items: &[T],
    kind: &'static str,
    id: impl ToString,
    pred: impl Fn(&T) -> bool,
) -> DomainResult<T> {
    items
        .iter()
        .find(|item| pred(*item))
        .cloned()
        .ok_or_else(|| DomainError::not_found(kind, id))
}

impl RecordStore for VecStore {
    fn route(&self, id: RouteId) -> DomainResult<Route> {
        find(&self.routes, "route", id, |r| r.id == id)
    }

    fn pickings_of_batch(&self, id: BatchPickingId) -> DomainResult<Vec<Picking>> {
        Ok(self
            .pickings
            .iter()
            .filter(|p| p.batch_id == Some(id))
            .cloned()
            .collect())
    }

    fn moves_of_picking(&self, id: PickingId) -> DomainResult<Vec<ShipmentLine>> {
        Ok(self
            .moves
            .iter()
            .filter(|m| m.picking_id == id)
            .cloned()
            .collect())
    }

    fn product(&self, id: ProductId) -> DomainResult<Product> {
        find(&self.products, "product", id, |p| p.id == id)
    }

    fn uom(&self, id: UomId) -> DomainResult<UnitOfMeasure> {
        find(&self.uoms, "uom", id, |u| u.id == id)
    }

    fn category(&self, id: CategoryId) -> DomainResult<ProductCategory> {
        find(&self.categories, "category", id, |c| c.id == id)
    }

    fn sale_line(&self, id: SaleLineId) -> DomainResult<SaleLine> {
        find(&self.sale_lines, "sale line", id, |s| s.id == id)
    }

    fn search_invoices(&self, filter: &Filter<Invoice>) -> DomainResult<Vec<Invoice>> {
        Ok(self.invoices.iter().filter(|i| filter.matches(i)).cloned().collect())
    }

    fn search_pickings(&self, filter: &Filter<Picking>) -> DomainResult<Vec<Picking>> {
        Ok(self.pickings.iter().filter(|p| filter.matches(p)).cloned().collect())
    }

    fn search_batches(&self, filter: &Filter<BatchPicking>) -> DomainResult<Vec<BatchPicking>> {
        Ok(self.batches.iter().filter(|b| filter.matches(b)).cloned().collect())
    }
}

impl VecStore {
    pub fn add_route(&mut self, company: CompanyId) -> Route {
        let route = Route {
            id: RouteId::new(),
            company_id: company,
            name: format!("R{:03}", self.routes.len() + 1),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        self.routes.push(route.clone());
        route
    }

    pub fn add_invoice(&mut self, route: &Route, class: u16) -> Invoice {
        let invoice = Invoice {
            id: InvoiceId::new(),
            company_id: route.company_id,
            route_id: Some(route.id),
            number: format!("F-{}", self.invoices.len() + 1),
            document_class: Some(DocumentClass(class)),
            signed: false,
        };
        self.invoices.push(invoice.clone());
        invoice
    }

    pub fn add_picking(
        &mut self,
        route: &Route,
        kind: PickingKind,
        batch: Option<BatchPickingId>,
    ) -> Picking {
        let picking = Picking {
            id: PickingId::new(),
            company_id: route.company_id,
            route_id: Some(route.id),
            name: format!("WH/{:04}", self.pickings.len() + 1),
            kind,
            batch_id: batch,
            signed: false,
        };
        self.pickings.push(picking.clone());
        picking
    }

    pub fn add_batch(&mut self, company: CompanyId) -> BatchPicking {
        let batch = BatchPicking {
            id: BatchPickingId::new(),
            company_id: company,
            name: format!("BATCH/{:03}", self.batches.len() + 1),
            signed: false,
        };
        self.batches.push(batch.clone());
        batch
    }

    /// Route with one loading batch; returns the internal picking holding moves.
    pub fn add_loaded_route(&mut self, company: CompanyId) -> (Route, Picking) {
        let route = self.add_route(company);
        let batch = self.add_batch(company);
        let picking = self.add_picking(&route, PickingKind::Internal, Some(batch.id));
        (route, picking)
    }

    pub fn add_category(&mut self, name: Option<&str>) -> CategoryId {
        let id = CategoryId::new();
        self.categories.push(ProductCategory {
            id,
            complete_name: name.map(str::to_string),
        });
        id
    }

    pub fn add_product(
        &mut self,
        name: &str,
        code: Option<&str>,
        category: Option<CategoryId>,
    ) -> ProductId {
        let id = ProductId::new();
        self.products.push(Product {
            id,
            name: name.to_string(),
            ref_etd: code.map(str::to_string),
            category_id: category,
        });
        id
    }

    pub fn add_uom(&mut self, name: &str) -> UomId {
        let id = UomId::new();
        self.uoms.push(UnitOfMeasure {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_move(
        &mut self,
        picking: &Picking,
        product: ProductId,
        uom: UomId,
        done: i64,
        planned: i64,
        price: Option<i64>,
    ) -> MoveId {
        let sale_line_id = price.map(|p| {
            let id = SaleLineId::new();
            self.sale_lines.push(SaleLine {
                id,
                price_unit: Some(Decimal::from(p)),
            });
            id
        });
        let id = MoveId::new();
        self.moves.push(ShipmentLine {
            id,
            picking_id: picking.id,
            product_id: product,
            uom_id: uom,
            quantity_done: Decimal::from(done),
            planned_quantity: Decimal::from(planned),
            sale_line_id,
            packaged: false,
        });
        id
    }
}

/// Transmitter remembering every call.
#[derive(Debug, Default)]
pub(crate) struct CapturingTransmitter {
    pub sent: Mutex<Vec<(CompanyId, TransmissionSet)>>,
}

impl DocumentTransmitter for CapturingTransmitter {
    fn build_and_send(
        &self,
        company: CompanyId,
        documents: &TransmissionSet,
    ) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((company, documents.clone()));
        Ok(())
    }
}
