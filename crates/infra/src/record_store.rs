use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use etd_core::{
    BatchPickingId, CategoryId, DomainError, DomainResult, Entity, InvoiceId, MoveId, PickingId,
    ProductId, RouteId, SaleLineId, UomId,
};
use etd_xerox::{
    BatchPicking, Filter, Invoice, Picking, Product, ProductCategory, RecordStore, Route,
    SaleLine, ShipmentLine, UnitOfMeasure,
};

#[derive(Debug, Default)]
struct Tables {
    routes: IndexMap<RouteId, Route>,
    invoices: IndexMap<InvoiceId, Invoice>,
    pickings: IndexMap<PickingId, Picking>,
    batches: IndexMap<BatchPickingId, BatchPicking>,
    moves: IndexMap<MoveId, ShipmentLine>,
    products: IndexMap<ProductId, Product>,
    categories: IndexMap<CategoryId, ProductCategory>,
    uoms: IndexMap<UomId, UnitOfMeasure>,
    sale_lines: IndexMap<SaleLineId, SaleLine>,
}

/// In-memory record store for tests/dev.
///
/// Tables keep insertion order, so searches return records in the order they
/// were first upserted.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Tables>,
}

fn upsert<K, V>(table: &mut IndexMap<K, V>, record: V)
where
    V: Entity<Id = K>,
    K: Eq + Hash,
{
    table.insert(record.id(), record);
}

fn lookup<K, V>(table: &IndexMap<K, V>, kind: &'static str, id: K) -> DomainResult<V>
where
    K: Eq + Hash + core::fmt::Display,
    V: Clone,
{
    table
        .get(&id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(kind, id))
}

fn search<K, V>(table: &IndexMap<K, V>, filter: &Filter<V>) -> Vec<V>
where
    V: Clone,
{
    table
        .values()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| DomainError::storage("record store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| DomainError::storage("record store lock poisoned"))
    }

    pub fn upsert_route(&self, route: Route) -> DomainResult<()> {
        upsert(&mut self.write()?.routes, route);
        Ok(())
    }

    pub fn upsert_invoice(&self, invoice: Invoice) -> DomainResult<()> {
        upsert(&mut self.write()?.invoices, invoice);
        Ok(())
    }

    pub fn upsert_picking(&self, picking: Picking) -> DomainResult<()> {
        upsert(&mut self.write()?.pickings, picking);
        Ok(())
    }

    pub fn upsert_batch(&self, batch: BatchPicking) -> DomainResult<()> {
        upsert(&mut self.write()?.batches, batch);
        Ok(())
    }

    /// Moves must reference a known picking.
    pub fn upsert_move(&self, line: ShipmentLine) -> DomainResult<()> {
        let mut tables = self.write()?;
        if !tables.pickings.contains_key(&line.picking_id) {
            return Err(DomainError::validation(format!(
                "move {} references unknown picking {}",
                line.id, line.picking_id
            )));
        }
        upsert(&mut tables.moves, line);
        Ok(())
    }

    pub fn upsert_product(&self, product: Product) -> DomainResult<()> {
        upsert(&mut self.write()?.products, product);
        Ok(())
    }

    pub fn upsert_category(&self, category: ProductCategory) -> DomainResult<()> {
        upsert(&mut self.write()?.categories, category);
        Ok(())
    }

    pub fn upsert_uom(&self, uom: UnitOfMeasure) -> DomainResult<()> {
        upsert(&mut self.write()?.uoms, uom);
        Ok(())
    }

    pub fn upsert_sale_line(&self, line: SaleLine) -> DomainResult<()> {
        upsert(&mut self.write()?.sale_lines, line);
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn route(&self, id: RouteId) -> DomainResult<Route> {
        lookup(&self.read()?.routes, "route", id)
    }

    fn pickings_of_batch(&self, id: BatchPickingId) -> DomainResult<Vec<Picking>> {
        let tables = self.read()?;
        if !tables.batches.contains_key(&id) {
            return Err(DomainError::not_found("batch picking", id));
        }
        Ok(tables
            .pickings
            .values()
            .filter(|p| p.batch_id == Some(id))
            .cloned()
            .collect())
    }

    fn moves_of_picking(&self, id: PickingId) -> DomainResult<Vec<ShipmentLine>> {
        Ok(self
            .read()?
            .moves
            .values()
            .filter(|m| m.picking_id == id)
            .cloned()
            .collect())
    }

    fn product(&self, id: ProductId) -> DomainResult<Product> {
        lookup(&self.read()?.products, "product", id)
    }

    fn uom(&self, id: UomId) -> DomainResult<UnitOfMeasure> {
        lookup(&self.read()?.uoms, "unit of measure", id)
    }

    fn category(&self, id: CategoryId) -> DomainResult<ProductCategory> {
        lookup(&self.read()?.categories, "product category", id)
    }

    fn sale_line(&self, id: SaleLineId) -> DomainResult<SaleLine> {
        lookup(&self.read()?.sale_lines, "sale line", id)
    }

    fn search_invoices(&self, filter: &Filter<Invoice>) -> DomainResult<Vec<Invoice>> {
        Ok(search(&self.read()?.invoices, filter))
    }

    fn search_pickings(&self, filter: &Filter<Picking>) -> DomainResult<Vec<Picking>> {
        Ok(search(&self.read()?.pickings, filter))
    }

    fn search_batches(&self, filter: &Filter<BatchPicking>) -> DomainResult<Vec<BatchPicking>> {
        Ok(search(&self.read()?.batches, filter))
    }
}
