//! Goods table printed on the Xerox route documents.
//!
//! Shipment lines of the routes' loading batches are merged per
//! (product, unit of measure), grouped under product-category headers in the
//! order categories are first met, and closed by a total line.

use std::collections::HashMap;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use etd_core::{BatchPickingId, CategoryId, DomainResult, MoveId, ProductId, UomId};

use crate::collaborators::{DocumentPredicates, RecordStore};
use crate::model::{Route, ShipmentLine};
use crate::selector::DocumentSelector;
use crate::settings::ReportLabels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLineKind {
    Section,
    Product,
    Total,
}

/// One row of the goods table.
///
/// Blank cells (`quantity`/`price` on headers, `price` on the total) are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    /// 1-based row number across headers, products and total.
    pub index: usize,
    pub kind: ReportLineKind,
    pub code: String,
    pub name: String,
    pub uom: String,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
}

/// A shipment line with its product, UoM, category and price resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentLineView {
    pub product_id: ProductId,
    pub uom_id: UomId,
    pub product_code: Option<String>,
    pub product_name: String,
    pub uom_name: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub quantity_done: Decimal,
    pub planned_quantity: Decimal,
    pub sale_price: Option<Decimal>,
}

impl ShipmentLineView {
    fn quantity(&self) -> Decimal {
        if self.quantity_done.is_zero() {
            self.planned_quantity
        } else {
            self.quantity_done
        }
    }
}

type SectionKey = Option<CategoryId>;

#[derive(Debug)]
struct Accumulated {
    code: String,
    name: String,
    uom: String,
    quantity: Decimal,
    price: Decimal,
    section: SectionKey,
}

/// Merge shipment lines into the goods table.
pub fn build_report_lines<I>(lines: I, labels: &ReportLabels) -> Vec<ReportLine>
where
    I: IntoIterator<Item = ShipmentLineView>,
{
    let mut sections: IndexMap<SectionKey, String> = IndexMap::new();
    let mut accumulated: IndexMap<(ProductId, UomId), Accumulated> = IndexMap::new();

    for line in lines {
        let section = line.category_id;
        sections
            .entry(section)
            .or_insert_with(|| line.category_name.clone().unwrap_or_default());

        let quantity = line.quantity();
        let entry = accumulated
            .entry((line.product_id, line.uom_id))
            .or_insert_with(|| Accumulated {
                code: line.product_code.clone().unwrap_or_default(),
                name: line.product_name.clone(),
                uom: line.uom_name.clone(),
                quantity: Decimal::ZERO,
                price: Decimal::ZERO,
                section,
            });
        entry.quantity += quantity;
        entry.price = entry.price.max(line.sale_price.unwrap_or(Decimal::ZERO));
    }

    let mut report = Vec::with_capacity(accumulated.len() + sections.len() + 1);
    let mut index = 1;

    for (section, section_name) in &sections {
        let members: Vec<&Accumulated> = accumulated
            .values()
            .filter(|acc| acc.section == *section)
            .collect();
        if members.is_empty() {
            continue;
        }

        report.push(ReportLine {
            index,
            kind: ReportLineKind::Section,
            code: String::new(),
            name: labels.wrap(section_name),
            uom: String::new(),
            quantity: None,
            price: None,
        });
        index += 1;

        for acc in members {
            report.push(ReportLine {
                index,
                kind: ReportLineKind::Product,
                code: acc.code.clone(),
                name: acc.name.clone(),
                uom: acc.uom.clone(),
                quantity: Some(acc.quantity),
                price: Some(acc.price),
            });
            index += 1;
        }
    }

    let total: Decimal = accumulated.values().map(|acc| acc.quantity).sum();
    report.push(ReportLine {
        index,
        kind: ReportLineKind::Total,
        code: String::new(),
        name: labels.wrap(&labels.total_label),
        uom: labels.total_uom.clone(),
        quantity: Some(total),
        price: None,
    });

    report
}

/// Loads the shipment lines of day routes and builds their goods table.
#[derive(Debug, Clone)]
pub struct ReportBuilder<S, P> {
    selector: DocumentSelector<S, P>,
    force: bool,
}

impl<S, P> ReportBuilder<S, P>
where
    S: RecordStore,
    P: DocumentPredicates,
{
    pub fn new(selector: DocumentSelector<S, P>) -> Self {
        Self {
            selector,
            force: false,
        }
    }

    /// Use the forced document selection (signed batches included).
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Goods table for the routes' loading batches.
    pub fn xerox_report(&self, routes: &[Route]) -> DomainResult<Vec<ReportLine>> {
        let moves = self.collect_moves(routes)?;
        let views = self.resolve(moves)?;
        let report = build_report_lines(views, &self.selector.settings().report);
        debug!(routes = routes.len(), lines = report.len(), "built xerox report");
        Ok(report)
    }

    /// route -> shipping batches -> pickings -> unpackaged moves, without duplicates.
    fn collect_moves(&self, routes: &[Route]) -> DomainResult<Vec<ShipmentLine>> {
        let mut batches: IndexSet<BatchPickingId> = IndexSet::new();
        for route in routes {
            let docs = self.selector.route_documents(route, self.force)?;
            batches.extend(docs.batches.iter().map(|b| b.id));
        }

        let store = self.selector.store();
        let mut moves: IndexMap<MoveId, ShipmentLine> = IndexMap::new();
        for batch in batches {
            for picking in store.pickings_of_batch(batch)? {
                for line in store.moves_of_picking(picking.id)? {
                    if !line.packaged {
                        moves.entry(line.id).or_insert(line);
                    }
                }
            }
        }
        Ok(moves.into_values().collect())
    }

    fn resolve(&self, moves: Vec<ShipmentLine>) -> DomainResult<Vec<ShipmentLineView>> {
        let store = self.selector.store();
        let mut products = HashMap::new();
        let mut uoms = HashMap::new();
        let mut categories = HashMap::new();

        let mut views = Vec::with_capacity(moves.len());
        for line in moves {
            let product = cached(&mut products, line.product_id, |id| store.product(id))?;
            let uom = cached(&mut uoms, line.uom_id, |id| store.uom(id))?;
            let category_name = match product.category_id {
                Some(id) => cached(&mut categories, id, |id| store.category(id))?.complete_name,
                None => None,
            };
            let sale_price = match line.sale_line_id {
                Some(id) => store.sale_line(id)?.price_unit,
                None => None,
            };

            views.push(ShipmentLineView {
                product_id: line.product_id,
                uom_id: line.uom_id,
                product_code: product.ref_etd,
                product_name: product.name,
                uom_name: uom.name,
                category_id: product.category_id,
                category_name,
                quantity_done: line.quantity_done,
                planned_quantity: line.planned_quantity,
                sale_price,
            });
        }
        Ok(views)
    }
}

fn cached<K, V, F>(cache: &mut HashMap<K, V>, key: K, fetch: F) -> DomainResult<V>
where
    K: Copy + Eq + Hash,
    V: Clone,
    F: FnOnce(K) -> DomainResult<V>,
{
    if let Some(value) = cache.get(&key) {
        return Ok(value.clone());
    }
    let value = fetch(key)?;
    cache.insert(key, value.clone());
    Ok(value)
}
