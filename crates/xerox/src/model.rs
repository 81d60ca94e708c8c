//! Records fetched from the external store.
//!
//! These are transient read copies: the store owns and persists them, this
//! module only reads them for the duration of one call.

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use etd_core::{
    BatchPickingId, CategoryId, CompanyId, CompanyOwned, Entity, InvoiceId, MoveId, PickingId,
    ProductId, RouteId, SaleLineId, UomId,
};

/// Fiscal document class code (SII document type).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentClass(pub u16);

impl DocumentClass {
    /// Electronic invoice (factura).
    pub const INVOICE: Self = Self(33);
    /// Electronic receipt (boleta).
    pub const RECEIPT: Self = Self(39);
    /// Liquidation document.
    pub const LIQUIDATION: Self = Self(61);

    pub fn code(self) -> u16 {
        self.0
    }
}

impl core::fmt::Display for DocumentClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Day route: one delivery route for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub company_id: CompanyId,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub company_id: CompanyId,
    pub route_id: Option<RouteId>,
    pub number: String,
    pub document_class: Option<DocumentClass>,
    /// Already signed by Xerox.
    pub signed: bool,
}

impl Invoice {
    pub fn has_class_in(&self, classes: &[DocumentClass]) -> bool {
        self.document_class.is_some_and(|c| classes.contains(&c))
    }
}

/// Picking operation type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingKind {
    Outgoing,
    Incoming,
    /// Truck loading operations.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picking {
    pub id: PickingId,
    pub company_id: CompanyId,
    pub route_id: Option<RouteId>,
    pub name: String,
    pub kind: PickingKind,
    pub batch_id: Option<BatchPickingId>,
    pub signed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPicking {
    pub id: BatchPickingId,
    pub company_id: CompanyId,
    pub name: String,
    pub signed: bool,
}

/// Stock move inside a picking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentLine {
    pub id: MoveId,
    pub picking_id: PickingId,
    pub product_id: ProductId,
    pub uom_id: UomId,
    pub quantity_done: Decimal,
    /// Initial demand ("to do") quantity.
    pub planned_quantity: Decimal,
    pub sale_line_id: Option<SaleLineId>,
    /// Move belongs to a package level; excluded from the goods report.
    pub packaged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// External reference code printed on tax documents.
    pub ref_etd: Option<String>,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    /// Full path name (e.g. "All / Beverages").
    pub complete_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    pub id: UomId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: SaleLineId,
    pub price_unit: Option<Decimal>,
}

macro_rules! impl_entity {
    ($t:ty, $id:ty) => {
        impl Entity for $t {
            type Id = $id;

            fn id(&self) -> Self::Id {
                self.id
            }
        }
    };
}

macro_rules! impl_company_owned {
    ($t:ty) => {
        impl CompanyOwned for $t {
            fn company_id(&self) -> CompanyId {
                self.company_id
            }
        }
    };
}

impl_entity!(Route, RouteId);
impl_entity!(Invoice, InvoiceId);
impl_entity!(Picking, PickingId);
impl_entity!(BatchPicking, BatchPickingId);
impl_entity!(ShipmentLine, MoveId);
impl_entity!(Product, ProductId);
impl_entity!(ProductCategory, CategoryId);
impl_entity!(UnitOfMeasure, UomId);
impl_entity!(SaleLine, SaleLineId);

impl_company_owned!(Route);
impl_company_owned!(Invoice);
impl_company_owned!(Picking);
impl_company_owned!(BatchPicking);

/// Kinds of records handed to the Xerox transmitter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "fsm.route.dayroute")]
    Route,
    #[serde(rename = "account.invoice")]
    Invoice,
    #[serde(rename = "stock.picking")]
    Picking,
    #[serde(rename = "stock.batch.picking")]
    BatchPicking,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Route,
        EntityKind::Invoice,
        EntityKind::Picking,
        EntityKind::BatchPicking,
    ];

    /// Model name used by the host application.
    pub fn model_name(self) -> &'static str {
        match self {
            EntityKind::Route => "fsm.route.dayroute",
            EntityKind::Invoice => "account.invoice",
            EntityKind::Picking => "stock.picking",
            EntityKind::BatchPicking => "stock.batch.picking",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.model_name())
    }
}

/// Records to transmit for one company, per entity kind.
///
/// Each set keeps first-insertion order and ignores duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionSet {
    pub routes: IndexSet<RouteId>,
    pub invoices: IndexSet<InvoiceId>,
    pub pickings: IndexSet<PickingId>,
    pub batches: IndexSet<BatchPickingId>,
}

impl TransmissionSet {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
            && self.invoices.is_empty()
            && self.pickings.is_empty()
            && self.batches.is_empty()
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Route => self.routes.len(),
            EntityKind::Invoice => self.invoices.len(),
            EntityKind::Picking => self.pickings.len(),
            EntityKind::BatchPicking => self.batches.len(),
        }
    }

    pub fn ids(&self, kind: EntityKind) -> Vec<Uuid> {
        match kind {
            EntityKind::Route => self.routes.iter().map(|id| *id.as_uuid()).collect(),
            EntityKind::Invoice => self.invoices.iter().map(|id| *id.as_uuid()).collect(),
            EntityKind::Picking => self.pickings.iter().map(|id| *id.as_uuid()).collect(),
            EntityKind::BatchPicking => self.batches.iter().map(|id| *id.as_uuid()).collect(),
        }
    }

    /// Mapping view `{model: ids}` handed to file builders.
    pub fn as_map(&self) -> IndexMap<EntityKind, Vec<Uuid>> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, self.ids(kind)))
            .collect()
    }
}
