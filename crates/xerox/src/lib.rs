//! Xerox shipping-document module for day routes.
//!
//! Two responsibilities live here, both thin layers over an external record
//! store:
//!
//! - **Document selection** ([`selector`], [`dispatch`]): which invoices,
//!   pickings and batch pickings linked to a set of day routes must be sent to
//!   the Xerox signing/printing service, and the per-company send step.
//! - **Report building** ([`report`]): the goods table printed on the route
//!   documents, grouped by product category with a grand total.
//!
//! Storage, predicate rules and the transmission itself are collaborators
//! (see [`collaborators`]); this crate performs no IO of its own.

pub mod collaborators;
pub mod dispatch;
pub mod model;
pub mod report;
pub mod selector;
pub mod settings;

#[cfg(test)]
mod testing;

pub use collaborators::{
    DocumentPredicates, DocumentTransmitter, Filter, RecordStore, SigningPredicates,
};
pub use dispatch::{SendFilesRequest, XeroxDispatcher, partition_by_company};
pub use model::{
    BatchPicking, DocumentClass, EntityKind, Invoice, Picking, PickingKind, Product,
    ProductCategory, Route, SaleLine, ShipmentLine, TransmissionSet, UnitOfMeasure,
};
pub use report::{ReportBuilder, ReportLine, ReportLineKind, ShipmentLineView, build_report_lines};
pub use selector::{DocumentSelector, SendOptions, ShippingDocuments};
pub use settings::{ReportLabels, XeroxSettings};
