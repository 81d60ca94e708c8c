//! Business settings for Xerox selection and reports.

use serde::{Deserialize, Serialize};

use crate::model::DocumentClass;

/// Labels printed on the goods report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLabels {
    /// Wraps section and total names, e.g. `***** Beverages *****`.
    pub marker: String,
    pub total_label: String,
    /// Printed in the UoM column of the total line.
    pub total_uom: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            marker: "*****".to_string(),
            total_label: "TOTAL".to_string(),
            total_uom: "TT".to_string(),
        }
    }
}

impl ReportLabels {
    pub fn wrap(&self, name: &str) -> String {
        format!("{marker} {name} {marker}", marker = self.marker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XeroxSettings {
    /// Invoice classes carried on the truck (counted as shipping documents).
    pub trucking_classes: Vec<DocumentClass>,
    /// Class kept when a liquidation send narrows invoices.
    pub liquidation_class: DocumentClass,
    pub report: ReportLabels,
}

impl Default for XeroxSettings {
    fn default() -> Self {
        Self {
            trucking_classes: vec![DocumentClass::INVOICE, DocumentClass::RECEIPT],
            liquidation_class: DocumentClass::LIQUIDATION,
            report: ReportLabels::default(),
        }
    }
}
