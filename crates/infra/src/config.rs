//! Configuration loading for the Xerox settings.
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `XEROX_TRUCKING_CLASSES` | comma separated invoice classes counted as shipping documents | `33,39` |
//! | `XEROX_LIQUIDATION_CLASS` | invoice class kept by liquidation sends | `61` |
//! | `XEROX_REPORT_TOTAL_LABEL` | name of the report total line | `TOTAL` |
//! | `XEROX_REPORT_TOTAL_UOM` | UoM cell of the report total line | `TT` |

use thiserror::Error;
use tracing::debug;

use etd_xerox::{DocumentClass, XeroxSettings};

pub const TRUCKING_CLASSES_VAR: &str = "XEROX_TRUCKING_CLASSES";
pub const LIQUIDATION_CLASS_VAR: &str = "XEROX_LIQUIDATION_CLASS";
pub const TOTAL_LABEL_VAR: &str = "XEROX_REPORT_TOTAL_LABEL";
pub const TOTAL_UOM_VAR: &str = "XEROX_REPORT_TOTAL_UOM";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid document class {value:?}")]
    InvalidClass { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Load settings from the process environment.
pub fn load_settings() -> Result<XeroxSettings, ConfigError> {
    load_settings_from(|var| std::env::var(var).ok())
}

/// Load settings through `lookup`; unset variables keep their defaults.
pub fn load_settings_from<F>(lookup: F) -> Result<XeroxSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = XeroxSettings::default();

    match lookup(TRUCKING_CLASSES_VAR) {
        Some(raw) => settings.trucking_classes = parse_classes(TRUCKING_CLASSES_VAR, &raw)?,
        None => debug!(var = TRUCKING_CLASSES_VAR, "using default trucking classes"),
    }

    if let Some(raw) = lookup(LIQUIDATION_CLASS_VAR) {
        settings.liquidation_class = parse_class(LIQUIDATION_CLASS_VAR, raw.trim())?;
    }

    if let Some(label) = lookup(TOTAL_LABEL_VAR) {
        settings.report.total_label = non_empty(TOTAL_LABEL_VAR, label)?;
    }

    if let Some(uom) = lookup(TOTAL_UOM_VAR) {
        settings.report.total_uom = non_empty(TOTAL_UOM_VAR, uom)?;
    }

    Ok(settings)
}

fn parse_class(var: &'static str, raw: &str) -> Result<DocumentClass, ConfigError> {
    raw.parse::<u16>()
        .map(DocumentClass)
        .map_err(|_| ConfigError::InvalidClass {
            var,
            value: raw.to_string(),
        })
}

fn parse_classes(var: &'static str, raw: &str) -> Result<Vec<DocumentClass>, ConfigError> {
    let classes = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_class(var, part))
        .collect::<Result<Vec<_>, _>>()?;
    if classes.is_empty() {
        return Err(ConfigError::Empty { var });
    }
    Ok(classes)
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Empty { var })
    } else {
        Ok(value)
    }
}
