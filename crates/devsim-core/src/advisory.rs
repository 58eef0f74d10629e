//! Input validation.
//!
//! [`validate`] separates the two failure classes: structural problems abort
//! with a [`ModelError`], while out-of-range or implausible values come back
//! as [`Advisory`] warnings alongside an otherwise usable scenario.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::model::Scenario;

/// Typical band for a floor area ratio. Values outside are flagged.
pub const TYPICAL_FAR_RANGE: (f64, f64) = (0.5, 8.0);

/// Tolerance when comparing derived and stated building heights.
const HEIGHT_EPSILON_M: f64 = 1e-6;

/// A non-fatal warning about an implausible input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Efficiency at or below zero, or above one. `lot_id` is `None` for the
    /// regulation-wide override.
    EfficiencyOutOfRange { lot_id: Option<String>, value: f64 },
    CoverageRatioOutOfRange { value: f64 },
    FloorAreaRatioUnusual { value: f64 },
    /// `max_floors × floor_to_floor_m` does not match `max_height_m`.
    HeightConflict {
        derived_height_m: f64,
        max_height_m: f64,
    },
    NonPositiveSiteArea { value: f64 },
    TractsExceedSite {
        tract_area_m2: f64,
        site_area_m2: f64,
    },
    ImplausibleRate { component: String, rate: f64 },
    ImplausibleQuantity { component: String, quantity: f64 },
    ImplausiblePercentage { name: String, value: f64 },
    ImplausibleExchangeRate { value: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EfficiencyOutOfRange {
                lot_id: Some(id),
                value,
            } => write!(f, "lot {id}: efficiency {value} is outside 0-1"),
            Self::EfficiencyOutOfRange {
                lot_id: None,
                value,
            } => write!(f, "efficiency override {value} is outside 0-1"),
            Self::CoverageRatioOutOfRange { value } => {
                write!(f, "KDB {value} is outside 0-1")
            }
            Self::FloorAreaRatioUnusual { value } => write!(
                f,
                "KLB/FAR {value} is outside the typical {}-{} band",
                TYPICAL_FAR_RANGE.0, TYPICAL_FAR_RANGE.1
            ),
            Self::HeightConflict {
                derived_height_m,
                max_height_m,
            } => {
                let relation = if derived_height_m > max_height_m {
                    "exceeds"
                } else {
                    "falls short of"
                };
                write!(
                    f,
                    "max floors x floor-to-floor = {derived_height_m} m {relation} max height {max_height_m} m"
                )
            }
            Self::NonPositiveSiteArea { value } => {
                write!(f, "site area {value} m2 is not positive")
            }
            Self::TractsExceedSite {
                tract_area_m2,
                site_area_m2,
            } => write!(
                f,
                "tracts occupy {tract_area_m2} m2, more than the {site_area_m2} m2 site"
            ),
            Self::ImplausibleRate { component, rate } => {
                write!(f, "{component}: unit rate {rate} is not positive")
            }
            Self::ImplausibleQuantity {
                component,
                quantity,
            } => write!(f, "{component}: quantity {quantity} is not positive"),
            Self::ImplausiblePercentage { name, value } => {
                write!(f, "{name} {value}% is implausible")
            }
            Self::ImplausibleExchangeRate { value } => {
                write!(f, "exchange rate {value} is not positive")
            }
        }
    }
}

/// Check a scenario for structural completeness and collect advisories.
///
/// Structural checks run first; the first failure is returned as an error.
pub fn validate(scenario: &Scenario) -> Result<Vec<Advisory>, ModelError> {
    check_structure(scenario)?;

    let reg = &scenario.regulation;
    let mut advisories = Vec::new();

    if reg.site_area_m2 <= 0.0 {
        advisories.push(Advisory::NonPositiveSiteArea {
            value: reg.site_area_m2,
        });
    }
    if !(0.0..=1.0).contains(&reg.max_coverage_ratio) {
        advisories.push(Advisory::CoverageRatioOutOfRange {
            value: reg.max_coverage_ratio,
        });
    }
    let (far_lo, far_hi) = TYPICAL_FAR_RANGE;
    if !(far_lo..=far_hi).contains(&reg.max_floor_area_ratio) {
        advisories.push(Advisory::FloorAreaRatioUnusual {
            value: reg.max_floor_area_ratio,
        });
    }
    if let (Some(derived), Some(max_height)) = (reg.derived_height_m(), reg.max_height_m) {
        if (derived - max_height).abs() > HEIGHT_EPSILON_M {
            advisories.push(Advisory::HeightConflict {
                derived_height_m: derived,
                max_height_m: max_height,
            });
        }
    }

    // Lot efficiencies are irrelevant while an override is in force.
    match reg.efficiency_override {
        Some(eff) => {
            if !efficiency_plausible(eff) {
                advisories.push(Advisory::EfficiencyOutOfRange {
                    lot_id: None,
                    value: eff,
                });
            }
        }
        None => {
            for lot in &scenario.lots {
                if !efficiency_plausible(lot.typology.efficiency) {
                    advisories.push(Advisory::EfficiencyOutOfRange {
                        lot_id: Some(lot.id.clone()),
                        value: lot.typology.efficiency,
                    });
                }
            }
        }
    }

    let tract_area: f64 = scenario
        .tracts
        .iter()
        .filter_map(|t| t.resolved_area_m2())
        .sum();
    if tract_area > reg.site_area_m2 {
        advisories.push(Advisory::TractsExceedSite {
            tract_area_m2: tract_area,
            site_area_m2: reg.site_area_m2,
        });
    }

    debug!(
        scenario = %scenario.id,
        advisories = advisories.len(),
        "scenario validated"
    );
    Ok(advisories)
}

fn efficiency_plausible(eff: f64) -> bool {
    eff > 0.0 && eff <= 1.0
}

fn check_structure(scenario: &Scenario) -> Result<(), ModelError> {
    let reg = &scenario.regulation;
    finite("site_area_m2", reg.site_area_m2)?;
    finite("max_coverage_ratio", reg.max_coverage_ratio)?;
    finite("max_floor_area_ratio", reg.max_floor_area_ratio)?;
    if let Some(v) = reg.max_height_m {
        finite("max_height_m", v)?;
    }
    if let Some(v) = reg.floor_to_floor_m {
        finite("floor_to_floor_m", v)?;
    }
    if let Some(v) = reg.efficiency_override {
        finite("efficiency_override", v)?;
    }
    non_negative("site_area_m2", reg.site_area_m2)?;

    let mut lot_ids = HashSet::new();
    for lot in &scenario.lots {
        if lot.id.trim().is_empty() {
            return Err(ModelError::EmptyId { kind: "lot" });
        }
        if !lot_ids.insert(lot.id.as_str()) {
            return Err(ModelError::DuplicateLot(lot.id.clone()));
        }
        let t = &lot.typology;
        for (name, value) in [
            ("area_m2", lot.area_m2),
            ("podium_footprint_m2", t.podium_footprint_m2),
            ("tower_plate_m2", t.tower_plate_m2),
        ] {
            let field = format!("lot {}: {name}", lot.id);
            finite(&field, value)?;
            non_negative(&field, value)?;
        }
        finite(&format!("lot {}: efficiency", lot.id), t.efficiency)?;
    }

    let mut tract_ids = HashSet::new();
    for tract in &scenario.tracts {
        if tract.id.trim().is_empty() {
            return Err(ModelError::EmptyId { kind: "tract" });
        }
        if !tract_ids.insert(tract.id.as_str()) {
            return Err(ModelError::DuplicateTract(tract.id.clone()));
        }
        for (name, value) in [
            ("area_m2", tract.area_m2),
            ("row_width_m", tract.row_width_m),
            ("length_m", tract.length_m),
        ] {
            if let Some(v) = value {
                let field = format!("tract {}: {name}", tract.id);
                finite(&field, v)?;
                non_negative(&field, v)?;
            }
        }
        if tract.resolved_area_m2().is_none() {
            return Err(ModelError::UnresolvedTractArea(tract.id.clone()));
        }
    }

    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::NonFinite {
            field: field.to_string(),
            value,
        })
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ModelError> {
    if value < 0.0 {
        Err(ModelError::Negative {
            field: field.to_string(),
            value,
        })
    } else {
        Ok(())
    }
}
