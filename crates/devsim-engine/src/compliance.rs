//! Zoning compliance: utilization of the FAR and coverage caps, remaining
//! buffers, height checks, and each lot's contribution.
//!
//! Ratios are kept at full precision; rounding is left to presentation.

use std::fmt;

use devsim_core::{Advisory, Lot, RegulationSet, Scenario, validate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::EngineError;
use crate::areas::{AreaSummary, aggregate};

/// Utilization above this fraction (but within the cap) is a warning.
pub const WARN_UTILIZATION: f64 = 0.9;

/// Slack allowed when comparing a derived height in metres against the cap.
const HEIGHT_TOLERANCE_M: f64 = 1e-6;

/// Status band for a utilization ratio: ≤ 90 % ok, ≤ 100 % warn, else bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationStatus {
    Ok,
    Warn,
    Bad,
}

impl UtilizationStatus {
    pub fn classify(utilization: f64) -> Self {
        if utilization <= WARN_UTILIZATION {
            Self::Ok
        } else if utilization <= 1.0 {
            Self::Warn
        } else {
            Self::Bad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Bad => "bad",
        }
    }
}

/// A breached limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    FarExceeded { excess_m2: f64 },
    KdbExceeded { excess_m2: f64 },
    /// Podium footprint larger than the lot. Only the lot area counts toward
    /// coverage, so this is reported on its own.
    FootprintExceedsLot {
        lot_id: String,
        footprint_m2: f64,
        lot_area_m2: f64,
    },
    FloorsExceedMax {
        lot_id: String,
        tower_floors: u32,
        max_floors: u32,
    },
    HeightExceedsMax {
        lot_id: String,
        height_m: f64,
        max_height_m: f64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FarExceeded { excess_m2 } => write!(f, "GFA exceeds FAR cap by {excess_m2:.0} m²"),
            Self::KdbExceeded { excess_m2 } => {
                write!(f, "footprint exceeds coverage cap by {excess_m2:.0} m²")
            }
            Self::FootprintExceedsLot {
                lot_id,
                footprint_m2,
                lot_area_m2,
            } => write!(
                f,
                "{lot_id}: podium footprint {footprint_m2:.0} m² exceeds lot area {lot_area_m2:.0} m²"
            ),
            Self::FloorsExceedMax {
                lot_id,
                tower_floors,
                max_floors,
            } => write!(f, "{lot_id}: {tower_floors} tower floors exceed max {max_floors}"),
            Self::HeightExceedsMax {
                lot_id,
                height_m,
                max_height_m,
            } => write!(f, "{lot_id}: height {height_m} m exceeds max {max_height_m} m"),
        }
    }
}

/// One lot's contribution to the caps and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotShare {
    pub lot_id: String,
    pub gfa_m2: f64,
    pub footprint_m2: f64,
    /// `gfa / far_cap`, 0 when the cap is 0.
    pub far_share: f64,
    /// `footprint / kdb_cap`, 0 when the cap is 0.
    pub kdb_share: f64,
    /// Fraction of total GFA, 0 when the total is 0.
    pub gfa_fraction: f64,
    /// Fraction of total footprint, 0 when the total is 0.
    pub footprint_fraction: f64,
}

/// Sellable vs non-sellable split of the site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandSplit {
    pub site_area_m2: f64,
    pub tract_area_m2: f64,
    pub buildable_m2: f64,
    pub sellable_pct: f64,
    pub nonsellable_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub total_gfa_m2: f64,
    pub total_footprint_m2: f64,
    pub far_cap_m2: f64,
    pub kdb_cap_m2: f64,
    pub far_utilization: f64,
    pub kdb_utilization: f64,
    pub far_status: UtilizationStatus,
    pub kdb_status: UtilizationStatus,
    pub far_ok: bool,
    pub kdb_ok: bool,
    /// Floors-only check against `max_floors`; true when no cap is set.
    pub height_ok: bool,
    /// Metre check (`floors × floor_to_floor ≤ max_height_m`), when both are set.
    pub height_m_ok: Option<bool>,
    /// Negative when the cap is exceeded.
    pub far_buffer_m2: f64,
    pub kdb_buffer_m2: f64,
    pub max_tower_floors: u32,
    pub by_lot: Vec<LotShare>,
    pub land: LandSplit,
    pub violations: Vec<Violation>,
    pub advisories: Vec<Advisory>,
}

impl ComplianceResult {
    /// FAR, coverage, and floor limits all satisfied.
    pub fn compliant(&self) -> bool {
        self.far_ok && self.kdb_ok && self.height_ok
    }
}

/// Validate, aggregate, and assess a scenario.
pub fn evaluate_compliance(scenario: &Scenario) -> Result<ComplianceResult, EngineError> {
    let advisories = validate(scenario)?;
    let areas = aggregate(scenario)?;
    let mut result = assess(&scenario.regulation, &scenario.lots, &areas);
    result.advisories = advisories;

    info!(
        scenario = %scenario.id,
        total_gfa = result.total_gfa_m2,
        far_util = result.far_utilization,
        kdb_util = result.kdb_utilization,
        compliant = result.compliant(),
        "compliance evaluated"
    );
    Ok(result)
}

/// Assess already-aggregated areas against the regulations.
///
/// `lots` and `areas.lots` must describe the same lots in the same order.
pub fn assess(regulation: &RegulationSet, lots: &[Lot], areas: &AreaSummary) -> ComplianceResult {
    let far_cap = regulation.far_cap_m2();
    let kdb_cap = regulation.kdb_cap_m2();
    let total_gfa = areas.total_gfa_m2;
    let total_footprint = areas.total_footprint_m2;

    let far_utilization = ratio_or_zero(total_gfa, far_cap);
    let kdb_utilization = ratio_or_zero(total_footprint, kdb_cap);
    let far_ok = total_gfa <= far_cap;
    let kdb_ok = total_footprint <= kdb_cap;
    let far_buffer = far_cap - total_gfa;
    let kdb_buffer = kdb_cap - total_footprint;

    let max_tower_floors = lots
        .iter()
        .map(|l| l.typology.tower_floors)
        .max()
        .unwrap_or(0);
    let height_ok = regulation
        .max_floors
        .is_none_or(|max| max_tower_floors <= max);
    let height_m_ok = match (regulation.max_height_m, regulation.floor_to_floor_m) {
        (Some(max_h), Some(ftf)) => {
            Some(max_tower_floors as f64 * ftf <= max_h + HEIGHT_TOLERANCE_M)
        }
        _ => None,
    };

    let by_lot = areas
        .lots
        .iter()
        .map(|a| LotShare {
            lot_id: a.lot_id.clone(),
            gfa_m2: a.gfa_m2,
            footprint_m2: a.footprint_m2,
            far_share: ratio_or_zero(a.gfa_m2, far_cap),
            kdb_share: ratio_or_zero(a.footprint_m2, kdb_cap),
            gfa_fraction: ratio_or_zero(a.gfa_m2, total_gfa),
            footprint_fraction: ratio_or_zero(a.footprint_m2, total_footprint),
        })
        .collect();

    let mut violations = Vec::new();
    if !far_ok {
        violations.push(Violation::FarExceeded {
            excess_m2: -far_buffer,
        });
    }
    if !kdb_ok {
        violations.push(Violation::KdbExceeded {
            excess_m2: -kdb_buffer,
        });
    }
    for lot in lots {
        if lot.footprint_exceeds_lot() {
            violations.push(Violation::FootprintExceedsLot {
                lot_id: lot.id.clone(),
                footprint_m2: lot.typology.podium_footprint_m2,
                lot_area_m2: lot.area_m2,
            });
        }
        if let Some(max) = regulation.max_floors {
            if lot.typology.tower_floors > max {
                violations.push(Violation::FloorsExceedMax {
                    lot_id: lot.id.clone(),
                    tower_floors: lot.typology.tower_floors,
                    max_floors: max,
                });
            }
        }
        if let (Some(max_h), Some(ftf)) = (regulation.max_height_m, regulation.floor_to_floor_m) {
            let height = lot.typology.tower_floors as f64 * ftf;
            if height > max_h + HEIGHT_TOLERANCE_M {
                violations.push(Violation::HeightExceedsMax {
                    lot_id: lot.id.clone(),
                    height_m: height,
                    max_height_m: max_h,
                });
            }
        }
    }

    ComplianceResult {
        total_gfa_m2: total_gfa,
        total_footprint_m2: total_footprint,
        far_cap_m2: far_cap,
        kdb_cap_m2: kdb_cap,
        far_utilization,
        kdb_utilization,
        far_status: UtilizationStatus::classify(far_utilization),
        kdb_status: UtilizationStatus::classify(kdb_utilization),
        far_ok,
        kdb_ok,
        height_ok,
        height_m_ok,
        far_buffer_m2: far_buffer,
        kdb_buffer_m2: kdb_buffer,
        max_tower_floors,
        by_lot,
        land: land_split(regulation.site_area_m2, areas.tracts.occupied_m2),
        violations,
        advisories: Vec::new(),
    }
}

fn land_split(site_area_m2: f64, tract_area_m2: f64) -> LandSplit {
    let buildable_m2 = (site_area_m2 - tract_area_m2).max(0.0);
    let (sellable_pct, nonsellable_pct) = if site_area_m2 > 0.0 {
        let sellable = buildable_m2 / site_area_m2 * 100.0;
        (sellable, 100.0 - sellable)
    } else {
        (0.0, 0.0)
    };
    LandSplit {
        site_area_m2,
        tract_area_m2,
        buildable_m2,
        sellable_pct,
        nonsellable_pct,
    }
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
