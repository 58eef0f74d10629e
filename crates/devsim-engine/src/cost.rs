//! Construction cost roll-up from aggregated areas and a rate library.
//!
//! The arithmetic is performed as given, even on implausible inputs;
//! [`validate_inputs`] reports those separately as advisories.

use devsim_core::{Advisory, Scenario, validate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::EngineError;
use crate::areas::{AreaSummary, aggregate};

pub const DEFAULT_CONTINGENCY_PCT: f64 = 10.0;
pub const DEFAULT_SOFT_COST_PCT: f64 = 8.0;
/// IDR → USD.
pub const DEFAULT_FX_RATE: f64 = 0.000064;

/// Land bucket a per-area cost component is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandCategory {
    Road,
    /// Parks and water bodies.
    OpenSpace,
    Infrastructure,
    Site,
}

/// How a component's quantity is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostBasis {
    PerGfa,
    PerArea { land: LandCategory },
    /// One unit, or the infrastructure land area when any is reserved.
    LumpSum,
}

/// One entry of the rate library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComponent {
    pub component: String,
    pub basis: CostBasis,
    pub rate: f64,
    pub unit: String,
}

impl CostComponent {
    pub fn new(component: &str, basis: CostBasis, rate: f64, unit: &str) -> Self {
        Self {
            component: component.to_string(),
            basis,
            rate,
            unit: unit.to_string(),
        }
    }
}

/// Built-in IDR rate library.
pub fn default_library() -> Vec<CostComponent> {
    vec![
        CostComponent::new("Buildings", CostBasis::PerGfa, 6_500_000.0, "IDR/m² GFA"),
        CostComponent::new(
            "Roads",
            CostBasis::PerArea {
                land: LandCategory::Road,
            },
            900_000.0,
            "IDR/m²",
        ),
        CostComponent::new(
            "Parks & Landscape",
            CostBasis::PerArea {
                land: LandCategory::OpenSpace,
            },
            600_000.0,
            "IDR/m²",
        ),
        CostComponent::new("Infrastructure", CostBasis::LumpSum, 150_000_000_000.0, "IDR"),
    ]
}

/// Quantities the library is priced against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAreas {
    pub total_gfa_m2: f64,
    pub road_m2: f64,
    pub open_space_m2: f64,
    pub infrastructure_m2: f64,
    pub site_m2: f64,
}

impl CostAreas {
    pub fn from_summary(summary: &AreaSummary, site_m2: f64) -> Self {
        Self {
            total_gfa_m2: summary.total_gfa_m2,
            road_m2: summary.tracts.road_m2,
            open_space_m2: summary.tracts.open_space_m2,
            infrastructure_m2: summary.tracts.infrastructure_m2,
            site_m2,
        }
    }

    fn land(&self, category: LandCategory) -> f64 {
        match category {
            LandCategory::Road => self.road_m2,
            LandCategory::OpenSpace => self.open_space_m2,
            LandCategory::Infrastructure => self.infrastructure_m2,
            LandCategory::Site => self.site_m2,
        }
    }

    /// Quantity and the unit label it is measured in.
    fn quantity(&self, basis: CostBasis) -> (f64, &'static str) {
        match basis {
            CostBasis::PerGfa => (self.total_gfa_m2, "m² GFA"),
            CostBasis::PerArea { land } => (self.land(land), "m²"),
            CostBasis::LumpSum if self.infrastructure_m2 != 0.0 => (self.infrastructure_m2, "m²"),
            CostBasis::LumpSum => (1.0, "lump"),
        }
    }
}

/// Percentages are whole numbers (10 = 10 %).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostParams {
    #[serde(default)]
    pub sensitivity_pct: f64,
    #[serde(default = "default_contingency")]
    pub contingency_pct: f64,
    #[serde(default = "default_soft_cost")]
    pub soft_cost_pct: f64,
    #[serde(default = "default_fx")]
    pub fx_rate: f64,
}

fn default_contingency() -> f64 {
    DEFAULT_CONTINGENCY_PCT
}

fn default_soft_cost() -> f64 {
    DEFAULT_SOFT_COST_PCT
}

fn default_fx() -> f64 {
    DEFAULT_FX_RATE
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            sensitivity_pct: 0.0,
            contingency_pct: DEFAULT_CONTINGENCY_PCT,
            soft_cost_pct: DEFAULT_SOFT_COST_PCT,
            fx_rate: DEFAULT_FX_RATE,
        }
    }
}

impl CostParams {
    fn markup_fraction(&self) -> f64 {
        (self.contingency_pct + self.soft_cost_pct) / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub component: String,
    pub basis: CostBasis,
    pub quantity: f64,
    pub quantity_unit: String,
    /// Unit label of the library rate, e.g. "IDR/m² GFA".
    pub rate_unit: String,
    pub base_rate: f64,
    pub effective_rate: f64,
    pub direct_cost: f64,
    /// This row's proportional share of contingency plus soft cost.
    pub markup_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTotals {
    pub direct: f64,
    pub contingency: f64,
    pub soft_cost: f64,
    pub grand_total: f64,
    pub converted_total: f64,
    /// Grand total per m² GFA; `None` when there is no GFA.
    pub cost_per_gfa: Option<f64>,
    pub converted_cost_per_gfa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    pub rows: Vec<CostRow>,
    pub totals: CostTotals,
    pub params: CostParams,
}

/// Price a library against a set of areas.
pub fn estimate_cost(
    areas: &CostAreas,
    library: &[CostComponent],
    params: &CostParams,
) -> CostResult {
    let factor = 1.0 + params.sensitivity_pct / 100.0;
    let markup = params.markup_fraction();

    let rows: Vec<CostRow> = library
        .iter()
        .map(|c| {
            let (quantity, unit) = areas.quantity(c.basis);
            let effective_rate = c.rate * factor;
            let direct_cost = quantity * effective_rate;
            let markup_cost = direct_cost * markup;
            CostRow {
                component: c.component.clone(),
                basis: c.basis,
                quantity,
                quantity_unit: unit.to_string(),
                rate_unit: c.unit.clone(),
                base_rate: c.rate,
                effective_rate,
                direct_cost,
                markup_cost,
                total_cost: direct_cost + markup_cost,
            }
        })
        .collect();

    let direct: f64 = rows.iter().map(|r| r.direct_cost).sum();
    let contingency = direct * params.contingency_pct / 100.0;
    let soft_cost = direct * params.soft_cost_pct / 100.0;
    let grand_total = direct + contingency + soft_cost;
    let cost_per_gfa = (areas.total_gfa_m2 != 0.0).then(|| grand_total / areas.total_gfa_m2);

    CostResult {
        rows,
        totals: CostTotals {
            direct,
            contingency,
            soft_cost,
            grand_total,
            converted_total: grand_total * params.fx_rate,
            cost_per_gfa,
            converted_cost_per_gfa: cost_per_gfa.map(|c| c * params.fx_rate),
        },
        params: *params,
    }
}

/// Aggregate a scenario's areas and price them.
pub fn estimate_scenario_cost(
    scenario: &Scenario,
    library: &[CostComponent],
    params: &CostParams,
) -> Result<CostResult, EngineError> {
    validate(scenario)?;
    let summary = aggregate(scenario)?;
    let areas = CostAreas::from_summary(&summary, scenario.regulation.site_area_m2);
    let result = estimate_cost(&areas, library, params);
    info!(
        scenario = %scenario.id,
        components = result.rows.len(),
        grand_total = result.totals.grand_total,
        "cost estimated"
    );
    Ok(result)
}

/// Flag non-positive rates, quantities and markups, and a non-positive
/// exchange rate.
pub fn validate_inputs(
    library: &[CostComponent],
    params: &CostParams,
    areas: &CostAreas,
) -> Vec<Advisory> {
    let mut out = Vec::new();
    for c in library {
        if !(c.rate > 0.0) {
            out.push(Advisory::ImplausibleRate {
                component: c.component.clone(),
                rate: c.rate,
            });
        }
        let (quantity, _) = areas.quantity(c.basis);
        if !(quantity > 0.0) {
            out.push(Advisory::ImplausibleQuantity {
                component: c.component.clone(),
                quantity,
            });
        }
    }
    for (name, value) in [
        ("contingency", params.contingency_pct),
        ("soft cost", params.soft_cost_pct),
    ] {
        if !(value > 0.0 && value <= 100.0) {
            out.push(Advisory::ImplausiblePercentage {
                name: name.to_string(),
                value,
            });
        }
    }
    if !(params.sensitivity_pct > -100.0) {
        out.push(Advisory::ImplausiblePercentage {
            name: "sensitivity".to_string(),
            value: params.sensitivity_pct,
        });
    }
    if !(params.fx_rate > 0.0) {
        out.push(Advisory::ImplausibleExchangeRate {
            value: params.fx_rate,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use devsim_core::template::jakarta_superblock;

    fn gfa_only(total_gfa_m2: f64) -> CostAreas {
        CostAreas {
            total_gfa_m2,
            ..CostAreas::default()
        }
    }

    fn buildings() -> Vec<CostComponent> {
        vec![CostComponent::new(
            "Buildings",
            CostBasis::PerGfa,
            6_500_000.0,
            "IDR/m² GFA",
        )]
    }

    #[test]
    fn single_row_grand_total() {
        let r = estimate_cost(&gfa_only(300_000.0), &buildings(), &CostParams::default());
        assert_eq!(r.rows[0].direct_cost, 1_950_000_000_000.0);
        assert_eq!(r.totals.direct, 1_950_000_000_000.0);
        let expected = 1_950_000_000_000.0 * 1.18;
        assert!((r.totals.grand_total - expected).abs() / expected < 1e-12);
        assert!((r.totals.converted_total - expected * DEFAULT_FX_RATE).abs() < 1.0);
    }

    #[test]
    fn rows_sum_to_direct_and_markups_allocate() {
        let scn = jakarta_superblock();
        let r = estimate_scenario_cost(&scn, &default_library(), &CostParams::default()).unwrap();
        assert_eq!(r.rows.len(), 4);

        let direct: f64 = r.rows.iter().map(|x| x.direct_cost).sum();
        assert_eq!(direct, r.totals.direct);

        let all_in: f64 = r.rows.iter().map(|x| x.total_cost).sum();
        assert!((all_in - r.totals.grand_total).abs() / r.totals.grand_total < 1e-12);
        let markups: f64 = r.rows.iter().map(|x| x.markup_cost).sum();
        let expected = r.totals.contingency + r.totals.soft_cost;
        assert!((markups - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn quantities_follow_basis() {
        let areas = CostAreas {
            total_gfa_m2: 100_000.0,
            road_m2: 34_800.0,
            open_space_m2: 19_000.0,
            infrastructure_m2: 0.0,
            site_m2: 138_000.0,
        };
        let mut lib = default_library();
        lib.push(CostComponent::new(
            "Land prep",
            CostBasis::PerArea {
                land: LandCategory::Site,
            },
            50_000.0,
            "IDR/m²",
        ));
        let r = estimate_cost(&areas, &lib, &CostParams::default());
        let qty: Vec<f64> = r.rows.iter().map(|x| x.quantity).collect();
        assert_eq!(qty, vec![100_000.0, 34_800.0, 19_000.0, 1.0, 138_000.0]);
        assert_eq!(r.rows[3].quantity_unit, "lump");
        assert_eq!(r.rows[3].direct_cost, 150_000_000_000.0);

        let rate_units: Vec<&str> = r.rows.iter().map(|x| x.rate_unit.as_str()).collect();
        assert_eq!(rate_units, vec!["IDR/m² GFA", "IDR/m²", "IDR/m²", "IDR", "IDR/m²"]);
    }

    #[test]
    fn lump_sum_scales_with_infrastructure_land() {
        let areas = CostAreas {
            infrastructure_m2: 3500.0,
            ..CostAreas::default()
        };
        let lib = vec![CostComponent::new("Infrastructure", CostBasis::LumpSum, 1000.0, "IDR")];
        let r = estimate_cost(&areas, &lib, &CostParams::default());
        assert_eq!(r.rows[0].quantity, 3500.0);
        assert_eq!(r.rows[0].quantity_unit, "m²");
        assert_eq!(r.rows[0].direct_cost, 3_500_000.0);
    }

    #[test]
    fn sensitivity_scales_rates() {
        let params = CostParams {
            sensitivity_pct: 10.0,
            ..CostParams::default()
        };
        let r = estimate_cost(&gfa_only(1000.0), &buildings(), &params);
        assert!((r.rows[0].effective_rate - 7_150_000.0).abs() < 1e-6);
        assert_eq!(r.rows[0].base_rate, 6_500_000.0);

        let params = CostParams {
            sensitivity_pct: -10.0,
            ..CostParams::default()
        };
        let r = estimate_cost(&gfa_only(1000.0), &buildings(), &params);
        assert!((r.rows[0].effective_rate - 5_850_000.0).abs() < 1e-6);
    }

    #[test]
    fn zero_gfa_has_no_cost_per_gfa() {
        let r = estimate_cost(&gfa_only(0.0), &default_library(), &CostParams::default());
        assert_eq!(r.totals.cost_per_gfa, None);
        assert_eq!(r.totals.converted_cost_per_gfa, None);
        assert!(r.totals.grand_total > 0.0);
    }

    #[test]
    fn cost_per_gfa_in_both_currencies() {
        let r = estimate_cost(&gfa_only(300_000.0), &buildings(), &CostParams::default());
        let per = r.totals.cost_per_gfa.unwrap();
        assert!((per - 6_500_000.0 * 1.18).abs() < 1e-3);
        let usd = r.totals.converted_cost_per_gfa.unwrap();
        assert!((usd - per * DEFAULT_FX_RATE).abs() < 1e-9);
    }

    #[test]
    fn implausible_inputs_still_computed() {
        let lib = vec![CostComponent::new("Buildings", CostBasis::PerGfa, -100.0, "IDR")];
        let params = CostParams {
            contingency_pct: 0.0,
            soft_cost_pct: -5.0,
            fx_rate: 0.0,
            ..CostParams::default()
        };
        let areas = gfa_only(1000.0);
        let r = estimate_cost(&areas, &lib, &params);
        assert_eq!(r.totals.direct, -100_000.0);
        assert_eq!(r.totals.grand_total, -95_000.0);

        let advisories = validate_inputs(&lib, &params, &areas);
        assert!(advisories.contains(&Advisory::ImplausibleRate {
            component: "Buildings".into(),
            rate: -100.0,
        }));
        assert!(advisories.contains(&Advisory::ImplausibleExchangeRate { value: 0.0 }));
        assert_eq!(
            advisories
                .iter()
                .filter(|a| matches!(a, Advisory::ImplausiblePercentage { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn default_inputs_are_plausible() {
        let scn = jakarta_superblock();
        let areas = CostAreas::from_summary(&aggregate(&scn).unwrap(), scn.regulation.site_area_m2);
        assert!(validate_inputs(&default_library(), &CostParams::default(), &areas).is_empty());
    }

    #[test]
    fn empty_quantity_flagged() {
        let advisories = validate_inputs(&buildings(), &CostParams::default(), &gfa_only(0.0));
        assert_eq!(
            advisories,
            vec![Advisory::ImplausibleQuantity {
                component: "Buildings".into(),
                quantity: 0.0,
            }]
        );
    }

    #[test]
    fn library_json_uses_tagged_basis() {
        let json = r#"[
            {"component": "Roads", "basis": {"kind": "per_area", "land": "road"}, "rate": 900000, "unit": "IDR/m²"},
            {"component": "Infrastructure", "basis": {"kind": "lump_sum"}, "rate": 1.5e11, "unit": "IDR"}
        ]"#;
        let lib: Vec<CostComponent> = serde_json::from_str(json).unwrap();
        assert_eq!(
            lib[0].basis,
            CostBasis::PerArea {
                land: LandCategory::Road
            }
        );
        assert_eq!(lib[1].basis, CostBasis::LumpSum);
    }
}
