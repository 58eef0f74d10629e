//! Area aggregation: GFA and ground footprint per lot and in total, plus
//! land occupied by non-buildable tracts.

use devsim_core::{Lot, ModelError, RegulationSet, Scenario, Tract, TractKind};
use serde::{Deserialize, Serialize};

/// Derived areas for one lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotArea {
    pub lot_id: String,
    pub podium_gfa_m2: f64,
    pub tower_gfa_m2: f64,
    pub gfa_m2: f64,
    /// Footprint counted toward coverage: `min(lot area, podium footprint)`.
    pub footprint_m2: f64,
    /// Podium footprint as entered, before capping.
    pub raw_footprint_m2: f64,
}

/// Land occupied by tracts, split by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TractTotals {
    pub road_m2: f64,
    /// Parks and water bodies.
    pub open_space_m2: f64,
    pub infrastructure_m2: f64,
    pub occupied_m2: f64,
}

/// Per-lot and scenario-wide areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    pub lots: Vec<LotArea>,
    pub total_gfa_m2: f64,
    pub total_footprint_m2: f64,
    pub tracts: TractTotals,
}

impl AreaSummary {
    pub fn new(lots: Vec<LotArea>, tracts: TractTotals) -> Self {
        let total_gfa_m2 = lots.iter().map(|l| l.gfa_m2).sum();
        let total_footprint_m2 = lots.iter().map(|l| l.footprint_m2).sum();
        Self {
            lots,
            total_gfa_m2,
            total_footprint_m2,
            tracts,
        }
    }
}

/// Aggregate all areas of a scenario.
///
/// Fails only when a tract's area cannot be resolved.
pub fn aggregate(scenario: &Scenario) -> Result<AreaSummary, ModelError> {
    let lots = aggregate_lots(&scenario.regulation, &scenario.lots);
    let tracts = aggregate_tracts(&scenario.tracts)?;
    Ok(AreaSummary::new(lots, tracts))
}

/// GFA and footprint for each lot under the scenario's regulations.
pub fn aggregate_lots(regulation: &RegulationSet, lots: &[Lot]) -> Vec<LotArea> {
    lots.iter()
        .map(|lot| {
            let eff = lot.effective_efficiency(regulation.efficiency_override);
            let podium_gfa_m2 = lot.typology.podium_gfa_m2(eff);
            let tower_gfa_m2 = lot.typology.tower_gfa_m2(eff);
            LotArea {
                lot_id: lot.id.clone(),
                podium_gfa_m2,
                tower_gfa_m2,
                gfa_m2: podium_gfa_m2 + tower_gfa_m2,
                footprint_m2: lot.footprint_m2(),
                raw_footprint_m2: lot.typology.podium_footprint_m2,
            }
        })
        .collect()
}

pub fn aggregate_tracts(tracts: &[Tract]) -> Result<TractTotals, ModelError> {
    let mut totals = TractTotals::default();
    for tract in tracts {
        let area = tract
            .resolved_area_m2()
            .ok_or_else(|| ModelError::UnresolvedTractArea(tract.id.clone()))?;
        match tract.kind {
            TractKind::Road => totals.road_m2 += area,
            TractKind::Park | TractKind::Water => totals.open_space_m2 += area,
            TractKind::Infrastructure => totals.infrastructure_m2 += area,
        }
        totals.occupied_m2 += area;
    }
    Ok(totals)
}
