//! Side-by-side comparison of saved snapshots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::EngineError;
use crate::compliance::evaluate_compliance;
use crate::cost::{CostComponent, CostParams, estimate_scenario_cost};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub snapshot_id: String,
    pub name: String,
    pub total_gfa_m2: f64,
    /// Percentage difference from the best row's GFA (0 or negative).
    pub delta_vs_best_pct: f64,
    pub far_utilization: f64,
    pub kdb_utilization: f64,
    pub far_buffer_m2: f64,
    pub kdb_buffer_m2: f64,
    pub grand_total: f64,
    pub converted_total: f64,
    pub cost_per_gfa: Option<f64>,
    pub compliant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    /// Index of the row with the largest GFA; the first one wins ties.
    pub best: Option<usize>,
}

impl Comparison {
    pub fn best_row(&self) -> Option<&ComparisonRow> {
        self.best.and_then(|i| self.rows.get(i))
    }
}

/// Compare snapshots, using their cached results where present.
pub fn compare(
    snapshots: &[Snapshot],
    library: &[CostComponent],
    params: &CostParams,
) -> Result<Comparison, EngineError> {
    let mut rows = Vec::with_capacity(snapshots.len());
    for snap in snapshots {
        let compliance = match &snap.compliance {
            Some(c) => c.clone(),
            None => evaluate_compliance(&snap.scenario)?,
        };
        let cost = match &snap.cost {
            Some(c) => c.clone(),
            None => estimate_scenario_cost(&snap.scenario, library, params)?,
        };
        debug!(
            snapshot = %snap.id,
            cached_compliance = snap.compliance.is_some(),
            cached_cost = snap.cost.is_some(),
            "comparison row"
        );
        rows.push(ComparisonRow {
            snapshot_id: snap.id.clone(),
            name: snap.name.clone(),
            total_gfa_m2: compliance.total_gfa_m2,
            delta_vs_best_pct: 0.0,
            far_utilization: compliance.far_utilization,
            kdb_utilization: compliance.kdb_utilization,
            far_buffer_m2: compliance.far_buffer_m2,
            kdb_buffer_m2: compliance.kdb_buffer_m2,
            grand_total: cost.totals.grand_total,
            converted_total: cost.totals.converted_total,
            cost_per_gfa: cost.totals.cost_per_gfa,
            compliant: compliance.compliant(),
        });
    }

    let best = rows
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, r)| match best {
            Some((_, g)) if r.total_gfa_m2 <= g => best,
            _ => Some((i, r.total_gfa_m2)),
        });
    if let Some((_, best_gfa)) = best.filter(|&(_, g)| g > 0.0) {
        for r in &mut rows {
            r.delta_vs_best_pct = (r.total_gfa_m2 - best_gfa) / best_gfa * 100.0;
        }
    }

    Ok(Comparison {
        rows,
        best: best.map(|(i, _)| i),
    })
}
