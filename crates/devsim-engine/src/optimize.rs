//! Exhaustive grid search over tower floors × tower floor plate × podium
//! levels.
//!
//! Each grid point applies one configuration uniformly to every lot, re-runs
//! the area aggregation and compliance assessment, and records whether the
//! result stays within all caps. The grid is small (tens to low hundreds of
//! points) so no pruning is attempted.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use devsim_core::{Lot, Scenario, validate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::EngineError;
use crate::areas::{AreaSummary, TractTotals, aggregate, aggregate_lots};
use crate::compliance::assess;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Tolerance when stepping a floating-point range up to its inclusive end.
const STEP_EPSILON: f64 = 1e-9;

/// One axis of the design space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    TowerFloors,
    TowerPlate,
    PodiumLevels,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TowerFloors => "tower floors",
            Self::TowerPlate => "tower plate",
            Self::PodiumLevels => "podium levels",
        })
    }
}

// ── Ranges ──

/// Inclusive integer range for floor counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl LevelRange {
    pub fn new(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }

    /// Number of values in the range, validated without enumerating it.
    pub fn count(&self, dimension: Dimension) -> Result<usize, EngineError> {
        if self.step == 0 {
            return Err(invalid(dimension, "step must be positive"));
        }
        if self.min > self.max {
            return Err(invalid(
                dimension,
                format!("min {} is above max {}", self.min, self.max),
            ));
        }
        usize::try_from((self.max - self.min) / self.step)
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| invalid(dimension, "too many values"))
    }

    pub fn values(&self, dimension: Dimension) -> Result<Vec<u32>, EngineError> {
        let count = self.count(dimension)?;
        Ok((self.min..=self.max)
            .step_by(self.step as usize)
            .take(count)
            .collect())
    }
}

/// Inclusive range of floor-plate areas in m².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl PlateRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Number of values in the range, validated without enumerating it.
    pub fn count(&self) -> Result<usize, EngineError> {
        let dim = Dimension::TowerPlate;
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(invalid(dim, "bounds must be finite"));
        }
        if self.step <= 0.0 {
            return Err(invalid(dim, "step must be positive"));
        }
        if self.min < 0.0 {
            return Err(invalid(dim, "plate area must not be negative"));
        }
        if self.min > self.max {
            return Err(invalid(
                dim,
                format!("min {} is above max {}", self.min, self.max),
            ));
        }
        let span = ((self.max - self.min) / self.step + STEP_EPSILON).floor();
        // `usize::MAX as f64` rounds up to 2^64, so `<` keeps the cast exact.
        if !span.is_finite() || span >= usize::MAX as f64 {
            return Err(invalid(dim, "too many values"));
        }
        (span as usize)
            .checked_add(1)
            .ok_or_else(|| invalid(dim, "too many values"))
    }

    pub fn values(&self) -> Result<Vec<f64>, EngineError> {
        let count = self.count()?;
        Ok((0..count)
            .map(|i| self.min + i as f64 * self.step)
            .collect())
    }
}

/// Parse `MIN:MAX:STEP`, or `MIN:MAX` with a step of 1.
fn split_range(s: &str) -> Option<(&str, &str, &str)> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [min, max] => Some((min, max, "1")),
        [min, max, step] => Some((min, max, step)),
        _ => None,
    }
}

impl FromStr for LevelRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max, step) =
            split_range(s).ok_or_else(|| format!("expected MIN:MAX[:STEP], got {s:?}"))?;
        let parse = |v: &str| {
            v.parse::<u32>()
                .map_err(|e| format!("invalid level count {v:?}: {e}"))
        };
        Ok(Self::new(parse(min)?, parse(max)?, parse(step)?))
    }
}

impl FromStr for PlateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max, step) =
            split_range(s).ok_or_else(|| format!("expected MIN:MAX[:STEP], got {s:?}"))?;
        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|e| format!("invalid plate area {v:?}: {e}"))
        };
        Ok(Self::new(parse(min)?, parse(max)?, parse(step)?))
    }
}

// ── Request ──

/// Dimensions pinned to a fixed value. A locked dimension is not enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Locks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tower_floors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tower_plate_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podium_levels: Option<u32>,
}

/// Pairing of dimensions used for the response surface: (rows, columns).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceAxes {
    #[default]
    PodiumByPlate,
    FloorsByPlate,
    PodiumByFloors,
}

impl SurfaceAxes {
    pub fn dimensions(&self) -> (Dimension, Dimension) {
        match self {
            Self::PodiumByPlate => (Dimension::PodiumLevels, Dimension::TowerPlate),
            Self::FloorsByPlate => (Dimension::TowerFloors, Dimension::TowerPlate),
            Self::PodiumByFloors => (Dimension::PodiumLevels, Dimension::TowerFloors),
        }
    }
}

/// Bounds of the design space to sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub floors: LevelRange,
    pub plate: PlateRange,
    pub podium: LevelRange,
    #[serde(default)]
    pub locks: Locks,
    #[serde(default)]
    pub surface: SurfaceAxes,
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self {
            floors: LevelRange::new(30, 60, 5),
            plate: PlateRange::new(1800.0, 2600.0, 200.0),
            podium: LevelRange::new(3, 7, 1),
            locks: Locks::default(),
            surface: SurfaceAxes::default(),
        }
    }
}

struct Axes {
    floors: Vec<u32>,
    plate: Vec<f64>,
    podium: Vec<u32>,
}

impl SweepSpec {
    /// Values enumerated on each axis; a locked axis yields only its lock.
    fn axes(&self) -> Result<Axes, EngineError> {
        let floors = match self.locks.tower_floors {
            Some(v) => vec![v],
            None => self.floors.values(Dimension::TowerFloors)?,
        };
        let plate = match self.locks.tower_plate_m2 {
            Some(v) => {
                check_plate_lock(v)?;
                vec![v]
            }
            None => self.plate.values()?,
        };
        let podium = match self.locks.podium_levels {
            Some(v) => vec![v],
            None => self.podium.values(Dimension::PodiumLevels)?,
        };
        Ok(Axes {
            floors,
            plate,
            podium,
        })
    }

    /// Number of grid points the sweep will evaluate.
    ///
    /// Computed from the range bounds alone, so an oversized request is
    /// refused before anything is allocated.
    pub fn point_count(&self) -> Result<usize, EngineError> {
        let floors = match self.locks.tower_floors {
            Some(_) => 1,
            None => self.floors.count(Dimension::TowerFloors)?,
        };
        let plate = match self.locks.tower_plate_m2 {
            Some(v) => {
                check_plate_lock(v)?;
                1
            }
            None => self.plate.count()?,
        };
        let podium = match self.locks.podium_levels {
            Some(_) => 1,
            None => self.podium.count(Dimension::PodiumLevels)?,
        };
        floors
            .checked_mul(plate)
            .ok_or_else(|| invalid(Dimension::TowerPlate, "grid point count overflows"))?
            .checked_mul(podium)
            .ok_or_else(|| invalid(Dimension::PodiumLevels, "grid point count overflows"))
    }
}

fn check_plate_lock(v: f64) -> Result<(), EngineError> {
    if !v.is_finite() || v < 0.0 {
        return Err(invalid(
            Dimension::TowerPlate,
            format!("locked plate {v} must be a finite non-negative area"),
        ));
    }
    Ok(())
}

// ── Result ──

/// One evaluated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub floors: u32,
    pub plate_m2: f64,
    pub podium: u32,
    pub gfa_m2: f64,
    /// FAR, coverage, and floor limits all satisfied.
    pub ok: bool,
}

impl GridPoint {
    fn coordinate(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::TowerFloors => self.floors as f64,
            Dimension::TowerPlate => self.plate_m2,
            Dimension::PodiumLevels => self.podium as f64,
        }
    }
}

/// Maximum GFA reached for one tower-floors value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub floors: u32,
    pub max_gfa_m2: f64,
}

/// Two-axis grid of the best GFA per cell, for heat-map rendering.
///
/// `max_gfa_m2[r][c]` is the largest GFA among points at `rows[r]` ×
/// `columns[c]`; `yield_pct` is the same value relative to the largest GFA
/// anywhere in the sweep (0–100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSurface {
    pub axes: SurfaceAxes,
    pub rows: Vec<f64>,
    pub columns: Vec<f64>,
    pub max_gfa_m2: Vec<Vec<f64>>,
    pub yield_pct: Vec<Vec<f64>>,
}

/// Regulatory caps the sweep was evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConstraints {
    pub far_cap_m2: f64,
    pub kdb_cap_m2: f64,
    pub max_floors: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Every evaluated point, ordered podium, then floors, then plate.
    pub points: Vec<GridPoint>,
    /// Highest-yield feasible point; `None` when nothing is feasible.
    pub best: Option<GridPoint>,
    pub feasible_count: usize,
    pub floor_curve: Vec<CurvePoint>,
    pub surface: ResponseSurface,
    pub constraints: SweepConstraints,
}

/// Sweep the design space for a scenario.
pub fn optimize(scenario: &Scenario, spec: &SweepSpec) -> Result<OptimizationResult, EngineError> {
    validate(scenario)?;
    let axes = spec.axes()?;
    let base = aggregate(scenario)?;

    let mut grid = Vec::with_capacity(axes.podium.len() * axes.floors.len() * axes.plate.len());
    for &podium in &axes.podium {
        for &floors in &axes.floors {
            for &plate in &axes.plate {
                grid.push((podium, floors, plate));
            }
        }
    }
    debug!(points = grid.len(), "sweep grid enumerated");

    #[cfg(feature = "parallel")]
    let points: Vec<GridPoint> = grid
        .par_iter()
        .map(|&(podium, floors, plate)| evaluate_point(scenario, base.tracts, floors, plate, podium))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let points: Vec<GridPoint> = grid
        .iter()
        .map(|&(podium, floors, plate)| evaluate_point(scenario, base.tracts, floors, plate, podium))
        .collect();

    let best = best_point(&points);
    let feasible_count = points.iter().filter(|p| p.ok).count();
    let reg = &scenario.regulation;

    info!(
        scenario = %scenario.id,
        points = points.len(),
        feasible = feasible_count,
        best_gfa = best.map(|b| b.gfa_m2),
        "sweep complete"
    );

    Ok(OptimizationResult {
        floor_curve: floor_curve(&points),
        surface: response_surface(&points, spec.surface),
        constraints: SweepConstraints {
            far_cap_m2: reg.far_cap_m2(),
            kdb_cap_m2: reg.kdb_cap_m2(),
            max_floors: reg.max_floors,
        },
        points,
        best,
        feasible_count,
    })
}

fn evaluate_point(
    scenario: &Scenario,
    tracts: TractTotals,
    floors: u32,
    plate: f64,
    podium: u32,
) -> GridPoint {
    let lots: Vec<Lot> = scenario
        .lots
        .iter()
        .map(|lot| {
            let mut lot = lot.clone();
            lot.typology.tower_floors = floors;
            lot.typology.tower_plate_m2 = plate;
            lot.typology.podium_levels = podium;
            lot
        })
        .collect();
    let areas = AreaSummary::new(aggregate_lots(&scenario.regulation, &lots), tracts);
    let result = assess(&scenario.regulation, &lots, &areas);
    GridPoint {
        floors,
        plate_m2: plate,
        podium,
        gfa_m2: areas.total_gfa_m2,
        ok: result.compliant(),
    }
}

/// Feasible point with the largest GFA.
///
/// Ties go to the fewest floors, then the smallest plate, then the fewest
/// podium levels, so the choice does not depend on evaluation order.
pub fn best_point(points: &[GridPoint]) -> Option<GridPoint> {
    points
        .iter()
        .filter(|p| p.ok)
        .copied()
        .reduce(|best, p| if outranks(&p, &best) { p } else { best })
}

fn outranks(a: &GridPoint, b: &GridPoint) -> bool {
    match a.gfa_m2.total_cmp(&b.gfa_m2) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            a.floors
                .cmp(&b.floors)
                .then(a.plate_m2.total_cmp(&b.plate_m2))
                .then(a.podium.cmp(&b.podium))
                == Ordering::Less
        }
    }
}

/// Largest GFA per tower-floors value, ascending by floors.
pub fn floor_curve(points: &[GridPoint]) -> Vec<CurvePoint> {
    let mut per_floors: BTreeMap<u32, f64> = BTreeMap::new();
    for p in points {
        let entry = per_floors.entry(p.floors).or_insert(0.0);
        *entry = entry.max(p.gfa_m2);
    }
    per_floors
        .into_iter()
        .map(|(floors, max_gfa_m2)| CurvePoint { floors, max_gfa_m2 })
        .collect()
}

/// Group points into a two-axis surface of per-cell maximum GFA.
pub fn response_surface(points: &[GridPoint], axes: SurfaceAxes) -> ResponseSurface {
    let (row_dim, col_dim) = axes.dimensions();
    let rows = distinct_sorted(points.iter().map(|p| p.coordinate(row_dim)));
    let columns = distinct_sorted(points.iter().map(|p| p.coordinate(col_dim)));

    let mut max_gfa_m2 = vec![vec![0.0; columns.len()]; rows.len()];
    for p in points {
        let r = index_of(&rows, p.coordinate(row_dim));
        let c = index_of(&columns, p.coordinate(col_dim));
        if let (Some(r), Some(c)) = (r, c) {
            max_gfa_m2[r][c] = f64::max(max_gfa_m2[r][c], p.gfa_m2);
        }
    }

    let peak = points.iter().map(|p| p.gfa_m2).fold(0.0, f64::max);
    let scale = if peak > 0.0 { peak } else { 1.0 };
    let yield_pct = max_gfa_m2
        .iter()
        .map(|row| row.iter().map(|g| g / scale * 100.0).collect())
        .collect();

    ResponseSurface {
        axes,
        rows,
        columns,
        max_gfa_m2,
        yield_pct,
    }
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

fn index_of(sorted: &[f64], value: f64) -> Option<usize> {
    sorted.binary_search_by(|v| v.total_cmp(&value)).ok()
}

fn invalid(dimension: Dimension, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidRange {
        dimension,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devsim_core::{LotUse, RegulationSet, Typology};

    fn scenario(max_floors: Option<u32>) -> Scenario {
        let mut reg = RegulationSet::new(138_000.0, 0.4, 3.0);
        reg.max_floors = max_floors;
        let lot = |id: &str| Lot {
            id: id.into(),
            area_m2: 8000.0,
            use_category: LotUse::Mixed,
            typology: Typology {
                podium_levels: 5,
                podium_footprint_m2: 5000.0,
                tower_floors: 40,
                tower_plate_m2: 2000.0,
                efficiency: 0.8,
            },
        };
        Scenario {
            id: "s1".into(),
            regulation: reg,
            lots: vec![lot("LOT-001"), lot("LOT-002")],
            tracts: vec![],
        }
    }

    fn spec_35() -> SweepSpec {
        SweepSpec {
            locks: Locks {
                podium_levels: Some(5),
                ..Locks::default()
            },
            ..SweepSpec::default()
        }
    }

    #[test]
    fn level_range_inclusive() {
        let r = LevelRange::new(30, 60, 5);
        assert_eq!(
            r.values(Dimension::TowerFloors).unwrap(),
            vec![30, 35, 40, 45, 50, 55, 60]
        );
        assert_eq!(
            LevelRange::new(3, 8, 2).values(Dimension::PodiumLevels).unwrap(),
            vec![3, 5, 7]
        );
    }

    #[test]
    fn plate_range_inclusive() {
        let r = PlateRange::new(1800.0, 2600.0, 200.0);
        assert_eq!(r.values().unwrap(), vec![1800.0, 2000.0, 2200.0, 2400.0, 2600.0]);
        let r = PlateRange::new(0.1, 0.3, 0.1);
        assert_eq!(r.values().unwrap().len(), 3);
    }

    #[test]
    fn bad_ranges_rejected() {
        assert!(matches!(
            LevelRange::new(10, 5, 1).values(Dimension::TowerFloors),
            Err(EngineError::InvalidRange {
                dimension: Dimension::TowerFloors,
                ..
            })
        ));
        assert!(LevelRange::new(1, 5, 0).values(Dimension::PodiumLevels).is_err());
        assert!(PlateRange::new(100.0, 200.0, 0.0).values().is_err());
        assert!(PlateRange::new(100.0, f64::NAN, 10.0).values().is_err());
        assert!(PlateRange::new(-100.0, 200.0, 10.0).values().is_err());
    }

    #[test]
    fn ranges_parse_from_text() {
        assert_eq!("30:60:5".parse::<LevelRange>().unwrap(), LevelRange::new(30, 60, 5));
        assert_eq!("3:7".parse::<LevelRange>().unwrap(), LevelRange::new(3, 7, 1));
        assert_eq!(
            "1800:2600:200".parse::<PlateRange>().unwrap(),
            PlateRange::new(1800.0, 2600.0, 200.0)
        );
        assert!("30".parse::<LevelRange>().is_err());
        assert!("a:b:c".parse::<PlateRange>().is_err());
    }

    #[test]
    fn floors_by_plate_grid_has_35_points() {
        let result = optimize(&scenario(None), &spec_35()).unwrap();
        assert_eq!(result.points.len(), 35);

        let max = result.points.iter().map(|p| p.gfa_m2).fold(0.0, f64::max);
        // Every point fits under the caps here, so best is the global max.
        assert_eq!(result.feasible_count, 35);
        assert_eq!(result.best.unwrap().gfa_m2, max);
    }

    #[test]
    fn best_is_feasible_and_dominates() {
        // FAR cap 414 000 m²; the largest configurations overshoot it.
        let mut spec = spec_35();
        spec.floors = LevelRange::new(60, 120, 10);
        let result = optimize(&scenario(None), &spec).unwrap();
        let best = result.best.unwrap();

        assert!(best.ok);
        assert!(result.feasible_count < result.points.len());
        for p in result.points.iter().filter(|p| p.ok) {
            assert!(best.gfa_m2 >= p.gfa_m2);
        }
        assert!(best.gfa_m2 <= result.constraints.far_cap_m2);
    }

    #[test]
    fn floors_cap_marks_taller_points_infeasible() {
        let result = optimize(&scenario(Some(45)), &spec_35()).unwrap();
        for p in &result.points {
            assert_eq!(p.ok, p.floors <= 45);
        }
        assert_eq!(result.best.unwrap().floors, 45);
        assert_eq!(result.best.unwrap().plate_m2, 2600.0);
    }

    #[test]
    fn no_feasible_point_yields_none() {
        let result = optimize(&scenario(Some(10)), &spec_35()).unwrap();
        assert_eq!(result.feasible_count, 0);
        assert!(result.best.is_none());
    }

    #[test]
    fn locked_dimensions_are_held_constant() {
        let spec = SweepSpec {
            locks: Locks {
                tower_floors: Some(42),
                tower_plate_m2: Some(2100.0),
                podium_levels: None,
            },
            ..SweepSpec::default()
        };
        let result = optimize(&scenario(None), &spec).unwrap();
        assert_eq!(result.points.len(), 5);
        for p in &result.points {
            assert_eq!(p.floors, 42);
            assert_eq!(p.plate_m2, 2100.0);
        }
    }

    #[test]
    fn locked_dimension_skips_range_validation() {
        let spec = SweepSpec {
            floors: LevelRange::new(50, 10, 0),
            locks: Locks {
                tower_floors: Some(30),
                ..Locks::default()
            },
            ..SweepSpec::default()
        };
        assert_eq!(spec.point_count().unwrap(), 25);
    }

    #[test]
    fn counts_match_enumerated_values() {
        let floors = LevelRange::new(30, 60, 5);
        assert_eq!(floors.count(Dimension::TowerFloors).unwrap(), 7);
        assert_eq!(LevelRange::new(3, 8, 2).count(Dimension::PodiumLevels).unwrap(), 3);
        assert_eq!(PlateRange::new(0.1, 0.3, 0.1).count().unwrap(), 3);
        assert_eq!(SweepSpec::default().point_count().unwrap(), 7 * 5 * 5);
    }

    #[test]
    fn huge_plate_range_is_counted_not_allocated() {
        let one_axis = SweepSpec {
            plate: PlateRange::new(0.0, 1e18, 1.0),
            locks: Locks {
                tower_floors: Some(40),
                tower_plate_m2: None,
                podium_levels: Some(5),
            },
            ..SweepSpec::default()
        };
        assert_eq!(one_axis.point_count().unwrap(), 1_000_000_000_000_000_001);

        let all_axes = SweepSpec {
            plate: PlateRange::new(0.0, 1e18, 1.0),
            ..SweepSpec::default()
        };
        assert!(matches!(
            all_axes.point_count(),
            Err(EngineError::InvalidRange { .. })
        ));
    }

    #[test]
    fn unrepresentable_plate_count_rejected() {
        let spec = SweepSpec {
            plate: PlateRange::new(0.0, 1e300, 1.0),
            ..SweepSpec::default()
        };
        assert!(matches!(
            spec.point_count(),
            Err(EngineError::InvalidRange {
                dimension: Dimension::TowerPlate,
                ..
            })
        ));
        assert!(PlateRange::new(0.0, 1e300, 1.0).values().is_err());
    }

    #[test]
    fn wide_floor_range_counted_exactly() {
        let floors = LevelRange::new(0, 4_000_000_000, 1);
        assert_eq!(
            floors.count(Dimension::TowerFloors).unwrap(),
            4_000_000_001
        );
        let full = LevelRange::new(0, u32::MAX, 1);
        assert_eq!(
            full.count(Dimension::TowerFloors).unwrap(),
            u32::MAX as usize + 1
        );
    }

    #[test]
    fn invalid_plate_lock_rejected() {
        let spec = SweepSpec {
            locks: Locks {
                tower_plate_m2: Some(-5.0),
                ..Locks::default()
            },
            ..SweepSpec::default()
        };
        assert!(spec.point_count().is_err());
    }

    #[test]
    fn sweep_is_deterministic() {
        let scn = scenario(Some(50));
        let spec = SweepSpec::default();
        let a = optimize(&scn, &spec).unwrap();
        let b = optimize(&scn, &spec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn points_follow_enumeration_order() {
        let result = optimize(&scenario(None), &SweepSpec::default()).unwrap();
        let first = result.points[0];
        let second = result.points[1];
        assert_eq!((first.podium, first.floors, first.plate_m2), (3, 30, 1800.0));
        assert_eq!((second.podium, second.floors, second.plate_m2), (3, 30, 2000.0));
        assert_eq!(result.points.len(), 7 * 5 * 5);
    }

    #[test]
    fn ties_prefer_lowest_coordinates() {
        let p = |floors, plate_m2, podium| GridPoint {
            floors,
            plate_m2,
            podium,
            gfa_m2: 1000.0,
            ok: true,
        };
        let points = [p(40, 2000.0, 5), p(30, 2400.0, 7), p(30, 2000.0, 7), p(30, 2000.0, 3)];
        let best = best_point(&points).unwrap();
        assert_eq!((best.floors, best.plate_m2, best.podium), (30, 2000.0, 3));

        let mut reversed = points;
        reversed.reverse();
        assert_eq!(best_point(&reversed), Some(best));
    }

    #[test]
    fn floor_curve_takes_max_per_floors() {
        let result = optimize(&scenario(None), &spec_35()).unwrap();
        assert_eq!(result.floor_curve.len(), 7);
        assert_eq!(result.floor_curve[0].floors, 30);
        // Two lots, podium 5 × 5000, 30 floors × 2600 plate, 80 % efficiency.
        let expected = 2.0 * (5.0 * 5000.0 + 30.0 * 2600.0) * 0.8;
        assert!((result.floor_curve[0].max_gfa_m2 - expected).abs() < 1e-6);
    }

    #[test]
    fn surface_normalised_to_peak() {
        let result = optimize(&scenario(None), &SweepSpec::default()).unwrap();
        let s = &result.surface;
        assert_eq!(s.axes, SurfaceAxes::PodiumByPlate);
        assert_eq!(s.rows, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(s.columns.len(), 5);

        let peak = result.points.iter().map(|p| p.gfa_m2).fold(0.0, f64::max);
        let top = s.max_gfa_m2[4][4];
        assert_eq!(top, peak);
        assert!((s.yield_pct[4][4] - 100.0).abs() < 1e-9);
        assert!(s.yield_pct[0][0] < 100.0);
    }

    #[test]
    fn alternative_surface_axes() {
        let points = optimize(&scenario(None), &SweepSpec::default()).unwrap().points;
        let s = response_surface(&points, SurfaceAxes::PodiumByFloors);
        assert_eq!(s.rows.len(), 5);
        assert_eq!(s.columns.len(), 7);
        assert_eq!(s.columns[0], 30.0);
    }

    #[test]
    fn empty_points_give_empty_surface() {
        let s = response_surface(&[], SurfaceAxes::FloorsByPlate);
        assert!(s.rows.is_empty());
        assert!(s.max_gfa_m2.is_empty());
    }
}
