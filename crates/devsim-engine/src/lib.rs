//! Feasibility engine: area aggregation, zoning compliance, design-space
//! sweeps, and construction cost roll-up.
//!
//! Every operation is a pure function of its inputs; identical inputs always
//! produce identical outputs.

pub mod areas;
pub mod compare;
pub mod compliance;
pub mod cost;
mod error;
pub mod optimize;
pub mod snapshot;

pub use areas::{AreaSummary, LotArea, TractTotals, aggregate};
pub use compare::{Comparison, ComparisonRow, compare};
pub use compliance::{ComplianceResult, UtilizationStatus, Violation, evaluate_compliance};
pub use cost::{
    CostAreas, CostBasis, CostComponent, CostParams, CostResult, CostRow, CostTotals, LandCategory,
    default_library, estimate_cost, estimate_scenario_cost, validate_inputs,
};
pub use error::EngineError;
pub use optimize::{
    CurvePoint, Dimension, GridPoint, LevelRange, Locks, OptimizationResult, PlateRange,
    ResponseSurface, SurfaceAxes, SweepSpec, optimize,
};
pub use snapshot::Snapshot;
