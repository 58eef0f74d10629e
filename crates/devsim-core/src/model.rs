//! Scenario data model: site-wide regulations, buildable lots, and
//! non-buildable tracts.
//!
//! All areas are square metres. Every type is a plain value: cloning a
//! [`Scenario`] yields a fully independent copy, so a snapshot taken from a
//! live scenario never observes later edits.

use serde::{Deserialize, Serialize};

/// Default net-to-gross efficiency applied to a typology when none is given.
pub const DEFAULT_EFFICIENCY: f64 = 0.8;

// ── Regulations ──

/// Site-wide zoning regulations.
///
/// `max_coverage_ratio` is the KDB (fraction of site area that may be covered
/// by ground-level footprint); `max_floor_area_ratio` is the KLB / FAR
/// (multiple of site area allowed as total GFA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationSet {
    pub site_area_m2: f64,
    #[serde(alias = "kdb")]
    pub max_coverage_ratio: f64,
    #[serde(alias = "klb")]
    pub max_floor_area_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_floors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height_m: Option<f64>,
    #[serde(
        default,
        alias = "floor_to_floor_height_m",
        skip_serializing_if = "Option::is_none"
    )]
    pub floor_to_floor_m: Option<f64>,
    /// When present, replaces every lot's own typology efficiency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_override: Option<f64>,
}

impl RegulationSet {
    /// Regulations with only the three mandatory figures set.
    pub fn new(site_area_m2: f64, max_coverage_ratio: f64, max_floor_area_ratio: f64) -> Self {
        Self {
            site_area_m2,
            max_coverage_ratio,
            max_floor_area_ratio,
            max_floors: None,
            max_height_m: None,
            floor_to_floor_m: None,
            efficiency_override: None,
        }
    }

    /// Maximum total GFA allowed on the site.
    pub fn far_cap_m2(&self) -> f64 {
        self.max_floor_area_ratio * self.site_area_m2
    }

    /// Maximum total ground footprint allowed on the site.
    pub fn kdb_cap_m2(&self) -> f64 {
        self.max_coverage_ratio * self.site_area_m2
    }

    /// Height implied by `max_floors × floor_to_floor_m`, when both are set.
    pub fn derived_height_m(&self) -> Option<f64> {
        match (self.max_floors, self.floor_to_floor_m) {
            (Some(floors), Some(ftf)) => Some(floors as f64 * ftf),
            _ => None,
        }
    }
}

// ── Lots ──

/// Podium + tower profile assigned to a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typology {
    pub podium_levels: u32,
    pub podium_footprint_m2: f64,
    pub tower_floors: u32,
    pub tower_plate_m2: f64,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
}

fn default_efficiency() -> f64 {
    DEFAULT_EFFICIENCY
}

impl Typology {
    pub fn podium_gfa_m2(&self, efficiency: f64) -> f64 {
        self.podium_levels as f64 * self.podium_footprint_m2 * efficiency
    }

    pub fn tower_gfa_m2(&self, efficiency: f64) -> f64 {
        self.tower_floors as f64 * self.tower_plate_m2 * efficiency
    }

    /// Podium GFA plus tower GFA at the given efficiency.
    pub fn gfa_m2(&self, efficiency: f64) -> f64 {
        self.podium_gfa_m2(efficiency) + self.tower_gfa_m2(efficiency)
    }
}

/// Land-use category of a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotUse {
    #[default]
    #[serde(alias = "resi")]
    Residential,
    Office,
    Hotel,
    Retail,
    Convention,
    #[serde(alias = "infra")]
    Infrastructure,
    Mixed,
}

impl LotUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Office => "office",
            Self::Hotel => "hotel",
            Self::Retail => "retail",
            Self::Convention => "convention",
            Self::Infrastructure => "infrastructure",
            Self::Mixed => "mixed",
        }
    }
}

/// A buildable parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: String,
    pub area_m2: f64,
    #[serde(rename = "use", default)]
    pub use_category: LotUse,
    pub typology: Typology,
}

impl Lot {
    /// Efficiency actually applied: the regulation override wins when present.
    pub fn effective_efficiency(&self, efficiency_override: Option<f64>) -> f64 {
        efficiency_override.unwrap_or(self.typology.efficiency)
    }

    /// Ground footprint counted toward coverage, capped at the lot area.
    pub fn footprint_m2(&self) -> f64 {
        self.area_m2.min(self.typology.podium_footprint_m2)
    }

    /// Whether the podium footprint is larger than the lot it sits on.
    pub fn footprint_exceeds_lot(&self) -> bool {
        self.typology.podium_footprint_m2 > self.area_m2
    }
}

// ── Tracts ──

/// Category of a non-buildable land reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TractKind {
    #[default]
    Road,
    Park,
    Water,
    #[serde(alias = "infra")]
    Infrastructure,
}

impl TractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Road => "road",
            Self::Park => "park",
            Self::Water => "water",
            Self::Infrastructure => "infrastructure",
        }
    }
}

/// A non-buildable, non-sellable land reservation.
///
/// Roads may be sized by right-of-way width × length; set `area_override` to
/// force the manual `area_m2` even when geometry is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tract {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: TractKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_m2: Option<f64>,
    #[serde(default, alias = "row_m", skip_serializing_if = "Option::is_none")]
    pub row_width_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub area_override: bool,
    /// Display sequence only.
    #[serde(default)]
    pub order: u32,
}

impl Tract {
    /// Tract with a manually entered area.
    pub fn with_area(id: impl Into<String>, kind: TractKind, area_m2: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            area_m2: Some(area_m2),
            row_width_m: None,
            length_m: None,
            area_override: false,
            order: 0,
        }
    }

    /// Road tract sized by right-of-way width × length.
    pub fn road(id: impl Into<String>, row_width_m: f64, length_m: f64) -> Self {
        Self {
            id: id.into(),
            kind: TractKind::Road,
            area_m2: None,
            row_width_m: Some(row_width_m),
            length_m: Some(length_m),
            area_override: false,
            order: 0,
        }
    }

    /// Area occupied by this tract, or `None` when it cannot be determined.
    pub fn resolved_area_m2(&self) -> Option<f64> {
        if self.kind == TractKind::Road && !self.area_override {
            if let (Some(row), Some(len)) = (self.row_width_m, self.length_m) {
                return Some(row * len);
            }
        }
        self.area_m2
    }
}

// ── Scenario ──

/// A development program: regulations, lots, and tracts.
///
/// Lot order is irrelevant to computation; tract order drives listings only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    #[serde(alias = "reg")]
    pub regulation: RegulationSet,
    #[serde(default)]
    pub lots: Vec<Lot>,
    #[serde(default)]
    pub tracts: Vec<Tract>,
}
