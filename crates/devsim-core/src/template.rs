//! Built-in starting scenarios.

use crate::model::{Lot, LotUse, RegulationSet, Scenario, Tract, TractKind, Typology};

/// 13.8 ha mixed-use superblock: KDB 40 %, KLB 3.0, 60 floors / 240 m.
pub fn jakarta_superblock() -> Scenario {
    let regulation = RegulationSet {
        site_area_m2: 138_000.0,
        max_coverage_ratio: 0.4,
        max_floor_area_ratio: 3.0,
        max_floors: Some(60),
        max_height_m: Some(240.0),
        floor_to_floor_m: Some(4.0),
        efficiency_override: None,
    };

    let lots = vec![
        lot("LOT-001", 12_000.0, LotUse::Residential, (5, 6000.0), (45, 1800.0), 0.8),
        lot("LOT-002", 10_000.0, LotUse::Office, (4, 5000.0), (40, 2000.0), 0.8),
        lot("LOT-003", 8_000.0, LotUse::Hotel, (3, 4000.0), (30, 1500.0), 0.75),
        lot("LOT-004", 9_000.0, LotUse::Mixed, (6, 5500.0), (35, 2200.0), 0.8),
        lot("LOT-005", 7_000.0, LotUse::Convention, (3, 6000.0), (0, 0.0), 0.85),
    ];

    let mut service_road = Tract::road("road-2", 12.0, 400.0);
    service_road.area_m2 = Some(6000.0);
    service_road.area_override = true;

    let mut tracts = vec![
        Tract::road("road-1", 24.0, 1200.0),
        service_road,
        Tract::with_area("park-1", TractKind::Park, 15_000.0),
        Tract::with_area("water-1", TractKind::Water, 4_000.0),
        Tract::with_area("infra-1", TractKind::Infrastructure, 3_500.0),
    ];
    for (i, t) in tracts.iter_mut().enumerate() {
        t.order = i as u32;
    }

    Scenario {
        lots,
        tracts,
        ..Scenario::new(regulation)
    }
}

fn lot(
    id: &str,
    area_m2: f64,
    use_category: LotUse,
    (podium_levels, podium_footprint_m2): (u32, f64),
    (tower_floors, tower_plate_m2): (u32, f64),
    efficiency: f64,
) -> Lot {
    Lot {
        id: id.to_string(),
        area_m2,
        use_category,
        typology: Typology {
            podium_levels,
            podium_footprint_m2,
            tower_floors,
            tower_plate_m2,
            efficiency,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::validate;

    #[test]
    fn superblock_is_clean() {
        let scn = jakarta_superblock();
        assert_eq!(scn.lots.len(), 5);
        assert_eq!(scn.tracts.len(), 5);
        assert!(validate(&scn).unwrap().is_empty());
    }

    #[test]
    fn superblock_road_sizes() {
        let scn = jakarta_superblock();
        assert_eq!(scn.tracts[0].resolved_area_m2(), Some(28_800.0));
        assert_eq!(scn.tracts[1].resolved_area_m2(), Some(6_000.0));
    }

    #[test]
    fn each_call_gets_its_own_id() {
        assert_ne!(jakarta_superblock().id, jakarta_superblock().id);
    }
}
