mod config;
mod display;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use devsim_core::{Scenario, template, validate};
use devsim_engine::cost::{
    CostAreas, DEFAULT_CONTINGENCY_PCT, DEFAULT_SOFT_COST_PCT, estimate_cost, validate_inputs,
};
use devsim_engine::{
    CostParams, LevelRange, Locks, PlateRange, Snapshot, SurfaceAxes, SweepSpec, aggregate,
    compare, evaluate_compliance, optimize,
};
use devsim_store::SnapshotStore;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Settings;

#[derive(Parser, Debug)]
#[command(name = "devsim", version, about = "Development feasibility simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON instead of cards
    #[arg(long, global = true)]
    json: bool,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a scenario against its zoning caps
    Simulate {
        /// Scenario JSON file
        file: PathBuf,
    },
    /// Grid-search tower floors, floor plate, and podium levels
    Optimize {
        file: PathBuf,
        /// Tower floors MIN:MAX[:STEP]
        #[arg(long, default_value = "30:60:5")]
        floors: LevelRange,
        /// Tower floor plate in m², MIN:MAX[:STEP]
        #[arg(long, default_value = "1800:2600:200")]
        plate: PlateRange,
        /// Podium levels MIN:MAX[:STEP]
        #[arg(long, default_value = "3:7:1")]
        podium: LevelRange,
        #[arg(long)]
        lock_floors: Option<u32>,
        #[arg(long)]
        lock_plate: Option<f64>,
        #[arg(long)]
        lock_podium: Option<u32>,
        /// Heat-map axes: podium-by-plate, floors-by-plate, podium-by-floors
        #[arg(long, default_value = "podium-by-plate", value_parser = parse_surface)]
        surface: SurfaceAxes,
    },
    /// Estimate construction cost for a scenario
    Cost {
        file: PathBuf,
        #[command(flatten)]
        pricing: Pricing,
    },
    /// Print the built-in demo scenario
    Template,
    /// Manage saved snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Compare saved snapshots side by side (all of them when no ids given)
    Compare {
        ids: Vec<String>,
        #[command(flatten)]
        pricing: Pricing,
    },
}

#[derive(Subcommand, Debug)]
enum SnapshotAction {
    /// Freeze a scenario file with its compliance and cost results
    Save {
        file: PathBuf,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        pricing: Pricing,
    },
    List,
    Show { id: String },
    Rename { id: String, name: String },
    Duplicate { id: String },
    Delete { id: String },
}

#[derive(clap::Args, Debug, Clone)]
struct Pricing {
    /// Cost library JSON (defaults to the built-in IDR library)
    #[arg(long)]
    library: Option<PathBuf>,
    /// Rate adjustment in percent, applied to every unit rate
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    sensitivity: f64,
    #[arg(long, default_value_t = DEFAULT_CONTINGENCY_PCT)]
    contingency: f64,
    #[arg(long, default_value_t = DEFAULT_SOFT_COST_PCT)]
    soft: f64,
}

impl Pricing {
    fn params(&self, settings: &Settings) -> CostParams {
        CostParams {
            sensitivity_pct: self.sensitivity,
            contingency_pct: self.contingency,
            soft_cost_pct: self.soft,
            fx_rate: settings.fx_rate,
        }
    }
}

fn parse_surface(s: &str) -> Result<SurfaceAxes, String> {
    match s {
        "podium-by-plate" => Ok(SurfaceAxes::PodiumByPlate),
        "floors-by-plate" => Ok(SurfaceAxes::FloorsByPlate),
        "podium-by-floors" => Ok(SurfaceAxes::PodiumByFloors),
        other => Err(format!("unknown surface axes {other:?}")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("devsim v{}", env!("CARGO_PKG_VERSION"));

    let json = cli.json;
    let settings = &cli.settings;
    match cli.command {
        Command::Simulate { file } => {
            let scenario = config::load_scenario(&file)?;
            let result = evaluate_compliance(&scenario)?;
            for a in &result.advisories {
                warn!(advisory = %a, "implausible input");
            }
            emit(json, &result, display::print_compliance)
        }
        Command::Optimize {
            file,
            floors,
            plate,
            podium,
            lock_floors,
            lock_plate,
            lock_podium,
            surface,
        } => {
            let scenario = config::load_scenario(&file)?;
            let spec = SweepSpec {
                floors,
                plate,
                podium,
                locks: Locks {
                    tower_floors: lock_floors,
                    tower_plate_m2: lock_plate,
                    podium_levels: lock_podium,
                },
                surface,
            };
            let points = check_grid(&spec, settings.max_grid_points)?;
            let result = optimize(&scenario, &spec)?;
            if result.best.is_none() {
                warn!(points, "no feasible configuration in range");
            }
            emit(json, &result, |r| display::print_sweep(&spec, r))
        }
        Command::Cost { file, pricing } => {
            let scenario = config::load_scenario(&file)?;
            let library = config::load_library(pricing.library.as_deref())?;
            let params = pricing.params(settings);
            let result = price(&scenario, &library, &params)?;
            emit(json, &result, display::print_cost)
        }
        Command::Template => {
            let scenario = template::jakarta_superblock();
            emit(json, &scenario, display::print_scenario)
        }
        Command::Snapshot { action } => run_snapshot(action, settings, json),
        Command::Compare { ids, pricing } => {
            let store = SnapshotStore::open(&settings.data_dir)?;
            let snapshots = if ids.is_empty() {
                store.list()?
            } else {
                ids.iter()
                    .map(|id| store.load(id))
                    .collect::<Result<Vec<_>, _>>()?
            };
            let library = config::load_library(pricing.library.as_deref())?;
            let result = compare(&snapshots, &library, &pricing.params(settings))?;
            emit(json, &result, display::print_comparison)
        }
    }
}

fn run_snapshot(action: SnapshotAction, settings: &Settings, json: bool) -> anyhow::Result<()> {
    let store = SnapshotStore::open(&settings.data_dir)
        .with_context(|| format!("opening snapshot store {}", settings.data_dir.display()))?;
    match action {
        SnapshotAction::Save {
            file,
            name,
            pricing,
        } => {
            let scenario = config::load_scenario(&file)?;
            let library = config::load_library(pricing.library.as_deref())?;
            let compliance = evaluate_compliance(&scenario)?;
            let cost = price(&scenario, &library, &pricing.params(settings))?;
            let snapshot = Snapshot::take(name, &scenario)
                .with_compliance(compliance)
                .with_cost(cost);
            store.save(&snapshot)?;
            emit(json, &snapshot, print_saved)
        }
        SnapshotAction::List => emit(json, &store.list()?, |s| display::print_snapshot_list(s)),
        SnapshotAction::Show { id } => emit(json, &store.load(&id)?, display::print_snapshot),
        SnapshotAction::Rename { id, name } => emit(json, &store.rename(&id, &name)?, print_saved),
        SnapshotAction::Duplicate { id } => emit(json, &store.duplicate(&id)?, print_saved),
        SnapshotAction::Delete { id } => {
            store.delete(&id)?;
            emit(json, &serde_json::json!({ "deleted": id }), |_| {
                println!("deleted {id}")
            })
        }
    }
}

/// Grid size of a sweep, refused when it exceeds `max` points.
fn check_grid(spec: &SweepSpec, max: usize) -> anyhow::Result<usize> {
    let points = spec.point_count()?;
    if points > max {
        bail!(
            "sweep has {points} grid points, above the limit of {max}; narrow the ranges or raise --max-grid-points"
        );
    }
    Ok(points)
}

/// Cost a scenario, warning about implausible inputs, rates or markups.
fn price(
    scenario: &Scenario,
    library: &[devsim_engine::CostComponent],
    params: &CostParams,
) -> anyhow::Result<devsim_engine::CostResult> {
    for a in validate(scenario)? {
        warn!(advisory = %a, "implausible input");
    }
    let areas = CostAreas::from_summary(&aggregate(scenario)?, scenario.regulation.site_area_m2);
    for a in validate_inputs(library, params, &areas) {
        warn!(advisory = %a, "implausible cost input");
    }
    Ok(estimate_cost(&areas, library, params))
}

fn print_saved(s: &Snapshot) {
    println!("{}  {}  {}", s.id, s.name, s.short_fingerprint());
}

fn emit<T: Serialize>(json: bool, value: &T, card: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        card(value);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn optimize_parses_ranges_and_locks() {
        let cli = Cli::parse_from([
            "devsim",
            "optimize",
            "scn.json",
            "--floors",
            "30:60:5",
            "--plate",
            "1800:2600:200",
            "--lock-podium",
            "5",
            "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Command::Optimize {
                floors,
                plate,
                lock_podium,
                ..
            } => {
                assert_eq!(floors, LevelRange::new(30, 60, 5));
                assert_eq!(plate, PlateRange::new(1800.0, 2600.0, 200.0));
                assert_eq!(lock_podium, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cost_accepts_negative_sensitivity() {
        let cli = Cli::parse_from(["devsim", "cost", "scn.json", "--sensitivity", "-10"]);
        match cli.command {
            Command::Cost { pricing, .. } => {
                assert_eq!(pricing.sensitivity, -10.0);
                assert_eq!(pricing.contingency, DEFAULT_CONTINGENCY_PCT);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bad_surface_rejected() {
        assert!(parse_surface("diagonal").is_err());
        assert_eq!(
            parse_surface("floors-by-plate").unwrap(),
            SurfaceAxes::FloorsByPlate
        );
    }

    #[test]
    fn oversized_sweep_refused_before_engine() {
        let spec = SweepSpec::default();
        assert_eq!(check_grid(&spec, 175).unwrap(), 175);
        let err = check_grid(&spec, 100).unwrap_err();
        assert!(err.to_string().contains("175 grid points"));
    }

    #[test]
    fn pathological_plate_ranges_refused() {
        let locked = SweepSpec {
            plate: PlateRange::new(0.0, 1e18, 1.0),
            locks: Locks {
                tower_floors: Some(40),
                tower_plate_m2: None,
                podium_levels: Some(5),
            },
            ..SweepSpec::default()
        };
        assert!(check_grid(&locked, 10_000).is_err());

        for max in [1e18, 1e300] {
            let spec = SweepSpec {
                plate: PlateRange::new(0.0, max, 1.0),
                ..SweepSpec::default()
            };
            assert!(check_grid(&spec, 10_000).is_err());
        }

        let floors = SweepSpec {
            floors: LevelRange::new(0, 4_000_000_000, 1),
            ..SweepSpec::default()
        };
        assert!(check_grid(&floors, 10_000).is_err());
    }

    #[test]
    fn structurally_invalid_scenario_is_not_priced() {
        let mut scenario = template::jakarta_superblock();
        let mut twin = scenario.lots[0].clone();
        twin.area_m2 = -500.0;
        scenario.lots.push(twin);
        assert!(price(
            &scenario,
            &devsim_engine::default_library(),
            &CostParams::default()
        )
        .is_err());
    }

    #[test]
    fn template_is_priced_with_defaults() {
        let scenario = template::jakarta_superblock();
        let result = price(
            &scenario,
            &devsim_engine::default_library(),
            &CostParams::default(),
        )
        .unwrap();
        assert_eq!(result.rows.len(), 4);
        assert!(result.totals.cost_per_gfa.is_some());
    }
}
