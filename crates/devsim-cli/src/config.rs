//! Runtime settings and input loading.
//!
//! Settings come from global flags, falling back to `DEVSIM_*` environment
//! variables, then to built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use devsim_core::Scenario;
use devsim_engine::cost::{CostComponent, DEFAULT_FX_RATE, default_library};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_MAX_GRID_POINTS: usize = 10_000;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Directory holding saved snapshots
    #[arg(long, global = true, env = "DEVSIM_DATA_DIR", default_value = ".devsim/snapshots")]
    pub data_dir: PathBuf,

    /// Refuse sweeps with more grid points than this
    #[arg(long, global = true, env = "DEVSIM_MAX_GRID_POINTS", default_value_t = DEFAULT_MAX_GRID_POINTS)]
    pub max_grid_points: usize,

    /// Exchange rate from the native currency (IDR) to USD
    #[arg(long = "fx", global = true, env = "DEVSIM_FX_RATE", default_value_t = DEFAULT_FX_RATE)]
    pub fx_rate: f64,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {what} in {}", path.display()))
}

pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let scenario: Scenario = read_json(path, "scenario")?;
    debug!(
        id = %scenario.id,
        lots = scenario.lots.len(),
        tracts = scenario.tracts.len(),
        "loaded scenario"
    );
    Ok(scenario)
}

/// Cost library from a JSON file, or the built-in IDR library.
pub fn load_library(path: Option<&Path>) -> anyhow::Result<Vec<CostComponent>> {
    match path {
        Some(p) => read_json(p, "cost library"),
        None => Ok(default_library()),
    }
}
