//! Vertical card display for engine results.
//!
//! Each card is a titled header followed by grouped `label  value` rows.
//! Areas and currency are rounded and digit-grouped here; the engine keeps
//! full precision.

use devsim_core::Scenario;
use devsim_engine::optimize::ResponseSurface;
use devsim_engine::{
    Comparison, ComplianceResult, CostResult, LevelRange, OptimizationResult, Snapshot, SweepSpec,
};

const MAX_LIST_ITEMS: usize = 10;

// ── Public API ──

pub fn print_scenario(scenario: &Scenario) {
    let reg = &scenario.regulation;
    println!("=== Scenario {} ===", scenario.id);
    println!("  {:<26} {}", "fingerprint", short(&scenario.fingerprint()));
    println!();

    println!("Regulation");
    row("site area", m2(reg.site_area_m2));
    row("KDB (coverage)", format!("{:.2}", reg.max_coverage_ratio));
    row("KLB (FAR)", format!("{:.2}", reg.max_floor_area_ratio));
    if let Some(f) = reg.max_floors {
        row("max floors", f);
    }
    if let Some(h) = reg.max_height_m {
        row("max height", format!("{h} m"));
    }
    if let Some(e) = reg.efficiency_override {
        row("efficiency override", format!("{e:.2}"));
    }
    println!();

    println!("Lots ({})", scenario.lots.len());
    for lot in &scenario.lots {
        let t = &lot.typology;
        println!(
            "    {:<10} {:<14} {:>10}  podium {}×{}  tower {}×{}  eff {:.2}",
            lot.id,
            lot.use_category.as_str(),
            m2(lot.area_m2),
            t.podium_levels,
            group(t.podium_footprint_m2),
            t.tower_floors,
            group(t.tower_plate_m2),
            t.efficiency,
        );
    }
    println!();

    if !scenario.tracts.is_empty() {
        println!("Tracts ({})", scenario.tracts.len());
        for tract in &scenario.tracts {
            let area = tract
                .resolved_area_m2()
                .map(m2)
                .unwrap_or_else(|| "-".to_string());
            println!("    {:<10} {:<14} {:>10}", tract.id, tract.kind.as_str(), area);
        }
        println!();
    }
}

pub fn print_compliance(r: &ComplianceResult) {
    println!("=== Compliance: {} ===", if r.compliant() { "PASS" } else { "FAIL" });
    println!();

    println!("Floor Area (FAR)");
    row("total GFA", m2(r.total_gfa_m2));
    row("cap", m2(r.far_cap_m2));
    row("utilization", util(r.far_utilization, r.far_status.as_str()));
    row("buffer", m2(r.far_buffer_m2));
    println!();

    println!("Coverage (KDB)");
    row("total footprint", m2(r.total_footprint_m2));
    row("cap", m2(r.kdb_cap_m2));
    row("utilization", util(r.kdb_utilization, r.kdb_status.as_str()));
    row("buffer", m2(r.kdb_buffer_m2));
    println!();

    println!("Height");
    row("max tower floors", r.max_tower_floors);
    row("floors ok", yes_no(r.height_ok));
    if let Some(ok) = r.height_m_ok {
        row("metres ok", yes_no(ok));
    }
    println!();

    println!("Land");
    row("site", m2(r.land.site_area_m2));
    row("tracts (non-sellable)", m2(r.land.tract_area_m2));
    row("buildable", m2(r.land.buildable_m2));
    row(
        "sellable / non-sellable",
        format!("{:.1}% / {:.1}%", r.land.sellable_pct, r.land.nonsellable_pct),
    );
    println!();

    if !r.by_lot.is_empty() {
        println!("Per Lot");
        println!(
            "    {:<10} {:>12} {:>10} {:>8} {:>8}",
            "lot", "GFA m²", "fp m²", "% GFA", "% fp"
        );
        for s in &r.by_lot {
            println!(
                "    {:<10} {:>12} {:>10} {:>7.1}% {:>7.1}%",
                s.lot_id,
                group(s.gfa_m2),
                group(s.footprint_m2),
                s.gfa_fraction * 100.0,
                s.footprint_fraction * 100.0,
            );
        }
        println!();
    }

    print_list("Violations", r.violations.iter().map(ToString::to_string));
    print_list("Advisories", r.advisories.iter().map(ToString::to_string));
}

pub fn print_sweep(spec: &SweepSpec, r: &OptimizationResult) {
    println!(
        "=== Sweep: {} points, {} feasible ===",
        r.points.len(),
        r.feasible_count
    );
    println!();

    println!("Ranges");
    row(
        "tower floors",
        lock_or_range(spec.locks.tower_floors, &spec.floors),
    );
    row(
        "tower plate",
        match spec.locks.tower_plate_m2 {
            Some(v) => format!("locked at {} m²", group(v)),
            None => format!(
                "{}..{} step {} m²",
                group(spec.plate.min),
                group(spec.plate.max),
                group(spec.plate.step)
            ),
        },
    );
    row(
        "podium levels",
        lock_or_range(spec.locks.podium_levels, &spec.podium),
    );
    println!();

    println!("Constraints");
    row("FAR cap", m2(r.constraints.far_cap_m2));
    row("KDB cap", m2(r.constraints.kdb_cap_m2));
    row(
        "max floors",
        r.constraints
            .max_floors
            .map_or_else(|| "-".to_string(), |f| f.to_string()),
    );
    println!();

    println!("Sweet Spot");
    match &r.best {
        Some(b) => {
            row("tower floors", b.floors);
            row("tower plate", m2(b.plate_m2));
            row("podium levels", b.podium);
            row("total GFA", m2(b.gfa_m2));
        }
        None => println!("  no feasible configuration in range"),
    }
    println!();

    if !r.floor_curve.is_empty() {
        println!("Floors vs Total GFA");
        for c in &r.floor_curve {
            println!("    {:>4} floors  {:>14}", c.floors, m2(c.max_gfa_m2));
        }
        println!();
    }

    print_surface(&r.surface);
}

pub fn print_cost(r: &CostResult) {
    println!("=== Cost Summary ===");
    println!();
    println!(
        "    {:<20} {:>12} {:<7} {:>16} {:<12} {:>20}",
        "component", "qty", "unit", "rate", "", "direct (IDR)"
    );
    for c in &r.rows {
        println!(
            "    {:<20} {:>12} {:<7} {:>16} {:<12} {:>20}",
            c.component,
            group(c.quantity),
            c.quantity_unit,
            group(c.effective_rate),
            c.rate_unit,
            group(c.direct_cost),
        );
    }
    println!();

    let t = &r.totals;
    let p = &r.params;
    println!("Totals");
    row("direct", idr(t.direct));
    row(&format!("contingency ({}%)", p.contingency_pct), idr(t.contingency));
    row(&format!("soft cost ({}%)", p.soft_cost_pct), idr(t.soft_cost));
    row("grand total", idr(t.grand_total));
    row("grand total (USD)", usd(t.converted_total));
    row(
        "per m² GFA",
        t.cost_per_gfa.map_or_else(|| "-".to_string(), idr),
    );
    row(
        "per m² GFA (USD)",
        t.converted_cost_per_gfa
            .map_or_else(|| "-".to_string(), |v| format!("USD {v:.2}")),
    );
    if p.sensitivity_pct != 0.0 {
        row("rate sensitivity", format!("{:+}%", p.sensitivity_pct));
    }
    println!();
}

pub fn print_snapshot(s: &Snapshot) {
    println!("=== Snapshot {} ===", s.name);
    row("id", &s.id);
    row("created", s.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    row("fingerprint", s.short_fingerprint());
    row("cached compliance", yes_no(s.compliance.is_some()));
    row("cached cost", yes_no(s.cost.is_some()));
    println!();
    print_scenario(&s.scenario);
    if let Some(c) = &s.compliance {
        print_compliance(c);
    }
    if let Some(c) = &s.cost {
        print_cost(c);
    }
}

pub fn print_snapshot_list(snapshots: &[Snapshot]) {
    if snapshots.is_empty() {
        println!("no snapshots saved");
        return;
    }
    println!("    {:<36}  {:<24}  {:<16}  {}", "id", "name", "created", "hash");
    for s in snapshots {
        println!(
            "    {:<36}  {:<24}  {:<16}  {}",
            s.id,
            s.name,
            s.created_at.format("%Y-%m-%d %H:%M"),
            s.short_fingerprint()
        );
    }
}

pub fn print_comparison(c: &Comparison) {
    println!("=== Compare ({} scenarios) ===", c.rows.len());
    if let Some(best) = c.best_row() {
        println!("  best: {} ({})", best.name, m2(best.total_gfa_m2));
    }
    println!();
    println!(
        "    {:<20} {:>12} {:>7} {:>7} {:>7} {:>22} {:>12} {}",
        "name", "GFA m²", "Δ best", "FAR", "KDB", "total (IDR)", "IDR/m²", "ok"
    );
    for r in &c.rows {
        println!(
            "    {:<20} {:>12} {:>6.0}% {:>6.1}% {:>6.1}% {:>22} {:>12} {}",
            r.name,
            group(r.total_gfa_m2),
            r.delta_vs_best_pct,
            r.far_utilization * 100.0,
            r.kdb_utilization * 100.0,
            group(r.grand_total),
            r.cost_per_gfa.map_or_else(|| "-".to_string(), group),
            yes_no(r.compliant),
        );
    }
    println!();
}

// ── Section rendering ──

fn print_surface(s: &ResponseSurface) {
    if s.rows.is_empty() || s.columns.is_empty() {
        return;
    }
    let (row_dim, col_dim) = s.axes.dimensions();
    println!("Yield Surface (% of max GFA, {row_dim} × {col_dim})");
    print!("    {:>8}", "");
    for c in &s.columns {
        print!(" {:>7}", group(*c));
    }
    println!();
    for (r, values) in s.rows.iter().zip(&s.yield_pct) {
        print!("    {:>8}", group(*r));
        for v in values {
            print!(" {:>6.0}%", v);
        }
        println!();
    }
    println!();
}

fn print_list(header: &str, items: impl ExactSizeIterator<Item = String>) {
    let len = items.len();
    if len == 0 {
        return;
    }
    println!("{header} ({len})");
    for item in items.take(MAX_LIST_ITEMS) {
        println!("  - {item}");
    }
    if len > MAX_LIST_ITEMS {
        println!("    ... and {} more", len - MAX_LIST_ITEMS);
    }
    println!();
}

// ── Helpers ──

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<26} {}", label, value);
}

fn lock_or_range(lock: Option<u32>, range: &LevelRange) -> String {
    match lock {
        Some(v) => format!("locked at {v}"),
        None => format!("{}..{} step {}", range.min, range.max, range.step),
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn util(ratio: f64, status: &str) -> String {
    format!("{:.1}% ({status})", ratio * 100.0)
}

fn short(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

fn m2(v: f64) -> String {
    format!("{} m²", group(v))
}

fn idr(v: f64) -> String {
    format!("IDR {}", group(v))
}

fn usd(v: f64) -> String {
    format!("USD {}", group(v))
}

/// Round to the nearest integer and group thousands with commas.
pub fn group(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
