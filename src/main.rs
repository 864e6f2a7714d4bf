use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use disbursement_viz::{load_csv, Aggregates, Config, VERSION};

fn main() -> Result<()> {
    init_logging();

    let config = Config::from_args(env::args());
    run_summary(&config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_summary(config: &Config) -> Result<()> {
    println!("📊 Disbursement Visualizer v{} - Dataset Summary", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading {}...", config.csv_path.display());
    let dataset = load_csv(&config.csv_path)
        .with_context(|| format!("Failed to load {}", config.csv_path.display()))?;
    println!("✓ Loaded {} records", dataset.len());

    // 2. Aggregate
    let agg = Aggregates::compute(dataset.records());

    match (agg.years.first(), agg.years.last()) {
        (Some(first), Some(last)) => {
            println!("✓ {} years ({} - {})", agg.years.len(), first, last);
        }
        _ => println!("⚠️  Dataset has no rows"),
    }

    // 3. Per-year totals
    println!("\n💰 Total disbursement per year");
    for total in &agg.yearly_totals {
        println!("   {:>6}  {:>20.2}", total.year, total.disbursed);
    }

    // 4. Shared scales
    println!("\n🎨 Color range: [{}, {}]", agg.color_range.min, agg.color_range.max);
    println!("🔵 Largest disbursement: {:.2}", agg.max_disbursed);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ {} animation frames ready", agg.years.len());

    Ok(())
}
