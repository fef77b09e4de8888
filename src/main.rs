use anyhow::{Context, Result};
use circle_cover::batch::{self, BatchOptions, DEFAULT_CANDIDATE_LIMIT};
use circle_cover::boundary::{BoundaryDataset, DEFAULT_NAME_PROPERTY};
use circle_cover::{CoordinateMode, CoverageConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Region circle coverage generator
///
/// Covers region boundaries (countries, provinces, ...) with circles of
/// bounded radius that lie entirely inside them.
#[derive(Parser, Debug)]
#[command(name = "circle-cover")]
#[command(version, about, long_about = None)]
struct Args {
    /// GeoJSON FeatureCollection with the region boundaries
    dataset: PathBuf,

    /// Names of the regions to cover
    #[arg(short, long, num_args = 1.., conflicts_with_all = ["world", "list"])]
    region: Vec<String>,

    /// Cover every region in the dataset
    #[arg(short, long)]
    world: bool,

    /// List region names in the dataset and exit
    #[arg(short, long)]
    list: bool,

    /// Minimum circle radius in kilometers
    #[arg(long, default_value_t = 1)]
    min_radius: u32,

    /// Maximum circle radius in kilometers
    #[arg(long, default_value_t = 10)]
    max_radius: u32,

    /// Coordinate system of the dataset
    #[arg(short, long, value_enum, default_value_t = CoordinateMode::Geographic)]
    coordinate_system: CoordinateMode,

    /// Km per degree (geographic) or units per km (projected)
    #[arg(long)]
    scale: Option<f64>,

    /// Feature property holding the region name
    #[arg(long, default_value = DEFAULT_NAME_PROPERTY)]
    name_property: String,

    /// Optional GeoJSON with sub-regions (states/provinces) used to label circles
    #[arg(long)]
    states: Option<PathBuf>,

    /// Feature property holding the sub-region name
    #[arg(long, default_value = DEFAULT_NAME_PROPERTY)]
    states_name_property: String,

    /// Directory for the CSV outputs
    #[arg(short, long, default_value = "output_files")]
    output_dir: PathBuf,

    /// Optional directory for SVG plots of every region
    #[arg(long)]
    svg_dir: Option<PathBuf>,

    /// Run regions whose candidate grid exceeds 10 million discs anyway
    #[arg(long)]
    override_candidate_limit: bool,

    /// Verbose mode, logs every pass
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    // Set up interrupt handler
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        if interrupted_clone.load(Ordering::SeqCst) {
            eprintln!("\nSecond interrupt received, exiting immediately!");
            std::process::exit(130); // 128 + SIGINT(2)
        }
        interrupted_clone.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupt received, finishing running regions... (press Ctrl-C again to force exit)");
    })
    .context("Error setting Ctrl-C handler")?;

    let config = CoverageConfig::new(args.min_radius, args.max_radius, args.coordinate_system, args.scale)?;

    println!("Region Circle Coverage");
    println!("======================\n");
    println!("Dataset:    {}", args.dataset.display());
    println!("Output:     {}", args.output_dir.display());
    println!("\nParameters:");
    println!("  Radius:     {} - {} km", config.radii.min_km, config.radii.max_km);
    println!("  Coordinates: {:?}", args.coordinate_system);

    // Step 1: Load boundaries
    println!("\n[1/4] Loading boundaries... [{:.2}s]", start_time.elapsed().as_secs_f64());
    let dataset = BoundaryDataset::load_geojson(&args.dataset, &args.name_property)?;
    println!("      Loaded {} regions", dataset.len());

    if args.list {
        for name in dataset.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let states = args
        .states
        .as_deref()
        .map(|path| BoundaryDataset::load_geojson(path, &args.states_name_property))
        .transpose()?;
    if let Some(ref states) = states {
        println!("      Loaded {} sub-regions for labeling", states.len());
    }

    // Step 2: Select regions
    println!("\n[2/4] Selecting regions... [{:.2}s]", start_time.elapsed().as_secs_f64());
    let names: Vec<String> = if args.world {
        dataset.names().map(str::to_string).collect()
    } else if !args.region.is_empty() {
        args.region.clone()
    } else {
        anyhow::bail!("Nothing to do: pass --region NAME..., --world or --list");
    };
    println!("      {} region(s) selected", names.len());

    // Step 3: Cover regions
    println!("\n[3/4] Generating circles... [{:.2}s]", start_time.elapsed().as_secs_f64());
    let options = BatchOptions {
        config,
        output_dir: args.output_dir.clone(),
        svg_dir: args.svg_dir.clone(),
        candidate_limit: if args.override_candidate_limit {
            None
        } else {
            Some(DEFAULT_CANDIDATE_LIMIT)
        },
    };
    let outcomes = batch::run_batch(&dataset, states.as_ref(), &names, &options, &interrupted);

    // Step 4: Report
    println!("\n[4/4] Summary... [{:.2}s]", start_time.elapsed().as_secs_f64());
    let mut failures = 0;
    let mut total_circles = 0;
    for outcome in &outcomes {
        match outcome.result {
            Ok(ref summary) => {
                total_circles += summary.circles;
                let fallback = if summary.used_fallback { " (min-radius fallback)" } else { "" };
                println!(
                    "      {}: {} circles{} -> {}",
                    outcome.region,
                    summary.circles,
                    fallback,
                    summary.csv_path.display()
                );
            }
            Err(ref e) => {
                failures += 1;
                println!("      {}: FAILED: {:#}", outcome.region, e);
            }
        }
    }

    println!(
        "\nDone! Generated {} circles for {} region(s). [{:.2}s]",
        total_circles,
        outcomes.len() - failures,
        start_time.elapsed().as_secs_f64()
    );

    if failures == outcomes.len() && !outcomes.is_empty() {
        anyhow::bail!("All {} region(s) failed", failures);
    }

    Ok(())
}
