use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carpool_core::geocode::{resolve_snapshot_locations, CachedGeocoder, Geocoder, TableGeocoder};
use carpool_core::plan::{build_event_plan, render_route_text, EventPlan, EventSnapshot};
use carpool_core::routing::{sequence_route_with, NamedCoordinate, RouteOptions, RouteOrder};
use carpool_core::{CarpoolParams, Coordinate, Direction};

const GEOCODE_CACHE_SIZE: usize = 256;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "carpool",
    about = "Seat children in carpools and sequence pickup routes for an event",
    long_about = "Reads an event snapshot (meeting spot plus RSVP records) as JSON,\n\
                  assigns every child to a vehicle for each leg and prints the plan."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign seats and sequence vehicle routes for one or both legs
    Plan {
        #[command(flatten)]
        source: SnapshotSource,
        /// Override the near-threshold (km)
        #[arg(long, env = "CARPOOL_NEAR_THRESHOLD_KM", allow_negative_numbers = true)]
        near_threshold_km: Option<f64>,
        #[arg(long, value_enum, default_value_t = LegArg::Both)]
        direction: LegArg,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Shuffle rider groups with this seed before matching
        #[arg(long)]
        seed: Option<u64>,
        /// Write the plan here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the gathering route over every located household
    Route {
        #[command(flatten)]
        source: SnapshotSource,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(clap::Args)]
struct SnapshotSource {
    /// Event snapshot (JSON)
    #[arg(long)]
    input: PathBuf,
    /// Resolve missing coordinates from a JSON table of address → {lat, lng}
    #[arg(long)]
    geocode_table: Option<PathBuf>,
    /// Resolve missing coordinates through Nominatim
    #[arg(long)]
    geocode: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LegArg {
    Go,
    Back,
    Both,
}

impl LegArg {
    fn directions(self) -> &'static [Direction] {
        match self {
            Self::Go => &[Direction::Go],
            Self::Back => &[Direction::Back],
            Self::Both => &Direction::ALL,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// ── helpers ────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_snapshot(path: &Path) -> Result<EventSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot '{}'", path.display()))
}

fn read_geocode_table(path: &Path) -> Result<TableGeocoder> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read geocode table '{}'", path.display()))?;
    let entries: BTreeMap<String, Coordinate> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse geocode table '{}'", path.display()))?;
    let mut table = TableGeocoder::new();
    for (address, coordinate) in &entries {
        table.insert(address, *coordinate);
    }
    Ok(table)
}

#[cfg(feature = "nominatim")]
fn nominatim_geocoder() -> Result<Box<dyn Geocoder>> {
    use carpool_core::geocode::nominatim::{NominatimGeocoder, DEFAULT_ENDPOINT};
    let endpoint =
        std::env::var("CARPOOL_NOMINATIM_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    Ok(Box::new(NominatimGeocoder::new(&endpoint)?))
}

#[cfg(not(feature = "nominatim"))]
fn nominatim_geocoder() -> Result<Box<dyn Geocoder>> {
    bail!("--geocode needs a build with the `nominatim` feature")
}

/// Load the snapshot and resolve missing coordinates when a geocoder was requested.
fn load_snapshot(source: &SnapshotSource) -> Result<EventSnapshot> {
    let mut snapshot = read_snapshot(&source.input)?;

    let geocoder: Option<Box<dyn Geocoder>> = match (&source.geocode_table, source.geocode) {
        (Some(_), true) => bail!("--geocode-table and --geocode are mutually exclusive"),
        (Some(path), false) => Some(Box::new(read_geocode_table(path)?)),
        (None, true) => Some(nominatim_geocoder()?),
        (None, false) => None,
    };

    if let Some(geocoder) = geocoder {
        let cached = CachedGeocoder::new(geocoder, GEOCODE_CACHE_SIZE);
        let report = resolve_snapshot_locations(&mut snapshot, &cached);
        info!(resolved = report.resolved, "geocoded snapshot");
        if !report.meeting_spot_resolved {
            warn!("meeting spot could not be located");
        }
    }
    Ok(snapshot)
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write '{}'", path.display()))?;
            info!(path = %path.display(), "wrote plan");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn render_plan_text(plan: &EventPlan) -> String {
    let mut out = format!("{}\nfingerprint: {}\n", plan.title, plan.fingerprint);
    for body in plan.bodies() {
        out.push_str(&format!("\n[{}]\n{}\n", body.direction, body.body));
    }
    if let Some(leg) = plan.legs.first() {
        if !leg.assignment.unlocated.is_empty() {
            out.push_str(&format!("\nUnlocated: {}\n", leg.assignment.unlocated.join(", ")));
        }
    }
    out.trim_end().to_string()
}

// ── commands ───────────────────────────────────────────────────────

fn run_plan(
    source: &SnapshotSource,
    near_threshold_km: Option<f64>,
    legs: LegArg,
    format: OutputFormat,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let snapshot = load_snapshot(source)?;

    let mut params: CarpoolParams = snapshot.effective_params();
    if let Some(km) = near_threshold_km {
        params = params.with_near_threshold_km(km);
    }
    if let Some(seed) = seed {
        params = params.with_seed(seed);
    }

    let plan = build_event_plan(&snapshot, &params, legs.directions())
        .context("failed to build plan")?;
    let text = match format {
        OutputFormat::Text => render_plan_text(&plan),
        OutputFormat::Json => serde_json::to_string_pretty(&plan)?,
    };
    emit(output, &text)
}

fn run_route(source: &SnapshotSource, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(source)?;
    let params = snapshot.effective_params();
    let Some(spot) = snapshot.meeting_spot.location else {
        warn!("meeting spot has no location; nothing to sequence");
        let text = match format {
            OutputFormat::Text => "(no route)".to_string(),
            OutputFormat::Json => serde_json::to_string_pretty(&RouteOrder::empty())?,
        };
        return emit(None, &text);
    };

    let points: Vec<NamedCoordinate> = snapshot
        .household_entries()
        .into_iter()
        .map(|household| NamedCoordinate::new(household.name, household.location))
        .collect();
    let route = sequence_route_with(&points, spot, &RouteOptions::from(&params));

    let label = if snapshot.meeting_spot.label.trim().is_empty() {
        params.meeting_spot_label.as_str()
    } else {
        snapshot.meeting_spot.label.as_str()
    };
    let text = match format {
        OutputFormat::Text if route.is_empty() => "(no route)".to_string(),
        OutputFormat::Text => {
            format!("{}\n{:.1} km", render_route_text(&route, label), route.total_km)
        }
        OutputFormat::Json => serde_json::to_string_pretty(&route)?,
    };
    emit(None, &text)
}

// ── main ───────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan {
            source,
            near_threshold_km,
            direction,
            format,
            seed,
            output,
        } => run_plan(&source, near_threshold_km, direction, format, seed, output.as_deref()),
        Commands::Route { source, format } => run_route(&source, format),
    }
}
