use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use route_optimizer::nominatim::{NominatimConfig, DEFAULT_NOMINATIM_URL};
use route_optimizer::osrm::{OsrmClient, OsrmConfig, DEFAULT_OSRM_URL};
use route_optimizer::planner::{PlanningSession, RoutePlanner};
use route_optimizer::resolver::LocationResolver;
use route_optimizer::retry::{CancelToken, RetryPolicy};
use route_optimizer::solver::{path_cost, SolveOptions, SolverPool, DEFAULT_MAX_POINTS};
use route_optimizer::store;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an address; optionally start a point list from it
    Geocode {
        query: String,

        #[arg(long, default_value = DEFAULT_NOMINATIM_URL)]
        nominatim_url: String,

        /// Per-attempt timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,

        /// Write a point list holding only the resolved origin
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Reorder a saved point list, keeping the first point as origin
    Optimize {
        #[command(flatten)]
        solve: SolveArgs,

        /// Overwrite the input file with the new order
        #[arg(long)]
        write: bool,
    },
    /// Fetch the driving route through a saved point list
    Route {
        #[command(flatten)]
        solve: SolveArgs,

        /// Reorder the points before routing
        #[arg(long)]
        optimize: bool,

        #[arg(long, default_value = DEFAULT_OSRM_URL)]
        osrm_url: String,

        #[arg(long, default_value = "driving")]
        profile: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        #[arg(long, default_value_t = 3)]
        attempts: usize,

        /// Give up after this many seconds overall
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Write the route geometry as GeoJSON
        #[arg(long)]
        geometry: Option<PathBuf>,
    },
    /// Reorder several point lists on a bounded worker pool
    Batch {
        files: Vec<PathBuf>,

        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        #[arg(long, default_value_t = DEFAULT_MAX_POINTS)]
        max_points: usize,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// JSON file holding an array of [lat, lon] pairs
    #[arg(short, long)]
    points: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MAX_POINTS)]
    max_points: usize,
}

impl SolveArgs {
    fn options(&self) -> SolveOptions {
        SolveOptions {
            max_points: self.max_points,
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Geocode {
            query,
            nominatim_url,
            timeout_secs,
            save,
        } => {
            let config = NominatimConfig::new(nominatim_url)
                .with_timeout(Duration::from_secs(timeout_secs));
            let resolver = LocationResolver::nominatim(config)?;
            let location = resolver.resolve(&query)?;
            println!(
                "{} ({:.4}, {:.4})",
                location.label, location.point.lat, location.point.lon
            );

            if let Some(path) = save {
                let mut session = PlanningSession::new();
                session.set_origin(location.point);
                session.save(&path)?;
                info!(path = %path.display(), "origin saved");
            }
        }
        Commands::Optimize { solve, write } => {
            let mut session = PlanningSession::load(&solve.points)
                .with_context(|| format!("failed to load {}", solve.points.display()))?;
            session.optimize(&solve.options())?;

            for (index, point) in session.points().iter().enumerate() {
                println!("{:>3}: ({:.4}, {:.4})", index + 1, point.lat, point.lon);
            }
            println!("straight-line cost: {:.6}", path_cost(session.points()));

            if write {
                session.save(&solve.points)?;
            }
        }
        Commands::Route {
            solve,
            optimize,
            osrm_url,
            profile,
            timeout_secs,
            attempts,
            deadline_secs,
            geometry,
        } => {
            let points = store::load_points(&solve.points)
                .with_context(|| format!("failed to load {}", solve.points.display()))?;

            let config = OsrmConfig::new(osrm_url)
                .with_profile(profile)
                .with_timeout(Duration::from_secs(timeout_secs));
            let planner = RoutePlanner::new(OsrmClient::new(config)?)
                .with_options(solve.options())
                .with_retry(RetryPolicy::routing().with_max_attempts(attempts));

            let cancel = deadline_secs
                .map(|secs| CancelToken::with_timeout(Duration::from_secs(secs)))
                .unwrap_or_default();
            let planned = planner.plan(&points, optimize, &cancel)?;

            for (index, point) in planned.points.iter().enumerate() {
                println!("{:>3}: ({:.4}, {:.4})", index + 1, point.lat, point.lon);
            }
            println!("distance: {:.2} km", planned.route.distance_km());
            println!("duration: {:.2} min", planned.route.duration_minutes());

            if let Some(path) = geometry {
                let geojson = serde_json::to_string_pretty(planned.route.geometry.as_geojson())?;
                std::fs::write(&path, geojson)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
        Commands::Batch {
            files,
            threads,
            max_points,
        } => {
            let batch = files
                .iter()
                .map(|path| {
                    store::load_points(path)
                        .with_context(|| format!("failed to load {}", path.display()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let pool = SolverPool::new(threads, SolveOptions { max_points })?;
            info!(threads = pool.threads(), lists = batch.len(), "solving batch");

            for (path, result) in files.iter().zip(pool.solve_all(&batch)) {
                match result {
                    Ok(order) => println!(
                        "{}: {} stops, straight-line cost {:.6}",
                        path.display(),
                        order.len(),
                        path_cost(&order)
                    ),
                    Err(err) => println!("{}: {err}", path.display()),
                }
            }
        }
    }

    Ok(())
}
