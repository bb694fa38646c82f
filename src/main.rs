use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use cityroute::geojson::GeoJsonRenderer;
use cityroute::tracking::{
    JsonLinesSource, JsonLinesStore, TrackerOptions, DEFAULT_MAX_PATH_POINTS,
};
use cityroute::{MapSession, Network, Status, Tracker};
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct NetworkLoadError(PathBuf, #[source] cityroute::network::LoadError);

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The path to a network description file (.xml, .xml.gz or .xml.bz2).
    /// Uses the built-in Bangalore network if not provided.
    #[arg(short, long, global = true)]
    network: Option<PathBuf>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors; overrides --verbose
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print all locations of the network as GeoJSON
    Locations,

    /// Find the shortest route between two locations and print it as GeoJSON
    Route {
        /// Name of the start location
        start: String,

        /// Name of the end location
        end: String,
    },

    /// Read position fixes (one JSON object per line) from the standard input
    /// and publish track records (one JSON object per line) to the standard output
    Track {
        /// How many most recent positions to keep
        #[arg(long, default_value_t = DEFAULT_MAX_PATH_POINTS)]
        max_path_points: usize,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(log_level(cli.verbose, cli.quiet))
        .init();

    let network = match &cli.network {
        Some(path) => load_network(path)?,
        None => Network::bangalore(),
    };

    match cli.command {
        Command::Locations => {
            let mut session = MapSession::new(GeoJsonRenderer::default(), &network);
            session.show_locations(&network);
            print_geojson(session.renderer())?;
        }

        Command::Route { start, end } => {
            let mut session = MapSession::new(GeoJsonRenderer::default(), &network);
            let status = session.show_route(&network, &start, &end);
            if !matches!(status, Status::Route(_)) {
                return Err(status.to_string().into());
            }

            eprintln!("{}", status);
            print_geojson(session.renderer())?;
        }

        Command::Track { max_path_points } => {
            let store = JsonLinesStore::new(io::stdout().lock());
            let mut tracker = Tracker::new(store, TrackerOptions { max_path_points });
            tracker.run(JsonLinesSource::new(io::stdin().lock()))?;

            if let Some(&last) = tracker.path().last() {
                if let Some((name, _)) = network.find_nearest_location(last) {
                    eprintln!("Travelled {:.3} km, last seen near {}", tracker.distance(), name);
                }
            }
        }
    }

    Ok(())
}

fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, 2) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    }
}

fn print_geojson(renderer: &GeoJsonRenderer) -> Result<(), serde_json::Error> {
    let out = io::stdout().lock();
    serde_json::to_writer_pretty(out, &renderer.to_geojson())?;
    println!();
    Ok(())
}

fn load_network<P: AsRef<Path>>(path: P) -> Result<Network, NetworkLoadError> {
    let mut n = Network::default();
    let options = cityroute::network::Options::default();
    match cityroute::network::add_features_from_file(&mut n, &options, path.as_ref()) {
        Ok(()) => Ok(n),
        Err(e) => Err(NetworkLoadError(PathBuf::from(path.as_ref()), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags() {
        let cli = Cli::try_parse_from(["cityroute", "-vv", "locations"]).unwrap();
        assert_eq!(log_level(cli.verbose, cli.quiet), log::LevelFilter::Debug);

        let cli = Cli::try_parse_from(["cityroute", "locations", "-q"]).unwrap();
        assert_eq!(log_level(cli.verbose, cli.quiet), log::LevelFilter::Error);

        let cli = Cli::try_parse_from(["cityroute", "-v", "--quiet", "locations"]).unwrap();
        assert_eq!(log_level(cli.verbose, cli.quiet), log::LevelFilter::Error);

        let cli = Cli::try_parse_from(["cityroute", "route", "Hebbal", "Majestic"]).unwrap();
        assert_eq!(log_level(cli.verbose, cli.quiet), log::LevelFilter::Warn);
    }
}
