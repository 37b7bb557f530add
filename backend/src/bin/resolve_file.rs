use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Parser;
use oncf_backend::markers::build_markers;
use oncf_backend::models::{Incident, PositionsResponse};
use oncf_backend::resolver::IncidentLocator;
use oncf_backend::stats::map_statistics;
use oncf_backend::tables::ReferenceTables;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Resolve a JSON dump of incidents to map positions offline"
)]
struct Args {
    /// JSON array of incidents, as served by `/api/evenements`
    #[arg(long)]
    input: PathBuf,

    /// Where to write the positions; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Alternative reference tables
    #[arg(long)]
    tables: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let locator = match &args.tables {
        Some(path) => IncidentLocator::new(ReferenceTables::from_path(path)?)?,
        None => IncidentLocator::oncf().clone(),
    };

    let incidents: Vec<Incident> = serde_json::from_reader(BufReader::new(File::open(&args.input)?))?;
    tracing::info!("Resolving {} incidents from {}", incidents.len(), args.input.display());

    let response = PositionsResponse {
        markers: build_markers(&locator, &incidents),
        statistics: map_statistics(&incidents),
    };

    match &args.output {
        Some(path) => {
            serde_json::to_writer_pretty(File::create(path)?, &response)?;
            tracing::info!("Wrote {} markers to {}", response.markers.len(), path.display());
        }
        None => serde_json::to_writer_pretty(std::io::stdout().lock(), &response)?,
    }
    Ok(())
}
