use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::error::LocatorError;
use crate::resolver::IncidentLocator;
use crate::tables::ReferenceTables;
use crate::upstream::UpstreamClient;

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Place ONCF railway incidents on the network map"
)]
pub struct Args {
    /// Address the HTTP service listens on
    #[arg(long, env = "ONCF_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Base URL of the dashboard API serving `/api/evenements`
    #[arg(long, env = "ONCF_API_URL")]
    pub upstream_url: Option<String>,

    /// JSON file replacing the built-in reference tables
    #[arg(long, env = "ONCF_TABLES")]
    pub tables: Option<PathBuf>,

    /// Page size requested from the dashboard API
    #[arg(long, env = "ONCF_PER_PAGE", default_value_t = 500)]
    pub per_page: u32,
}

impl Args {
    pub fn locator(&self) -> Result<IncidentLocator, LocatorError> {
        match &self.tables {
            Some(path) => {
                let tables = ReferenceTables::from_path(path)?;
                tracing::info!("Loaded reference tables from {}", path.display());
                Ok(IncidentLocator::new(tables)?)
            }
            None => Ok(IncidentLocator::oncf().clone()),
        }
    }

    pub fn upstream(&self) -> Option<UpstreamClient> {
        self.upstream_url
            .as_deref()
            .map(|url| UpstreamClient::new(url, self.per_page))
    }
}
