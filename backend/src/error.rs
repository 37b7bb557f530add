use thiserror::Error;

use crate::network::TablesError;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("reference tables error: {0}")]
    Tables(#[from] TablesError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("no incident API configured")]
    UpstreamNotConfigured,
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}
