use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

pub mod export;
pub mod import;
pub mod loader;
pub mod model;

pub use export::export_gpx;
pub use import::{GpxData, GpxSummary, TrackPoint};
pub use loader::{fetch, load_file};

#[derive(Debug, Clone)]
pub enum GpxError {
    Parse(Arc<serde_xml_rs::Error>),
    Io(Arc<io::Error>),
    Request(Arc<reqwest::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
    },
    InvalidTrackPoint {
        index: usize,
        reason: String,
    },
}

impl error::Error for GpxError {}

impl fmt::Display for GpxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GpxError::Parse(e) => write!(f, "GPX parse error: {}", e),
            GpxError::Io(e) => write!(f, "Failed to read GPX file: {}", e),
            GpxError::Request(e) => write!(f, "HTTP request error: {}", e),
            GpxError::InvalidResponse { status_code, url } => {
                write!(f, "Failed to load GPX file ({}) {}", status_code, url)
            }
            GpxError::InvalidTrackPoint { index, reason } => {
                write!(f, "Invalid track point {}: {}", index, reason)
            }
        }
    }
}

impl From<serde_xml_rs::Error> for GpxError {
    fn from(e: serde_xml_rs::Error) -> Self {
        GpxError::Parse(Arc::new(e))
    }
}

impl From<io::Error> for GpxError {
    fn from(e: io::Error) -> Self {
        GpxError::Io(Arc::new(e))
    }
}

impl From<reqwest::Error> for GpxError {
    fn from(e: reqwest::Error) -> Self {
        GpxError::Request(Arc::new(e))
    }
}
