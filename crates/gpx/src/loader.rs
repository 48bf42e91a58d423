use std::path::Path;

use crate::{import::GpxData, GpxError};

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<GpxData, GpxError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    log::debug!("Loaded GPX file '{}'.", path.as_ref().display());
    GpxData::parse(&content)
}

/// Downloads and parses a GPX document. No retries.
pub async fn fetch(url: &str) -> Result<GpxData, GpxError> {
    log::info!("Requesting GPX file '{url}'.");
    let response = reqwest::get(url).await?;
    match response.status() {
        reqwest::StatusCode::OK => GpxData::parse(&response.text().await?),
        status_code => Err(GpxError::InvalidResponse {
            status_code,
            url: url.to_owned(),
        }),
    }
}
