//! Article image downloads.
//!
//! Images are fetched over plain HTTP and stored under the output directory
//! with a random `<uuid>.jpg` name. Failures are logged and reported as "no
//! image"; they never fail the article.

use crate::pipeline::ImageStore;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Stores images as files in a directory.
pub struct HttpImageStore {
    client: Client,
    directory: PathBuf,
}

impl HttpImageStore {
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;
        Ok(Self {
            client,
            directory: directory.into(),
        })
    }

    fn unique_filename() -> String {
        format!("{}.jpg", Uuid::new_v4())
    }
}

impl ImageStore for HttpImageStore {
    #[instrument(level = "debug", skip(self))]
    async fn download(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Error downloading image");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Failed to download image");
            return None;
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Error reading image body");
                return None;
            }
        };

        let filename = Self::unique_filename();
        let path = self.directory.join(&filename);
        if let Err(e) = fs::write(&path, &bytes).await {
            warn!(path = %path.display(), error = %e, "Failed to save image");
            return None;
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Image saved");
        Some(filename)
    }
}
