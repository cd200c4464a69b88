use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};

/// Read-only access to the county reference dataset (a GeoJSON
/// FeatureCollection), wherever it lives.
pub trait CountySource {
    fn read(&self) -> Result<Arc<[u8]>>;

    /// Human-readable origin, for logs and error messages.
    fn describe(&self) -> String;
}

/// Dataset stored in a file on disk.
pub struct DiskSource {
    path: PathBuf,
}

impl DiskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl CountySource for DiskSource {
    fn read(&self) -> Result<Arc<[u8]>> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read county dataset {}", self.path.display()))?;
        Ok(Arc::from(bytes))
    }

    fn describe(&self) -> String { self.path.display().to_string() }
}

/// Dataset already held in memory (e.g. handed over by a browser fetch).
#[derive(Clone)]
pub struct MemSource {
    bytes: Arc<[u8]>,
}

impl MemSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self { Self { bytes: bytes.into() } }
}

impl CountySource for MemSource {
    fn read(&self) -> Result<Arc<[u8]>> { Ok(self.bytes.clone()) }

    fn describe(&self) -> String { format!("<memory: {} bytes>", self.bytes.len()) }
}

/// Dataset fetched over HTTP with a blocking client.
#[cfg(feature = "download")]
pub struct HttpSource {
    url: String,
    timeout: std::time::Duration,
}

#[cfg(feature = "download")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), timeout: std::time::Duration::from_secs(60) }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(feature = "download")]
impl CountySource for HttpSource {
    fn read(&self) -> Result<Arc<[u8]>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("build HTTP client")?;

        tracing::debug!(url = %self.url, "fetching county dataset");
        let bytes = client.get(&self.url).send()
            .with_context(|| format!("GET {}", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {}", self.url))?
            .bytes()
            .with_context(|| format!("read body of {}", self.url))?;

        Ok(Arc::from(bytes.to_vec()))
    }

    fn describe(&self) -> String { self.url.clone() }
}
