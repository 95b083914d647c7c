//! Reference score tables of published methods.
//!
//! A baseline is a score table in the CSV layout of [`crate::table`],
//! including the `method` column, that gets unioned into a
//! [`MethodCollection`](crate::MethodCollection).

use crate::error::Result;
use crate::table::{EvalTable, read_csv};

/// Environment variable the CLI reads the baseline URL from.
pub const BASELINE_URL_ENV: &str = "SEP_EVAL_BASELINE_URL";

/// Provider of a serialized baseline table.
pub trait BaselineSource {
    /// Short description for logs, e.g. the URL.
    fn describe(&self) -> String;

    /// Fetch the serialized table.
    fn fetch(&self) -> Result<Vec<u8>>;

    /// Fetch and decode the table.
    fn load_table(&self) -> Result<EvalTable> {
        let bytes = self.fetch()?;
        read_csv(bytes.as_slice())
    }
}

/// Baseline table already held in memory.
#[derive(Debug, Clone)]
pub struct StaticBaseline {
    data: Vec<u8>,
}

impl StaticBaseline {
    /// Wrap serialized table bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl BaselineSource for StaticBaseline {
    fn describe(&self) -> String {
        format!("in-memory table ({} bytes)", self.data.len())
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

/// Baseline table downloaded with a blocking HTTP GET.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpBaseline {
    url: String,
}

#[cfg(feature = "remote")]
impl HttpBaseline {
    /// Baseline served at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// URL of the table.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "remote")]
impl BaselineSource for HttpBaseline {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        use crate::error::Error;

        let response = reqwest::blocking::get(&self.url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::Baseline(format!("{}: {e}", self.url)))?;
        let bytes = response
            .bytes()
            .map_err(|e| Error::Baseline(format!("{}: {e}", self.url)))?;
        Ok(bytes.to_vec())
    }
}
