use doc_genie::config::parse_or;
use doc_genie::{GenieError, Result};
use std::env;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 200;

#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_upload_mb: usize = parse_or(&lookup, "GENIE_MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?;
        if max_upload_mb == 0 {
            return Err(GenieError::config("GENIE_MAX_UPLOAD_MB must be at least 1"));
        }

        Ok(Self {
            bind_addr: lookup("GENIE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}
