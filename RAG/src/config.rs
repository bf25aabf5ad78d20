use std::env;
use std::str::FromStr;

use crate::error::{GenieError, Result};
use crate::vector_index::DistanceMetric;

pub const CREDENTIAL_VAR: &str = "GOOGLE_API_KEY";

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_SEPARATOR: &str = "\n";

pub const DEFAULT_TOP_K: usize = 4;

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub gemini: GeminiSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
}

#[derive(Clone)]
pub struct GeminiSettings {
    /// `None` when the credential variable is unset or blank.
    pub api_key: Option<String>,
    pub api_base: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f32,
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("embedding_model", &self.embedding_model)
            .field("chat_model", &self.chat_model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separator: String,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl ChunkingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(GenieError::config("chunk size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(GenieError::config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.separator.is_empty() {
            return Err(GenieError::config("chunk separator must not be empty"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub metric: DistanceMetric,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            metric: DistanceMetric::default(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment. Call `dotenv::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini = GeminiSettings {
            api_key: lookup(CREDENTIAL_VAR)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            api_base: lookup("GENIE_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            embedding_model: lookup("GENIE_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            chat_model: lookup("GENIE_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            temperature: parse_or(&lookup, "GENIE_TEMPERATURE", DEFAULT_TEMPERATURE)?,
        };

        let chunking = ChunkingSettings {
            chunk_size: parse_or(&lookup, "GENIE_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: parse_or(&lookup, "GENIE_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            separator: lookup("GENIE_CHUNK_SEPARATOR")
                .map(|v| unescape(&v))
                .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string()),
        };

        let retrieval = RetrievalSettings {
            top_k: parse_or(&lookup, "GENIE_TOP_K", DEFAULT_TOP_K)?,
            metric: parse_or(&lookup, "GENIE_DISTANCE", DistanceMetric::default())?,
        };

        let settings = Self {
            gemini,
            chunking,
            retrieval,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(GenieError::config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.gemini.temperature
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(GenieError::config("top_k must be at least 1"));
        }
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}

/// Parses `key` with `FromStr`, falling back to `default` when unset.
/// A value that is set but unparsable is a configuration error.
pub fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| GenieError::config(format!("invalid value for {}: {:?} ({})", key, raw, e))),
        None => Ok(default),
    }
}

// `.env` files hand us a literal backslash-n for the newline separator.
fn unescape(raw: &str) -> String {
    raw.replace("\\n", "\n").replace("\\t", "\t").replace("\\r", "\r")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_fixed_pipeline_parameters() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.chunking.separator, "\n");
        assert_eq!(settings.gemini.temperature, 0.7);
        assert_eq!(settings.gemini.embedding_model, "models/embedding-001");
        assert_eq!(settings.gemini.chat_model, "gemini-1.5-flash");
        assert_eq!(settings.retrieval.top_k, 4);
        assert_eq!(settings.retrieval.metric, DistanceMetric::L2);
        assert!(!settings.has_credential());
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let settings = Settings::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "   ")])).unwrap();
        assert!(settings.gemini.api_key.is_none());

        let settings = Settings::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "abc123")])).unwrap();
        assert_eq!(settings.gemini.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn overrides_are_parsed() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GENIE_CHUNK_SIZE", "500"),
            ("GENIE_CHUNK_OVERLAP", "50"),
            ("GENIE_CHUNK_SEPARATOR", "\\n\\n"),
            ("GENIE_TOP_K", "2"),
            ("GENIE_DISTANCE", "cosine"),
            ("GENIE_API_BASE", "http://localhost:9999/v1beta/"),
        ]))
        .unwrap();
        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.chunk_overlap, 50);
        assert_eq!(settings.chunking.separator, "\n\n");
        assert_eq!(settings.retrieval.top_k, 2);
        assert_eq!(settings.retrieval.metric, DistanceMetric::Cosine);
        assert_eq!(settings.gemini.api_base, "http://localhost:9999/v1beta");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Settings::from_lookup(lookup_from(&[("GENIE_CHUNK_SIZE", "lots")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("GENIE_CHUNK_OVERLAP", "1000")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("GENIE_TEMPERATURE", "3.5")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("GENIE_TOP_K", "0")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("GENIE_DISTANCE", "manhattan")])).is_err());
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let settings = Settings::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "secret-key")])).unwrap();
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
