//! Client configuration: API key, endpoints and timeout.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 6;
const DEFAULT_PERSONALIZATION_URL: &str = "https://personalization.stream-io-api.com/personalization/v1.0/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: String,
    /// Region prefix such as `us-east`; ignored when `base_url` is set.
    pub region: Option<String>,
    /// Full API base URL, overriding the region-derived default.
    pub base_url: Option<String>,
    pub personalization_url: Option<String>,
    pub timeout_secs: u64,
    /// Pre-issued token sent verbatim in the `Authorization` header.
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_key: String::new(),
            region: None,
            base_url: None,
            personalization_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth_token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        ClientConfig {
            api_key: api_key.into(),
            ..ClientConfig::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_personalization_url(mut self, url: impl Into<String>) -> Self {
        self.personalization_url = Some(url.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Read `STREAM_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("STREAM_API_KEY")
            .ok_or_else(|| Error::Config("STREAM_API_KEY not set".to_string()))?;
        let timeout_secs = match get("STREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("STREAM_TIMEOUT_SECS is not a number: {raw:?}")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let config = ClientConfig {
            api_key,
            region: get("STREAM_REGION"),
            base_url: get("STREAM_URL"),
            personalization_url: get("STREAM_PERSONALIZATION_URL"),
            timeout_secs,
            auth_token: get("STREAM_AUTH_TOKEN"),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: ClientConfig =
            toml::from_str(input).map_err(|e| Error::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::Config("api_key must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        self.api_base()?;
        self.personalization_base()?;
        Ok(())
    }

    /// Base URL of the main API, always ending in `/`.
    pub fn api_base(&self) -> Result<Url> {
        let raw = match (&self.base_url, &self.region) {
            (Some(url), _) => url.clone(),
            (None, Some(region)) if !region.is_empty() => {
                format!("https://{region}-api.stream-io-api.com/api/v1.0/")
            }
            _ => "https://api.stream-io-api.com/api/v1.0/".to_string(),
        };
        parse_base(&raw)
    }

    pub fn personalization_base(&self) -> Result<Url> {
        parse_base(
            self.personalization_url
                .as_deref()
                .unwrap_or(DEFAULT_PERSONALIZATION_URL),
        )
    }
}

// Bases always end with a slash; endpoint segments are appended below it.
fn parse_base(raw: &str) -> Result<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_base_urls() {
        let cfg = ClientConfig::new("key");
        assert_eq!(cfg.api_base().unwrap().as_str(), "https://api.stream-io-api.com/api/v1.0/");
        assert_eq!(
            cfg.personalization_base().unwrap().as_str(),
            "https://personalization.stream-io-api.com/personalization/v1.0/"
        );
        assert_eq!(cfg.timeout_secs, 6);
    }

    #[test]
    fn test_region_base_url() {
        let cfg = ClientConfig::new("key").with_region("us-east");
        assert_eq!(
            cfg.api_base().unwrap().as_str(),
            "https://us-east-api.stream-io-api.com/api/v1.0/"
        );
    }

    #[test]
    fn test_explicit_base_url_gets_trailing_slash() {
        let cfg = ClientConfig::new("key")
            .with_region("ignored")
            .with_base_url("http://localhost:8000/api/v1.0");
        assert_eq!(cfg.api_base().unwrap().as_str(), "http://localhost:8000/api/v1.0/");
    }

    #[test]
    fn test_from_lookup_reads_all_vars() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("STREAM_API_KEY", "k1"),
            ("STREAM_REGION", "eu-west"),
            ("STREAM_TIMEOUT_SECS", "15"),
            ("STREAM_AUTH_TOKEN", "tok"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_key, "k1");
        assert_eq!(cfg.region.as_deref(), Some("eu-west"));
        assert_eq!(cfg.timeout_secs, 15);
        assert_eq!(cfg.auth_token.as_deref(), Some("tok"));
        assert!(cfg.base_url.is_none());
    }

    #[test]
    fn test_from_lookup_requires_api_key() {
        let err = ClientConfig::from_lookup(lookup(&[("STREAM_REGION", "x")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = ClientConfig::from_lookup(lookup(&[("STREAM_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("STREAM_API_KEY", "k"),
            ("STREAM_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("STREAM_TIMEOUT_SECS"));
    }

    #[test]
    fn test_from_toml_str_partial() {
        let cfg = ClientConfig::from_toml_str("api_key = \"abc\"\nregion = \"us-west\"\n").unwrap();
        assert_eq!(cfg.api_key, "abc");
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(
            cfg.api_base().unwrap().as_str(),
            "https://us-west-api.stream-io-api.com/api/v1.0/"
        );
    }

    #[test]
    fn test_from_toml_str_rejects_missing_key() {
        assert!(matches!(ClientConfig::from_toml_str("region = \"x\""), Err(Error::Config(_))));
        assert!(matches!(ClientConfig::from_toml_str("api_key = 5"), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_url() {
        assert!(ClientConfig::new("k").with_timeout_secs(0).validate().is_err());
        assert!(ClientConfig::new("k").with_base_url("not a url").validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"from-file\"\ntimeout_secs = 2").unwrap();
        let cfg = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.api_key, "from-file");
        assert_eq!(cfg.timeout_secs, 2);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
