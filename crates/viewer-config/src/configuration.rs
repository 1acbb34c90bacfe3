//! The configuration value handed to the rendering engine.

use std::{
    fmt::{self, Display},
    fs,
    path::Path,
};

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::Error;

/// Where a configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    /// Baked into the artifact at build time.
    Embedded,
    /// Fetched from the `config` query parameter URL.
    Url,
    /// Read from a dropped or picked file.
    File,
    /// Pasted into the setup surface.
    Pasted,
}

impl ConfigOrigin {
    /// Stable lowercase name used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Url => "url",
            Self::File => "file",
            Self::Pasted => "pasted",
        }
    }
}

impl Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An acceptable configuration: text that parsed as JSON.
///
/// The structure of the value is owned by the rendering engine and is not inspected here.
/// The only way to obtain a `Configuration` is through parsing, so holding one proves the
/// text was valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Source of the text.
    origin: ConfigOrigin,
    /// Exact text received.
    raw: String,
    /// Parsed value.
    value: Value,
}

impl Configuration {
    /// Parse `raw` as JSON, tagging the result with `origin`.
    pub fn parse(origin: ConfigOrigin, raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        let value = serde_json::from_str::<Value>(&raw)
            .map_err(|e| Error::from_json(None, &raw, &e))?;
        trace!(origin = %origin, bytes = raw.len(), "config_parsed");
        Ok(Self { origin, raw, value })
    }

    /// Read and parse a configuration file from disk.
    pub fn from_path(origin: ConfigOrigin, path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path).map_err(|e| Error::Read {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;
        let value = serde_json::from_str::<Value>(&raw)
            .map_err(|e| Error::from_json(Some(path.to_path_buf()), &raw, &e))?;
        Ok(Self { origin, raw, value })
    }

    /// The source this configuration was acquired from.
    pub fn origin(&self) -> ConfigOrigin {
        self.origin
    }

    /// The exact text that was parsed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed JSON value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// True when the document is the JSON literal `null`.
    ///
    /// A null embedded default is treated as absent.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_keeps_raw_text_and_origin() {
        let raw = "{ \"a\" : 1 }";
        let cfg = Configuration::parse(ConfigOrigin::Pasted, raw).unwrap();
        assert_eq!(cfg.raw(), raw);
        assert_eq!(cfg.origin(), ConfigOrigin::Pasted);
        assert_eq!(cfg.value()["a"], 1);
    }

    #[test]
    fn parse_rejects_missing_value() {
        let err = Configuration::parse(ConfigOrigin::File, "{\"a\":}").unwrap_err();
        match err {
            Error::Parse {
                line, col, message, ..
            } => {
                assert_eq!(line, 1);
                assert_eq!(col, 6);
                assert!(message.contains("expected value"), "{message}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parse_accepts_any_json_document() {
        for raw in ["[]", "42", "\"text\"", "null", "{\"columns\":[]}"] {
            assert!(Configuration::parse(ConfigOrigin::Url, raw).is_ok(), "{raw}");
        }
        assert!(
            Configuration::parse(ConfigOrigin::Embedded, "null")
                .unwrap()
                .is_null()
        );
    }

    #[test]
    fn parse_rejects_empty_text() {
        let err = Configuration::parse(ConfigOrigin::Pasted, "").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn from_path_reports_read_and_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = Configuration::from_path(ConfigOrigin::File, &missing).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert_eq!(err.path(), Some(missing.as_path()));

        let bad = dir.path().join("bad.json");
        let mut f = fs::File::create(&bad).unwrap();
        writeln!(f, "{{\n  \"columns\": [1, 2,]\n}}").unwrap();
        let err = Configuration::from_path(ConfigOrigin::File, &bad).unwrap_err();
        match &err {
            Error::Parse { line, excerpt, .. } => {
                assert_eq!(*line, 2);
                assert!(excerpt.contains("\"columns\""));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(err.pretty().contains("bad.json:2:"));
    }

    #[test]
    fn origin_names_are_stable() {
        assert_eq!(ConfigOrigin::Embedded.to_string(), "embedded");
        assert_eq!(
            serde_json::to_string(&ConfigOrigin::Pasted).unwrap(),
            "\"pasted\""
        );
    }
}
