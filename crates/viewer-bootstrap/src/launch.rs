//! Launch-time inputs: the page URL's `config` parameter and source priority.

use reqwest::Url;
use tracing::warn;
use viewer_config::CONFIG_QUERY_PARAM;

/// Relative order of the two automatic sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourcePriority {
    /// Remote URL first, then the embedded default.
    #[default]
    UrlFirst,
    /// Embedded default first; the URL is only consulted when there is no default.
    EmbeddedFirst,
}

/// Parameters the page was opened with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchParams {
    /// Absolute URL of a remote configuration.
    config_url: Option<String>,
}

impl LaunchParams {
    /// No launch parameters.
    pub fn none() -> Self {
        Self::default()
    }

    /// Launch with an explicit config URL. An empty string counts as absent.
    pub fn with_config_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            config_url: (!url.is_empty()).then_some(url),
        }
    }

    /// Extract the `config` parameter from the page URL.
    ///
    /// Relative values resolve against the page URL. An unparsable page URL yields no
    /// parameters.
    pub fn from_page_url(page: &str) -> Self {
        let base = match Url::parse(page) {
            Ok(u) => u,
            Err(e) => {
                warn!(page, error = %e, "page_url_unparsable");
                return Self::none();
            }
        };
        let Some(raw) = base
            .query_pairs()
            .find(|(k, _)| k == CONFIG_QUERY_PARAM)
            .map(|(_, v)| v.into_owned())
        else {
            return Self::none();
        };
        if raw.is_empty() {
            return Self::none();
        }
        let resolved = base.join(&raw).map(String::from).unwrap_or(raw);
        Self {
            config_url: Some(resolved),
        }
    }

    /// The remote config URL, if one was supplied.
    pub fn config_url(&self) -> Option<&str> {
        self.config_url.as_deref()
    }
}
