//! `viewer-build resolve`: run the bootstrap resolver headlessly.
//!
//! The engine here only summarises the configuration it is handed, which makes the command
//! useful for checking what a deployed `?config=` URL or an embedded default would resolve to.

use std::{path::PathBuf, result::Result as StdResult, sync::Arc};

use async_trait::async_trait;
use clap::Args;
use serde_json::Value;
use tokio::runtime;
use tracing::info;
use viewer_bootstrap::{
    AttemptOutcome, ConfigFetcher, EngineFactory, HttpFetcher, LaunchParams, Mount,
    RenderEngine, RenderError, ResolutionReport, Session, SourceKind, SourcePriority,
    TracingSurface,
};
use viewer_config::{ConfigOrigin, Configuration};

use crate::{Error, Result};

/// Arguments for `viewer-build resolve`.
#[derive(Debug, Clone, Default, Args)]
pub struct ResolveArgs {
    /// Remote configuration URL, as passed in `?config=`.
    #[arg(long, conflicts_with = "page_url")]
    pub config_url: Option<String>,
    /// Full page URL; its `config` query parameter is used.
    #[arg(long)]
    pub page_url: Option<String>,
    /// File standing in for the embedded default.
    #[arg(long = "default", value_name = "PATH")]
    pub default_config: Option<PathBuf>,
    /// Try the embedded default before the URL.
    #[arg(long)]
    pub prefer_embedded: bool,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ResolveArgs {
    /// Launch parameters described by these arguments.
    fn launch(&self) -> LaunchParams {
        match (&self.config_url, &self.page_url) {
            (Some(url), _) => LaunchParams::with_config_url(url.clone()),
            (None, Some(page)) => LaunchParams::from_page_url(page),
            (None, None) => LaunchParams::none(),
        }
    }

    /// Source priority described by these arguments.
    fn priority(&self) -> SourcePriority {
        if self.prefer_embedded {
            SourcePriority::EmbeddedFirst
        } else {
            SourcePriority::UrlFirst
        }
    }
}

/// Run `viewer-build resolve`.
pub fn resolve_cmd(args: &ResolveArgs) -> Result<()> {
    let rt = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| Error::Runtime { source })?;
    let fetcher: Arc<dyn ConfigFetcher> = Arc::new(HttpFetcher::new()?);
    let report = rt.block_on(resolve(args, fetcher))?;

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => println!("{{\"error\": \"{e}\"}}"),
        }
    } else {
        print_report(&report);
    }

    if report.state.is_rendering() {
        Ok(())
    } else {
        Err(Error::Unresolved {
            state: report.state.name(),
        })
    }
}

/// Resolve with the given fetcher and the summary engine.
pub async fn resolve(
    args: &ResolveArgs,
    fetcher: Arc<dyn ConfigFetcher>,
) -> Result<ResolutionReport> {
    let embedded = match &args.default_config {
        Some(path) => Some(
            Configuration::from_path(ConfigOrigin::Embedded, path).map_err(|source| {
                Error::InvalidConfig {
                    path: path.clone(),
                    source,
                }
            })?,
        ),
        None => None,
    };

    let session = Session::builder(Arc::new(SummaryFactory), Arc::new(TracingSurface::new()))
        .fetcher(fetcher)
        .embedded_default(embedded)
        .priority(args.priority())
        .build();
    Ok(session.resolve_on_load(&args.launch()).await)
}

/// Human-readable report.
fn print_report(report: &ResolutionReport) {
    println!("==> Attempts");
    for attempt in &report.attempts {
        let source = source_name(attempt.source);
        let outcome = match &attempt.outcome {
            AttemptOutcome::Success => "success".to_string(),
            AttemptOutcome::ParseError(m) => format!("parse error: {m}"),
            AttemptOutcome::TransportError(m) => format!("transport error: {m}"),
            AttemptOutcome::NotAttempted => "not attempted".to_string(),
        };
        println!("    {source:<9} {outcome}");
    }
    println!("==> Final state: {}", report.state.name());
}

/// Label for a source in the text report.
fn source_name(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Url => "url",
        SourceKind::Embedded => "embedded",
        SourceKind::Drop => "drop",
        SourceKind::FilePicker => "picker",
        SourceKind::Paste => "paste",
    }
}

/// Engine factory for headless runs.
#[derive(Debug, Default)]
struct SummaryFactory;

impl EngineFactory for SummaryFactory {
    fn construct(
        &self,
        config: Configuration,
    ) -> StdResult<Box<dyn RenderEngine>, RenderError> {
        match config.value() {
            Value::Object(_) => Ok(Box::new(SummaryEngine { config })),
            other => Err(RenderError::new(format!(
                "configuration must be a JSON object, got {}",
                kind(other)
            ))),
        }
    }
}

/// Logs a summary instead of rendering.
struct SummaryEngine {
    /// The configuration being "rendered".
    config: Configuration,
}

#[async_trait]
impl RenderEngine for SummaryEngine {
    async fn render(&self, mount: &Mount) -> StdResult<(), RenderError> {
        let keys = match self.config.value() {
            Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(","),
            _ => String::new(),
        };
        info!(
            mount = mount.id(),
            origin = %self.config.origin(),
            bytes = self.config.raw().len(),
            keys = %keys,
            "config_summarised"
        );
        Ok(())
    }
}

/// JSON kind name for messages.
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use viewer_bootstrap::{BootstrapState, test_support::StaticFetcher};

    use super::*;

    const URL: &str = "https://example.org/genome.json";

    fn fetcher(f: StaticFetcher) -> Arc<dyn ConfigFetcher> {
        Arc::new(f)
    }

    #[tokio::test]
    async fn url_config_is_rendered() {
        let args = ResolveArgs {
            config_url: Some(URL.into()),
            ..ResolveArgs::default()
        };
        let report = resolve(&args, fetcher(StaticFetcher::new().with_body(URL, r#"{"app":{}}"#)))
            .await
            .unwrap();
        assert_eq!(report.chosen(), Some(SourceKind::Url));
        assert_eq!(
            report.state,
            BootstrapState::Rendering {
                origin: ConfigOrigin::Url
            }
        );
    }

    #[tokio::test]
    async fn falls_back_to_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.json");
        fs::write(&path, r#"{"tables":[]}"#).unwrap();
        let args = ResolveArgs {
            page_url: Some("https://viewer.example.org/?config=missing.json".into()),
            default_config: Some(path),
            ..ResolveArgs::default()
        };
        let report = resolve(&args, fetcher(StaticFetcher::new())).await.unwrap();
        assert_eq!(report.chosen(), Some(SourceKind::Embedded));
        assert!(matches!(
            report.attempt(SourceKind::Url).map(|a| &a.outcome),
            Some(AttemptOutcome::TransportError(_))
        ));
    }

    #[tokio::test]
    async fn non_object_config_fails_to_render() {
        let args = ResolveArgs {
            config_url: Some(URL.into()),
            ..ResolveArgs::default()
        };
        let report = resolve(&args, fetcher(StaticFetcher::new().with_body(URL, "[1,2]")))
            .await
            .unwrap();
        match report.state {
            BootstrapState::SetupVisible { error: Some(message) } => {
                assert_eq!(
                    message,
                    "Failed to initialize viewer: configuration must be a JSON object, got an array"
                );
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.json");
        fs::write(&path, "{").unwrap();
        let args = ResolveArgs {
            default_config: Some(path),
            ..ResolveArgs::default()
        };
        let err = resolve(&args, fetcher(StaticFetcher::new())).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
