//! Bootstrap state, acquisition attempts, and operation outcomes.

use serde::Serialize;
use viewer_config::ConfigOrigin;

/// Lifecycle of a viewer session.
///
/// `Rendering` and `SetupVisible` are the resting states. `RenderFailed` is transient and is
/// always followed by `SetupVisible` carrying the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum BootstrapState {
    /// Running the automatic fallback chain.
    Resolving,
    /// Waiting on the setup surface, optionally showing an inline error.
    SetupVisible {
        /// Inline error currently displayed.
        error: Option<String>,
    },
    /// A configuration was handed to the engine.
    Rendering {
        /// Source of the configuration in use.
        origin: ConfigOrigin,
    },
    /// The engine failed to construct or render.
    RenderFailed {
        /// The engine's message.
        message: String,
    },
}

impl BootstrapState {
    /// Short kebab-case name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::SetupVisible { .. } => "setup-visible",
            Self::Rendering { .. } => "rendering",
            Self::RenderFailed { .. } => "render-failed",
        }
    }

    /// True for the setup-visible state.
    pub fn is_setup_visible(&self) -> bool {
        matches!(self, Self::SetupVisible { .. })
    }

    /// True for the rendering state.
    pub fn is_rendering(&self) -> bool {
        matches!(self, Self::Rendering { .. })
    }
}

/// One way of acquiring a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Remote URL from the `config` query parameter.
    Url,
    /// Default baked into the artifact.
    Embedded,
    /// File dropped onto the drop target.
    Drop,
    /// File chosen through the file picker.
    FilePicker,
    /// Text committed from the paste area.
    Paste,
}

impl SourceKind {
    /// The origin a configuration from this source carries.
    pub fn origin(self) -> ConfigOrigin {
        match self {
            Self::Url => ConfigOrigin::Url,
            Self::Embedded => ConfigOrigin::Embedded,
            Self::Drop | Self::FilePicker => ConfigOrigin::File,
            Self::Paste => ConfigOrigin::Pasted,
        }
    }
}

/// Result of a single acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "kebab-case")]
pub enum AttemptOutcome {
    /// The source produced acceptable JSON.
    Success,
    /// The source produced text that is not JSON.
    ParseError(String),
    /// The text could not be obtained.
    TransportError(String),
    /// The source was absent or not reached.
    NotAttempted,
}

/// One try of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionAttempt {
    /// Which source was tried.
    pub source: SourceKind,
    /// What happened.
    pub outcome: AttemptOutcome,
}

impl AcquisitionAttempt {
    /// Build an attempt record.
    pub fn new(source: SourceKind, outcome: AttemptOutcome) -> Self {
        Self { source, outcome }
    }

    /// Shorthand for an attempt that was never made.
    pub fn not_attempted(source: SourceKind) -> Self {
        Self::new(source, AttemptOutcome::NotAttempted)
    }

    /// Whether the attempt produced a configuration.
    pub fn succeeded(&self) -> bool {
        self.outcome == AttemptOutcome::Success
    }
}

/// Result of one acquire/load invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum AcquireOutcome {
    /// The engine rendered the configuration.
    Rendered {
        /// Source of the configuration.
        origin: ConfigOrigin,
    },
    /// The input was unreadable or not JSON; the setup surface shows `message`.
    Rejected {
        /// Inline message shown to the user.
        message: String,
    },
    /// The engine failed; the setup surface is back with the error.
    RenderFailed {
        /// The engine's message.
        message: String,
    },
    /// A newer request replaced this one before it finished.
    Superseded,
    /// Nothing to do (blank paste, empty file list).
    Ignored,
}

/// Summary of the automatic on-load resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Attempts in the order they were considered.
    pub attempts: Vec<AcquisitionAttempt>,
    /// Outcome of the render handoff, when a source succeeded.
    pub handoff: Option<AcquireOutcome>,
    /// Session state when resolution returned.
    pub state: BootstrapState,
}

impl ResolutionReport {
    /// The source that supplied the configuration, if any.
    pub fn chosen(&self) -> Option<SourceKind> {
        self.attempts
            .iter()
            .find(|a| a.succeeded())
            .map(|a| a.source)
    }

    /// The recorded attempt for `source`.
    pub fn attempt(&self, source: SourceKind) -> Option<&AcquisitionAttempt> {
        self.attempts.iter().find(|a| a.source == source)
    }
}
