//! Viewer Bootstrap
//!
//! Decides, once per page load, which configuration the table viewer renders with:
//! - the remote URL named by the `config` query parameter,
//! - else the default embedded in the artifact at build time,
//! - else whatever the user supplies on the setup surface (drop, file picker, paste).
//!
//! [`Session`] owns the state machine and is the only public entry point for driving it.
//! The rendering engine, the setup surface, and the HTTP fetcher are injected through
//! [`EngineFactory`], [`SetupSurface`], and [`ConfigFetcher`].

mod engine;
mod error;
mod fetch;
mod input;
mod launch;
mod session;
mod state;
mod surface;
pub mod test_support;

pub use engine::{EngineFactory, Mount, RenderEngine};
pub use error::{RenderError, TransportError};
pub use fetch::{ConfigFetcher, HttpFetcher};
pub use input::{ConfigFile, ConfigInput, DiskFile, MemoryFile};
pub use launch::{LaunchParams, SourcePriority};
pub use session::{Session, SessionBuilder};
pub use state::{
    AcquireOutcome, AcquisitionAttempt, AttemptOutcome, BootstrapState, ResolutionReport,
    SourceKind,
};
pub use surface::{SetupEvent, SetupSurface, TracingSurface};
pub use viewer_config::{ConfigOrigin, Configuration};
