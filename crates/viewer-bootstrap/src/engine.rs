//! Contract with the external rendering engine.

use async_trait::async_trait;
use viewer_config::Configuration;

use crate::RenderError;

/// Identifier of the container the engine renders into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mount {
    /// Element id of the container.
    id: String,
}

impl Mount {
    /// Mount into the element with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Element id of the container.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new("app")
    }
}

/// A constructed rendering engine.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Render into `mount`. A returned error is shown to the user verbatim.
    async fn render(&self, mount: &Mount) -> Result<(), RenderError>;
}

/// Builds a rendering engine from an accepted configuration.
///
/// The configuration is handed over by value; the session never mutates it afterward.
pub trait EngineFactory: Send + Sync {
    /// Construct an engine. Failing here is equivalent to a failed render.
    fn construct(&self, config: Configuration) -> Result<Box<dyn RenderEngine>, RenderError>;
}
