//! The interactive setup surface and the events it produces.

use tracing::{info, warn};

use crate::ConfigFile;

/// Presentation side of the setup screen.
///
/// Implementations own the visual state; the session only tells them what to show.
pub trait SetupSurface: Send + Sync {
    /// Make the setup screen visible.
    fn show(&self);
    /// Display an inline error message.
    fn show_error(&self, message: &str);
    /// Remove any inline error.
    fn clear_error(&self);
    /// Toggle the drop target's drag-over highlight.
    fn set_drop_highlight(&self, on: bool);
    /// Hide the setup screen once content has rendered. Any fade is cosmetic.
    fn dismiss(&self);
}

/// Events raised by the setup screen controls.
#[derive(Debug)]
pub enum SetupEvent {
    /// A drag entered the drop target.
    DragEnter,
    /// A drag is moving over the drop target.
    DragOver,
    /// A drag left the drop target.
    DragLeave,
    /// Files were dropped on the drop target. Only the first is used.
    Drop(Vec<Box<dyn ConfigFile>>),
    /// Files were chosen with the hidden file input. Only the first is used.
    FilePicked(Vec<Box<dyn ConfigFile>>),
    /// The paste area was committed with its current text.
    PasteCommitted(String),
}

/// Surface for headless sessions: reports everything through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSurface;

impl TracingSurface {
    /// Create a surface.
    pub fn new() -> Self {
        Self
    }
}

impl SetupSurface for TracingSurface {
    fn show(&self) {
        info!("setup_surface_shown");
    }

    fn show_error(&self, message: &str) {
        warn!(message, "setup_surface_error");
    }

    fn clear_error(&self) {}

    fn set_drop_highlight(&self, _on: bool) {}

    fn dismiss(&self) {
        info!("setup_surface_dismissed");
    }
}
