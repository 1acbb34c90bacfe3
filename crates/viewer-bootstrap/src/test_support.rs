//! Test support utilities for viewer-bootstrap unit and integration tests.
//! These helpers are public so integration tests and downstream crates can script the
//! engine, the fetcher, and the setup surface without a browser.

use std::{
    collections::{HashMap, VecDeque},
    future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    ConfigFetcher, Configuration, EngineFactory, Mount, RenderEngine, RenderError, SetupSurface,
    TransportError,
};

/// A call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    /// `show`
    Show,
    /// `show_error`
    Error(String),
    /// `clear_error`
    ClearError,
    /// `set_drop_highlight`
    Highlight(bool),
    /// `dismiss`
    Dismiss,
}

/// Setup surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Calls in order.
    calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far.
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }

    /// The error currently displayed, if any.
    pub fn current_error(&self) -> Option<String> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                SurfaceCall::Error(m) => Some(Some(m.clone())),
                SurfaceCall::ClearError => Some(None),
                _ => None,
            })
            .flatten()
    }

    /// Whether the setup screen was dismissed after it was last shown.
    pub fn is_dismissed(&self) -> bool {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                SurfaceCall::Show => Some(false),
                SurfaceCall::Dismiss => Some(true),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Current drop highlight.
    pub fn highlighted(&self) -> bool {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                SurfaceCall::Highlight(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Append a call.
    fn push(&self, call: SurfaceCall) {
        self.calls.lock().push(call);
    }
}

impl SetupSurface for RecordingSurface {
    fn show(&self) {
        self.push(SurfaceCall::Show);
    }

    fn show_error(&self, message: &str) {
        self.push(SurfaceCall::Error(message.to_string()));
    }

    fn clear_error(&self) {
        self.push(SurfaceCall::ClearError);
    }

    fn set_drop_highlight(&self, on: bool) {
        self.push(SurfaceCall::Highlight(on));
    }

    fn dismiss(&self) {
        self.push(SurfaceCall::Dismiss);
    }
}

/// What the next engine built by a [`ScriptedFactory`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineScript {
    /// Render successfully.
    Render,
    /// Construct, then reject the render with a message.
    RejectRender(String),
    /// Fail construction with a message.
    FailConstruct(String),
    /// Construct, then never finish rendering.
    Hang,
}

/// Engine factory that follows a script, one step per construction.
///
/// When the script runs out every engine renders successfully.
#[derive(Debug, Default)]
pub struct ScriptedFactory {
    /// Remaining steps.
    script: Mutex<VecDeque<EngineScript>>,
    /// Configurations passed to `construct`.
    constructed: Mutex<Vec<Configuration>>,
    /// Number of completed renders.
    renders: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    /// A factory whose engines always render.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step to the script.
    pub fn then(self, step: EngineScript) -> Self {
        self.script.lock().push_back(step);
        self
    }

    /// Configurations passed to `construct`, oldest first.
    pub fn constructed(&self) -> Vec<Configuration> {
        self.constructed.lock().clone()
    }

    /// Number of renders that completed successfully.
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl EngineFactory for ScriptedFactory {
    fn construct(&self, config: Configuration) -> Result<Box<dyn RenderEngine>, RenderError> {
        let step = self
            .script
            .lock()
            .pop_front()
            .unwrap_or(EngineScript::Render);
        self.constructed.lock().push(config);
        let render = match step {
            EngineScript::FailConstruct(message) => return Err(RenderError::new(message)),
            EngineScript::Render => RenderStep::Render,
            EngineScript::RejectRender(message) => RenderStep::Reject(message),
            EngineScript::Hang => RenderStep::Hang,
        };
        Ok(Box::new(ScriptedEngine {
            step: render,
            renders: self.renders.clone(),
        }))
    }
}

/// What a constructed [`ScriptedEngine`] does on `render`.
enum RenderStep {
    /// Succeed.
    Render,
    /// Fail with a message.
    Reject(String),
    /// Never finish.
    Hang,
}

/// Engine produced by [`ScriptedFactory`].
struct ScriptedEngine {
    /// Behavior of `render`.
    step: RenderStep,
    /// Shared success counter.
    renders: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderEngine for ScriptedEngine {
    async fn render(&self, _mount: &Mount) -> Result<(), RenderError> {
        match &self.step {
            RenderStep::Render => {
                self.renders.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            RenderStep::Reject(message) => Err(RenderError::new(message.clone())),
            RenderStep::Hang => future::pending().await,
        }
    }
}

/// Canned response for a [`StaticFetcher`] URL.
#[derive(Debug, Clone)]
enum Canned {
    /// Return this body.
    Body(String),
    /// Fail with this error.
    Fail(TransportError),
    /// Never respond.
    Hang,
}

/// Fetcher with canned responses. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    /// Responses by URL.
    responses: Mutex<HashMap<String, Canned>>,
    /// URLs requested, in order.
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// A fetcher with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body`.
    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.insert(url, Canned::Body(body.to_string()))
    }

    /// Answer `url` with `error`.
    pub fn with_error(self, url: &str, error: TransportError) -> Self {
        self.insert(url, Canned::Fail(error))
    }

    /// Never answer `url`.
    pub fn hanging(self, url: &str) -> Self {
        self.insert(url, Canned::Hang)
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Register a response.
    fn insert(self, url: &str, canned: Canned) -> Self {
        self.responses.lock().insert(url.to_string(), canned);
        self
    }
}

#[async_trait]
impl ConfigFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        self.requests.lock().push(url.to_string());
        let canned = self.responses.lock().get(url).cloned();
        match canned {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Fail(e)) => Err(e),
            Some(Canned::Hang) => future::pending().await,
            None => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
