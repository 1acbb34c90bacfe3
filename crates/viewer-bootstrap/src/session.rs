//! The bootstrap session: automatic fallback chain, interactive acquisition, and render
//! handoff.
//!
//! A [`Session`] is the single owner of bootstrap state. Every way of obtaining a
//! configuration ends in the same handoff: construct the engine, render into the mount,
//! and either dismiss the setup surface or return to it with the engine's error.

use std::{future::Future, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use viewer_config::{ConfigOrigin, Configuration};

use crate::{
    AcquireOutcome, AcquisitionAttempt, AttemptOutcome, BootstrapState, ConfigFetcher, ConfigFile,
    ConfigInput, EngineFactory, LaunchParams, Mount, RenderEngine, RenderError,
    ResolutionReport, SetupEvent, SetupSurface, SourceKind, SourcePriority, TransportError,
};

/// Prefix for render failures shown on the setup surface.
const RENDER_FAILED_PREFIX: &str = "Failed to initialize viewer";

/// Handle on one in-flight fetch/render sequence.
struct Ticket {
    /// Request number; only the latest may write state.
    generation: u64,
    /// Cancelled when a newer request starts.
    token: CancellationToken,
}

/// Mutable session data. Never locked across an await point.
struct Shared {
    /// Current state.
    state: BootstrapState,
    /// Every state entered, oldest first.
    history: Vec<BootstrapState>,
    /// Every acquisition attempt, oldest first.
    attempts: Vec<AcquisitionAttempt>,
    /// Configuration most recently handed to the engine.
    active: Option<Configuration>,
    /// Engine that completed its render.
    live: Option<Box<dyn RenderEngine>>,
    /// Token of the request currently awaiting fetch or render.
    in_flight: Option<CancellationToken>,
    /// Number of requests started.
    generation: u64,
    /// Whether the automatic chain has run.
    resolved: bool,
}

impl Shared {
    /// Whether `ticket` is still the latest request.
    fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation == ticket.generation && !ticket.token.is_cancelled()
    }
}

/// Collaborators and shared state behind a [`Session`] handle.
struct Inner {
    /// Builds engines from accepted configurations.
    factory: Arc<dyn EngineFactory>,
    /// Setup screen presentation.
    surface: Arc<dyn SetupSurface>,
    /// Remote fetcher for the `config` URL.
    fetcher: Option<Arc<dyn ConfigFetcher>>,
    /// Build-time default.
    embedded: Option<Configuration>,
    /// Container the engine renders into.
    mount: Mount,
    /// Order of the automatic sources.
    priority: SourcePriority,
    /// Mutable state.
    shared: Mutex<Shared>,
    /// Publishes every state change.
    state_tx: watch::Sender<BootstrapState>,
}

/// Owner of bootstrap state for one page load.
///
/// Cloning yields another handle on the same session, so event handlers can each hold
/// one. A request that starts while another is awaiting its fetch or render cancels the
/// earlier one: the last request wins and a superseded request never touches state.
#[derive(Clone)]
pub struct Session {
    /// Shared session data.
    inner: Arc<Inner>,
}

/// Configures a [`Session`].
pub struct SessionBuilder {
    /// Engine factory.
    factory: Arc<dyn EngineFactory>,
    /// Setup surface.
    surface: Arc<dyn SetupSurface>,
    /// Optional remote fetcher.
    fetcher: Option<Arc<dyn ConfigFetcher>>,
    /// Optional embedded default.
    embedded: Option<Configuration>,
    /// Render target.
    mount: Mount,
    /// Source order.
    priority: SourcePriority,
}

impl SessionBuilder {
    /// Fetcher used for the `config` URL. Without one, a supplied URL counts as a transport
    /// failure.
    pub fn fetcher(mut self, fetcher: Arc<dyn ConfigFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// The configuration baked into the artifact. A JSON `null` counts as absent.
    pub fn embedded_default(mut self, config: Option<Configuration>) -> Self {
        self.embedded = config.filter(|c| {
            if c.is_null() {
                debug!("embedded_default_null");
            }
            !c.is_null()
        });
        self
    }

    /// Container the engine renders into (defaults to `app`).
    pub fn mount(mut self, mount: Mount) -> Self {
        self.mount = mount;
        self
    }

    /// Order of the automatic sources (defaults to URL first).
    pub fn priority(mut self, priority: SourcePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Create the session in the `resolving` state.
    pub fn build(self) -> Session {
        let (state_tx, _rx) = watch::channel(BootstrapState::Resolving);
        Session {
            inner: Arc::new(Inner {
                factory: self.factory,
                surface: self.surface,
                fetcher: self.fetcher,
                embedded: self.embedded,
                mount: self.mount,
                priority: self.priority,
                shared: Mutex::new(Shared {
                    state: BootstrapState::Resolving,
                    history: vec![BootstrapState::Resolving],
                    attempts: Vec::new(),
                    active: None,
                    live: None,
                    in_flight: None,
                    generation: 0,
                    resolved: false,
                }),
                state_tx,
            }),
        }
    }
}

impl Session {
    /// Start configuring a session around an engine factory and a setup surface.
    pub fn builder(
        factory: Arc<dyn EngineFactory>,
        surface: Arc<dyn SetupSurface>,
    ) -> SessionBuilder {
        SessionBuilder {
            factory,
            surface,
            fetcher: None,
            embedded: None,
            mount: Mount::default(),
            priority: SourcePriority::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> BootstrapState {
        self.inner.shared.lock().state.clone()
    }

    /// Every state entered so far, starting with `resolving`.
    pub fn history(&self) -> Vec<BootstrapState> {
        self.inner.shared.lock().history.clone()
    }

    /// Every acquisition attempt made so far.
    pub fn attempts(&self) -> Vec<AcquisitionAttempt> {
        self.inner.shared.lock().attempts.clone()
    }

    /// The configuration most recently handed to the engine, unless that render failed.
    pub fn active_config(&self) -> Option<Configuration> {
        self.inner.shared.lock().active.clone()
    }

    /// Whether an engine has completed its render and is live.
    pub fn has_live_engine(&self) -> bool {
        self.inner.shared.lock().live.is_some()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<BootstrapState> {
        self.inner.state_tx.subscribe()
    }

    /// Run the automatic fallback chain. Only the first call does anything.
    ///
    /// Sources are tried in priority order and the first acceptable configuration is
    /// rendered. URL transport and parse failures are logged and fall through. When no
    /// source produces a configuration the setup surface is shown.
    pub async fn resolve_on_load(&self, launch: &LaunchParams) -> ResolutionReport {
        {
            let mut shared = self.inner.shared.lock();
            if shared.resolved {
                warn!("resolve_on_load_repeated");
                return ResolutionReport {
                    attempts: Vec::new(),
                    handoff: None,
                    state: shared.state.clone(),
                };
            }
            shared.resolved = true;
        }

        let ticket = self.begin_request();
        let order = match self.inner.priority {
            SourcePriority::UrlFirst => [SourceKind::Url, SourceKind::Embedded],
            SourcePriority::EmbeddedFirst => [SourceKind::Embedded, SourceKind::Url],
        };

        let mut attempts = Vec::with_capacity(order.len());
        let mut chosen = None;
        for source in order {
            if chosen.is_some() {
                attempts.push(AcquisitionAttempt::not_attempted(source));
                continue;
            }
            let Some((attempt, config)) = self.try_source(source, launch, &ticket).await else {
                return self.superseded_report(attempts);
            };
            self.record(attempt.clone());
            attempts.push(attempt);
            chosen = config;
        }

        match chosen {
            Some(config) => {
                let handoff = self.handoff(&ticket, config).await;
                ResolutionReport {
                    attempts,
                    handoff: Some(handoff),
                    state: self.state(),
                }
            }
            None => {
                {
                    let mut shared = self.inner.shared.lock();
                    if !shared.is_current(&ticket) {
                        drop(shared);
                        return self.superseded_report(attempts);
                    }
                    shared.in_flight = None;
                    self.transition(&mut shared, BootstrapState::SetupVisible { error: None });
                }
                info!("no_config_source; waiting on setup surface");
                self.inner.surface.show();
                ResolutionReport {
                    attempts,
                    handoff: None,
                    state: self.state(),
                }
            }
        }
    }

    /// Acquire a configuration from an interactive input.
    ///
    /// Unreadable input or invalid JSON shows an inline error and leaves the state alone.
    /// Acceptable JSON goes straight to the render handoff.
    pub async fn acquire(&self, input: ConfigInput) -> AcquireOutcome {
        let source = input.source();
        let label = input.invalid_label();
        let text = match input.read().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(source = ?source, "acquire_ignored_blank");
                return AcquireOutcome::Ignored;
            }
            Err(e) => {
                self.record(AcquisitionAttempt::new(
                    source,
                    AttemptOutcome::TransportError(e.to_string()),
                ));
                return self.reject(format!("Could not read file: {e}"));
            }
        };

        match Configuration::parse(source.origin(), text) {
            Ok(config) => {
                self.record(AcquisitionAttempt::new(source, AttemptOutcome::Success));
                let ticket = self.begin_request();
                self.handoff(&ticket, config).await
            }
            Err(e) => {
                self.record(AcquisitionAttempt::new(
                    source,
                    AttemptOutcome::ParseError(e.to_string()),
                ));
                self.reject(format!("{label}: {e}"))
            }
        }
    }

    /// Dispatch a setup surface event.
    ///
    /// Drag events only toggle the drop highlight and return `None`.
    pub async fn handle_event(&self, event: SetupEvent) -> Option<AcquireOutcome> {
        match event {
            SetupEvent::DragEnter | SetupEvent::DragOver => {
                self.inner.surface.set_drop_highlight(true);
                None
            }
            SetupEvent::DragLeave => {
                self.inner.surface.set_drop_highlight(false);
                None
            }
            SetupEvent::Drop(files) => {
                self.inner.surface.set_drop_highlight(false);
                Some(self.acquire_first(files, ConfigInput::Dropped).await)
            }
            SetupEvent::FilePicked(files) => {
                Some(self.acquire_first(files, ConfigInput::Picked).await)
            }
            SetupEvent::PasteCommitted(text) => {
                Some(self.acquire(ConfigInput::Pasted(text)).await)
            }
        }
    }

    /// Hand an already accepted configuration to the engine.
    pub async fn load(&self, config: Configuration) -> AcquireOutcome {
        let ticket = self.begin_request();
        self.handoff(&ticket, config).await
    }

    /// Acquire the first of `files`, ignoring an empty list.
    async fn acquire_first(
        &self,
        files: Vec<Box<dyn ConfigFile>>,
        wrap: fn(Box<dyn ConfigFile>) -> ConfigInput,
    ) -> AcquireOutcome {
        match files.into_iter().next() {
            Some(file) => self.acquire(wrap(file)).await,
            None => AcquireOutcome::Ignored,
        }
    }

    /// Try one automatic source. `None` means the request was superseded.
    async fn try_source(
        &self,
        source: SourceKind,
        launch: &LaunchParams,
        ticket: &Ticket,
    ) -> Option<(AcquisitionAttempt, Option<Configuration>)> {
        match source {
            SourceKind::Url => self.try_url(launch, ticket).await,
            SourceKind::Embedded => Some(self.try_embedded()),
            SourceKind::Drop | SourceKind::FilePicker | SourceKind::Paste => {
                Some((AcquisitionAttempt::not_attempted(source), None))
            }
        }
    }

    /// Fetch and parse the `config` URL.
    async fn try_url(
        &self,
        launch: &LaunchParams,
        ticket: &Ticket,
    ) -> Option<(AcquisitionAttempt, Option<Configuration>)> {
        let Some(url) = launch.config_url() else {
            return Some((AcquisitionAttempt::not_attempted(SourceKind::Url), None));
        };
        let fetched = match &self.inner.fetcher {
            Some(fetcher) => guarded(&ticket.token, fetcher.fetch(url)).await?,
            None => Err(TransportError::NoFetcher {
                url: url.to_string(),
            }),
        };
        let text = match fetched {
            Ok(text) => text,
            Err(e) => {
                warn!(url, error = %e, "url_config_failed; trying next source");
                return Some((
                    AcquisitionAttempt::new(
                        SourceKind::Url,
                        AttemptOutcome::TransportError(e.to_string()),
                    ),
                    None,
                ));
            }
        };
        match Configuration::parse(ConfigOrigin::Url, text) {
            Ok(config) => {
                info!(url, "url_config_loaded");
                Some((
                    AcquisitionAttempt::new(SourceKind::Url, AttemptOutcome::Success),
                    Some(config),
                ))
            }
            Err(e) => {
                warn!(url, error = %e, "url_config_invalid; trying next source");
                Some((
                    AcquisitionAttempt::new(
                        SourceKind::Url,
                        AttemptOutcome::ParseError(e.to_string()),
                    ),
                    None,
                ))
            }
        }
    }

    /// Use the embedded default when present.
    fn try_embedded(&self) -> (AcquisitionAttempt, Option<Configuration>) {
        match &self.inner.embedded {
            Some(config) => {
                info!("using embedded default config");
                (
                    AcquisitionAttempt::new(SourceKind::Embedded, AttemptOutcome::Success),
                    Some(config.clone()),
                )
            }
            None => (AcquisitionAttempt::not_attempted(SourceKind::Embedded), None),
        }
    }

    /// Construct the engine, render, and settle the resulting state.
    async fn handoff(&self, ticket: &Ticket, config: Configuration) -> AcquireOutcome {
        let origin = config.origin();
        {
            let mut shared = self.inner.shared.lock();
            if !shared.is_current(ticket) {
                return AcquireOutcome::Superseded;
            }
            shared.active = Some(config.clone());
            self.transition(&mut shared, BootstrapState::Rendering { origin });
        }
        info!(origin = %origin, mount = self.inner.mount.id(), "render_handoff");

        let engine = match self.inner.factory.construct(config) {
            Ok(engine) => engine,
            Err(e) => return self.render_failed(ticket, &e),
        };
        let rendered = guarded(&ticket.token, engine.render(&self.inner.mount)).await;
        match rendered {
            None => {
                debug!(origin = %origin, "render_superseded");
                AcquireOutcome::Superseded
            }
            Some(Err(e)) => self.render_failed(ticket, &e),
            Some(Ok(())) => {
                {
                    let mut shared = self.inner.shared.lock();
                    if !shared.is_current(ticket) {
                        return AcquireOutcome::Superseded;
                    }
                    shared.live = Some(engine);
                    shared.in_flight = None;
                }
                self.inner.surface.clear_error();
                self.inner.surface.dismiss();
                info!(origin = %origin, "render_complete");
                AcquireOutcome::Rendered { origin }
            }
        }
    }

    /// Record a render failure and return to the setup surface.
    fn render_failed(&self, ticket: &Ticket, err: &RenderError) -> AcquireOutcome {
        let message = err.message().to_string();
        let shown = format!("{RENDER_FAILED_PREFIX}: {message}");
        {
            let mut shared = self.inner.shared.lock();
            if !shared.is_current(ticket) {
                return AcquireOutcome::Superseded;
            }
            error!(error = %message, "initialization_failed");
            shared.live = None;
            shared.active = None;
            shared.in_flight = None;
            self.transition(
                &mut shared,
                BootstrapState::RenderFailed {
                    message: message.clone(),
                },
            );
            self.transition(
                &mut shared,
                BootstrapState::SetupVisible {
                    error: Some(shown.clone()),
                },
            );
        }
        self.inner.surface.show();
        self.inner.surface.show_error(&shown);
        AcquireOutcome::RenderFailed { message }
    }

    /// Show an inline error for rejected input without changing state.
    fn reject(&self, message: String) -> AcquireOutcome {
        warn!(%message, "config_rejected");
        {
            let mut shared = self.inner.shared.lock();
            if let BootstrapState::SetupVisible { error } = &mut shared.state {
                *error = Some(message.clone());
                self.inner.state_tx.send_replace(shared.state.clone());
            }
        }
        self.inner.surface.show_error(&message);
        AcquireOutcome::Rejected { message }
    }

    /// Start a request, cancelling whichever one is in flight.
    fn begin_request(&self) -> Ticket {
        let mut shared = self.inner.shared.lock();
        if let Some(previous) = shared.in_flight.take() {
            previous.cancel();
            debug!("request_replaced");
        }
        shared.generation += 1;
        let token = CancellationToken::new();
        shared.in_flight = Some(token.clone());
        Ticket {
            generation: shared.generation,
            token,
        }
    }

    /// Append to the attempt log.
    fn record(&self, attempt: AcquisitionAttempt) {
        debug!(source = ?attempt.source, outcome = ?attempt.outcome, "acquisition_attempt");
        self.inner.shared.lock().attempts.push(attempt);
    }

    /// Enter `next`, recording and publishing it.
    fn transition(&self, shared: &mut Shared, next: BootstrapState) {
        debug!(from = shared.state.name(), to = next.name(), "bootstrap_state");
        shared.state = next.clone();
        shared.history.push(next.clone());
        self.inner.state_tx.send_replace(next);
    }

    /// Report for a chain that a newer request replaced.
    fn superseded_report(&self, attempts: Vec<AcquisitionAttempt>) -> ResolutionReport {
        debug!("resolve_on_load_superseded");
        ResolutionReport {
            attempts,
            handoff: Some(AcquireOutcome::Superseded),
            state: self.state(),
        }
    }
}

/// Run `fut` unless `token` is cancelled first.
async fn guarded<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = token.cancelled() => None,
        out = fut => Some(out),
    }
}
