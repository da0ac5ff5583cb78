use super::config::ControllerConfig;
use super::state::{SessionMode, SessionSnapshot};
use super::ticker::Ticker;
use super::ui::{Notice, SessionUi};
use crate::device::{
    CaptureArtifact, CaptureDevice, CaptureHandle, PermissionStatus, PlaybackDevice,
    PlaybackHandle, PlaybackStatus,
};
use crate::error::{CleanupStep, Result, SessionError};
use crate::host::{HostEvent, HostLifecycle, LeaveRequest};
use chrono::{DateTime, Utc};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Mutable part of the session, guarded by one lock that is never held across a
/// device call
#[derive(Default)]
struct SessionState {
    mode: SessionMode,
    capture: Option<CaptureHandle>,
    playback: Option<PlaybackHandle>,
    recording_uri: Option<String>,
    elapsed_seconds: u64,
    playback_position_ms: u64,
    last_error: Option<SessionError>,
    recording_started_at: Option<DateTime<Utc>>,
    elapsed_ticker: Option<Ticker>,
    playback_ticker: Option<Ticker>,
}

impl SessionState {
    fn set_mode(&mut self, mode: SessionMode) {
        if self.mode != mode {
            info!("Session mode: {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    fn holds_ticker(ticker: &Option<Ticker>, id: u64) -> bool {
        ticker.as_ref().map(Ticker::id) == Some(id)
    }

    /// Cancel both tickers and hand every device handle to the caller
    fn detach(&mut self) -> (Option<CaptureHandle>, Option<PlaybackHandle>) {
        self.elapsed_ticker = None;
        self.playback_ticker = None;
        self.recording_uri = None;
        self.playback_position_ms = 0;
        (self.capture.take(), self.playback.take())
    }
}

struct HostBinding {
    host: Arc<HostLifecycle>,
    subscription_id: u64,
    task: JoinHandle<()>,
}

struct Inner {
    config: ControllerConfig,
    capture: Arc<dyn CaptureDevice>,
    playback: Arc<dyn PlaybackDevice>,
    ui: Arc<dyn SessionUi>,
    state: Mutex<SessionState>,
    /// Serializes user-initiated transitions; releases never take it
    transition: Mutex<()>,
    session_ready: AtomicBool,
    /// Set from an accepted start until its capture is open or abandoned
    capture_starting: AtomicBool,
    cleanup_in_flight: AtomicBool,
    /// Bumped by every full release so in-flight transitions can tell they were overtaken
    release_epoch: AtomicU64,
    host: Mutex<Option<HostBinding>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if self.state.get_mut().capture.is_some() {
            warn!("Recording controller dropped with an open capture; unmount() was not called");
        }
    }
}

/// Stores `value` into `flag` when dropped, unless disarmed
struct FlagReset<'a> {
    flag: &'a AtomicBool,
    value: bool,
    armed: bool,
}

impl<'a> FlagReset<'a> {
    fn new(flag: &'a AtomicBool, value: bool) -> Self {
        Self {
            flag,
            value,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FlagReset<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(self.value, Ordering::SeqCst);
        }
    }
}

/// Lifecycle controller for one recording screen
///
/// Owns the capture and playback handles and guarantees that the microphone is
/// released on every path out of `Recording`: explicit stop, discard, app
/// backgrounding, confirmed navigation away, errors and unmount.
#[derive(Clone)]
pub struct RecordingController {
    inner: Arc<Inner>,
}

impl RecordingController {
    /// Create the controller for a freshly mounted screen
    ///
    /// Subscribes to host lifecycle events, asks for microphone permission and
    /// applies the idle audio mode. A failure leaves the controller in `Error`
    /// with a retry available.
    pub async fn mount(
        config: ControllerConfig,
        capture: Arc<dyn CaptureDevice>,
        playback: Arc<dyn PlaybackDevice>,
        ui: Arc<dyn SessionUi>,
        host: Arc<HostLifecycle>,
    ) -> Self {
        info!(
            "Mounting recording controller (capture: {}, playback: {})",
            capture.name(),
            playback.name()
        );

        let controller = Self {
            inner: Arc::new(Inner {
                config,
                capture,
                playback,
                ui,
                state: Mutex::new(SessionState::default()),
                transition: Mutex::new(()),
                session_ready: AtomicBool::new(false),
                capture_starting: AtomicBool::new(false),
                cleanup_in_flight: AtomicBool::new(false),
                release_epoch: AtomicU64::new(0),
                host: Mutex::new(None),
            }),
        };

        controller.bind_host(host).await;

        if let Err(e) = controller.prepare().await {
            controller.enter_error(e).await;
        }

        controller
    }

    /// Stop listening to the host and release every resource
    pub async fn unmount(&self) {
        if let Some(binding) = self.inner.host.lock().await.take() {
            binding.host.unsubscribe(binding.subscription_id);
            binding.task.abort();
        }

        self.release_all().await;
        info!("Recording controller unmounted");
    }

    async fn bind_host(&self, host: Arc<HostLifecycle>) {
        let mut subscription = host.subscribe();
        let subscription_id = subscription.id();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            debug!("Host event task started");

            // Aborted together with this task on unmount
            let mut prompts = JoinSet::new();

            loop {
                tokio::select! {
                    event = subscription.next() => {
                        let Some(event) = event else {
                            break;
                        };
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        let controller = RecordingController { inner };

                        match event {
                            // A pending leave prompt must not hold back a background release
                            HostEvent::NavigationAboutToLeave(_)
                            | HostEvent::HardwareBackPressed(_) => {
                                prompts.spawn(async move {
                                    controller.handle_host_event(event).await
                                });
                            }
                            event => controller.handle_host_event(event).await,
                        }
                    }
                    Some(joined) = prompts.join_next(), if !prompts.is_empty() => {
                        if let Err(e) = joined {
                            warn!("Leave prompt task failed: {}", e);
                        }
                    }
                }
            }

            debug!("Host event task stopped");
        });

        *self.inner.host.lock().await = Some(HostBinding {
            host,
            subscription_id,
            task,
        });
    }

    /// Permission check plus idle audio mode; leaves the session `Idle` and ready
    async fn prepare(&self) -> Result<()> {
        let inner = &self.inner;

        match inner.capture.request_permission().await {
            Ok(PermissionStatus::Granted) => {}
            Ok(PermissionStatus::Denied) => return Err(SessionError::PermissionDenied),
            Err(e) => {
                warn!("Permission request failed: {:#}", e);
                return Err(SessionError::PermissionDenied);
            }
        }

        inner
            .capture
            .configure_mode(inner.config.idle_mode)
            .await
            .map_err(|e| SessionError::DeviceConfigurationFailed(format!("{:#}", e)))?;

        {
            let mut state = inner.state.lock().await;
            state.last_error = None;
            state.set_mode(SessionMode::Idle);
        }
        inner.session_ready.store(true, Ordering::SeqCst);

        Ok(())
    }

    /// Begin a new capture from `Idle`, `Stopped` or `Playing`
    ///
    /// Rejected with [`SessionError::NotReady`] while a previous start or stop is
    /// still settling. On a device failure the session ends in `Error` with every
    /// handle released.
    pub async fn start_capture(&self) -> Result<()> {
        let inner = &self.inner;

        if inner
            .session_ready
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Capture requested while the session is not ready");
            inner.ui.notify(Notice::PleaseWait);
            return Err(SessionError::NotReady);
        }
        let ready = FlagReset::new(&inner.session_ready, true);
        inner.capture_starting.store(true, Ordering::SeqCst);
        let _starting = FlagReset::new(&inner.capture_starting, false);

        // Taken before queueing so a release during the wait is still noticed
        let epoch = inner.release_epoch.load(Ordering::SeqCst);
        let _transition = inner.transition.lock().await;

        let mode = inner.state.lock().await.mode;
        if !matches!(
            mode,
            SessionMode::Idle | SessionMode::Stopped | SessionMode::Playing
        ) {
            return Err(SessionError::InvalidTransition {
                operation: "start recording",
                mode,
            });
        }

        info!("Starting capture from {}", mode);

        // Stop anything still active before touching the audio mode
        let (capture, playback) = inner.state.lock().await.detach();
        self.release_detached(capture, playback).await;

        let handle = match self.open_fresh_capture(epoch).await {
            Ok(handle) => handle,
            Err(SessionError::Interrupted) => return Err(SessionError::Interrupted),
            Err(e) => {
                self.enter_error(e.clone()).await;
                return Err(e);
            }
        };

        let mut state = inner.state.lock().await;
        if inner.release_epoch.load(Ordering::SeqCst) != epoch {
            drop(state);
            info!("Release overtook capture start; closing the new capture");
            if let Err(e) = inner.capture.stop_and_release(handle).await {
                cleanup_failure(CleanupStep::StopCapture, e);
            }
            return Err(SessionError::Interrupted);
        }

        state.capture = Some(handle);
        state.elapsed_seconds = 0;
        state.playback_position_ms = 0;
        state.recording_uri = None;
        state.recording_started_at = Some(Utc::now());
        state.elapsed_ticker = Some(self.spawn_elapsed_ticker());
        state.set_mode(SessionMode::Recording);

        // Stays false until the capture is stopped or released
        ready.disarm();

        info!("Capture started");
        Ok(())
    }

    /// Identical to [`Self::start_capture`]; discards the current artifact
    pub async fn re_record(&self) -> Result<()> {
        self.start_capture().await
    }

    /// Reset the audio mode twice, let the device settle, switch to recording
    /// mode and open the capture
    ///
    /// Some platforms keep a stale microphone lock across quick stop/start
    /// cycles; the double reset plus settle delay runs before every capture.
    async fn open_fresh_capture(&self, epoch: u64) -> Result<CaptureHandle> {
        let inner = &self.inner;
        let config = &inner.config;

        for (step, mode) in config.reset_modes.iter().enumerate() {
            debug!("Audio mode reset {}: {:?}", step + 1, mode);
            inner
                .capture
                .configure_mode(*mode)
                .await
                .map_err(|e| SessionError::DeviceConfigurationFailed(format!("{:#}", e)))?;
        }

        tokio::time::sleep(config.settle_delay()).await;
        self.ensure_epoch(epoch)?;

        inner
            .capture
            .configure_mode(config.recording_mode)
            .await
            .map_err(|e| SessionError::DeviceConfigurationFailed(format!("{:#}", e)))?;
        self.ensure_epoch(epoch)?;

        inner
            .capture
            .open_capture()
            .await
            .map_err(|e| SessionError::CaptureOpenFailed(format!("{:#}", e)))
    }

    fn ensure_epoch(&self, epoch: u64) -> Result<()> {
        if self.inner.release_epoch.load(Ordering::SeqCst) == epoch {
            Ok(())
        } else {
            Err(SessionError::Interrupted)
        }
    }

    /// Stop the running capture and keep its artifact
    ///
    /// The capture handle is consumed before this returns, whatever the device
    /// answers. A preview of the artifact is preloaded; preload failure is only
    /// logged.
    pub async fn stop_capture(&self) -> Result<CaptureArtifact> {
        let inner = &self.inner;
        let _transition = inner.transition.lock().await;

        let (handle, epoch) = {
            let mut state = inner.state.lock().await;
            if state.mode != SessionMode::Recording {
                return Err(SessionError::InvalidTransition {
                    operation: "stop recording",
                    mode: state.mode,
                });
            }
            state.elapsed_ticker = None;
            match state.capture.take() {
                Some(handle) => (handle, inner.release_epoch.load(Ordering::SeqCst)),
                None => return Err(SessionError::Interrupted),
            }
        };
        let _ready = FlagReset::new(&inner.session_ready, true);

        info!("Stopping capture");

        let artifact = match inner.capture.stop_and_release(handle).await {
            Ok(artifact) => artifact,
            Err(e) => {
                if self.ensure_epoch(epoch).is_err() {
                    warn!("Capture stop failed after release: {:#}", e);
                    return Err(SessionError::Interrupted);
                }
                let err = SessionError::CaptureStopFailed(format!("{:#}", e));
                self.enter_error(err.clone()).await;
                return Err(err);
            }
        };

        {
            let mut state = inner.state.lock().await;
            if inner.release_epoch.load(Ordering::SeqCst) != epoch {
                info!("Release overtook capture stop; {} is left on disk", artifact.uri);
                return Err(SessionError::Interrupted);
            }
            state.recording_uri = Some(artifact.uri.clone());
            state.playback_position_ms = 0;
            state.set_mode(SessionMode::Stopped);
        }

        if let Err(e) = inner.capture.configure_mode(inner.config.playback_mode).await {
            warn!("Failed to apply playback audio mode: {:#}", e);
        }

        self.preload(&artifact.uri, epoch).await;

        info!("Capture stopped: {} ({}ms)", artifact.uri, artifact.duration_ms);
        Ok(artifact)
    }

    async fn preload(&self, uri: &str, epoch: u64) {
        let inner = &self.inner;

        let handle = match inner.playback.load(uri).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("{}", SessionError::PlaybackLoadFailed(format!("{:#}", e)));
                return;
            }
        };

        let stale = {
            let mut state = inner.state.lock().await;
            let current = inner.release_epoch.load(Ordering::SeqCst) == epoch
                && state.mode == SessionMode::Stopped
                && state.playback.is_none();
            if current {
                state.playback = Some(handle);
                None
            } else {
                Some(handle)
            }
        };

        if let Some(handle) = stale {
            debug!("Preloaded sound no longer needed");
            if let Err(e) = inner.playback.unload(handle).await {
                cleanup_failure(CleanupStep::UnloadPlayback, e);
            }
        }
    }

    /// Play the preview; no-op without a loaded sound or when already playing
    pub async fn play(&self) -> Result<()> {
        let inner = &self.inner;
        let _transition = inner.transition.lock().await;

        let handle = {
            let state = inner.state.lock().await;
            match state.mode {
                SessionMode::Stopped => {}
                SessionMode::Playing => return Ok(()),
                mode => {
                    return Err(SessionError::InvalidTransition {
                        operation: "play",
                        mode,
                    })
                }
            }
            match &state.playback {
                Some(handle) => handle.clone(),
                None => {
                    debug!("No preview loaded; play ignored");
                    return Ok(());
                }
            }
        };

        if let Err(e) = inner.playback.play(&handle).await {
            return Err(self.playback_failed(format!("{:#}", e)));
        }

        let mut state = inner.state.lock().await;
        if state.playback.as_ref() != Some(&handle) {
            return Err(SessionError::Interrupted);
        }
        state.playback_ticker = Some(self.spawn_playback_ticker());
        state.set_mode(SessionMode::Playing);

        Ok(())
    }

    /// Pause the preview; no-op when not playing
    pub async fn pause(&self) -> Result<()> {
        let inner = &self.inner;
        let _transition = inner.transition.lock().await;

        let handle = {
            let mut state = inner.state.lock().await;
            match state.mode {
                SessionMode::Playing => {}
                SessionMode::Stopped => return Ok(()),
                mode => {
                    return Err(SessionError::InvalidTransition {
                        operation: "pause",
                        mode,
                    })
                }
            }
            state.playback_ticker = None;
            match &state.playback {
                Some(handle) => handle.clone(),
                None => {
                    state.set_mode(SessionMode::Stopped);
                    return Ok(());
                }
            }
        };

        let result = inner.playback.pause(&handle).await;

        {
            let mut state = inner.state.lock().await;
            if state.mode == SessionMode::Playing {
                state.set_mode(SessionMode::Stopped);
            }
        }

        result.map_err(|e| self.playback_failed(format!("{:#}", e)))
    }

    /// Drop the artifact and release everything; back to `Idle`
    pub async fn discard(&self) -> Result<()> {
        let inner = &self.inner;
        let _transition = inner.transition.lock().await;

        let mode = inner.state.lock().await.mode;
        if !matches!(mode, SessionMode::Stopped | SessionMode::Playing) {
            return Err(SessionError::InvalidTransition {
                operation: "discard",
                mode,
            });
        }

        info!("Discarding recording");
        self.release_all().await;
        Ok(())
    }

    fn playback_failed(&self, reason: String) -> SessionError {
        let err = SessionError::PlaybackFailed(reason);
        warn!("{}", err);
        self.inner
            .ui
            .notify(Notice::PlaybackUnavailable(err.user_message()));
        err
    }

    /// Re-run the permission and audio-mode setup after an error
    pub async fn retry(&self) -> Result<()> {
        let inner = &self.inner;
        let _transition = inner.transition.lock().await;

        let mode = inner.state.lock().await.mode;
        if mode != SessionMode::Error {
            return Err(SessionError::InvalidTransition {
                operation: "retry",
                mode,
            });
        }

        info!("Retrying session setup");
        if let Err(e) = self.prepare().await {
            self.enter_error(e.clone()).await;
            return Err(e);
        }

        Ok(())
    }

    async fn enter_error(&self, error: SessionError) {
        error!("Session error: {}", error);

        {
            let mut state = self.inner.state.lock().await;
            state.last_error = Some(error.clone());
            state.set_mode(SessionMode::Error);
        }

        self.release_all().await;
        self.inner.session_ready.store(true, Ordering::SeqCst);
        self.inner.ui.notify(Notice::from_error(&error));
    }

    /// Release every device resource from any state
    ///
    /// Stops the capture, unloads the preview and applies the inert audio mode.
    /// Each step is attempted regardless of the others; their failures are
    /// logged and returned, never raised. A call made while another release is
    /// running returns at once with nothing to report. The session ends in
    /// `Idle`, or stays in `Error`.
    pub async fn release_all(&self) -> Vec<SessionError> {
        let inner = &self.inner;

        if inner.cleanup_in_flight.swap(true, Ordering::SeqCst) {
            debug!("Release already in flight");
            return Vec::new();
        }
        let _in_flight = FlagReset::new(&inner.cleanup_in_flight, false);

        let (capture, playback) = {
            let mut state = inner.state.lock().await;
            inner.release_epoch.fetch_add(1, Ordering::SeqCst);
            let detached = state.detach();
            if state.mode != SessionMode::Error {
                state.set_mode(SessionMode::Idle);
            }
            detached
        };

        let mut failures = self.release_detached(capture, playback).await;

        if let Err(e) = inner.capture.configure_mode(inner.config.inert_mode).await {
            failures.push(cleanup_failure(CleanupStep::ResetAudioMode, e));
        }

        inner.session_ready.store(true, Ordering::SeqCst);

        if failures.is_empty() {
            info!("Session resources released");
        } else {
            warn!("Session resources released with {} failed steps", failures.len());
        }

        failures
    }

    async fn release_detached(
        &self,
        capture: Option<CaptureHandle>,
        playback: Option<PlaybackHandle>,
    ) -> Vec<SessionError> {
        let mut failures = Vec::new();

        if let Some(handle) = capture {
            debug!("Releasing capture {}", handle.id());
            if let Err(e) = self.inner.capture.stop_and_release(handle).await {
                failures.push(cleanup_failure(CleanupStep::StopCapture, e));
            }
        }

        if let Some(handle) = playback {
            debug!("Unloading sound {}", handle.id());
            if let Err(e) = self.inner.playback.unload(handle).await {
                failures.push(cleanup_failure(CleanupStep::UnloadPlayback, e));
            }
        }

        failures
    }

    pub async fn handle_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::AppBackgrounded => self.on_app_backgrounded().await,
            HostEvent::AppForegrounded => self.on_app_foregrounded().await,
            HostEvent::NavigationAboutToLeave(request) => {
                self.on_leave_requested(request, "navigation").await
            }
            HostEvent::HardwareBackPressed(request) => {
                self.on_leave_requested(request, "hardware back").await
            }
        }
    }

    async fn on_app_backgrounded(&self) {
        let mode = self.mode().await;

        // A start still in flight counts as recording
        let starting = self.inner.capture_starting.load(Ordering::SeqCst);
        if mode == SessionMode::Recording || starting {
            info!("App backgrounded while recording; releasing the microphone");
            self.release_all().await;
            self.inner.ui.notify(Notice::RecordingInterrupted);
            return;
        }

        match mode {
            SessionMode::Playing => {
                info!("App backgrounded while playing; pausing preview");
                if let Err(e) = self.pause().await {
                    warn!("Failed to pause preview on background: {}", e);
                }
            }
            mode => debug!("App backgrounded while {}", mode),
        }
    }

    async fn on_app_foregrounded(&self) {
        if self.mode().await != SessionMode::Idle {
            return;
        }

        debug!("App foregrounded; restoring idle audio mode");
        if let Err(e) = self
            .inner
            .capture
            .configure_mode(self.inner.config.idle_mode)
            .await
        {
            warn!("Failed to restore idle audio mode: {:#}", e);
        }
    }

    async fn on_leave_requested(&self, request: LeaveRequest, source: &str) {
        if self.mode().await != SessionMode::Recording {
            request.proceed();
            return;
        }

        info!("Leave requested by {} while recording", source);

        if self.inner.ui.confirm_leave().await {
            if self.mode().await == SessionMode::Recording {
                info!("Leave confirmed; abandoning the recording");
                self.release_all().await;
            } else {
                debug!("Leave confirmed after the recording was already released");
            }
            request.proceed();
        } else {
            info!("Leave cancelled; staying on the recording screen");
            request.stay();
        }
    }

    fn spawn_elapsed_ticker(&self) -> Ticker {
        let weak = Arc::downgrade(&self.inner);
        Ticker::spawn(self.inner.config.elapsed_tick(), move |id| {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => RecordingController { inner }.on_elapsed_tick(id).await,
                    None => ControlFlow::Break(()),
                }
            }
        })
    }

    async fn on_elapsed_tick(&self, id: u64) -> ControlFlow<()> {
        let mut state = self.inner.state.lock().await;
        if !SessionState::holds_ticker(&state.elapsed_ticker, id)
            || state.mode != SessionMode::Recording
        {
            debug!("Stale elapsed tick ignored");
            return ControlFlow::Break(());
        }

        state.elapsed_seconds += 1;
        ControlFlow::Continue(())
    }

    fn spawn_playback_ticker(&self) -> Ticker {
        let weak = Arc::downgrade(&self.inner);
        Ticker::spawn(self.inner.config.playback_poll(), move |id| {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => RecordingController { inner }.on_playback_tick(id).await,
                    None => ControlFlow::Break(()),
                }
            }
        })
    }

    async fn on_playback_tick(&self, id: u64) -> ControlFlow<()> {
        let inner = &self.inner;

        let handle = {
            let state = inner.state.lock().await;
            if !SessionState::holds_ticker(&state.playback_ticker, id)
                || state.mode != SessionMode::Playing
            {
                return ControlFlow::Break(());
            }
            match &state.playback {
                Some(handle) => handle.clone(),
                None => return ControlFlow::Break(()),
            }
        };

        let polled = inner.playback.poll_status(&handle).await;

        let mut state = inner.state.lock().await;
        // The sound may have been paused, discarded or replaced during the poll
        if !SessionState::holds_ticker(&state.playback_ticker, id)
            || state.playback.as_ref() != Some(&handle)
        {
            debug!("Stale playback tick ignored");
            return ControlFlow::Break(());
        }

        let reason = match polled {
            Ok(PlaybackStatus {
                error: Some(reason),
                ..
            }) => reason,
            Err(e) => format!("{:#}", e),
            Ok(status) if status.did_finish => {
                debug!("Preview finished");
                state.playback_ticker = None;
                state.playback_position_ms = 0;
                state.set_mode(SessionMode::Stopped);
                return ControlFlow::Break(());
            }
            Ok(status) => {
                state.playback_position_ms = status.position_ms;
                return ControlFlow::Continue(());
            }
        };

        state.playback_ticker = None;
        state.playback_position_ms = 0;
        state.set_mode(SessionMode::Stopped);
        drop(state);

        self.playback_failed(reason);
        ControlFlow::Break(())
    }

    pub async fn mode(&self) -> SessionMode {
        self.inner.state.lock().await.mode
    }

    pub fn is_session_ready(&self) -> bool {
        self.inner.session_ready.load(Ordering::SeqCst)
    }

    pub async fn last_error(&self) -> Option<SessionError> {
        self.inner.state.lock().await.last_error.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock().await;

        SessionSnapshot {
            mode: state.mode,
            elapsed_seconds: state.elapsed_seconds,
            playback_position_ms: state.playback_position_ms,
            recording_uri: state.recording_uri.clone(),
            capture_open: state.capture.is_some(),
            playback_loaded: state.playback.is_some(),
            session_ready: self.inner.session_ready.load(Ordering::SeqCst),
            cleanup_in_flight: self.inner.cleanup_in_flight.load(Ordering::SeqCst),
            last_error: state.last_error.as_ref().map(|e| e.to_string()),
            recording_started_at: state.recording_started_at,
        }
    }
}

fn cleanup_failure(step: CleanupStep, error: anyhow::Error) -> SessionError {
    let failure = SessionError::CleanupStepFailed {
        step,
        reason: format!("{:#}", error),
    };
    warn!("{}", failure);
    failure
}
