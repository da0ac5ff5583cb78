// Scriptable device fakes for controller tests
//
// Each fake keeps a journal of calls and the set of handles it considers
// open, so tests can assert that nothing leaks.

#![allow(dead_code)]

use anyhow::{bail, Result};
use capture_session::{
    AudioModeOptions, CaptureArtifact, CaptureDevice, CaptureHandle, ControllerConfig,
    HostLifecycle, Notice, PermissionStatus, PlaybackDevice, PlaybackHandle, PlaybackStatus,
    RecordingController, SessionMode, SessionUi,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureCall {
    Permission,
    Configure(AudioModeOptions),
    Open(u64),
    Stop(u64),
}

#[derive(Debug)]
pub struct CaptureScript {
    pub permission: PermissionStatus,
    pub fail_open: bool,
    pub fail_stop: bool,
    pub fail_configure: bool,
    /// Time each stop takes after the microphone is released
    pub stop_delay_ms: u64,
    pub calls: Vec<CaptureCall>,
    pub open: HashSet<u64>,
    pub opened_total: usize,
    next_id: u64,
}

impl Default for CaptureScript {
    fn default() -> Self {
        Self {
            permission: PermissionStatus::Granted,
            fail_open: false,
            fail_stop: false,
            fail_configure: false,
            stop_delay_ms: 0,
            calls: Vec::new(),
            open: HashSet::new(),
            opened_total: 0,
            next_id: 1,
        }
    }
}

#[derive(Default)]
pub struct FakeCapture {
    pub script: Mutex<CaptureScript>,
}

impl FakeCapture {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn denying() -> Arc<Self> {
        let fake = Self::default();
        fake.script.lock().unwrap().permission = PermissionStatus::Denied;
        Arc::new(fake)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut CaptureScript) -> R) -> R {
        f(&mut self.script.lock().unwrap())
    }

    pub fn open_count(&self) -> usize {
        self.with(|s| s.open.len())
    }

    pub fn opened_total(&self) -> usize {
        self.with(|s| s.opened_total)
    }

    pub fn stop_count(&self) -> usize {
        self.with(|s| {
            s.calls
                .iter()
                .filter(|c| matches!(c, CaptureCall::Stop(_)))
                .count()
        })
    }

    pub fn calls(&self) -> Vec<CaptureCall> {
        self.with(|s| s.calls.clone())
    }

    pub fn last_mode(&self) -> Option<AudioModeOptions> {
        self.with(|s| {
            s.calls.iter().rev().find_map(|c| match c {
                CaptureCall::Configure(mode) => Some(*mode),
                _ => None,
            })
        })
    }
}

#[async_trait::async_trait]
impl CaptureDevice for FakeCapture {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(self.with(|s| {
            s.calls.push(CaptureCall::Permission);
            s.permission
        }))
    }

    async fn configure_mode(&self, options: AudioModeOptions) -> Result<()> {
        let fail = self.with(|s| {
            s.calls.push(CaptureCall::Configure(options));
            s.fail_configure
        });
        if fail {
            bail!("audio session rejected {:?}", options);
        }
        Ok(())
    }

    async fn open_capture(&self) -> Result<CaptureHandle> {
        self.with(|s| {
            if s.fail_open {
                bail!("microphone busy");
            }
            let id = s.next_id;
            s.next_id += 1;
            s.calls.push(CaptureCall::Open(id));
            s.open.insert(id);
            s.opened_total += 1;
            Ok(CaptureHandle::new(id))
        })
    }

    async fn stop_and_release(&self, handle: CaptureHandle) -> Result<CaptureArtifact> {
        let (known, fail, delay) = self.with(|s| {
            s.calls.push(CaptureCall::Stop(handle.id()));
            // Released on every outcome
            (s.open.remove(&handle.id()), s.fail_stop, s.stop_delay_ms)
        });

        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        if !known {
            bail!("unknown capture {}", handle.id());
        }
        if fail {
            bail!("recorder failed to finalize");
        }

        Ok(CaptureArtifact {
            uri: format!("memory://recording-{}.wav", handle.id()),
            duration_ms: 1000,
            sample_count: 16000,
        })
    }

    fn name(&self) -> &str {
        "fake capture"
    }
}

#[derive(Debug)]
pub struct PlaybackScript {
    pub duration_ms: u64,
    pub step_ms: u64,
    pub fail_load: bool,
    /// Time each load takes before answering
    pub load_delay_ms: u64,
    pub fail_play: bool,
    pub fail_unload: bool,
    pub poll_error: Option<String>,
    /// Position and playing flag per loaded sound
    pub loaded: HashMap<u64, (u64, bool)>,
    pub loads_total: usize,
    pub polls: usize,
    next_id: u64,
}

impl Default for PlaybackScript {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            step_ms: 100,
            fail_load: false,
            load_delay_ms: 0,
            fail_play: false,
            fail_unload: false,
            poll_error: None,
            loaded: HashMap::new(),
            loads_total: 0,
            polls: 0,
            next_id: 1,
        }
    }
}

#[derive(Default)]
pub struct FakePlayback {
    pub script: Mutex<PlaybackScript>,
    /// When set, every poll waits for a permit before answering
    pub poll_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakePlayback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut PlaybackScript) -> R) -> R {
        f(&mut self.script.lock().unwrap())
    }

    pub fn loaded_count(&self) -> usize {
        self.with(|s| s.loaded.len())
    }

    pub fn poll_count(&self) -> usize {
        self.with(|s| s.polls)
    }

    pub fn gate_polls(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.poll_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait::async_trait]
impl PlaybackDevice for FakePlayback {
    async fn load(&self, uri: &str) -> Result<PlaybackHandle> {
        let delay = self.with(|s| s.load_delay_ms);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }

        self.with(|s| {
            if s.fail_load {
                bail!("cannot decode {}", uri);
            }
            let id = s.next_id;
            s.next_id += 1;
            s.loaded.insert(id, (0, false));
            s.loads_total += 1;
            Ok(PlaybackHandle::new(id))
        })
    }

    async fn play(&self, handle: &PlaybackHandle) -> Result<()> {
        self.with(|s| {
            if s.fail_play {
                bail!("speaker unavailable");
            }
            match s.loaded.get_mut(&handle.id()) {
                Some(sound) => {
                    sound.1 = true;
                    Ok(())
                }
                None => bail!("unknown sound {}", handle.id()),
            }
        })
    }

    async fn pause(&self, handle: &PlaybackHandle) -> Result<()> {
        self.with(|s| match s.loaded.get_mut(&handle.id()) {
            Some(sound) => {
                sound.1 = false;
                Ok(())
            }
            None => bail!("unknown sound {}", handle.id()),
        })
    }

    async fn unload(&self, handle: PlaybackHandle) -> Result<()> {
        self.with(|s| {
            let known = s.loaded.remove(&handle.id()).is_some();
            if s.fail_unload {
                bail!("unload rejected");
            }
            if !known {
                bail!("unknown sound {}", handle.id());
            }
            Ok(())
        })
    }

    async fn poll_status(&self, handle: &PlaybackHandle) -> Result<PlaybackStatus> {
        let gate = self.poll_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.with(|s| {
            s.polls += 1;
            if let Some(reason) = s.poll_error.clone() {
                return Ok(PlaybackStatus {
                    error: Some(reason),
                    ..PlaybackStatus::default()
                });
            }

            let (duration_ms, step_ms) = (s.duration_ms, s.step_ms);
            let Some(sound) = s.loaded.get_mut(&handle.id()) else {
                bail!("unknown sound {}", handle.id());
            };

            if sound.1 {
                sound.0 += step_ms;
            }
            if sound.1 && sound.0 >= duration_ms {
                *sound = (0, false);
                return Ok(PlaybackStatus {
                    position_ms: duration_ms,
                    is_playing: false,
                    did_finish: true,
                    error: None,
                });
            }

            Ok(PlaybackStatus {
                position_ms: sound.0,
                is_playing: sound.1,
                did_finish: false,
                error: None,
            })
        })
    }

    fn name(&self) -> &str {
        "fake playback"
    }
}

pub struct FakeUi {
    pub notices: Mutex<Vec<Notice>>,
    pub confirm_answer: AtomicBool,
    pub confirm_requests: AtomicUsize,
    /// When set, a leave prompt stays open until the gate is notified
    pub confirm_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
            confirm_requests: AtomicUsize::new(0),
            confirm_gate: Mutex::new(None),
        })
    }

    pub fn hold_prompts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.confirm_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn answer_leave(&self, confirm: bool) {
        self.confirm_answer.store(confirm, Ordering::SeqCst);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn confirm_requests(&self) -> usize {
        self.confirm_requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionUi for FakeUi {
    async fn confirm_leave(&self) -> bool {
        self.confirm_requests.fetch_add(1, Ordering::SeqCst);

        let gate = self.confirm_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        settle_delay_ms: 50,
        ..ControllerConfig::default()
    }
}

pub struct Harness {
    pub controller: RecordingController,
    pub host: Arc<HostLifecycle>,
    pub capture: Arc<FakeCapture>,
    pub playback: Arc<FakePlayback>,
    pub ui: Arc<FakeUi>,
}

impl Harness {
    pub async fn mount() -> Self {
        Self::mount_with(FakeCapture::new(), FakePlayback::new()).await
    }

    pub async fn mount_with(capture: Arc<FakeCapture>, playback: Arc<FakePlayback>) -> Self {
        let host = Arc::new(HostLifecycle::new());
        let ui = FakeUi::new();

        let controller = RecordingController::mount(
            test_config(),
            capture.clone(),
            playback.clone(),
            ui.clone(),
            Arc::clone(&host),
        )
        .await;

        Self {
            controller,
            host,
            capture,
            playback,
            ui,
        }
    }

    /// Record, then stop, leaving the session in `Stopped` with a loaded preview
    pub async fn record_and_stop(&self) {
        self.controller.start_capture().await.unwrap();
        self.controller.stop_capture().await.unwrap();
    }

    /// Let the host event task drain until the session reaches `mode`
    pub async fn wait_for_mode(&self, mode: SessionMode) {
        for _ in 0..200 {
            if self.controller.mode().await == mode {
                // Let the handler finish the rest of its release
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "session never reached {}; still {}",
            mode,
            self.controller.mode().await
        );
    }
}
