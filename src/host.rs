//! Host lifecycle notifications
//!
//! Delivers app foreground/background changes and navigation intercepts to
//! the screen's controller. Navigation requests carry a one-shot reply so the
//! controller can hold the navigation until the user confirms or cancels.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Outcome of a navigation intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Navigation continues
    Proceed,
    /// Navigation is cancelled and the screen stays
    Stay,
}

/// Pending navigation awaiting the controller's answer
#[derive(Debug)]
pub struct LeaveRequest {
    reply: oneshot::Sender<NavigationDecision>,
}

impl LeaveRequest {
    pub fn new() -> (Self, oneshot::Receiver<NavigationDecision>) {
        let (reply, rx) = oneshot::channel();
        (Self { reply }, rx)
    }

    pub fn proceed(self) {
        self.answer(NavigationDecision::Proceed);
    }

    pub fn stay(self) {
        self.answer(NavigationDecision::Stay);
    }

    pub fn answer(self, decision: NavigationDecision) {
        if self.reply.send(decision).is_err() {
            debug!("Navigation requester went away before {:?}", decision);
        }
    }
}

#[derive(Debug)]
pub enum HostEvent {
    AppBackgrounded,
    AppForegrounded,
    NavigationAboutToLeave(LeaveRequest),
    HardwareBackPressed(LeaveRequest),
}

/// Receiving end handed to the subscriber
pub struct HostSubscription {
    id: u64,
    events: mpsc::UnboundedReceiver<HostEvent>,
}

impl HostSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn next(&mut self) -> Option<HostEvent> {
        self.events.recv().await
    }
}

/// Single-subscriber host lifecycle notifier
///
/// A new subscription replaces the previous one, matching one live recording
/// screen per host.
#[derive(Default)]
pub struct HostLifecycle {
    subscriber: Mutex<Option<(u64, mpsc::UnboundedSender<HostEvent>)>>,
    next_id: AtomicU64,
}

impl HostLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<(u64, mpsc::UnboundedSender<HostEvent>)>> {
        // The slot holds no invariant a panicking holder could break
        self.subscriber
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> HostSubscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::unbounded_channel();

        if self.slot().replace((id, tx)).is_some() {
            warn!("Host subscription replaced by {}", id);
        }

        HostSubscription { id, events: rx }
    }

    /// Remove the subscription if it is still the current one
    pub fn unsubscribe(&self, id: u64) {
        let mut slot = self.slot();
        if slot.as_ref().map(|(current, _)| *current) == Some(id) {
            *slot = None;
            debug!("Host subscription {} removed", id);
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.slot().is_some()
    }

    /// Deliver an event; returns it back if nobody is listening
    pub fn emit(&self, event: HostEvent) -> Result<(), HostEvent> {
        match self.slot().as_ref() {
            Some((_, tx)) => tx.send(event).map_err(|e| e.0),
            None => Err(event),
        }
    }

    pub fn app_backgrounded(&self) {
        if self.emit(HostEvent::AppBackgrounded).is_err() {
            debug!("App backgrounded with no subscriber");
        }
    }

    pub fn app_foregrounded(&self) {
        if self.emit(HostEvent::AppForegrounded).is_err() {
            debug!("App foregrounded with no subscriber");
        }
    }

    /// In-app navigation is about to leave the screen
    pub async fn request_navigation_leave(&self) -> NavigationDecision {
        let (request, rx) = LeaveRequest::new();
        self.dispatch_leave(HostEvent::NavigationAboutToLeave(request), rx)
            .await
    }

    /// OS back button or gesture
    pub async fn hardware_back_pressed(&self) -> NavigationDecision {
        let (request, rx) = LeaveRequest::new();
        self.dispatch_leave(HostEvent::HardwareBackPressed(request), rx)
            .await
    }

    async fn dispatch_leave(
        &self,
        event: HostEvent,
        rx: oneshot::Receiver<NavigationDecision>,
    ) -> NavigationDecision {
        if self.emit(event).is_err() {
            return NavigationDecision::Proceed;
        }
        // An unanswered request never traps the user on the screen
        rx.await.unwrap_or(NavigationDecision::Proceed)
    }
}
