//! Timer-driven owner of the current [`QrSession`].
//!
//! One timer task per session. Starting or refreshing a session cancels the
//! previous timer before the new one is spawned, and every timer carries the
//! generation it was started for, so a superseded timer can never publish
//! into or expire the replacement session. Dropping the controller stops its
//! timer.

use super::ports::{ClipboardPort, ClockPort};
use super::{QrSession, SessionSnapshot, TickOutcome};
use crate::payload::{PayloadBuilder, PaymentRequest};
use crate::{PixError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

type SharedSession = Arc<Mutex<QrSession>>;

fn lock(session: &SharedSession) -> MutexGuard<'_, QrSession> {
    // The lock is never held across an await or a panicking call.
    session.lock().unwrap_or_else(|e| e.into_inner())
}

/// Drives the countdown of the displayed payment code.
///
/// Must be used from within a tokio runtime: `start` and `refresh` spawn the
/// timer task.
///
/// # Example
///
/// ```rust,no_run
/// use pixkit_lib::payload::{PayloadBuilder, PaymentRequest};
/// use pixkit_lib::session::{MemoryClipboard, QrSessionController, SystemClock};
/// use std::sync::Arc;
///
/// # async fn example() -> pixkit_lib::Result<()> {
/// let mut controller = QrSessionController::new(
///     PayloadBuilder::default(),
///     Arc::new(SystemClock),
///     Arc::new(MemoryClipboard::new()),
/// );
/// let mut updates = controller.subscribe();
/// controller.start(PaymentRequest::new("user@example.com").with_expiration_minutes(5))?;
///
/// while updates.changed().await.is_ok() {
///     if let Some(snapshot) = updates.borrow().clone() {
///         println!("{} {}", snapshot.remaining_display, snapshot.state);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct QrSessionController {
    builder: PayloadBuilder,
    clock: Arc<dyn ClockPort>,
    clipboard: Arc<dyn ClipboardPort>,
    current: Option<SharedSession>,
    timer: Option<JoinHandle<()>>,
    generation: Arc<AtomicU64>,
    updates: watch::Sender<Option<SessionSnapshot>>,
}

impl QrSessionController {
    pub fn new(
        builder: PayloadBuilder,
        clock: Arc<dyn ClockPort>,
        clipboard: Arc<dyn ClipboardPort>,
    ) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            builder,
            clock,
            clipboard,
            current: None,
            timer: None,
            generation: Arc::new(AtomicU64::new(0)),
            updates,
        }
    }

    /// Receive a snapshot after every tick, start and refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSnapshot>> {
        self.updates.subscribe()
    }

    /// Render a payment code for `request` and start its countdown,
    /// discarding any session already running.
    ///
    /// # Errors
    ///
    /// Propagates payload build failures; the previous session, if any, is
    /// left running in that case.
    #[tracing::instrument(skip_all)]
    pub fn start(&mut self, request: PaymentRequest) -> Result<SessionSnapshot> {
        let session = QrSession::create(&self.builder, &request, self.clock.now())?;
        Ok(self.install(session))
    }

    /// Replace the current session with a fresh one: new transaction id,
    /// new payload, full countdown.
    ///
    /// # Errors
    ///
    /// [`PixError::NoActiveSession`] before `start`; otherwise propagates
    /// payload build failures.
    #[tracing::instrument(skip_all)]
    pub fn refresh(&mut self) -> Result<SessionSnapshot> {
        let current = self.current.as_ref().ok_or(PixError::NoActiveSession)?;
        let fresh = lock(current).refresh(&self.builder, self.clock.now())?;
        Ok(self.install(fresh))
    }

    /// Stop the timer and discard the session.
    pub fn stop(&mut self) {
        self.cancel_timer();
        self.current = None;
        self.updates.send_replace(None);
    }

    /// Latest state of the current session.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.current.as_ref().map(|s| lock(s).snapshot())
    }

    /// Copy-and-paste text of the current session, expired or not.
    pub fn payload_text(&self) -> Option<String> {
        self.current
            .as_ref()
            .map(|s| lock(s).payload().as_str().to_string())
    }

    /// Send the current payload to the clipboard.
    ///
    /// # Errors
    ///
    /// - [`PixError::NoActiveSession`] before `start`.
    /// - [`PixError::SessionExpired`] when the payload is stale.
    /// - Whatever the clipboard port reports; the session is unaffected.
    pub fn copy_payload(&self) -> Result<()> {
        let current = self.current.as_ref().ok_or(PixError::NoActiveSession)?;
        let text = {
            let session = lock(current);
            if session.is_expired() {
                return Err(PixError::SessionExpired {
                    transaction_id: session.transaction_id().to_string(),
                });
            }
            session.payload().as_str().to_string()
        };

        self.clipboard.copy(&text).map_err(|err| {
            tracing::warn!(error = %err, "copying payment code failed");
            err
        })
    }

    fn install(&mut self, session: QrSession) -> SessionSnapshot {
        self.cancel_timer();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = session.snapshot();
        let shared = Arc::new(Mutex::new(session));
        self.current = Some(Arc::clone(&shared));
        self.updates.send_replace(Some(snapshot.clone()));

        self.timer = Some(tokio::spawn(run_countdown(
            shared,
            Arc::clone(&self.clock),
            self.updates.clone(),
            Arc::clone(&self.generation),
            generation,
            self.builder.config().tick_interval(),
        )));

        snapshot
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for QrSessionController {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn run_countdown(
    session: SharedSession,
    clock: Arc<dyn ClockPort>,
    updates: watch::Sender<Option<SessionSnapshot>>,
    current_generation: Arc<AtomicU64>,
    generation: u64,
    period: std::time::Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if current_generation.load(Ordering::SeqCst) != generation {
            break;
        }

        let (outcome, snapshot) = {
            let mut session = lock(&session);
            let outcome = session.tick(clock.now());
            (outcome, session.snapshot())
        };
        updates.send_replace(Some(snapshot));

        match outcome {
            TickOutcome::Running => {}
            TickOutcome::Expired | TickOutcome::Idle => break,
        }
    }
}
