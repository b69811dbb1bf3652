//! Time-boxed lifecycle of a displayed payment code.
//!
//! A [`QrSession`] owns exactly one payload and counts down from the
//! configured lifetime, one tick per second. It moves `Active → Expired`
//! exactly once; nothing leads back to `Active` except [`QrSession::refresh`],
//! which produces a brand-new session with a new transaction id rather than
//! mutating the old one.
//!
//! [`QrSessionController`] drives the countdown from a tokio timer and
//! publishes [`SessionSnapshot`]s for a UI to subscribe to.

pub mod controller;
pub mod ports;

pub use controller::QrSessionController;
pub use ports::{ClipboardPort, ClockPort, ManualClock, MemoryClipboard, SystemClock};

use crate::payload::{Payload, PayloadBuilder, PaymentRequest};
use crate::txid::TransactionId;
use crate::{PixError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted session lifetime: one day.
pub const MAX_EXPIRATION_MINUTES: u32 = 24 * 60;

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// The payload may be shown and copied.
    Active,
    /// The countdown reached zero; the payload is stale.
    Expired,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Expired => f.write_str("expired"),
        }
    }
}

/// Result of one countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still active.
    Running,
    /// This tick expired the session. Returned once per session.
    Expired,
    /// The session had already expired; nothing changed.
    Idle,
}

/// Session metadata handed to the UI alongside the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub transaction_id: TransactionId,
    pub remaining_seconds: u32,
    /// `MM:SS`
    pub remaining_display: String,
    pub state: SessionState,
    pub expires_at: DateTime<Utc>,
}

/// A displayed payment code and its countdown.
#[derive(Clone, Debug)]
pub struct QrSession {
    request: PaymentRequest,
    payload: Payload,
    transaction_id: TransactionId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    duration_secs: u32,
    remaining_secs: u32,
    state: SessionState,
}

impl QrSession {
    /// Create an active session for `request`. Uses the request's transaction
    /// id when it carries one, otherwise generates a fresh id.
    ///
    /// # Errors
    ///
    /// [`PixError::InvalidData`] for a lifetime above one day; otherwise
    /// propagates payload build failures (`InvalidKey`, `FieldTooLong`).
    pub fn create(
        builder: &PayloadBuilder,
        request: &PaymentRequest,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let txid = TransactionId::from_optional(request.transaction_id.as_deref());
        Self::with_transaction_id(builder, request, txid, now)
    }

    /// Create an active session with an explicit transaction id.
    ///
    /// # Errors
    ///
    /// [`PixError::InvalidData`] when the lifetime exceeds
    /// [`MAX_EXPIRATION_MINUTES`]; otherwise propagates payload build failures.
    pub fn with_transaction_id(
        builder: &PayloadBuilder,
        request: &PaymentRequest,
        transaction_id: TransactionId,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let minutes = match request.expiration_minutes {
            0 => builder.config().default_expiration_minutes,
            m => m,
        };
        if minutes > MAX_EXPIRATION_MINUTES {
            return Err(PixError::invalid_data(
                "expirationMinutes",
                format!("{} exceeds {}", minutes, MAX_EXPIRATION_MINUTES),
            ));
        }
        let duration_secs = minutes * 60;
        let payload = builder.build_with_txid(request, &transaction_id)?;

        tracing::info!(
            txid = %transaction_id,
            duration_secs,
            "payment code session created"
        );

        Ok(Self {
            request: request.clone(),
            payload,
            transaction_id,
            created_at: now,
            expires_at: now + Duration::seconds(i64::from(duration_secs)),
            duration_secs,
            remaining_secs: duration_secs,
            state: SessionState::Active,
        })
    }

    /// Replace this session with a new one: fresh transaction id, rebuilt
    /// payload, full countdown. Valid from either state.
    ///
    /// # Errors
    ///
    /// Propagates payload build failures.
    pub fn refresh(&self, builder: &PayloadBuilder, now: DateTime<Utc>) -> Result<Self> {
        let txid = TransactionId::generate_distinct_from(&self.transaction_id);
        tracing::info!(
            old_txid = %self.transaction_id,
            new_txid = %txid,
            "refreshing payment code"
        );
        Self::with_transaction_id(builder, &self.request, txid, now)
    }

    /// Advance the countdown by one tick.
    ///
    /// The counter is also clamped to the time left until `expires_at`, so a
    /// missed tick is caught up on the next one.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.state == SessionState::Expired {
            return TickOutcome::Idle;
        }

        // Round up so timer jitter does not drop a second early.
        let left_ms = (self.expires_at - now).num_milliseconds().max(0);
        let by_clock = u32::try_from((left_ms + 999) / 1000).unwrap_or(u32::MAX);
        self.remaining_secs = self.remaining_secs.saturating_sub(1).min(by_clock);

        if self.remaining_secs == 0 {
            self.state = SessionState::Expired;
            tracing::info!(txid = %self.transaction_id, "payment code expired");
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn request(&self) -> &PaymentRequest {
        &self.request
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_expired(&self) -> bool {
        self.state == SessionState::Expired
    }

    /// Full lifetime in seconds.
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Remaining time as `MM:SS`.
    pub fn remaining_display(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            transaction_id: self.transaction_id.clone(),
            remaining_seconds: self.remaining_secs,
            remaining_display: self.remaining_display(),
            state: self.state,
            expires_at: self.expires_at,
        }
    }
}

/// Format seconds as `MM:SS`; minutes are not capped at 59.
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest::new("user@example.com")
            .with_amount("20.00".parse().unwrap())
            .with_expiration_minutes(5)
    }

    #[test]
    fn test_new_session_is_active_with_full_countdown() {
        let now = Utc::now();
        let session = QrSession::create(&PayloadBuilder::default(), &request(), now).unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.remaining_secs(), 300);
        assert_eq!(session.remaining_display(), "05:00");
        assert_eq!(session.expires_at() - session.created_at(), Duration::seconds(300));
        assert!(!session.transaction_id().is_unset());
    }

    #[test]
    fn test_explicit_txid_is_used() {
        let session = QrSession::create(
            &PayloadBuilder::default(),
            &request().with_transaction_id("PEDIDO9"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(session.transaction_id().as_str(), "PEDIDO9");
        assert!(session.payload().as_str().contains("0507PEDIDO9"));
    }

    #[test]
    fn test_expires_after_full_countdown_exactly_once() {
        let now = Utc::now();
        let mut session = QrSession::create(&PayloadBuilder::default(), &request(), now).unwrap();

        for _ in 0..299 {
            assert_eq!(session.tick(now), TickOutcome::Running);
        }
        assert_eq!(session.remaining_display(), "00:01");
        assert_eq!(session.tick(now), TickOutcome::Expired);
        assert!(session.is_expired());
        assert_eq!(session.tick(now), TickOutcome::Idle);
        assert_eq!(session.tick(now), TickOutcome::Idle);
        assert_eq!(session.remaining_secs(), 0);
    }

    #[test]
    fn test_missed_ticks_caught_up_by_clock() {
        let now = Utc::now();
        let mut session = QrSession::create(&PayloadBuilder::default(), &request(), now).unwrap();
        assert_eq!(session.tick(now + Duration::seconds(120)), TickOutcome::Running);
        assert_eq!(session.remaining_secs(), 180);
        assert_eq!(session.tick(now + Duration::seconds(400)), TickOutcome::Expired);
    }

    #[test]
    fn test_refresh_replaces_session() {
        let now = Utc::now();
        let builder = PayloadBuilder::default();
        let mut session = QrSession::create(&builder, &request(), now).unwrap();
        while session.tick(now) != TickOutcome::Expired {}

        let later = now + Duration::seconds(600);
        let fresh = session.refresh(&builder, later).unwrap();
        assert_eq!(fresh.state(), SessionState::Active);
        assert_eq!(fresh.remaining_secs(), 300);
        assert_ne!(fresh.transaction_id(), session.transaction_id());
        assert_ne!(fresh.payload(), session.payload());
        assert_eq!(fresh.created_at(), later);
        // the old value is untouched
        assert!(session.is_expired());
    }

    #[test]
    fn test_zero_minutes_uses_configured_default() {
        let session = QrSession::create(
            &PayloadBuilder::default(),
            &request().with_expiration_minutes(0),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(session.duration_secs(), 300);
    }

    #[test]
    fn test_lifetime_above_one_day_rejected() {
        let err = QrSession::create(
            &PayloadBuilder::default(),
            &request().with_expiration_minutes(MAX_EXPIRATION_MINUTES + 1),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.code(), crate::PixErrorCode::InvalidData);
        assert!(err.to_string().contains("expirationMinutes"));

        let longest = QrSession::create(
            &PayloadBuilder::default(),
            &request().with_expiration_minutes(MAX_EXPIRATION_MINUTES),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(longest.remaining_display(), "1440:00");
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(59), "00:59");
        assert_eq!(format_mm_ss(61), "01:01");
        assert_eq!(format_mm_ss(3600), "60:00");
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let session =
            QrSession::create(&PayloadBuilder::default(), &request(), Utc::now()).unwrap();
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["remainingSeconds"], 300);
        assert_eq!(json["remainingDisplay"], "05:00");
        assert_eq!(json["state"], "Active");
    }
}
