//! Payment session lifecycle tracking.
//!
//! One registry owns every in-flight attempt, keyed by invoice id. The
//! checkout surface and the webhook channel feed events in from different
//! execution contexts; the per-invoice entry guard is the serialization
//! point, and the first verified terminal event wins. Caller notifications
//! fire after the guard is dropped so observers may call back into the SDK.

use std::sync::Arc;

use dashmap::DashMap;
use error_stack::report;
use time::OffsetDateTime;

use crate::{
    config::GatewayConfig,
    errors::{CustomResult, SessionError},
    payments::CheckoutRequest,
    webhook::{PaymentNotification, PaymentStatus},
};

/// Lifecycle states of one payment attempt.
///
/// `Completed`, `Cancelled` and `Failed` are terminal; no event moves a
/// session out of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum SessionState {
    /// The signed request has been handed to the checkout surface.
    Dispatched,
    /// The surface has taken control; an outcome is pending.
    AwaitingOutcome,
    /// A verified success settled the attempt.
    Completed,
    /// The customer abandoned the attempt.
    Cancelled,
    /// The attempt failed or its outcome could not be verified.
    Failed,
}

impl SessionState {
    /// Whether this state absorbs further events.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Terminal failure delivered through [`PaymentObserver::on_payment_error`].
#[derive(Clone, Debug, thiserror::Error)]
pub enum PaymentFailure {
    /// An inbound result claimed an outcome its check value does not prove.
    #[error("Notification for invoice {invoice_id} failed integrity verification")]
    IntegrityMismatch {
        /// Invoice the unverifiable notification addressed.
        invoice_id: String,
    },
    /// The gateway reported a declined payment.
    #[error("Payment for invoice {invoice_id} declined with status {status_code}: {status_message}")]
    Declined {
        /// Invoice of the declined attempt.
        invoice_id: String,
        /// Raw gateway status code.
        status_code: String,
        /// Gateway status message.
        status_message: String,
    },
    /// The checkout surface reported a rendering or navigation error.
    #[error("Checkout surface failed for invoice {invoice_id}: {message}")]
    Surface {
        /// Invoice of the failed attempt.
        invoice_id: String,
        /// Surface-supplied description.
        message: String,
    },
}

/// Caller-facing notification contract. Exactly one `started` and at most
/// one of `completed`/`error`/`cancelled` fire per session.
pub trait PaymentObserver: Send + Sync {
    /// A session was created and its request dispatched.
    fn on_payment_started(&self, invoice_id: &str);
    /// A verified success settled the session.
    fn on_payment_completed(&self, notification: &PaymentNotification);
    /// The session failed terminally.
    fn on_payment_error(&self, failure: &PaymentFailure);
    /// The customer abandoned the session.
    fn on_payment_cancelled(&self, invoice_id: &str);
}

/// How the machine disposed of an inbound event.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventDisposition {
    /// The event transitioned the session.
    Accepted,
    /// The gateway is still processing; the session keeps awaiting.
    Pending,
    /// The event referenced no active session and was ignored.
    Stale,
    /// A second terminal confirmation matching the recorded outcome.
    Duplicate,
    /// A second terminal confirmation disagreeing with the recorded
    /// outcome. The original outcome stands; the caller should treat this
    /// as an integrity anomaly.
    ConflictingDuplicate,
}

#[derive(Debug)]
struct PaymentSession {
    state: SessionState,
    started_at: OffsetDateTime,
    settled_status: Option<String>,
}

impl PaymentSession {
    fn new() -> Self {
        Self {
            state: SessionState::Dispatched,
            started_at: OffsetDateTime::now_utc(),
            settled_status: None,
        }
    }
}

enum Notify {
    None,
    Completed(Box<PaymentNotification>),
    Error(PaymentFailure),
    Cancelled(String),
}

/// Registry of in-flight payment sessions and their transition rules.
pub struct PaymentSessionMachine {
    config: Arc<GatewayConfig>,
    observer: Arc<dyn PaymentObserver>,
    sessions: DashMap<String, PaymentSession>,
}

impl std::fmt::Debug for PaymentSessionMachine {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PaymentSessionMachine")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl PaymentSessionMachine {
    /// Creates a machine notifying `observer`.
    pub fn new(config: Arc<GatewayConfig>, observer: Arc<dyn PaymentObserver>) -> Self {
        Self {
            config,
            observer,
            sessions: DashMap::new(),
        }
    }

    /// Registers a session for `request` and fires `on_payment_started`.
    ///
    /// An invoice already tracked, settled or not, is rejected; settled
    /// sessions must be removed with [`Self::sweep_settled`] before the
    /// invoice id can be reused.
    pub fn dispatch(&self, request: &CheckoutRequest) -> CustomResult<(), SessionError> {
        let invoice_id = request.invoice_id().to_string();
        match self.sessions.entry(invoice_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(report!(SessionError::DuplicateInvoice { invoice_id }));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(PaymentSession::new());
            }
        }
        tracing::info!(invoice = %invoice_id, kind = %request.kind(), "payment session dispatched");
        self.observer.on_payment_started(&invoice_id);
        Ok(())
    }

    /// The checkout surface has taken control of the dispatched request.
    pub fn surface_acknowledged(&self, invoice_id: &str) -> EventDisposition {
        match self.sessions.get_mut(invoice_id) {
            Some(mut session) if session.state == SessionState::Dispatched => {
                session.state = SessionState::AwaitingOutcome;
                EventDisposition::Accepted
            }
            Some(_) | None => EventDisposition::Stale,
        }
    }

    /// The checkout surface observed a success redirect carrying
    /// `notification`. Honored only after checksum verification.
    pub fn surface_success(&self, notification: PaymentNotification) -> EventDisposition {
        self.settle(notification)
    }

    /// The webhook channel delivered `notification`. Verified and honored
    /// exactly like the surface success path; a race between the two
    /// channels resolves to whichever verified event arrived first.
    pub fn webhook_confirmed(&self, notification: PaymentNotification) -> EventDisposition {
        self.settle(notification)
    }

    /// The checkout surface reported a navigation or rendering error.
    pub fn surface_error(&self, invoice_id: &str, message: &str) -> EventDisposition {
        let Some(mut session) = self.sessions.get_mut(invoice_id) else {
            return EventDisposition::Stale;
        };
        if session.state.is_terminal() {
            return EventDisposition::Stale;
        }
        session.state = SessionState::Failed;
        drop(session);
        self.notify(Notify::Error(PaymentFailure::Surface {
            invoice_id: invoice_id.to_string(),
            message: message.to_string(),
        }));
        EventDisposition::Accepted
    }

    /// The customer abandoned the hosted page.
    pub fn surface_cancelled(&self, invoice_id: &str) -> EventDisposition {
        let Some(mut session) = self.sessions.get_mut(invoice_id) else {
            return EventDisposition::Stale;
        };
        if session.state.is_terminal() {
            return EventDisposition::Stale;
        }
        session.state = SessionState::Cancelled;
        drop(session);
        self.notify(Notify::Cancelled(invoice_id.to_string()));
        EventDisposition::Accepted
    }

    /// Current state of the session for `invoice_id`, if one is tracked.
    pub fn state(&self, invoice_id: &str) -> Option<SessionState> {
        self.sessions.get(invoice_id).map(|session| session.state)
    }

    /// Removes settled sessions from the registry and returns how many
    /// were dropped. Until swept, settled sessions keep absorbing late
    /// duplicate confirmations.
    pub fn sweep_settled(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.state.is_terminal());
        before - self.sessions.len()
    }

    fn settle(&self, notification: PaymentNotification) -> EventDisposition {
        let verified = notification.verify(&self.config);
        let Some(mut session) = self.sessions.get_mut(notification.invoice_no.as_str()) else {
            tracing::warn!(
                invoice = %notification.invoice_no,
                "settlement event for an unknown invoice ignored"
            );
            return EventDisposition::Stale;
        };

        if session.state.is_terminal() {
            // First verified terminal event already won; reconcile the
            // latecomer against the recorded outcome.
            let matches_outcome = verified
                && session.settled_status.as_deref() == Some(notification.status_code.as_str());
            drop(session);
            return if matches_outcome {
                EventDisposition::Duplicate
            } else {
                tracing::warn!(
                    invoice = %notification.invoice_no,
                    status = %notification.status_code,
                    "conflicting duplicate confirmation for a settled session"
                );
                EventDisposition::ConflictingDuplicate
            };
        }

        let elapsed = OffsetDateTime::now_utc() - session.started_at;
        let (disposition, notify) = if !verified {
            session.state = SessionState::Failed;
            (
                EventDisposition::Accepted,
                Notify::Error(PaymentFailure::IntegrityMismatch {
                    invoice_id: notification.invoice_no.clone(),
                }),
            )
        } else {
            match notification.status() {
                PaymentStatus::Success => {
                    session.state = SessionState::Completed;
                    session.settled_status = Some(notification.status_code.clone());
                    (
                        EventDisposition::Accepted,
                        Notify::Completed(Box::new(notification)),
                    )
                }
                PaymentStatus::Pending => {
                    session.state = SessionState::AwaitingOutcome;
                    (EventDisposition::Pending, Notify::None)
                }
                PaymentStatus::Declined => {
                    session.state = SessionState::Failed;
                    session.settled_status = Some(notification.status_code.clone());
                    (
                        EventDisposition::Accepted,
                        Notify::Error(PaymentFailure::Declined {
                            invoice_id: notification.invoice_no.clone(),
                            status_code: notification.status_code.clone(),
                            status_message: notification.status_message.clone(),
                        }),
                    )
                }
            }
        };
        if session.state.is_terminal() {
            tracing::info!(
                state = %session.state,
                elapsed = %elapsed,
                "payment session settled"
            );
        }
        drop(session);
        self.notify(notify);
        disposition
    }

    fn notify(&self, notify: Notify) {
        match notify {
            Notify::None => {}
            Notify::Completed(notification) => self.observer.on_payment_completed(&notification),
            Notify::Error(failure) => self.observer.on_payment_error(&failure),
            Notify::Cancelled(invoice_id) => self.observer.on_payment_cancelled(&invoice_id),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    struct SilentObserver;

    impl PaymentObserver for SilentObserver {
        fn on_payment_started(&self, _invoice_id: &str) {}
        fn on_payment_completed(&self, _notification: &PaymentNotification) {}
        fn on_payment_error(&self, _failure: &PaymentFailure) {}
        fn on_payment_cancelled(&self, _invoice_id: &str) {}
    }

    fn machine() -> PaymentSessionMachine {
        use masking::Secret;

        use crate::config::{Environment, MerchantCredentials};

        PaymentSessionMachine::new(
            Arc::new(GatewayConfig {
                environment: Environment::Sandbox,
                credentials: MerchantCredentials {
                    merchant_key: "MK1".to_string(),
                    merchant_token: Secret::new("SECRET".to_string()),
                    business_key: None,
                    business_token: None,
                },
                notification_url: None,
            }),
            Arc::new(SilentObserver),
        )
    }

    fn insert_session(machine: &PaymentSessionMachine, invoice_id: &str) {
        machine
            .sessions
            .insert(invoice_id.to_string(), PaymentSession::new());
    }

    #[test]
    fn acknowledgement_moves_a_dispatched_session_to_awaiting() {
        let machine = machine();
        insert_session(&machine, "INV-1");
        assert_eq!(
            machine.surface_acknowledged("INV-1"),
            EventDisposition::Accepted
        );
        assert_eq!(machine.state("INV-1"), Some(SessionState::AwaitingOutcome));
        // A second acknowledgement has nothing to move.
        assert_eq!(
            machine.surface_acknowledged("INV-1"),
            EventDisposition::Stale
        );
    }

    #[test]
    fn acknowledgement_for_an_unknown_invoice_is_stale() {
        let machine = machine();
        assert_eq!(
            machine.surface_acknowledged("INV-404"),
            EventDisposition::Stale
        );
        assert_eq!(machine.state("INV-404"), None);
    }

    #[test]
    fn cancel_settles_an_awaiting_session() {
        let machine = machine();
        insert_session(&machine, "INV-1");
        machine.surface_acknowledged("INV-1");
        assert_eq!(
            machine.surface_cancelled("INV-1"),
            EventDisposition::Accepted
        );
        assert_eq!(machine.state("INV-1"), Some(SessionState::Cancelled));
        // Terminal states absorb.
        assert_eq!(machine.surface_cancelled("INV-1"), EventDisposition::Stale);
        assert_eq!(
            machine.surface_error("INV-1", "late error"),
            EventDisposition::Stale
        );
    }

    #[test]
    fn sweep_removes_only_settled_sessions() {
        let machine = machine();
        insert_session(&machine, "INV-1");
        insert_session(&machine, "INV-2");
        machine.surface_cancelled("INV-1");
        assert_eq!(machine.sweep_settled(), 1);
        assert_eq!(machine.state("INV-1"), None);
        assert_eq!(machine.state("INV-2"), Some(SessionState::Dispatched));
    }
}
