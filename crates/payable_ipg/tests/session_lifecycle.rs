#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end lifecycle coverage: the dual-channel settlement race,
//! duplicate reconciliation, stale events and single-flight token refresh.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use masking::Secret;
use payable_ipg::{
    auth::{CredentialVault, TokenTransport},
    config::{Environment, GatewayConfig, MerchantCredentials},
    crypto,
    errors::{CustomResult, SessionError, TransportError},
    payments::{
        Address, CheckoutOperation, CheckoutRequest, CustomerDetails, PaymentFields,
        PaymentRequestBuilder,
    },
    request::Request,
    session::{
        EventDisposition, PaymentFailure, PaymentObserver, PaymentSessionMachine, SessionState,
    },
    webhook::PaymentNotification,
};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Event {
    Started(String),
    Completed(String),
    Error(String),
    Cancelled(String),
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn terminal_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|event| !matches!(event, Event::Started(_)))
            .collect()
    }
}

impl PaymentObserver for RecordingObserver {
    fn on_payment_started(&self, invoice_id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Started(invoice_id.to_string()));
    }

    fn on_payment_completed(&self, notification: &PaymentNotification) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Completed(notification.invoice_no.clone()));
    }

    fn on_payment_error(&self, failure: &PaymentFailure) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Error(failure.to_string()));
    }

    fn on_payment_cancelled(&self, invoice_id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Cancelled(invoice_id.to_string()));
    }
}

fn config() -> Arc<GatewayConfig> {
    Arc::new(GatewayConfig {
        environment: Environment::Sandbox,
        credentials: MerchantCredentials {
            merchant_key: "MK1".to_string(),
            merchant_token: Secret::new("SECRET".to_string()),
            business_key: Some("BK1".to_string()),
            business_token: Some(Secret::new("BT1".to_string())),
        },
        notification_url: None,
    })
}

fn harness() -> (PaymentSessionMachine, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let machine = PaymentSessionMachine::new(config(), observer.clone());
    (machine, observer)
}

fn checkout_request(invoice_id: &str) -> CheckoutRequest {
    PaymentRequestBuilder::new(config())
        .build(CheckoutOperation::OneTime {
            fields: PaymentFields {
                invoice_id: invoice_id.to_string(),
                amount: "100.00".to_string(),
                currency_code: "LKR".to_string(),
                order_description: None,
                customer: CustomerDetails {
                    first_name: "Amara".to_string(),
                    last_name: "Perera".to_string(),
                    email: "amara@example.com".to_string(),
                    mobile: "+94771234567".to_string(),
                },
                billing: Address {
                    line1: "10 Galle Road".to_string(),
                    line2: None,
                    city: "Colombo".to_string(),
                    country: "LK".to_string(),
                    postal_code: None,
                },
                shipping: None,
                custom1: None,
                custom2: None,
            },
        })
        .unwrap()
}

fn notification(invoice_id: &str, status_code: &str) -> PaymentNotification {
    let token_hash = crypto::derive_token_hash(&Secret::new("SECRET".to_string()));
    let check_value = crypto::chain_hex([
        "MK1",
        "ORD-1",
        "TXN-1",
        "100.00",
        "LKR",
        invoice_id,
        status_code,
        token_hash.as_str(),
    ]);
    PaymentNotification {
        merchant_key: "MK1".to_string(),
        payable_order_id: "ORD-1".to_string(),
        payable_transaction_id: "TXN-1".to_string(),
        payable_amount: "100.00".to_string(),
        payable_currency: "LKR".to_string(),
        invoice_no: invoice_id.to_string(),
        status_code: status_code.to_string(),
        status_message: "SUCCESS".to_string(),
        payment_type: "1".to_string(),
        payment_method: "VISA".to_string(),
        payment_scheme: "VISA".to_string(),
        custom1: None,
        custom2: None,
        card_holder_name: None,
        card_number: None,
        check_value,
    }
}

fn tampered_notification(invoice_id: &str) -> PaymentNotification {
    let mut payload = notification(invoice_id, "1");
    payload.payable_amount = "999999.00".to_string();
    payload
}

#[test]
fn dispatch_starts_the_session_exactly_once() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();

    assert_eq!(machine.state("INV-1"), Some(SessionState::Dispatched));
    assert_eq!(observer.events(), vec![Event::Started("INV-1".to_string())]);

    let error = machine.dispatch(&checkout_request("INV-1")).unwrap_err();
    assert!(matches!(
        error.current_context(),
        SessionError::DuplicateInvoice { invoice_id } if invoice_id == "INV-1"
    ));
    // The rejected dispatch fired nothing.
    assert_eq!(observer.events().len(), 1);
}

#[test]
fn surface_success_then_webhook_completes_once() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.surface_acknowledged("INV-1");

    assert_eq!(
        machine.surface_success(notification("INV-1", "1")),
        EventDisposition::Accepted
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Completed));

    assert_eq!(
        machine.webhook_confirmed(notification("INV-1", "1")),
        EventDisposition::Duplicate
    );
    assert_eq!(
        observer.terminal_events(),
        vec![Event::Completed("INV-1".to_string())]
    );
}

#[test]
fn webhook_then_surface_success_completes_once() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.surface_acknowledged("INV-1");

    assert_eq!(
        machine.webhook_confirmed(notification("INV-1", "1")),
        EventDisposition::Accepted
    );
    assert_eq!(
        machine.surface_success(notification("INV-1", "1")),
        EventDisposition::Duplicate
    );
    assert_eq!(
        observer.terminal_events(),
        vec![Event::Completed("INV-1".to_string())]
    );
}

#[test]
fn racing_channels_settle_the_session_exactly_once() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.surface_acknowledged("INV-1");

    std::thread::scope(|scope| {
        let surface = scope.spawn(|| machine.surface_success(notification("INV-1", "1")));
        let webhook = scope.spawn(|| machine.webhook_confirmed(notification("INV-1", "1")));
        let dispositions = [surface.join().unwrap(), webhook.join().unwrap()];
        assert!(dispositions.contains(&EventDisposition::Accepted));
        assert!(dispositions.contains(&EventDisposition::Duplicate));
    });

    assert_eq!(machine.state("INV-1"), Some(SessionState::Completed));
    assert_eq!(
        observer.terminal_events(),
        vec![Event::Completed("INV-1".to_string())]
    );
}

#[test]
fn unverifiable_webhook_fails_the_session() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.surface_acknowledged("INV-1");

    assert_eq!(
        machine.webhook_confirmed(tampered_notification("INV-1")),
        EventDisposition::Accepted
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Failed));
    assert!(matches!(
        observer.terminal_events().as_slice(),
        [Event::Error(message)] if message.contains("integrity")
    ));
}

#[test]
fn declined_webhook_fails_the_session() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.surface_acknowledged("INV-1");

    let mut declined = notification("INV-1", "3");
    declined.status_message = "INSUFFICIENT FUNDS".to_string();
    assert_eq!(
        machine.webhook_confirmed(declined),
        EventDisposition::Accepted
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Failed));
    assert!(matches!(
        observer.terminal_events().as_slice(),
        [Event::Error(message)] if message.contains("INSUFFICIENT FUNDS")
    ));
}

#[test]
fn pending_webhook_keeps_the_session_awaiting() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();

    assert_eq!(
        machine.webhook_confirmed(notification("INV-1", "0")),
        EventDisposition::Pending
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::AwaitingOutcome));
    assert!(observer.terminal_events().is_empty());

    assert_eq!(
        machine.webhook_confirmed(notification("INV-1", "1")),
        EventDisposition::Accepted
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Completed));
}

#[test]
fn event_for_an_unknown_invoice_is_a_no_op() {
    let (machine, observer) = harness();
    assert_eq!(
        machine.webhook_confirmed(notification("INV-404", "1")),
        EventDisposition::Stale
    );
    assert_eq!(
        machine.surface_success(notification("INV-404", "1")),
        EventDisposition::Stale
    );
    assert_eq!(machine.state("INV-404"), None);
    assert!(observer.events().is_empty());
}

#[test]
fn conflicting_duplicate_preserves_the_recorded_outcome() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.surface_acknowledged("INV-1");
    machine.surface_success(notification("INV-1", "1"));

    // A later verified webhook disagreeing on the status is an anomaly.
    assert_eq!(
        machine.webhook_confirmed(notification("INV-1", "3")),
        EventDisposition::ConflictingDuplicate
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Completed));
    assert_eq!(
        observer.terminal_events(),
        vec![Event::Completed("INV-1".to_string())]
    );
}

#[test]
fn cancellation_settles_the_session_and_absorbs_late_webhooks() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.surface_acknowledged("INV-1");

    assert_eq!(
        machine.surface_cancelled("INV-1"),
        EventDisposition::Accepted
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Cancelled));

    // A webhook arriving after the customer backed out disagrees with the
    // recorded outcome and must not resurrect the session.
    assert_eq!(
        machine.webhook_confirmed(notification("INV-1", "1")),
        EventDisposition::ConflictingDuplicate
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Cancelled));
    assert_eq!(
        observer.terminal_events(),
        vec![Event::Cancelled("INV-1".to_string())]
    );
}

#[test]
fn surface_error_fails_an_awaiting_session() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();

    assert_eq!(
        machine.surface_error("INV-1", "hosted page rejected the request"),
        EventDisposition::Accepted
    );
    assert_eq!(machine.state("INV-1"), Some(SessionState::Failed));
    assert!(matches!(
        observer.terminal_events().as_slice(),
        [Event::Error(message)] if message.contains("hosted page rejected the request")
    ));
}

#[test]
fn independent_invoices_settle_independently() {
    let (machine, observer) = harness();
    machine.dispatch(&checkout_request("INV-1")).unwrap();
    machine.dispatch(&checkout_request("INV-2")).unwrap();

    machine.webhook_confirmed(notification("INV-2", "1"));
    assert_eq!(machine.state("INV-1"), Some(SessionState::Dispatched));
    assert_eq!(machine.state("INV-2"), Some(SessionState::Completed));

    machine.surface_cancelled("INV-1");
    assert_eq!(
        observer.terminal_events(),
        vec![
            Event::Completed("INV-2".to_string()),
            Event::Cancelled("INV-1".to_string()),
        ]
    );

    assert_eq!(machine.sweep_settled(), 2);
}

struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl TokenTransport for CountingTransport {
    async fn execute(&self, _request: Request) -> CustomResult<Vec<u8>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        Ok(br#"{"accessToken":"tok-1","expiresIn":900}"#.to_vec())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_token_requests_share_one_acquisition() {
    let vault = Arc::new(CredentialVault::new(config()));
    let transport = Arc::new(CountingTransport {
        calls: AtomicUsize::new(0),
    });

    let first = {
        let vault = vault.clone();
        let transport = transport.clone();
        tokio::spawn(async move { vault.get_valid_token(&*transport).await })
    };
    let second = {
        let vault = vault.clone();
        let transport = transport.clone();
        tokio::spawn(async move { vault.get_valid_token(&*transport).await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.expires_at, second.expires_at);
}
