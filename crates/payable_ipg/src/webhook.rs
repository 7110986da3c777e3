//! Inbound gateway notification handling.
//!
//! Notifications are verified before they are interpreted: the claimed
//! `checkValue` must match the recomputed webhook chain, otherwise the
//! delivery is rejected with no state change and the caller answers
//! non-200.

use error_stack::{report, IntoReport, ResultExt};

use crate::{
    checksum::{self, ChecksumField, ChecksumKind, ChecksumSource},
    config::GatewayConfig,
    consts,
    errors::{CustomResult, WebhookError},
};

/// Gateway-originated payment notification, camelCase on the wire.
///
/// The same shape arrives over the webhook channel and on the checkout
/// surface's success redirect.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    /// Public merchant identifier.
    pub merchant_key: String,
    /// Gateway order id.
    pub payable_order_id: String,
    /// Gateway transaction id.
    pub payable_transaction_id: String,
    /// Settled amount.
    pub payable_amount: String,
    /// Settled currency.
    pub payable_currency: String,
    /// Merchant invoice correlation id.
    pub invoice_no: String,
    /// Gateway status code.
    pub status_code: String,
    /// Human-readable status.
    pub status_message: String,
    /// Gateway payment type discriminator.
    pub payment_type: String,
    /// Payment method used on the hosted page.
    pub payment_method: String,
    /// Card scheme, when a card paid.
    pub payment_scheme: String,
    /// Passthrough field echoed from the dispatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom1: Option<String>,
    /// Passthrough field echoed from the dispatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom2: Option<String>,
    /// Cardholder display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_holder_name: Option<String>,
    /// Masked card number for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    /// Claimed integrity check value.
    pub check_value: String,
}

impl PaymentNotification {
    /// Settlement status the gateway reports.
    pub fn status(&self) -> PaymentStatus {
        match self.status_code.as_str() {
            consts::STATUS_CODE_SUCCESS => PaymentStatus::Success,
            consts::STATUS_CODE_PENDING => PaymentStatus::Pending,
            _ => PaymentStatus::Declined,
        }
    }

    /// Recomputes the webhook chain and compares it against the claimed
    /// check value. A chain that cannot be assembled counts as failed
    /// verification.
    pub fn verify(&self, config: &GatewayConfig) -> bool {
        checksum::verify(
            ChecksumKind::WebhookVerify,
            self,
            &config.credentials.merchant_token,
            &self.check_value,
        )
        .unwrap_or(false)
    }
}

impl ChecksumSource for PaymentNotification {
    fn checksum_field(&self, field: ChecksumField) -> Option<&str> {
        match field {
            ChecksumField::MerchantKey => Some(&self.merchant_key),
            ChecksumField::PayableOrderId => Some(&self.payable_order_id),
            ChecksumField::PayableTransactionId => Some(&self.payable_transaction_id),
            ChecksumField::PayableAmount => Some(&self.payable_amount),
            ChecksumField::PayableCurrency => Some(&self.payable_currency),
            ChecksumField::InvoiceNo => Some(&self.invoice_no),
            ChecksumField::StatusCode => Some(&self.status_code),
            ChecksumField::MerchantId
            | ChecksumField::InvoiceId
            | ChecksumField::Amount
            | ChecksumField::CurrencyCode
            | ChecksumField::CustomerRefNo
            | ChecksumField::CustomerId
            | ChecksumField::TokenId => None,
        }
    }
}

/// Settlement status classes derived from the gateway status code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum PaymentStatus {
    /// The payment settled.
    Success,
    /// The gateway is still processing; not terminal.
    Pending,
    /// The gateway declined the payment.
    Declined,
}

/// Body the receiving endpoint answers with on an accepted delivery.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct WebhookAck {
    /// HTTP-style status the gateway expects in the body.
    #[serde(rename = "Status")]
    pub status: u16,
}

impl WebhookAck {
    /// Ack for a verified, accepted delivery.
    pub const fn accepted() -> Self {
        Self { status: 200 }
    }
}

/// Decodes and verifies a raw webhook delivery.
///
/// Returns the notification together with the `{"Status": 200}` ack body
/// on success. A decoding or verification failure leaves no state behind;
/// the caller must answer non-200 and drop the delivery.
pub fn accept(
    raw_body: &[u8],
    config: &GatewayConfig,
) -> CustomResult<(PaymentNotification, WebhookAck), WebhookError> {
    let notification: PaymentNotification = serde_json::from_slice(raw_body)
        .into_report()
        .change_context(WebhookError::BodyDecodingFailed)?;
    if !notification.verify(config) {
        tracing::warn!(
            invoice = %notification.invoice_no,
            "webhook delivery failed source verification"
        );
        return Err(report!(WebhookError::SourceVerificationFailed));
    }
    tracing::info!(
        invoice = %notification.invoice_no,
        status = %notification.status_code,
        "verified gateway notification"
    );
    Ok((notification, WebhookAck::accepted()))
}
