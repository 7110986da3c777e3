//! Ordered checksum chains for each gateway operation family.
//!
//! Every chain closes with the uppercase SHA-512 of the merchant token, so
//! outbound payloads carry a proof of the secret without the secret itself.
//! The per-kind field order is data, not code: adding a kind means adding a
//! row to the chain table.

use masking::Secret;
use subtle::ConstantTimeEq;

use crate::{
    crypto,
    errors::{ChecksumError, CustomResult},
};

/// Fields that can occupy a checksum chain slot, named as the gateway
/// spells them on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChecksumField {
    /// Public merchant identifier on checkout dispatches.
    MerchantKey,
    /// Merchant invoice correlation id.
    InvoiceId,
    /// Charge amount string.
    Amount,
    /// ISO currency code.
    CurrencyCode,
    /// Merchant-side customer reference on recurring dispatches.
    CustomerRefNo,
    /// Public merchant identifier on stored-card calls.
    MerchantId,
    /// Merchant-side customer reference on stored-card calls.
    CustomerId,
    /// Stored card token.
    TokenId,
    /// Gateway order id reported back in notifications.
    PayableOrderId,
    /// Gateway transaction id reported back in notifications.
    PayableTransactionId,
    /// Settled amount reported back in notifications.
    PayableAmount,
    /// Settled currency reported back in notifications.
    PayableCurrency,
    /// Merchant invoice echoed back in notifications.
    InvoiceNo,
    /// Gateway status code reported back in notifications.
    StatusCode,
}

impl ChecksumField {
    /// Wire spelling of the field.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::MerchantKey => "merchantKey",
            Self::InvoiceId => "invoiceId",
            Self::Amount => "amount",
            Self::CurrencyCode => "currencyCode",
            Self::CustomerRefNo => "customerRefNo",
            Self::MerchantId => "merchantId",
            Self::CustomerId => "customerId",
            Self::TokenId => "tokenId",
            Self::PayableOrderId => "payableOrderId",
            Self::PayableTransactionId => "payableTransactionId",
            Self::PayableAmount => "payableAmount",
            Self::PayableCurrency => "payableCurrency",
            Self::InvoiceNo => "invoiceNo",
            Self::StatusCode => "statusCode",
        }
    }
}

/// One slot in a chain: which field fills it, and whether an absent value
/// hashes as an empty segment instead of failing closed.
#[derive(Clone, Copy, Debug)]
pub struct ChainSlot {
    /// Field occupying the slot.
    pub field: ChecksumField,
    /// Absent values hash as the empty string. Only documented optional
    /// fields carry this; everything else is required.
    pub optional_as_empty: bool,
}

const fn required(field: ChecksumField) -> ChainSlot {
    ChainSlot {
        field,
        optional_as_empty: false,
    }
}

const fn optional(field: ChecksumField) -> ChainSlot {
    ChainSlot {
        field,
        optional_as_empty: true,
    }
}

const PAYMENT_CHAIN: &[ChainSlot] = &[
    required(ChecksumField::MerchantKey),
    required(ChecksumField::InvoiceId),
    required(ChecksumField::Amount),
    required(ChecksumField::CurrencyCode),
];

const PAYMENT_WITH_CUSTOMER_REF_CHAIN: &[ChainSlot] = &[
    required(ChecksumField::MerchantKey),
    required(ChecksumField::InvoiceId),
    required(ChecksumField::Amount),
    required(ChecksumField::CurrencyCode),
    required(ChecksumField::CustomerRefNo),
];

const TOKENIZE_CHAIN: &[ChainSlot] = &[
    required(ChecksumField::MerchantId),
    required(ChecksumField::InvoiceId),
    required(ChecksumField::Amount),
    required(ChecksumField::CurrencyCode),
    required(ChecksumField::CustomerId),
    optional(ChecksumField::TokenId),
];

const TOKENIZE_LIST_CHAIN: &[ChainSlot] = &[
    required(ChecksumField::MerchantId),
    required(ChecksumField::CustomerId),
];

const TOKENIZE_CARD_CHAIN: &[ChainSlot] = &[
    required(ChecksumField::MerchantId),
    required(ChecksumField::CustomerId),
    required(ChecksumField::TokenId),
];

const WEBHOOK_VERIFY_CHAIN: &[ChainSlot] = &[
    required(ChecksumField::MerchantKey),
    required(ChecksumField::PayableOrderId),
    required(ChecksumField::PayableTransactionId),
    required(ChecksumField::PayableAmount),
    required(ChecksumField::PayableCurrency),
    required(ChecksumField::InvoiceNo),
    required(ChecksumField::StatusCode),
];

/// Chain families, one per gateway operation shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChecksumKind {
    /// One-time or recurring checkout dispatch.
    Payment,
    /// Recurring checkout dispatch carrying a customer reference.
    PaymentWithCustomerRef,
    /// Hosted card-save dispatch and stored-card charge.
    Tokenize,
    /// Stored-card listing.
    TokenizeList,
    /// Stored-card removal.
    TokenizeDelete,
    /// Stored-card metadata update.
    TokenizeEdit,
    /// Inbound notification verification.
    WebhookVerify,
}

impl ChecksumKind {
    /// Ordered slots hashed before the token hash for this kind.
    pub const fn chain_slots(self) -> &'static [ChainSlot] {
        match self {
            Self::Payment => PAYMENT_CHAIN,
            Self::PaymentWithCustomerRef => PAYMENT_WITH_CUSTOMER_REF_CHAIN,
            Self::Tokenize => TOKENIZE_CHAIN,
            Self::TokenizeList => TOKENIZE_LIST_CHAIN,
            Self::TokenizeDelete | Self::TokenizeEdit => TOKENIZE_CARD_CHAIN,
            Self::WebhookVerify => WEBHOOK_VERIFY_CHAIN,
        }
    }
}

/// Read view the chain builder consults for slot values.
pub trait ChecksumSource {
    /// Value for `field` if the payload carries one.
    fn checksum_field(&self, field: ChecksumField) -> Option<&str>;
}

/// Builds the chain for `kind` from `source` and returns the uppercase hex
/// check value.
///
/// Fails closed: a missing required slot is an error, never a silently
/// empty segment.
pub fn compute(
    kind: ChecksumKind,
    source: &dyn ChecksumSource,
    merchant_token: &Secret<String>,
) -> CustomResult<String, ChecksumError> {
    let token_hash = crypto::derive_token_hash(merchant_token);
    let slots = kind.chain_slots();
    let mut segments: Vec<&str> = Vec::with_capacity(slots.len() + 1);
    for slot in slots {
        match source.checksum_field(slot.field) {
            Some(value) => segments.push(value),
            None if slot.optional_as_empty => segments.push(""),
            None => {
                return Err(error_stack::report!(ChecksumError::MissingRequiredField {
                    field_name: slot.field.wire_name(),
                }))
            }
        }
    }
    segments.push(&token_hash);
    Ok(crypto::chain_hex(segments))
}

/// Recomputes the chain for `kind` and compares it against `claimed` in
/// constant time. Hex case differences are ignored.
pub fn verify(
    kind: ChecksumKind,
    source: &dyn ChecksumSource,
    merchant_token: &Secret<String>,
    claimed: &str,
) -> CustomResult<bool, ChecksumError> {
    let expected = compute(kind, source, merchant_token)?;
    let claimed = claimed.to_ascii_uppercase();
    Ok(expected.as_bytes().ct_eq(claimed.as_bytes()).into())
}
