//! Checkout dispatch assembly and stored-card request building.
//!
//! Checkout dispatches are self-contained signed form payloads handed to
//! the external checkout surface. Stored-card operations are bearer
//! authorized REST calls prepared as transport envelopes. Both read the
//! merchant token exactly once, to close the checksum chain; the token
//! itself never enters a payload.

use std::sync::Arc;

use error_stack::{report, IntoReport, ResultExt};
use masking::{PeekInterface, Secret};
use time::Date;

use crate::{
    auth::{CredentialVault, TokenTransport},
    checksum::{self, ChecksumField, ChecksumKind, ChecksumSource},
    config::GatewayConfig,
    consts,
    errors::{CustomResult, ParsingError, TokenRequestError, ValidationError},
    request::{headers, Method, Request, RequestBuilder, RequestContent},
    validation,
};

/// Operation families the gateway distinguishes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, strum::Display)]
pub enum PaymentKind {
    /// Single hosted-checkout charge.
    OneTime,
    /// Scheduled charge series started from the hosted checkout.
    Recurring,
    /// Hosted card-save flow.
    TokenizeCreate,
    /// Server-side charge against a stored card.
    TokenizePay,
    /// Stored-card listing.
    TokenizeList,
    /// Stored-card removal.
    TokenizeDelete,
    /// Stored-card metadata update.
    TokenizeEdit,
}

/// Customer identity shown on the hosted page.
#[derive(Clone, Debug)]
pub struct CustomerDetails {
    /// Customer first name.
    pub first_name: String,
    /// Customer last name.
    pub last_name: String,
    /// Customer email address.
    pub email: String,
    /// Customer mobile number.
    pub mobile: String,
}

/// Postal address block.
#[derive(Clone, Debug)]
pub struct Address {
    /// First street line.
    pub line1: String,
    /// Second street line.
    pub line2: Option<String>,
    /// City name.
    pub city: String,
    /// Country identifier as the gateway expects it.
    pub country: String,
    /// Postal or zip code.
    pub postal_code: Option<String>,
}

/// Caller-supplied fields shared by every checkout dispatch.
#[derive(Clone, Debug)]
pub struct PaymentFields {
    /// Merchant invoice correlation id, unique per attempt.
    pub invoice_id: String,
    /// Charge amount with exactly two fraction digits.
    pub amount: String,
    /// Three-letter uppercase currency code.
    pub currency_code: String,
    /// Free-form order description shown on the hosted page.
    pub order_description: Option<String>,
    /// Customer identity.
    pub customer: CustomerDetails,
    /// Billing address.
    pub billing: Address,
    /// Shipping address when it differs from billing.
    pub shipping: Option<Address>,
    /// Free-form passthrough field echoed in notifications.
    pub custom1: Option<String>,
    /// Free-form passthrough field echoed in notifications.
    pub custom2: Option<String>,
}

/// Schedule end of a recurring series.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecurringEnd {
    /// The series runs until cancelled.
    Forever,
    /// The series ends on the given date.
    On(Date),
}

/// Charge cadence of a recurring series.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RecurringInterval {
    /// One charge per month.
    Monthly,
    /// One charge per year.
    Annually,
}

/// Recurring series parameters.
#[derive(Clone, Debug)]
pub struct RecurringSchedule {
    /// First charge date.
    pub start_date: Date,
    /// Schedule end.
    pub end: RecurringEnd,
    /// Amount charged on each cycle, two fraction digits.
    pub recurring_amount: String,
    /// Charge cadence.
    pub interval: RecurringInterval,
    /// Whether the gateway retries failed cycles.
    pub is_retry: bool,
    /// Retry budget per cycle.
    pub retry_attempts: u8,
    /// Whether the first charge happens at dispatch instead of the start
    /// date.
    pub do_first_payment: bool,
}

/// Card-save options for the hosted tokenize flow.
#[derive(Clone, Debug)]
pub struct CardSaveOptions {
    /// Merchant-side customer reference the token is stored under.
    pub customer_ref_no: String,
    /// Existing token to replace, when re-saving a card.
    pub token_id: Option<String>,
    /// Whether the hosted page offers to save the card.
    pub is_save_card: bool,
    /// Display label for the saved card.
    pub nick_name: Option<String>,
    /// Marks the saved card as the customer default.
    pub is_default_card: bool,
}

/// Checkout-surface operations and their kind-specific payloads.
#[derive(Clone, Debug)]
pub enum CheckoutOperation {
    /// Single charge.
    OneTime {
        /// Shared dispatch fields.
        fields: PaymentFields,
    },
    /// Scheduled charge series.
    Recurring {
        /// Shared dispatch fields.
        fields: PaymentFields,
        /// Series parameters.
        schedule: RecurringSchedule,
        /// Optional customer reference; when present it joins the
        /// checksum chain.
        customer_ref_no: Option<String>,
    },
    /// Card-save flow on the hosted page.
    TokenizeCreate {
        /// Shared dispatch fields.
        fields: PaymentFields,
        /// Card-save options.
        options: CardSaveOptions,
    },
}

impl CheckoutOperation {
    /// Shared field block of the operation.
    pub fn fields(&self) -> &PaymentFields {
        match self {
            Self::OneTime { fields }
            | Self::Recurring { fields, .. }
            | Self::TokenizeCreate { fields, .. } => fields,
        }
    }

    /// Operation family tag.
    pub fn kind(&self) -> PaymentKind {
        match self {
            Self::OneTime { .. } => PaymentKind::OneTime,
            Self::Recurring { .. } => PaymentKind::Recurring,
            Self::TokenizeCreate { .. } => PaymentKind::TokenizeCreate,
        }
    }

    /// Hosted-page `paymentType` discriminator. Card-save dispatches ride
    /// the one-time flow with the save options appended.
    fn payment_type(&self) -> &'static str {
        match self {
            Self::OneTime { .. } | Self::TokenizeCreate { .. } => "1",
            Self::Recurring { .. } => "2",
        }
    }

    fn checksum_kind(&self) -> ChecksumKind {
        match self {
            Self::OneTime { .. } => ChecksumKind::Payment,
            Self::Recurring {
                customer_ref_no, ..
            } => {
                if customer_ref_no.is_some() {
                    ChecksumKind::PaymentWithCustomerRef
                } else {
                    ChecksumKind::Payment
                }
            }
            Self::TokenizeCreate { .. } => ChecksumKind::Tokenize,
        }
    }

    fn chain_view<'a>(&'a self, merchant_key: &'a str) -> ChainView<'a> {
        let fields = self.fields();
        ChainView {
            merchant: Some(merchant_key),
            invoice_id: Some(&fields.invoice_id),
            amount: Some(&fields.amount),
            currency: Some(&fields.currency_code),
            customer_reference: match self {
                Self::OneTime { .. } => None,
                Self::Recurring {
                    customer_ref_no, ..
                } => customer_ref_no.as_deref(),
                Self::TokenizeCreate { options, .. } => Some(&options.customer_ref_no),
            },
            token_id: match self {
                Self::TokenizeCreate { options, .. } => options.token_id.as_deref(),
                Self::OneTime { .. } | Self::Recurring { .. } => None,
            },
        }
    }
}

/// Stored-card operations dispatched server-side with a bearer token.
#[derive(Clone, Debug)]
pub enum TokenizedCardOperation {
    /// Charge a stored card.
    Pay {
        /// Merchant invoice correlation id.
        invoice_id: String,
        /// Charge amount with exactly two fraction digits.
        amount: String,
        /// Three-letter uppercase currency code.
        currency_code: String,
        /// Merchant-side customer reference.
        customer_id: String,
        /// Stored card token.
        token_id: String,
        /// Free-form passthrough field.
        custom1: Option<String>,
        /// Free-form passthrough field.
        custom2: Option<String>,
    },
    /// List cards stored for a customer.
    List {
        /// Merchant-side customer reference.
        customer_id: String,
    },
    /// Remove a stored card.
    Delete {
        /// Merchant-side customer reference.
        customer_id: String,
        /// Stored card token.
        token_id: String,
    },
    /// Update stored card metadata.
    Edit {
        /// Merchant-side customer reference.
        customer_id: String,
        /// Stored card token.
        token_id: String,
        /// New display label.
        nick_name: Option<String>,
        /// New default-card flag.
        is_default_card: Option<bool>,
    },
}

impl TokenizedCardOperation {
    /// Operation family tag.
    pub fn kind(&self) -> PaymentKind {
        match self {
            Self::Pay { .. } => PaymentKind::TokenizePay,
            Self::List { .. } => PaymentKind::TokenizeList,
            Self::Delete { .. } => PaymentKind::TokenizeDelete,
            Self::Edit { .. } => PaymentKind::TokenizeEdit,
        }
    }

    fn checksum_kind(&self) -> ChecksumKind {
        match self {
            Self::Pay { .. } => ChecksumKind::Tokenize,
            Self::List { .. } => ChecksumKind::TokenizeList,
            Self::Delete { .. } => ChecksumKind::TokenizeDelete,
            Self::Edit { .. } => ChecksumKind::TokenizeEdit,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Pay { .. } => consts::TOKENIZE_PAY_PATH,
            Self::List { .. } => consts::TOKENIZE_LIST_PATH,
            Self::Delete { .. } => consts::TOKENIZE_DELETE_PATH,
            Self::Edit { .. } => consts::TOKENIZE_EDIT_PATH,
        }
    }

    fn chain_view<'a>(&'a self, merchant_key: &'a str) -> ChainView<'a> {
        match self {
            Self::Pay {
                invoice_id,
                amount,
                currency_code,
                customer_id,
                token_id,
                ..
            } => ChainView {
                merchant: Some(merchant_key),
                invoice_id: Some(invoice_id.as_str()),
                amount: Some(amount.as_str()),
                currency: Some(currency_code.as_str()),
                customer_reference: Some(customer_id.as_str()),
                token_id: Some(token_id.as_str()),
            },
            Self::List { customer_id } => ChainView {
                merchant: Some(merchant_key),
                customer_reference: Some(customer_id.as_str()),
                ..Default::default()
            },
            Self::Delete {
                customer_id,
                token_id,
            }
            | Self::Edit {
                customer_id,
                token_id,
                ..
            } => ChainView {
                merchant: Some(merchant_key),
                customer_reference: Some(customer_id.as_str()),
                token_id: Some(token_id.as_str()),
                ..Default::default()
            },
        }
    }

    fn body(
        &self,
        merchant_key: &str,
        check_value: &str,
    ) -> CustomResult<RequestContent, ParsingError> {
        match self {
            Self::Pay {
                invoice_id,
                amount,
                currency_code,
                customer_id,
                token_id,
                custom1,
                custom2,
            } => RequestContent::json(&TokenizePayRequest {
                merchant_id: merchant_key,
                invoice_id: invoice_id.as_str(),
                amount: amount.as_str(),
                currency_code: currency_code.as_str(),
                customer_id: customer_id.as_str(),
                token_id: token_id.as_str(),
                custom1: custom1.as_deref(),
                custom2: custom2.as_deref(),
                check_value,
            }),
            Self::List { customer_id } => RequestContent::json(&TokenizeListRequest {
                merchant_id: merchant_key,
                customer_id: customer_id.as_str(),
                check_value,
            }),
            Self::Delete {
                customer_id,
                token_id,
            } => RequestContent::json(&TokenizeCardRequest {
                merchant_id: merchant_key,
                customer_id: customer_id.as_str(),
                token_id: token_id.as_str(),
                check_value,
            }),
            Self::Edit {
                customer_id,
                token_id,
                nick_name,
                is_default_card,
            } => RequestContent::json(&TokenizeEditRequest {
                merchant_id: merchant_key,
                customer_id: customer_id.as_str(),
                token_id: token_id.as_str(),
                nick_name: nick_name.as_deref(),
                is_default_card: is_default_card.map(flag),
                check_value,
            }),
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizePayRequest<'a> {
    merchant_id: &'a str,
    invoice_id: &'a str,
    amount: &'a str,
    currency_code: &'a str,
    customer_id: &'a str,
    token_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom1: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom2: Option<&'a str>,
    check_value: &'a str,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeListRequest<'a> {
    merchant_id: &'a str,
    customer_id: &'a str,
    check_value: &'a str,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeCardRequest<'a> {
    merchant_id: &'a str,
    customer_id: &'a str,
    token_id: &'a str,
    check_value: &'a str,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeEditRequest<'a> {
    merchant_id: &'a str,
    customer_id: &'a str,
    token_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    nick_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_default_card: Option<&'a str>,
    check_value: &'a str,
}

/// Slot values consulted when closing a checksum chain for an outbound
/// operation.
#[derive(Default)]
struct ChainView<'a> {
    merchant: Option<&'a str>,
    invoice_id: Option<&'a str>,
    amount: Option<&'a str>,
    currency: Option<&'a str>,
    customer_reference: Option<&'a str>,
    token_id: Option<&'a str>,
}

impl ChecksumSource for ChainView<'_> {
    fn checksum_field(&self, field: ChecksumField) -> Option<&str> {
        match field {
            ChecksumField::MerchantKey | ChecksumField::MerchantId => self.merchant,
            ChecksumField::InvoiceId => self.invoice_id,
            ChecksumField::Amount => self.amount,
            ChecksumField::CurrencyCode => self.currency,
            ChecksumField::CustomerRefNo | ChecksumField::CustomerId => self.customer_reference,
            ChecksumField::TokenId => self.token_id,
            ChecksumField::PayableOrderId
            | ChecksumField::PayableTransactionId
            | ChecksumField::PayableAmount
            | ChecksumField::PayableCurrency
            | ChecksumField::InvoiceNo
            | ChecksumField::StatusCode => None,
        }
    }
}

/// Frozen hosted-checkout dispatch: endpoint, method and ordered form
/// fields with `checkValue` last. Read-only once built; the surface renders
/// it and the machine correlates on its invoice id.
#[derive(Clone, Debug, serde::Serialize)]
pub struct CheckoutRequest {
    endpoint: String,
    method: Method,
    kind: PaymentKind,
    invoice_id: String,
    form_fields: Vec<(String, String)>,
}

impl CheckoutRequest {
    /// Checkout endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Dispatch method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Operation family of the dispatch.
    pub fn kind(&self) -> PaymentKind {
        self.kind
    }

    /// Invoice id the dispatch is keyed by.
    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }

    /// Ordered form fields, `checkValue` last.
    pub fn form_fields(&self) -> &[(String, String)] {
        &self.form_fields
    }

    /// Transport envelope for integrations that deliver the dispatch
    /// server-side instead of rendering the form.
    pub fn to_transport_request(&self) -> CustomResult<Request, ParsingError> {
        let encoded = serde_urlencoded::to_string(&self.form_fields)
            .into_report()
            .change_context(ParsingError)?;
        Ok(RequestBuilder::new()
            .method(self.method)
            .url(&self.endpoint)
            .header(headers::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .set_body(RequestContent::FormUrlEncoded(Secret::new(encoded)))
            .build())
    }
}

/// Assembles signed checkout dispatches and bearer-authorized stored-card
/// calls over one gateway configuration.
#[derive(Clone, Debug)]
pub struct PaymentRequestBuilder {
    config: Arc<GatewayConfig>,
}

impl PaymentRequestBuilder {
    /// Creates a builder over `config`.
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }

    /// Validates `operation`, signs it, and freezes the checkout dispatch.
    pub fn build(&self, operation: CheckoutOperation) -> CustomResult<CheckoutRequest, ValidationError> {
        let credentials = &self.config.credentials;
        validation::required_text("merchantKey", &credentials.merchant_key)?;
        let fields = operation.fields();
        validate_common(fields)?;

        let mut form: Vec<(String, String)> = Vec::new();
        push_field(&mut form, "merchantKey", credentials.merchant_key.clone());
        push_field(&mut form, "invoiceId", fields.invoice_id.clone());
        push_field(&mut form, "paymentType", operation.payment_type());
        push_field(&mut form, "amount", fields.amount.clone());
        push_field(&mut form, "currencyCode", fields.currency_code.clone());
        if let Some(description) = &fields.order_description {
            push_field(&mut form, "orderDescription", description.clone());
        }
        push_field(&mut form, "customerFirstName", fields.customer.first_name.clone());
        push_field(&mut form, "customerLastName", fields.customer.last_name.clone());
        push_field(&mut form, "customerEmail", fields.customer.email.clone());
        push_field(&mut form, "customerMobilePhone", fields.customer.mobile.clone());
        push_address(&mut form, "billingAddress", &fields.billing);
        if let Some(shipping) = &fields.shipping {
            push_address(&mut form, "shippingAddress", shipping);
        }
        if let Some(custom1) = &fields.custom1 {
            push_field(&mut form, "custom1", custom1.clone());
        }
        if let Some(custom2) = &fields.custom2 {
            push_field(&mut form, "custom2", custom2.clone());
        }

        match &operation {
            CheckoutOperation::OneTime { .. } => {}
            CheckoutOperation::Recurring {
                schedule,
                customer_ref_no,
                ..
            } => {
                validate_schedule(schedule)?;
                if let Some(reference) = customer_ref_no {
                    validation::required_text("customerRefNo", reference)?;
                    push_field(&mut form, "customerRefNo", reference.clone());
                }
                push_field(&mut form, "startDate", render_date(schedule.start_date)?);
                push_field(&mut form, "endDate", render_schedule_end(schedule.end)?);
                push_field(&mut form, "recurringAmount", schedule.recurring_amount.clone());
                push_field(&mut form, "interval", schedule.interval.to_string());
                push_field(&mut form, "isRetry", flag(schedule.is_retry));
                push_field(&mut form, "retryAttempts", schedule.retry_attempts.to_string());
                push_field(&mut form, "doFirstPayment", flag(schedule.do_first_payment));
            }
            CheckoutOperation::TokenizeCreate { options, .. } => {
                validation::required_text("customerRefNo", &options.customer_ref_no)?;
                push_field(&mut form, "customerRefNo", options.customer_ref_no.clone());
                if let Some(token_id) = &options.token_id {
                    push_field(&mut form, "tokenId", token_id.clone());
                }
                push_field(&mut form, "isSaveCard", flag(options.is_save_card));
                if let Some(nick_name) = &options.nick_name {
                    push_field(&mut form, "nickName", nick_name.clone());
                }
                push_field(&mut form, "isDefaultCard", flag(options.is_default_card));
            }
        }

        if let Some(url) = &self.config.notification_url {
            push_field(&mut form, "notificationUrl", url.clone());
        }

        let check_value = checksum::compute(
            operation.checksum_kind(),
            &operation.chain_view(&credentials.merchant_key),
            &credentials.merchant_token,
        )
        .change_context(ValidationError::InvalidValue {
            message: "check value computation failed".to_string(),
        })?;
        push_field(&mut form, "checkValue", check_value);

        Ok(CheckoutRequest {
            endpoint: self.config.url(consts::CHECKOUT_PATH),
            method: Method::Post,
            kind: operation.kind(),
            invoice_id: fields.invoice_id.clone(),
            form_fields: form,
        })
    }

    /// Builds the transport envelope for a stored-card operation, attaching
    /// a bearer token obtained through `vault`.
    pub async fn build_tokenized(
        &self,
        operation: TokenizedCardOperation,
        vault: &CredentialVault,
        transport: &dyn TokenTransport,
    ) -> CustomResult<Request, TokenRequestError> {
        validate_tokenized(&operation).change_context(TokenRequestError::InvalidFields)?;
        let credentials = &self.config.credentials;
        let check_value = checksum::compute(
            operation.checksum_kind(),
            &operation.chain_view(&credentials.merchant_key),
            &credentials.merchant_token,
        )
        .change_context(TokenRequestError::InvalidFields)?;
        let body = operation
            .body(&credentials.merchant_key, &check_value)
            .change_context(TokenRequestError::RequestEncodingFailed)?;
        let token = vault
            .get_valid_token(transport)
            .await
            .change_context(TokenRequestError::CredentialFailure)?;
        Ok(RequestBuilder::new()
            .method(Method::Post)
            .url(&self.config.url(operation.path()))
            .header(headers::CONTENT_TYPE, "application/json")
            .header_masked(
                headers::AUTHORIZATION,
                Secret::new(format!("Bearer {}", token.token.peek())),
            )
            .set_body(body)
            .build())
    }
}

fn validate_common(fields: &PaymentFields) -> CustomResult<(), ValidationError> {
    validation::required_text("invoiceId", &fields.invoice_id)?;
    validation::validate_amount_format("amount", &fields.amount)?;
    validation::validate_currency_code(&fields.currency_code)?;
    validation::required_text("customerFirstName", &fields.customer.first_name)?;
    validation::required_text("customerLastName", &fields.customer.last_name)?;
    validation::required_text("customerEmail", &fields.customer.email)?;
    validation::validate_email(&fields.customer.email)?;
    validation::required_text("customerMobilePhone", &fields.customer.mobile)?;
    validate_address(
        &fields.billing,
        (
            "billingAddressStreet",
            "billingAddressCity",
            "billingAddressCountry",
        ),
    )?;
    if let Some(shipping) = &fields.shipping {
        validate_address(
            shipping,
            (
                "shippingAddressStreet",
                "shippingAddressCity",
                "shippingAddressCountry",
            ),
        )?;
    }
    Ok(())
}

fn validate_address(
    address: &Address,
    (street, city, country): (&'static str, &'static str, &'static str),
) -> CustomResult<(), ValidationError> {
    validation::required_text(street, &address.line1)?;
    validation::required_text(city, &address.city)?;
    validation::required_text(country, &address.country)
}

fn validate_schedule(schedule: &RecurringSchedule) -> CustomResult<(), ValidationError> {
    validation::validate_amount_format("recurringAmount", &schedule.recurring_amount)?;
    if let RecurringEnd::On(end_date) = schedule.end {
        if end_date < schedule.start_date {
            return Err(report!(ValidationError::InvalidValue {
                message: "endDate precedes startDate".to_string(),
            }));
        }
    }
    Ok(())
}

fn validate_tokenized(operation: &TokenizedCardOperation) -> CustomResult<(), ValidationError> {
    match operation {
        TokenizedCardOperation::Pay {
            invoice_id,
            amount,
            currency_code,
            customer_id,
            token_id,
            ..
        } => {
            validation::required_text("invoiceId", invoice_id)?;
            validation::validate_amount_format("amount", amount)?;
            validation::validate_currency_code(currency_code)?;
            validation::required_text("customerId", customer_id)?;
            validation::required_text("tokenId", token_id)
        }
        TokenizedCardOperation::List { customer_id } => {
            validation::required_text("customerId", customer_id)
        }
        TokenizedCardOperation::Delete {
            customer_id,
            token_id,
        }
        | TokenizedCardOperation::Edit {
            customer_id,
            token_id,
            ..
        } => {
            validation::required_text("customerId", customer_id)?;
            validation::required_text("tokenId", token_id)
        }
    }
}

fn push_field(form: &mut Vec<(String, String)>, name: &str, value: impl Into<String>) {
    form.push((name.to_string(), value.into()));
}

fn push_address(form: &mut Vec<(String, String)>, prefix: &str, address: &Address) {
    push_field(form, &format!("{prefix}Street"), address.line1.clone());
    if let Some(line2) = &address.line2 {
        push_field(form, &format!("{prefix}Street2"), line2.clone());
    }
    push_field(form, &format!("{prefix}City"), address.city.clone());
    push_field(form, &format!("{prefix}Country"), address.country.clone());
    if let Some(postal_code) = &address.postal_code {
        push_field(form, &format!("{prefix}PostcodeZip"), postal_code.clone());
    }
}

/// Gateway boolean form encoding.
fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn render_date(date: Date) -> CustomResult<String, ValidationError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    date.format(format)
        .into_report()
        .change_context(ValidationError::InvalidValue {
            message: "date could not be formatted".to_string(),
        })
}

fn render_schedule_end(end: RecurringEnd) -> CustomResult<String, ValidationError> {
    match end {
        RecurringEnd::Forever => Ok(consts::RECURRING_FOREVER.to_string()),
        RecurringEnd::On(date) => render_date(date),
    }
}
