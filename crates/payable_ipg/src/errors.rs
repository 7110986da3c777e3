//! Error types shared across the crate.

/// Custom [`Result`] alias carrying an [`error_stack::Report`].
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Failures raised while validating caller-supplied request fields.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The provided input is missing a required field.
    #[error("Missing required field: {field_name}")]
    MissingRequiredField {
        /// Wire name of the absent field.
        field_name: &'static str,
    },
    /// An incorrect value was provided for the field specified by `field_name`.
    #[error("Incorrect value provided for field: {field_name}")]
    IncorrectValueProvided {
        /// Wire name of the malformed field.
        field_name: &'static str,
    },
    /// An invalid input was provided.
    #[error("{message}")]
    InvalidValue {
        /// Description of the rejected input.
        message: String,
    },
}

/// Failures while assembling a checksum chain.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// A field the chain requires was absent from the payload. The engine
    /// fails closed rather than hashing an empty segment in its place.
    #[error("Missing checksum chain field: {field_name}")]
    MissingRequiredField {
        /// Wire name of the absent chain field.
        field_name: &'static str,
    },
}

/// Failures in the client-credentials token lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Business key and token were not configured for this merchant.
    #[error("Business key and token are required for stored-card operations")]
    MissingBusinessCredentials,
    /// The grant request body could not be encoded.
    #[error("Failed to encode the token grant request")]
    RequestEncodingFailed,
    /// The transport failed before a grant response arrived.
    #[error("Token endpoint request did not complete")]
    TokenEndpointUnreachable,
    /// The grant response could not be parsed.
    #[error("Failed to deserialize the token grant response")]
    ResponseDeserializationFailed,
}

/// Failures accepting an inbound gateway notification.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The delivery body was not a valid notification payload.
    #[error("Failed to decode the notification body")]
    BodyDecodingFailed,
    /// The claimed check value did not match the recomputed chain.
    #[error("Notification source verification failed")]
    SourceVerificationFailed,
}

/// Failures registering a new payment session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A session already tracks this invoice.
    #[error("A session already exists for invoice {invoice_id}")]
    DuplicateInvoice {
        /// Invoice carried by the rejected dispatch.
        invoice_id: String,
    },
}

/// Failures assembling a bearer-authorized stored-card call.
#[derive(Debug, thiserror::Error)]
pub enum TokenRequestError {
    /// Request fields failed validation.
    #[error("Stored-card request fields failed validation")]
    InvalidFields,
    /// No valid access token could be obtained.
    #[error("Could not obtain a valid access token")]
    CredentialFailure,
    /// The request body could not be encoded.
    #[error("Failed to encode the request body")]
    RequestEncodingFailed,
}

/// Failure to encode or decode a payload.
#[derive(Debug, thiserror::Error)]
#[error("Failed to encode or decode a payload")]
pub struct ParsingError;

/// Raised by transport collaborators when request delivery fails.
#[derive(Debug, thiserror::Error)]
#[error("Transport failed to deliver the request")]
pub struct TransportError;
