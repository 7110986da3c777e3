//! Gateway-wide constants.

/// Base URL of the sandbox gateway environment.
pub const SANDBOX_BASE_URL: &str = "https://sandboxipgpayment.payable.lk";

/// Base URL of the production gateway environment.
pub const PRODUCTION_BASE_URL: &str = "https://ipgpayment.payable.lk";

/// Hosted checkout dispatch path.
pub const CHECKOUT_PATH: &str = "/ipg/v2/checkout";

/// Client-credentials grant endpoint for stored-card operations.
pub const AUTH_TOKENIZE_PATH: &str = "/ipg/v2/auth/tokenize";

/// Stored-card charge endpoint.
pub const TOKENIZE_PAY_PATH: &str = "/ipg/v2/tokenize/pay";

/// Stored-card listing endpoint.
pub const TOKENIZE_LIST_PATH: &str = "/ipg/v2/tokenize/listCard";

/// Stored-card removal endpoint.
pub const TOKENIZE_DELETE_PATH: &str = "/ipg/v2/tokenize/deleteCard";

/// Stored-card metadata update endpoint.
pub const TOKENIZE_EDIT_PATH: &str = "/ipg/v2/tokenize/editCard";

/// Delimiter joining checksum chain segments.
pub const CHECKSUM_DELIMITER: &str = "|";

/// Access token lifetime in seconds assumed when the grant response omits
/// `expiresIn`.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 900;

/// Schedule end marker for open-ended recurring payments.
pub const RECURRING_FOREVER: &str = "FOREVER";

/// Gateway status code reporting a settled payment.
pub const STATUS_CODE_SUCCESS: &str = "1";

/// Gateway status code reporting a payment still being processed.
pub const STATUS_CODE_PENDING: &str = "0";

/// Base64 engine used for the client-credentials basic authorization value.
pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;
