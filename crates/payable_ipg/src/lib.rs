//! Merchant-side core for the Payable IPG hosted checkout gateway.
//!
//! The crate signs outbound requests and verifies inbound notifications
//! with the gateway's SHA-512 checksum chains, manages the OAuth bearer
//! token stored-card operations need, and tracks each payment attempt
//! through its lifecycle until the checkout surface or the webhook channel
//! reports a verified terminal outcome.
//!
//! It performs no I/O of its own. Network delivery, webhook hosting and
//! the checkout rendering surface are collaborator concerns; the crate
//! hands them prepared [`request::Request`] envelopes and consumes the
//! raw events they feed back.

#![warn(missing_docs, missing_debug_implementations)]

pub mod auth;
pub mod checksum;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod errors;
pub mod payments;
pub mod request;
pub mod session;
pub mod validation;
pub mod webhook;
