//! Hashing primitives behind the gateway's integrity chains.

use masking::{PeekInterface, Secret};
use ring::digest;

use crate::consts;

/// Trait for generating a message digest.
pub trait GenerateDigest {
    /// Digest of `message`.
    fn generate_digest(&self, message: &[u8]) -> Vec<u8>;
}

/// SHA-512 hashing, the only digest the gateway chains use.
#[derive(Debug)]
pub struct Sha512;

impl GenerateDigest for Sha512 {
    fn generate_digest(&self, message: &[u8]) -> Vec<u8> {
        digest::digest(&digest::SHA512, message).as_ref().to_vec()
    }
}

/// Uppercase hex SHA-512 digest of the UTF-8 bytes of `input`.
pub fn digest_hex(input: &str) -> String {
    hex::encode_upper(Sha512.generate_digest(input.as_bytes()))
}

/// Joins `parts` with the chain delimiter and digests the result.
///
/// Parts are hashed verbatim, without trimming or normalization, so equal
/// ordered sequences always produce equal digests.
pub fn chain_hex<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    digest_hex(
        &parts
            .into_iter()
            .collect::<Vec<_>>()
            .join(consts::CHECKSUM_DELIMITER),
    )
}

/// Uppercase hex digest of the merchant token, the closing segment of every
/// checksum chain. Recomputed per call; the raw secret is read only here.
pub fn derive_token_hash(merchant_token: &Secret<String>) -> String {
    digest_hex(merchant_token.peek())
}
