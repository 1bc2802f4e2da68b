//! Identity management for KILN participants.
//!
//! Every participant (buyer, provider, arbitrator, admin) is identified by
//! the base58 encoding of an Ed25519 public key. [`Wallet`] holds the
//! corresponding keypair and is how callers mint fresh identities.

use crate::error::{CoreError, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant identity (base58-encoded Ed25519 public key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create an address from a base58-encoded string.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not valid base58 or wrong length.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CoreError::InvalidAddress(format!("invalid base58: {e}")))?;

        if bytes.len() != 32 {
            return Err(CoreError::InvalidAddress(format!(
                "address must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self(s.to_string()))
    }

    /// Create an address from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns error if bytes are not 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(CoreError::InvalidAddress(format!(
                "address must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bs58::encode(bytes).into_string()))
    }

    /// Get the base58-encoded address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the raw bytes of the address.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        bs58::decode(&self.0).into_vec().unwrap_or_default()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A KILN wallet (Ed25519 keypair).
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Generate a new random wallet from the system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns error if the derived public key cannot be encoded.
    pub fn generate() -> Result<Self> {
        let mut secret_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut secret_bytes);
        Self::from_secret_key(&secret_bytes)
    }

    /// Create a wallet from a secret key (32 bytes).
    ///
    /// # Errors
    ///
    /// Returns error if the key is invalid.
    pub fn from_secret_key(secret: &[u8]) -> Result<Self> {
        let secret_array: [u8; 32] = secret
            .try_into()
            .map_err(|_| CoreError::Wallet(format!("secret key must be 32 bytes, got {}", secret.len())))?;

        let signing_key = SigningKey::from_bytes(&secret_array);
        let verifying_key = signing_key.verifying_key();
        let address = Address::from_bytes(verifying_key.as_bytes())?;

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Get the wallet's address.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the secret key bytes.
    #[must_use]
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign a message with this wallet's key.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Verify a signature against an address.
    ///
    /// # Errors
    ///
    /// Returns error if the address does not decode to a valid public key
    /// or the signature does not match.
    pub fn verify(address: &Address, message: &[u8], signature: &Signature) -> Result<()> {
        let bytes: [u8; 32] = address
            .to_bytes()
            .try_into()
            .map_err(|_| CoreError::InvalidAddress(address.as_str().to_string()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| CoreError::InvalidAddress(format!("not a public key: {e}")))?;
        key.verify(message, signature)
            .map_err(|e| CoreError::Wallet(format!("signature verification failed: {e}")))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
