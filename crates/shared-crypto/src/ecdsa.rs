//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable ECDSA signatures using the secp256k1 curve.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2)
//! - Constant-time operations
//!
//! ## Use Cases
//!
//! - Reporter transaction signing
//! - Sender recovery on the ledger host

use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{keccak256, Address, Hash, SignedTransaction, Transaction, TxSignature};
use std::fmt;
use zeroize::Zeroize;

/// Derives the 20-byte address of a public key.
///
/// `keccak256(uncompressed_point[1..])[12..]`, the Ethereum convention.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Recovers the signer's address from a prehashed message and its signature.
pub fn recover_address(hash: &Hash, signature: &TxSignature) -> Result<Address, CryptoError> {
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(&signature.r);
    bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&bytes).map_err(|_| CryptoError::InvalidSignature)?;

    let recovery_id =
        RecoveryId::from_byte(signature.v).ok_or(CryptoError::InvalidRecoveryId(signature.v))?;

    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&key))
}

/// Recovers the sender of a signed transaction.
pub fn recover_sender(signed: &SignedTransaction) -> Result<Address, CryptoError> {
    recover_address(&signed.transaction.signing_hash(), &signed.signature)
}

/// secp256k1 ECDSA keypair identifying one reporter.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Create from a hex secret key, with or without `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let trimmed = input.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut decoded =
            hex::decode(stripped).map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;

        if decoded.len() != 32 {
            let actual = decoded.len();
            decoded.zeroize();
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual,
            });
        }

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        let result = Self::from_bytes(bytes);
        bytes.zeroize();
        result
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// The reporter address derived from this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte prehash, producing a recoverable signature.
    pub fn sign_hash(&self, hash: &Hash) -> Result<TxSignature, CryptoError> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let bytes: [u8; 64] = sig.to_bytes().into();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        Ok(TxSignature {
            r,
            s,
            v: recovery_id.to_byte(),
        })
    }

    /// Sign a transaction over its signing hash.
    pub fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<SignedTransaction, CryptoError> {
        let signature = self.sign_hash(&transaction.signing_hash())?;
        Ok(SignedTransaction {
            transaction,
            signature,
        })
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &shared_types::format_address(&self.address))
            .finish_non_exhaustive()
    }
}
