// api-server/src/auth/verify.rs
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use sha2::{Digest, Sha256};

/// Decode a wallet-network public key string ("ed25519:<base58>" or bare
/// base58) into raw key bytes. Returns `None` for anything that is not a
/// well-formed 32-byte key.
pub fn decode_key(public_key: &str) -> Option<[u8; PUBLIC_KEY_LENGTH]> {
    let b58 = public_key.strip_prefix("ed25519:").unwrap_or(public_key);
    let bytes = bs58::decode(b58).into_vec().ok()?;
    bytes.try_into().ok()
}

/// Canonical string form of a public key, used for authorization membership
/// checks so that encoding variants of the same key still compare equal.
pub fn canonical_key(public_key: &str) -> Option<String> {
    let bytes = decode_key(public_key)?;
    Some(format!("ed25519:{}", bs58::encode(&bytes).into_string()))
}

/// Verify a detached Ed25519 signature over the SHA-256 digest of `message`.
///
/// Pure function. Malformed key or signature material is a verification
/// failure, never a fault.
pub fn verify_detached(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(public_key) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);

    let digest = Sha256::digest(message);
    key.verify(&digest, &signature).is_ok()
}
