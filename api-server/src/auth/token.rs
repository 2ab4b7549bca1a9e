// api-server/src/auth/token.rs
use common::AuthError;
use serde::{Deserialize, Serialize};

/// Number of dot-separated segments in the token wire format:
/// `base64(JSON claims) . base64(signature) . publicKeyString`
const SEGMENTS: usize = 3;

/// Claims carried inside the signed message segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "accountId")]
    pub account_id: String,
    /// Issued-at, milliseconds since the Unix epoch
    pub iat: i64,
}

/// Parsed login token. Transient: exists only for the duration of one
/// handshake and is never persisted.
#[derive(Debug, Clone)]
pub struct LoginToken {
    pub claims: TokenClaims,
    /// Raw bytes of the first wire segment, before base64 decoding. The
    /// signature covers these bytes, not the decoded JSON.
    pub message: Vec<u8>,
    pub signature: Vec<u8>,
    /// Public key string as embedded in the token, e.g. "ed25519:<base58>"
    pub public_key: String,
}

/// Parse a login token from its wire form.
pub fn decode(wire: &str) -> Result<LoginToken, AuthError> {
    let parts: Vec<&str> = wire.split('.').collect();
    if parts.len() != SEGMENTS {
        return Err(AuthError::MalformedToken);
    }

    let message = parts[0].as_bytes().to_vec();
    let decoded = base64::decode(parts[0]).map_err(|_| AuthError::MalformedToken)?;
    let claims: TokenClaims =
        serde_json::from_slice(&decoded).map_err(|_| AuthError::MalformedToken)?;
    if claims.account_id.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let signature = base64::decode(parts[1]).map_err(|_| AuthError::MalformedToken)?;

    let public_key = parts[2].to_string();
    if public_key.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    Ok(LoginToken {
        claims,
        message,
        signature,
        public_key,
    })
}

/// Serialize a token to its wire form. The inverse of [`decode`]; used by
/// clients and tests to construct tokens.
pub fn encode(claims: &TokenClaims, signature: &[u8], public_key: &str) -> String {
    let message = serde_json::to_string(claims).expect("claims serialize");
    format!(
        "{}.{}.{}",
        base64::encode(message),
        base64::encode(signature),
        public_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(account_id: &str, iat: i64) -> String {
        encode(
            &TokenClaims {
                account_id: account_id.to_string(),
                iat,
            },
            b"fake-signature",
            "ed25519:6E8sCci9badyRkXb3JoRpBj5p8C6Tw41ELDZoiihKEtp",
        )
    }

    #[test]
    fn decodes_well_formed_token() {
        let token = decode(&wire("alice.testnet", 1_700_000_000_000)).unwrap();
        assert_eq!(token.claims.account_id, "alice.testnet");
        assert_eq!(token.claims.iat, 1_700_000_000_000);
        assert_eq!(token.signature, b"fake-signature");
        assert!(token.public_key.starts_with("ed25519:"));
        // The message is the raw base64 segment, still encoded
        assert_eq!(
            token.message,
            base64::encode(r#"{"accountId":"alice.testnet","iat":1700000000000}"#).into_bytes()
        );
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(decode("").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(decode("onlyone").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(decode("two.segments").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(decode("a.b.c.d").unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(
            decode("!!!not-base64!!!.c2ln.ed25519:abc").unwrap_err(),
            AuthError::MalformedToken
        );
        let claims = base64::encode(r#"{"accountId":"alice.testnet","iat":1}"#);
        assert_eq!(
            decode(&format!("{}.???.ed25519:abc", claims)).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn rejects_invalid_json_and_missing_fields() {
        let not_json = base64::encode("hello");
        assert_eq!(
            decode(&format!("{}.c2ln.ed25519:abc", not_json)).unwrap_err(),
            AuthError::MalformedToken
        );

        let missing_iat = base64::encode(r#"{"accountId":"alice.testnet"}"#);
        assert_eq!(
            decode(&format!("{}.c2ln.ed25519:abc", missing_iat)).unwrap_err(),
            AuthError::MalformedToken
        );

        let wrong_type = base64::encode(r#"{"accountId":"alice.testnet","iat":"soon"}"#);
        assert_eq!(
            decode(&format!("{}.c2ln.ed25519:abc", wrong_type)).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn rejects_empty_public_key_segment() {
        let claims = base64::encode(r#"{"accountId":"alice.testnet","iat":1}"#);
        assert_eq!(
            decode(&format!("{}.c2ln.", claims)).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn round_trip() {
        let original = wire("bob.testnet", 42);
        let token = decode(&original).unwrap();
        let rebuilt = encode(&token.claims, &token.signature, &token.public_key);
        assert_eq!(rebuilt, original);
    }
}
