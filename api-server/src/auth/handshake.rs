// api-server/src/auth/handshake.rs
use common::models::Account;
use common::{now_ms, ActorError, AuthConfig, AuthError};

use crate::actors::account_actor::{AccountActor, GetAccount};
use crate::actors::keyed::Registry;
use crate::actors::session_actor::{SessionActor, SetToken};
use crate::auth::resolver::KeyResolver;
use crate::auth::token::{self, LoginToken};
use crate::auth::verify::{canonical_key, decode_key, verify_detached};

/// Outcome of a completed handshake: the caller is authenticated either way;
/// the account record is present only once the identity has registered.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: String,
    pub account: Option<Account>,
}

/// Why a login attempt did not reach `SessionEstablished`. Rejections carry
/// a user-facing reason; internal faults are logged and kept opaque.
#[derive(Debug)]
pub enum LoginError {
    Rejected(AuthError),
    Internal(ActorError),
}

impl From<AuthError> for LoginError {
    fn from(e: AuthError) -> Self {
        Self::Rejected(e)
    }
}

impl From<ActorError> for LoginError {
    fn from(e: ActorError) -> Self {
        Self::Internal(e)
    }
}

/// Token freshness: `iat` must lie within one symmetric window of `now`,
/// which bounds clock skew the same amount in both directions. `iat` comes
/// straight off the wire, so the arithmetic saturates instead of overflowing
/// on extreme values; a saturated bound still rejects them.
fn is_fresh(iat_ms: i64, now_ms: i64, window_ms: i64) -> bool {
    iat_ms.saturating_add(window_ms) >= now_ms && iat_ms.saturating_sub(window_ms) <= now_ms
}

/// Stages Received through KeyAuthorized: decode the wire token, check
/// freshness, verify the signature, and check the key against the identity's
/// currently authorized set. Pure apart from the resolver call; establishes
/// no session, so rejections leave no trace.
pub async fn authenticate(
    wire: &str,
    at_ms: i64,
    resolver: &dyn KeyResolver,
    config: &AuthConfig,
) -> Result<LoginToken, AuthError> {
    // Received -> Decoded
    let token = token::decode(wire)?;
    let identity = token.claims.account_id.as_str();

    // Decoded -> ExpiryChecked
    if !is_fresh(token.claims.iat, at_ms, config.token_expiry_ms) {
        tracing::warn!(
            "token issued at {} outside freshness window for {}",
            token.claims.iat,
            identity
        );
        return Err(AuthError::TokenExpired);
    }

    // ExpiryChecked -> SignatureVerified. The signature check precedes the
    // authorization check so a forged token never costs a network call.
    let key_bytes = decode_key(&token.public_key).ok_or(AuthError::InvalidSignature)?;
    if !verify_detached(&token.message, &token.signature, &key_bytes) {
        return Err(AuthError::InvalidSignature);
    }

    // SignatureVerified -> KeyAuthorized
    let authorized_keys = resolver.signing_keys(identity).await?;
    let authorized = if config.exact_key_compare {
        authorized_keys.iter().any(|k| k == &token.public_key)
    } else {
        // Canonical-string comparison tolerates encoding variants of the
        // same key ("ed25519:" prefix present or not)
        match canonical_key(&token.public_key) {
            Some(embedded) => authorized_keys
                .iter()
                .filter_map(|k| canonical_key(k))
                .any(|k| k == embedded),
            None => false,
        }
    };
    if !authorized {
        tracing::warn!("key {} not authorized for {}", token.public_key, identity);
        return Err(AuthError::UnauthorizedKey);
    }

    Ok(token)
}

/// Full login handshake: authenticate the token, then establish the session
/// (KeyAuthorized -> SessionEstablished) and read back the account record.
/// Stateless per call; a rejected attempt may simply be retried with a fresh
/// token.
pub async fn login(
    wire: &str,
    resolver: &dyn KeyResolver,
    config: &AuthConfig,
    sessions: &Registry<SessionActor>,
    accounts: &Registry<AccountActor>,
) -> Result<LoginOutcome, LoginError> {
    let token = authenticate(wire, now_ms(), resolver, config).await?;
    let identity = token.claims.account_id;

    // The opaque wire string becomes the session's access token
    sessions
        .addr(&identity)
        .send(SetToken {
            token: wire.to_string(),
        })
        .await
        .map_err(|e| ActorError::Mailbox(e.to_string()))??;

    let account = accounts
        .addr(&identity)
        .send(GetAccount)
        .await
        .map_err(|e| ActorError::Mailbox(e.to_string()))??;

    tracing::info!(
        "session established for {} (registered: {})",
        identity,
        account.is_some()
    );
    Ok(LoginOutcome { identity, account })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::account_actor::{Register, RegisterOutcome};
    use crate::actors::session_actor::IsValid;
    use crate::auth::token::TokenClaims;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use ed25519_dalek::{Signer, SigningKey};
    use sha2::{Digest, Sha256};
    use std::sync::Arc;

    struct StaticResolver(Result<Vec<String>, AuthError>);

    #[async_trait]
    impl KeyResolver for StaticResolver {
        async fn signing_keys(&self, _account_id: &str) -> Result<Vec<String>, AuthError> {
            self.0.clone()
        }
    }

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[42; 32])
    }

    fn public_key_string(key: &SigningKey) -> String {
        format!(
            "ed25519:{}",
            bs58::encode(key.verifying_key().as_bytes()).into_string()
        )
    }

    /// Build a wire token signed over the base64 message segment
    fn wire_token(identity: &str, iat: i64, key: &SigningKey) -> String {
        wire_token_with_pk(identity, iat, key, &public_key_string(key))
    }

    fn wire_token_with_pk(identity: &str, iat: i64, key: &SigningKey, pk: &str) -> String {
        let claims = TokenClaims {
            account_id: identity.to_string(),
            iat,
        };
        let message = base64::encode(serde_json::to_string(&claims).unwrap());
        let digest = Sha256::digest(message.as_bytes());
        let signature = key.sign(&digest);
        token::encode(&claims, &signature.to_bytes(), pk)
    }

    fn config() -> AuthConfig {
        AuthConfig::default()
    }

    fn resolver_with(key: &SigningKey) -> StaticResolver {
        StaticResolver(Ok(vec![public_key_string(key)]))
    }

    #[actix_web::test]
    async fn fresh_valid_token_authenticates() {
        let key = signing_key();
        let wire = wire_token("alice.testnet", now_ms(), &key);
        let token = authenticate(&wire, now_ms(), &resolver_with(&key), &config())
            .await
            .unwrap();
        assert_eq!(token.claims.account_id, "alice.testnet");
    }

    #[actix_web::test]
    async fn stale_token_is_expired_even_with_valid_signature() {
        let key = signing_key();
        let now = now_ms();
        let wire = wire_token("alice.testnet", now - 11_000, &key);
        let err = authenticate(&wire, now, &resolver_with(&key), &config())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }

    #[actix_web::test]
    async fn future_token_beyond_skew_window_is_expired() {
        let key = signing_key();
        let now = now_ms();
        let wire = wire_token("alice.testnet", now + 11_000, &key);
        let err = authenticate(&wire, now, &resolver_with(&key), &config())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);

        // Skew inside the window is tolerated in both directions
        let wire = wire_token("alice.testnet", now + 3_000, &key);
        assert!(authenticate(&wire, now, &resolver_with(&key), &config())
            .await
            .is_ok());
        let wire = wire_token("alice.testnet", now - 3_000, &key);
        assert!(authenticate(&wire, now, &resolver_with(&key), &config())
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn bad_signature_rejected_before_authorization() {
        let key = signing_key();
        let other = SigningKey::from_bytes(&[7; 32]);
        // Signed by `other` but claiming `key`'s (authorized) public key
        let claims = TokenClaims {
            account_id: "alice.testnet".to_string(),
            iat: now_ms(),
        };
        let message = base64::encode(serde_json::to_string(&claims).unwrap());
        let digest = Sha256::digest(message.as_bytes());
        let signature = other.sign(&digest);
        let wire = token::encode(&claims, &signature.to_bytes(), &public_key_string(&key));

        let err = authenticate(&wire, now_ms(), &resolver_with(&key), &config())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[actix_web::test]
    async fn unauthorized_key_rejected_after_signature_check() {
        let key = signing_key();
        let wire = wire_token("alice.testnet", now_ms(), &key);

        // Valid signature, but the resolver knows a different key
        let stranger = SigningKey::from_bytes(&[9; 32]);
        let resolver = resolver_with(&stranger);
        let err = authenticate(&wire, now_ms(), &resolver, &config())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnauthorizedKey);

        // An empty key set is the same legitimate negative
        let resolver = StaticResolver(Ok(vec![]));
        let err = authenticate(&wire, now_ms(), &resolver, &config())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnauthorizedKey);
    }

    #[actix_web::test]
    async fn canonical_comparison_tolerates_prefix_variants() {
        let key = signing_key();
        let bare = bs58::encode(key.verifying_key().as_bytes()).into_string();
        let wire = wire_token_with_pk("alice.testnet", now_ms(), &key, &bare);

        // Resolver returns the prefixed form; the token embeds the bare form
        let resolver = resolver_with(&key);
        assert!(authenticate(&wire, now_ms(), &resolver, &config())
            .await
            .is_ok());

        // Byte-exact mode refuses the mismatch
        let exact = AuthConfig {
            exact_key_compare: true,
            ..config()
        };
        let err = authenticate(&wire, now_ms(), &resolver, &exact)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnauthorizedKey);
    }

    #[actix_web::test]
    async fn provider_outage_is_distinct_from_rejection() {
        let key = signing_key();
        let wire = wire_token("alice.testnet", now_ms(), &key);
        let resolver = StaticResolver(Err(AuthError::IdentityProviderUnavailable(
            "connection refused".to_string(),
        )));
        let err = authenticate(&wire, now_ms(), &resolver, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IdentityProviderUnavailable(_)));
    }

    fn registries() -> (Registry<SessionActor>, Registry<AccountActor>) {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = Registry::new({
            let storage = storage.clone();
            move |key| SessionActor::new(key, storage.clone())
        });
        let accounts = Registry::new({
            let storage = storage.clone();
            move |key| AccountActor::new(key, storage.clone())
        });
        (sessions, accounts)
    }

    #[actix_web::test]
    async fn full_handshake_establishes_session_and_reads_account() {
        let key = signing_key();
        let resolver = resolver_with(&key);
        let (sessions, accounts) = registries();

        // Token issued 3 seconds ago, valid signature, key authorized
        let wire = wire_token("alice.testnet", now_ms() - 3_000, &key);
        let outcome = login(&wire, &resolver, &config(), &sessions, &accounts)
            .await
            .unwrap();
        assert_eq!(outcome.identity, "alice.testnet");
        // Authenticated but not yet registered
        assert!(outcome.account.is_none());

        // The wire string is now the identity's valid access token
        let valid = sessions
            .addr("alice.testnet")
            .send(IsValid {
                token: wire.clone(),
            })
            .await
            .unwrap()
            .unwrap();
        assert!(valid);

        // Register, then log in again: the account comes back
        let outcome = accounts
            .addr("alice.testnet")
            .send(Register {
                display_name: "Alice".to_string(),
                external_wallet_id: Some("alice.testnet".to_string()),
            })
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::Created(_)));

        let wire = wire_token("alice.testnet", now_ms(), &key);
        let outcome = login(&wire, &resolver, &config(), &sessions, &accounts)
            .await
            .unwrap();
        assert_eq!(outcome.account.unwrap().display_name, "Alice");
    }

    #[actix_web::test]
    async fn rejected_handshake_leaves_no_session() {
        let key = signing_key();
        let (sessions, accounts) = registries();

        let now = now_ms();
        let wire = wire_token("alice.testnet", now - 60_000, &key);
        let err = login(&wire, &resolver_with(&key), &config(), &sessions, &accounts)
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::Rejected(AuthError::TokenExpired)));

        let valid = sessions
            .addr("alice.testnet")
            .send(IsValid { token: wire })
            .await
            .unwrap()
            .unwrap();
        assert!(!valid);
    }

    #[test]
    fn freshness_window_is_symmetric() {
        assert!(is_fresh(1_000, 1_000, 10_000));
        assert!(is_fresh(1_000, 11_000, 10_000));
        assert!(!is_fresh(1_000, 11_001, 10_000));
        assert!(is_fresh(11_000, 1_000, 10_000));
        assert!(!is_fresh(11_001, 1_000, 10_000));
    }

    #[test]
    fn extreme_issued_at_values_are_stale_not_a_panic() {
        let now = now_ms();
        assert!(!is_fresh(i64::MAX, now, 10_000));
        assert!(!is_fresh(i64::MIN, now, 10_000));
    }

    #[actix_web::test]
    async fn token_with_extreme_issued_at_is_rejected() {
        let key = signing_key();
        let wire = wire_token("alice.testnet", i64::MAX, &key);
        let err = authenticate(&wire, now_ms(), &resolver_with(&key), &config())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);

        let wire = wire_token("alice.testnet", i64::MIN, &key);
        let err = authenticate(&wire, now_ms(), &resolver_with(&key), &config())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }
}
