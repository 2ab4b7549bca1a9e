// api-server/src/auth/resolver.rs
use async_trait::async_trait;
use common::AuthError;
use serde::Deserialize;
use serde_json::json;

/// Resolves the set of public keys currently authorized to sign for an
/// identity. The wallet network is the source of truth; the handshake only
/// ever consumes this one capability.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Public key strings ("ed25519:<base58>") for `account_id`. An empty
    /// vec is a legitimate negative result; a network or protocol failure
    /// is `IdentityProviderUnavailable`.
    async fn signing_keys(&self, account_id: &str) -> Result<Vec<String>, AuthError>;
}

/// Key resolver backed by the wallet network's JSON-RPC endpoint
pub struct RpcKeyResolver {
    client: reqwest::Client,
    rpc_url: String,
}

impl RpcKeyResolver {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<AccessKeyList>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AccessKeyList {
    #[serde(default)]
    keys: Vec<AccessKeyEntry>,
    /// Query-level failure (e.g. unknown account), reported inside `result`
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessKeyEntry {
    public_key: String,
}

#[async_trait]
impl KeyResolver for RpcKeyResolver {
    async fn signing_keys(&self, account_id: &str) -> Result<Vec<String>, AuthError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": "dontcare",
            "method": "query",
            "params": {
                "request_type": "view_access_key_list",
                "finality": "final",
                "account_id": account_id,
            },
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::IdentityProviderUnavailable(e.to_string()))?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| AuthError::IdentityProviderUnavailable(e.to_string()))?;

        if let Some(error) = body.error {
            tracing::warn!("key resolution failed for {}: {}", account_id, error);
            return Err(AuthError::IdentityProviderUnavailable(error.to_string()));
        }

        let result = body.result.ok_or_else(|| {
            AuthError::IdentityProviderUnavailable("rpc response without result".to_string())
        })?;

        // A query-level error means the network answered but knows no keys
        // for this account (e.g. the account does not exist). That is a
        // negative result, not an outage.
        if let Some(error) = result.error {
            tracing::info!("no signing keys for {}: {}", account_id, error);
            return Ok(Vec::new());
        }

        Ok(result.keys.into_iter().map(|k| k.public_key).collect())
    }
}
