// common/src/models/account.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registered account record, keyed by wallet identity.
///
/// Created exactly once per identity on first successful registration. The
/// record is immutable afterwards except for additive provider linking; the
/// owning account actor rejects any second registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Wallet-network account name, e.g. "alice.testnet"
    pub identity: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_wallet_id: Option<String>,
    /// Additional linked identity providers (provider name -> provider id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_providers: Option<HashMap<String, String>>,
    /// Timestamp of the registration that created this record
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(identity: String, display_name: String, external_wallet_id: Option<String>) -> Self {
        Self {
            identity,
            display_name,
            external_wallet_id,
            linked_providers: None,
            created_at: Utc::now(),
        }
    }
}

/// Request body for account registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub display_name: String,
    pub external_wallet_id: String,
}
