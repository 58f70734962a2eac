//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::info;

use crate::{Error, Result};

/// Version stage read for every secret.
pub const CURRENT_STAGE: &str = "AWSCURRENT";

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

async fn cached(secret_id: &str) -> Option<String> {
    get_cache().read().await.get(secret_id).cloned()
}

async fn remember(secret_id: &str, value: &str) {
    get_cache()
        .write()
        .await
        .insert(secret_id.to_string(), value.to_string());
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_id: &str) -> Result<String> {
    if let Some(value) = cached(secret_id).await {
        return Ok(value);
    }

    info!(secret_id = %secret_id, "Retrieving secret from Secrets Manager");

    let response = client
        .get_secret_value()
        .secret_id(secret_id)
        .version_stage(CURRENT_STAGE)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    remember(secret_id, &secret_string).await;

    Ok(secret_string)
}

/// Clear the secrets cache (useful for testing or credential rotation).
pub async fn clear_cache() {
    let mut cache = get_cache().write().await;
    cache.clear();
}
