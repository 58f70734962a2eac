//! AWS Systems Manager Parameter Store integration.

use aws_sdk_ssm::Client as SsmClient;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::info;

use crate::{Error, Result};

type CacheKey = (String, bool);

static PARAMETER_CACHE: OnceLock<RwLock<HashMap<CacheKey, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<CacheKey, String>> {
    PARAMETER_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

async fn cached(key: &CacheKey) -> Option<String> {
    get_cache().read().await.get(key).cloned()
}

async fn remember(key: CacheKey, value: &str) {
    get_cache().write().await.insert(key, value.to_string());
}

/// Get a parameter value from Parameter Store with caching.
///
/// Encrypted parameters (`SecureString`) must be read with `with_decryption`
/// set, otherwise the ciphertext is returned.
pub async fn get_parameter(
    client: &SsmClient,
    name: &str,
    with_decryption: bool,
) -> Result<String> {
    let key = (name.to_string(), with_decryption);
    if let Some(value) = cached(&key).await {
        return Ok(value);
    }

    info!(parameter = %name, with_decryption, "Retrieving parameter from Parameter Store");

    let response = client
        .get_parameter()
        .name(name)
        .with_decryption(with_decryption)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get parameter {}: {}", name, e)))?;

    let value = response
        .parameter()
        .and_then(|p| p.value())
        .ok_or_else(|| Error::Aws(format!("Parameter {} has no value", name)))?
        .to_string();

    remember(key, &value).await;

    Ok(value)
}

/// Clear the parameter cache.
pub async fn clear_cache() {
    get_cache().write().await.clear();
}
