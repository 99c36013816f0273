//! Interface source that consults local overrides and the class cache before the network

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{trace, warn};

use super::LocalAbis;
use crate::domain::abi::InterfaceDefinition;
use crate::domain::source::InterfaceSource;
use crate::domain::Felt;
use crate::store::AbiCache;

/// Lookup order: local file for the address, local file for the class hash,
/// persistent class cache, then `remote` (whose answer is cached).
pub struct LayeredSource<S> {
    remote: S,
    local: LocalAbis,
    cache: Option<Mutex<AbiCache>>,
}

impl<S: InterfaceSource> LayeredSource<S> {
    pub fn new(remote: S) -> Self {
        Self {
            remote,
            local: LocalAbis::default(),
            cache: None,
        }
    }

    pub fn with_local(mut self, local: LocalAbis) -> Self {
        self.local = local;
        self
    }

    pub fn with_cache(mut self, cache: AbiCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    fn cached(&self, class_hash: &Felt) -> Option<InterfaceDefinition> {
        let cache = self.cache.as_ref()?.lock().ok()?;
        match cache.get_abi(class_hash) {
            Ok(found) => found,
            Err(err) => {
                warn!(target: "tracelens::abi", %class_hash, %err, "ABI cache read failed");
                None
            }
        }
    }

    fn store(&self, class_hash: &Felt, interface: &InterfaceDefinition) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let result = cache
            .lock()
            .map_err(|_| anyhow!("ABI cache lock poisoned"))
            .and_then(|cache| cache.save_abi(class_hash, interface));
        if let Err(err) = result {
            warn!(target: "tracelens::abi", %class_hash, %err, "ABI cache write failed");
        }
    }
}

#[async_trait]
impl<S: InterfaceSource> InterfaceSource for LayeredSource<S> {
    async fn class_hash_at(&self, address: Felt) -> Result<Felt> {
        self.remote.class_hash_at(address).await
    }

    async fn interface_of_class(&self, class_hash: Felt) -> Result<InterfaceDefinition> {
        if let Some(interface) = self.local.get(&class_hash) {
            trace!(target: "tracelens::abi", %class_hash, "local ABI override");
            return Ok(interface.clone());
        }
        if let Some(interface) = self.cached(&class_hash) {
            trace!(target: "tracelens::abi", %class_hash, "ABI cache hit");
            return Ok(interface);
        }
        let interface = self.remote.interface_of_class(class_hash).await?;
        self.store(&class_hash, &interface);
        Ok(interface)
    }

    async fn call_view(&self, address: Felt, function: &str) -> Result<Felt> {
        self.remote.call_view(address, function).await
    }

    async fn interface_at(&self, address: Felt) -> Result<InterfaceDefinition> {
        if let Some(interface) = self.local.get(&address) {
            trace!(target: "tracelens::abi", %address, "local ABI override");
            return Ok(interface.clone());
        }
        let class_hash = self.remote.class_hash_at(address).await?;
        self.interface_of_class(class_hash).await
    }
}
