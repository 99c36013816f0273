//! Interface resolution with one-hop proxy following and per-session caching

use futures::{stream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::domain::abi::{InterfaceCache, InterfaceDefinition, ResolvedContract};
use crate::domain::source::InterfaceSource;
use crate::domain::{DecodeError, Felt};

/// Default number of interface fetches in flight
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Resolves contract addresses to interfaces through an [`InterfaceSource`]
pub struct InterfaceResolver<'a, S: ?Sized> {
    source: &'a S,
    concurrency: usize,
}

impl<'a, S: InterfaceSource + ?Sized> InterfaceResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Bound the resolution fan-out (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch the interface for `address`.
    ///
    /// When the interface exposes a view function whose name contains
    /// `implementation`, it is called and the interface behind the returned
    /// word (a class hash, or failing that a contract address) replaces it.
    /// Only one hop is followed.
    pub async fn resolve(&self, address: Felt) -> Result<InterfaceDefinition, DecodeError> {
        let interface = self
            .source
            .interface_at(address)
            .await
            .map_err(|source| DecodeError::LookupFailed { address, source })?;

        let Some(getter) = interface.proxy_getter() else {
            return Ok(interface);
        };
        debug!(target: "tracelens::resolver", %address, getter, "following proxy implementation");

        let implementation = self
            .source
            .call_view(address, getter)
            .await
            .map_err(|source| DecodeError::LookupFailed { address, source })?;

        match self.source.interface_of_class(implementation).await {
            Ok(interface) => Ok(interface),
            Err(err) => {
                debug!(
                    target: "tracelens::resolver",
                    %implementation,
                    %err,
                    "implementation is not a class hash, trying it as an address"
                );
                self.source
                    .interface_at(implementation)
                    .await
                    .map_err(|source| DecodeError::LookupFailed {
                        address: implementation,
                        source,
                    })
            }
        }
    }

    /// Resolve through the cache; fetches only on a miss
    pub async fn resolve_cached<'c>(
        &self,
        cache: &'c mut InterfaceCache,
        address: Felt,
    ) -> Result<&'c ResolvedContract, DecodeError> {
        if !cache.contains(&address) {
            let interface = self.resolve(address).await?;
            cache.insert(address, interface);
        }
        cache
            .get(&address)
            .ok_or_else(|| DecodeError::LookupFailed {
                address,
                source: anyhow::anyhow!("interface missing from cache after insert"),
            })
    }

    /// Resolve every address not yet cached, at most `concurrency` at a time.
    ///
    /// Duplicates are fetched once. The first failure aborts the whole batch
    /// and nothing from it is cached.
    pub async fn resolve_all(
        &self,
        cache: &mut InterfaceCache,
        addresses: &[Felt],
    ) -> Result<(), DecodeError> {
        let mut pending: Vec<Felt> = Vec::new();
        for address in addresses {
            if !cache.contains(address) && !pending.contains(address) {
                pending.push(*address);
            }
        }
        if pending.is_empty() {
            return Ok(());
        }
        debug!(
            target: "tracelens::resolver",
            count = pending.len(),
            cached = cache.len(),
            "resolving interfaces"
        );

        let resolved: Vec<(Felt, InterfaceDefinition)> = stream::iter(pending)
            .map(|address| async move {
                self.resolve(address)
                    .await
                    .map(|interface| (address, interface))
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        for (address, interface) in resolved {
            cache.insert(address, interface);
        }
        Ok(())
    }
}
