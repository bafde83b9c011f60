//! Registry access: URL templating and a per-process fetch cache.
//!
//! Each namespace maps to a URL template with `{type}` and `{name}`
//! placeholders, e.g. `https://kitn-ai.github.io/registry/r/{type}/{name}.json`.
//! The index of a registry lives next to the items as `registry.json`.
//!
//! Fetched documents are cached in memory by URL for the lifetime of the
//! fetcher. Concurrent requests for the same URL share one in-flight
//! request. Failures are not cached, so a later call asks again.

mod transport;

pub use transport::{HttpTransport, Transport};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::error::KitnError;
use crate::model::{ComponentRef, Registries, RegistryIndex, RegistryItem};

const ITEM_SUFFIX: &str = "{type}/{name}.json";
const INDEX_FILE: &str = "registry.json";

type Slot<V> = Arc<OnceCell<Arc<V>>>;
type Cache<V> = Mutex<HashMap<String, Slot<V>>>;

pub struct RegistryFetcher<T = HttpTransport> {
    registries: Registries,
    transport: T,
    items: Cache<RegistryItem>,
    indexes: Cache<RegistryIndex>,
}

impl<T: Transport> RegistryFetcher<T> {
    pub fn new(registries: Registries, transport: T) -> Self {
        Self {
            registries,
            transport,
            items: Mutex::default(),
            indexes: Mutex::default(),
        }
    }

    fn template(&self, namespace: &str) -> Result<&str, KitnError> {
        self.registries
            .get(namespace)
            .map(String::as_str)
            .ok_or_else(|| KitnError::RegistryNotConfigured {
                namespace: namespace.to_string(),
            })
    }

    /// Concrete URL of a component descriptor. A pinned version is
    /// requested as `name@version`.
    pub fn resolve_url(&self, reference: &ComponentRef, type_dir: &str) -> Result<String, KitnError> {
        let template = self.template(&reference.namespace)?;
        let name = match &reference.version {
            Some(v) => format!("{}@{v}", reference.name),
            None => reference.name.clone(),
        };
        Ok(template.replace("{type}", type_dir).replace("{name}", &name))
    }

    pub fn index_url(&self, namespace: &str) -> Result<String, KitnError> {
        let template = self.template(namespace)?;
        if let Some(root) = template.strip_suffix(ITEM_SUFFIX) {
            return Ok(format!("{root}{INDEX_FILE}"));
        }
        let root = template.rfind('/').map_or("", |i| &template[..=i]);
        Ok(format!("{root}{INDEX_FILE}"))
    }

    pub async fn fetch_item(
        &self,
        reference: &ComponentRef,
        type_dir: &str,
    ) -> Result<Arc<RegistryItem>, KitnError> {
        let url = self.resolve_url(reference, type_dir)?;
        self.fetch_cached(&self.items, url).await
    }

    pub async fn fetch_index(&self, namespace: &str) -> Result<Arc<RegistryIndex>, KitnError> {
        let url = self.index_url(namespace)?;
        self.fetch_cached(&self.indexes, url).await
    }

    /// Fetch a component whose type is looked up in its registry's index.
    pub async fn fetch_component(
        &self,
        reference: &ComponentRef,
    ) -> Result<Arc<RegistryItem>, KitnError> {
        let index = self.fetch_index(&reference.namespace).await?;
        let entry = index
            .get(&reference.name)
            .ok_or_else(|| KitnError::ComponentNotFound {
                namespace: reference.namespace.clone(),
                name: reference.name.clone(),
            })?;
        self.fetch_item(reference, entry.kind.registry_dir()).await
    }

    pub fn clear_cache(&self) {
        lock(&self.items).clear();
        lock(&self.indexes).clear();
    }

    async fn fetch_cached<V: DeserializeOwned>(
        &self,
        cache: &Cache<V>,
        url: String,
    ) -> Result<Arc<V>, KitnError> {
        let slot = lock(cache).entry(url.clone()).or_default().clone();

        if let Some(value) = slot.get() {
            tracing::debug!("cache hit: {url}");
            return Ok(value.clone());
        }

        let value = slot
            .get_or_try_init(|| async {
                let body = self.transport.get(&url).await?;
                let parsed: V = serde_json::from_str(&body).map_err(|source| KitnError::Parse {
                    url: url.clone(),
                    source,
                })?;
                Ok::<_, KitnError>(Arc::new(parsed))
            })
            .await?;
        Ok(value.clone())
    }
}

fn lock<V>(cache: &Cache<V>) -> std::sync::MutexGuard<'_, HashMap<String, Slot<V>>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}
