//! Pool of interchangeable provider credentials.
//!
//! Each credential wraps one API key's client. The pool is fixed at startup;
//! rotation state is a single atomic cursor.


use rand::seq::SliceRandom;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gembridge_types::ConfigError;

use crate::proxy::upstream::client::mask_key;
use crate::proxy::upstream::{GeminiClient, GenerativeProvider};

/// One pool entry: a provider handle plus a log-safe label.
pub struct Credential {
    index: usize,
    label: String,
    client: Arc<dyn GenerativeProvider>,
}

impl Credential {
    pub fn new(index: usize, label: impl Into<String>, client: Arc<dyn GenerativeProvider>) -> Self {
        Self { index, label: label.into(), client }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn client(&self) -> &dyn GenerativeProvider {
        self.client.as_ref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("index", &self.index).field("label", &self.label).finish()
    }
}

pub struct CredentialPool {
    credentials: Vec<Arc<Credential>>,
    cursor: AtomicUsize,
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("size", &self.credentials.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}

impl CredentialPool {
    /// Build from ready-made provider handles. An empty list is a config error.
    pub fn new(providers: Vec<(String, Arc<dyn GenerativeProvider>)>) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::NoCredentials);
        }
        let credentials = providers
            .into_iter()
            .enumerate()
            .map(|(index, (label, client))| Arc::new(Credential::new(index, label, client)))
            .collect();
        Ok(Self { credentials, cursor: AtomicUsize::new(0) })
    }

    /// One `GeminiClient` per key, all sharing `http_client`.
    pub fn from_api_keys(
        api_keys: &[String],
        http_client: &reqwest::Client,
        base_url: &str,
    ) -> Result<Self, ConfigError> {
        let providers = api_keys
            .iter()
            .map(|key| {
                let client = GeminiClient::new(http_client.clone(), base_url, key.clone())?;
                Ok((mask_key(key), Arc::new(client) as Arc<dyn GenerativeProvider>))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let pool = Self::new(providers)?;
        tracing::info!("Credential pool ready with {} key(s)", pool.len());
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn first(&self) -> Arc<Credential> {
        Arc::clone(&self.credentials[0])
    }

    /// Advance the round-robin cursor and return the credential it lands on.
    pub fn next(&self) -> Arc<Credential> {
        let len = self.credentials.len();
        let previous = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
            .unwrap_or_else(|i| i);
        Arc::clone(&self.credentials[(previous + 1) % len])
    }

    /// Uniform pick among credentials other than `excluding`.
    pub fn random(&self, excluding: Option<&Arc<Credential>>) -> Option<Arc<Credential>> {
        let candidates: Vec<&Arc<Credential>> = self
            .credentials
            .iter()
            .filter(|c| excluding.map_or(true, |ex| ex.index != c.index))
            .collect();
        let picked = candidates.choose(&mut rand::thread_rng()).map(|c| Arc::clone(c))?;
        tracing::debug!("Random credential picked: index {}", picked.index);
        Some(picked)
    }

    /// Credential for one attempt: round-robin first, then a different key
    /// per retry, staying on the same key when it is the only one.
    pub fn rotate(&self, previous: Option<&Arc<Credential>>) -> Arc<Credential> {
        match previous {
            None => self.next(),
            Some(prev) => self.random(Some(prev)).unwrap_or_else(|| Arc::clone(prev)),
        }
    }
}
