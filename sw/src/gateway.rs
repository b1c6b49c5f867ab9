//! Cache-first request gateway, independent of the browser bindings.
//!
//! The worker lifecycle is `Installing -> Active`. A failed install leaves the
//! worker `Redundant` and the browser keeps whatever version was active before.

use std::cell::Cell;

use futures::future::try_join_all;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Active,
    Redundant,
}

pub trait CachedResponse: Sized {
    /// Second handle on the same response so one copy can be stored while the
    /// other is returned to the page.
    fn duplicate(&self) -> Result<Self, GatewayError>;
    fn status(&self) -> u16;
    fn is_ok(&self) -> bool;
}

#[allow(async_fn_in_trait)]
pub trait Network {
    type Request;
    type Response: CachedResponse;

    fn request_for(&self, path: &str) -> Result<Self::Request, GatewayError>;
    fn describe(&self, request: &Self::Request) -> String;
    /// Only cacheable requests are looked up in and written to the store.
    fn is_cacheable(&self, request: &Self::Request) -> bool;
    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response, GatewayError>;
}

#[allow(async_fn_in_trait)]
pub trait CacheStore {
    type Request;
    type Response;

    async fn lookup(&self, request: &Self::Request)
    -> Result<Option<Self::Response>, GatewayError>;
    async fn store(
        &self,
        request: &Self::Request,
        response: Self::Response,
    ) -> Result<(), GatewayError>;
    async fn remove(&self, request: &Self::Request) -> Result<(), GatewayError>;
}

/// Receives failures the gateway recovers from instead of returning.
pub type ErrorReporter = Box<dyn Fn(&str, &GatewayError)>;

pub struct ServiceWorkerGateway<C, N> {
    config: GatewayConfig,
    cache: C,
    network: N,
    state: Cell<WorkerState>,
    reporter: ErrorReporter,
}

impl<C, N> ServiceWorkerGateway<C, N>
where
    N: Network,
    C: CacheStore<Request = N::Request, Response = N::Response>,
{
    pub fn new(config: GatewayConfig, cache: C, network: N) -> Self {
        Self {
            config,
            cache,
            network,
            state: Cell::new(WorkerState::Installing),
            reporter: Box::new(|_, _| {}),
        }
    }

    pub fn with_reporter(mut self, reporter: impl Fn(&str, &GatewayError) + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Precache every manifest entry. Returns the number of stored entries.
    pub async fn install(&self) -> Result<usize, GatewayError> {
        match self.precache().await {
            Ok(count) => Ok(count),
            Err(err) => {
                self.state.set(WorkerState::Redundant);
                Err(err)
            }
        }
    }

    async fn precache(&self) -> Result<usize, GatewayError> {
        let requests = self
            .config
            .manifest
            .iter()
            .map(|path| self.network.request_for(path))
            .collect::<Result<Vec<_>, _>>()?;

        // Nothing is written until the whole batch has settled successfully.
        let responses = try_join_all(requests.iter().map(|request| async move {
            let response = self.network.fetch(request).await?;
            if response.is_ok() {
                Ok(response)
            } else {
                Err(GatewayError::BadStatus {
                    key: self.network.describe(request),
                    status: response.status(),
                })
            }
        }))
        .await?;

        let count = responses.len();
        for (written, (request, response)) in requests.iter().zip(responses).enumerate() {
            if let Err(err) = self.cache.store(request, response).await {
                self.roll_back(&requests[..written]).await;
                return Err(err);
            }
        }

        Ok(count)
    }

    /// Remove entries written by an install that did not complete.
    async fn roll_back(&self, written: &[N::Request]) {
        for request in written {
            if let Err(err) = self.cache.remove(request).await {
                (self.reporter)("precache rollback failed", &err);
            }
        }
    }

    pub fn activate(&self) -> WorkerState {
        if self.state.get() == WorkerState::Installing {
            self.state.set(WorkerState::Active);
        }
        self.state.get()
    }

    /// Answer an intercepted request: cache, then network, then the cached
    /// root document.
    pub async fn respond(&self, request: &N::Request) -> Result<N::Response, GatewayError> {
        let cacheable = self.network.is_cacheable(request);

        if cacheable {
            // A broken cache counts as a miss; the network may still answer.
            match self.cache.lookup(request).await {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(err) => (self.reporter)("cache lookup failed", &err),
            }
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if cacheable && response.is_ok() {
                    self.write_back(request, &response).await;
                }
                Ok(response)
            }
            Err(_) => self.offline_fallback().await,
        }
    }

    async fn write_back(&self, request: &N::Request, response: &N::Response) {
        let stored = match response.duplicate() {
            Ok(copy) => self.cache.store(request, copy).await,
            Err(err) => Err(err),
        };
        if let Err(err) = stored {
            (self.reporter)("runtime cache write failed", &err);
        }
    }

    async fn offline_fallback(&self) -> Result<N::Response, GatewayError> {
        let fallback = self.network.request_for(self.config.fallback_path)?;
        self.cache
            .lookup(&fallback)
            .await?
            .ok_or_else(|| GatewayError::Offline {
                key: self.config.fallback_path.to_string(),
            })
    }
}
