pub mod config;
pub mod error;
pub mod gateway;
pub mod message;

use std::rc::Rc;

use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{Request, Response};

use config::GatewayConfig;
use error::GatewayError;
use gateway::{CacheStore, CachedResponse, Network, ServiceWorkerGateway};
use message::Notification;

type WorkerGateway = ServiceWorkerGateway<WebCache, WorkerNetwork>;

thread_local! {
    static GATEWAY: Rc<WorkerGateway> = {
        let config = GatewayConfig::DEFAULT;
        Rc::new(
            ServiceWorkerGateway::new(config, WebCache::new(config.cache_name), WorkerNetwork)
                .with_reporter(log_error),
        )
    };
}

fn worker_gateway() -> Rc<WorkerGateway> {
    GATEWAY.with(Rc::clone)
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(&format!(
        "[{}] {}",
        GatewayConfig::DEFAULT.cache_name,
        message
    )));
}

fn log_error(context: &str, err: &GatewayError) {
    web_sys::console::error_1(&JsValue::from_str(&format!(
        "[{}] {}: {}",
        GatewayConfig::DEFAULT.cache_name,
        context,
        err
    )));
}

pub(crate) fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn service_worker_scope() -> Result<web_sys::ServiceWorkerGlobalScope, GatewayError> {
    js_sys::global()
        .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
        .map_err(|err| GatewayError::Js(format!("{err:?}")))
}

fn js_function(target: &JsValue, name: &str) -> Result<Function, JsValue> {
    Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("{} missing", name)))
}

/// The worker's named entry in `CacheStorage`, opened per operation.
pub struct WebCache {
    name: &'static str,
}

impl WebCache {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    async fn open(&self) -> Result<web_sys::Cache, GatewayError> {
        let scope = service_worker_scope()?;
        let cache_storage = scope.caches().map_err(GatewayError::from_js_value)?;
        let cache_value = JsFuture::from(cache_storage.open(self.name))
            .await
            .map_err(GatewayError::from_js_value)?;
        cache_value
            .dyn_into::<web_sys::Cache>()
            .map_err(GatewayError::from_js_value)
    }
}

impl CacheStore for WebCache {
    type Request = Request;
    type Response = Response;

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, GatewayError> {
        let cache = self.open().await?;
        let matched = JsFuture::from(cache.match_with_request(request))
            .await
            .map_err(|err| GatewayError::Cache(js_value_to_string(&err)))?;

        if matched.is_undefined() || matched.is_null() {
            return Ok(None);
        }

        matched
            .dyn_into::<Response>()
            .map(Some)
            .map_err(GatewayError::from_js_value)
    }

    async fn store(&self, request: &Request, response: Response) -> Result<(), GatewayError> {
        let cache = self.open().await?;
        JsFuture::from(cache.put_with_request(request, &response))
            .await
            .map_err(|err| GatewayError::Cache(js_value_to_string(&err)))?;
        Ok(())
    }

    async fn remove(&self, request: &Request) -> Result<(), GatewayError> {
        let cache = self.open().await?;
        JsFuture::from(cache.delete_with_request(request))
            .await
            .map_err(|err| GatewayError::Cache(js_value_to_string(&err)))?;
        Ok(())
    }
}

pub struct WorkerNetwork;

impl Network for WorkerNetwork {
    type Request = Request;
    type Response = Response;

    fn request_for(&self, path: &str) -> Result<Request, GatewayError> {
        Request::new_with_str(path).map_err(GatewayError::from_js_value)
    }

    fn describe(&self, request: &Request) -> String {
        request.url()
    }

    fn is_cacheable(&self, request: &Request) -> bool {
        request.method() == "GET"
    }

    async fn fetch(&self, request: &Request) -> Result<Response, GatewayError> {
        let scope = service_worker_scope()?;
        let fetched = JsFuture::from(scope.fetch_with_request(request))
            .await
            .map_err(|err| GatewayError::Network {
                key: request.url(),
                reason: js_value_to_string(&err),
            })?;
        fetched
            .dyn_into::<Response>()
            .map_err(GatewayError::from_js_value)
    }
}

impl CachedResponse for Response {
    fn duplicate(&self) -> Result<Self, GatewayError> {
        self.clone().map_err(GatewayError::from_js_value)
    }

    fn status(&self) -> u16 {
        Response::status(self)
    }

    fn is_ok(&self) -> bool {
        // Opaque cross-origin responses report status 0.
        self.ok() || Response::status(self) == 0
    }
}

/// Install: precache the manifest, then take over from any waiting version.
/// The promise rejects when precaching fails so the browser discards this
/// worker version.
#[wasm_bindgen]
pub fn handle_install() -> Promise {
    future_to_promise(precache_and_skip_waiting(worker_gateway()))
}

async fn precache_and_skip_waiting(gateway: Rc<WorkerGateway>) -> Result<JsValue, JsValue> {
    let count = gateway.install().await.map_err(|err| {
        log_error("install failed", &err);
        JsValue::from(err)
    })?;
    log(&format!("precached {} assets", count));
    skip_waiting()?;
    Ok(JsValue::UNDEFINED)
}

/// Activate: control already-open pages without a reload.
#[wasm_bindgen]
pub fn handle_activate() -> Promise {
    let state = worker_gateway().activate();
    log(&format!("activate ({:?})", state));
    future_to_promise(async move {
        if let Err(err) = claim_clients().await {
            web_sys::console::error_1(&err);
        }
        Ok(JsValue::UNDEFINED)
    })
}

/// Fetch: resolves to the `Response` handed to `respondWith`.
#[wasm_bindgen]
pub fn handle_fetch(request: Request) -> Promise {
    let gateway = worker_gateway();
    future_to_promise(async move {
        gateway
            .respond(&request)
            .await
            .map(JsValue::from)
            .map_err(|err| {
                log_error("fetch failed", &err);
                JsValue::from(err)
            })
    })
}

/// Message: `{"type": "notify", "title"?, "body"?}` shows a notification.
/// Anything else is logged and dropped.
#[wasm_bindgen]
pub fn handle_message(data: JsValue) -> Promise {
    let message = match message::control_message_from_js(&data) {
        Ok(message) => message,
        Err(reason) => {
            log(&format!("ignored message ({})", reason));
            return Promise::resolve(&JsValue::UNDEFINED);
        }
    };

    let notification = message::notification_for(&message, worker_gateway().config());
    future_to_promise(async move {
        if let Err(err) = show_notification(&notification).await {
            web_sys::console::error_1(&err);
        }
        Ok(JsValue::UNDEFINED)
    })
}

fn skip_waiting() -> Result<(), JsValue> {
    let scope = js_sys::global().dyn_into::<web_sys::ServiceWorkerGlobalScope>()?;
    let skip_waiting = js_function(&scope, "skipWaiting")?;
    let _ = skip_waiting.call0(&scope)?;
    Ok(())
}

async fn claim_clients() -> Result<(), JsValue> {
    let scope = js_sys::global().dyn_into::<web_sys::ServiceWorkerGlobalScope>()?;
    let clients = Reflect::get(&scope, &JsValue::from_str("clients"))?;
    let claim = js_function(&clients, "claim")?;
    let promise_val = claim.call0(&clients)?;
    let _ = JsFuture::from(Promise::from(promise_val)).await?;
    Ok(())
}

async fn show_notification(notification: &Notification) -> Result<(), JsValue> {
    let scope = js_sys::global().dyn_into::<web_sys::ServiceWorkerGlobalScope>()?;
    let registration = Reflect::get(&scope, &JsValue::from_str("registration"))?;
    let show = js_function(&registration, "showNotification")?;

    let options = Object::new();
    Reflect::set(
        &options,
        &JsValue::from_str("body"),
        &JsValue::from_str(&notification.body),
    )?;
    Reflect::set(
        &options,
        &JsValue::from_str("icon"),
        &JsValue::from_str(&notification.icon),
    )?;

    let promise = show.call2(
        &registration,
        &JsValue::from_str(&notification.title),
        &JsValue::from(options),
    )?;
    let _ = JsFuture::from(Promise::from(promise)).await?;
    Ok(())
}
