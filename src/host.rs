//! Calls into the page's host environment: the Telegram bridge and the
//! service worker container.

use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

use crate::js_value_to_string;

pub const SW_BOOTSTRAP_URL: &str = "/sw_bootstrap.js";

fn js_function(target: &JsValue, name: &str) -> Result<Function, String> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(|err| js_value_to_string(&err))?
        .dyn_into::<Function>()
        .map_err(|_| format!("{} missing", name))
}

fn js_property(target: &JsValue, name: &str) -> Result<JsValue, String> {
    let value =
        Reflect::get(target, &JsValue::from_str(name)).map_err(|err| js_value_to_string(&err))?;
    if value.is_undefined() || value.is_null() {
        return Err(format!("{} unavailable", name));
    }
    Ok(value)
}

/// Tell the Telegram client the Mini App has finished loading.
pub fn signal_ready(window: &Window) -> Result<(), String> {
    let window_js: JsValue = window.clone().into();
    let telegram = js_property(&window_js, "Telegram")?;
    let web_app = js_property(&telegram, "WebApp")?;
    let ready = js_function(&web_app, "ready")?;
    ready
        .call0(&web_app)
        .map_err(|err| js_value_to_string(&err))?;
    Ok(())
}

fn should_register_service_worker(window: &Window) -> Result<(), String> {
    let search = window.location().search().unwrap_or_default();
    if search.contains("nosw=1") {
        return Err("disabled via nosw=1".to_string());
    }

    Ok(())
}

fn service_worker_container(window: &Window) -> Result<JsValue, String> {
    let nav_js: JsValue = window.navigator().into();

    let has_sw = Reflect::has(&nav_js, &JsValue::from_str("serviceWorker"))
        .map_err(|err| js_value_to_string(&err))?;
    if !has_sw {
        return Err("service worker unsupported".to_string());
    }

    js_property(&nav_js, "serviceWorker")
}

fn registration_script_url(registration: &JsValue) -> Option<String> {
    for key in ["active", "waiting", "installing"] {
        let Ok(worker) = Reflect::get(registration, &JsValue::from_str(key)) else {
            continue;
        };
        if worker.is_null() || worker.is_undefined() {
            continue;
        }
        let Ok(url) = Reflect::get(&worker, &JsValue::from_str("scriptURL")) else {
            continue;
        };
        if let Some(url) = url.as_string() {
            return Some(url);
        }
    }

    None
}

/// Register the offline worker as a module script. `Err` carries the reason
/// registration was skipped or failed.
pub async fn register_service_worker(window: &Window) -> Result<String, String> {
    should_register_service_worker(window)?;

    let sw_container = service_worker_container(window)?;
    let register = js_function(&sw_container, "register")
        .map_err(|_| "serviceWorker.register missing".to_string())?;

    let options = Object::new();
    Reflect::set(
        &options,
        &JsValue::from_str("type"),
        &JsValue::from_str("module"),
    )
    .map_err(|err| js_value_to_string(&err))?;

    let registration = register
        .call2(
            &sw_container,
            &JsValue::from_str(SW_BOOTSTRAP_URL),
            &JsValue::from(options),
        )
        .map_err(|err| js_value_to_string(&err))?;
    let registration = JsFuture::from(Promise::from(registration))
        .await
        .map_err(|err| js_value_to_string(&err))?;
    let script_url = registration_script_url(&registration).unwrap_or_else(|| "(pending)".into());

    Ok(format!("sw_register (script={})", script_url))
}
