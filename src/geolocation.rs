use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

use crate::bearing::Coordinate;

/// W3C `GeolocationPositionError.PERMISSION_DENIED`.
const PERMISSION_DENIED: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeolocationOutcome {
    Success(Coordinate),
    Denied,
    Unavailable,
}

impl GeolocationOutcome {
    pub fn from_error_code(code: Option<u16>) -> Self {
        match code {
            Some(PERMISSION_DENIED) => GeolocationOutcome::Denied,
            _ => GeolocationOutcome::Unavailable,
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            GeolocationOutcome::Success(_) => "geolocation_success",
            GeolocationOutcome::Denied => "geolocation_denied",
            GeolocationOutcome::Unavailable => "geolocation_unavailable",
        }
    }

    /// Text shown on the start screen when no position was obtained.
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            GeolocationOutcome::Success(_) => None,
            GeolocationOutcome::Denied => {
                Some("Location access was denied. Allow it in settings and try again.")
            }
            GeolocationOutcome::Unavailable => {
                Some("Your location could not be determined. Try again.")
            }
        }
    }
}

fn read_f64(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()
}

fn coordinate_from_position(position: &JsValue) -> Option<Coordinate> {
    let coords = Reflect::get(position, &JsValue::from_str("coords")).ok()?;
    if coords.is_undefined() || coords.is_null() {
        return None;
    }
    Some(Coordinate::new(
        read_f64(&coords, "latitude")?,
        read_f64(&coords, "longitude")?,
    ))
}

/// One-shot `getCurrentPosition`. No timeout is set, so a request the user
/// never answers stays pending.
pub async fn request_position(window: &Window) -> GeolocationOutcome {
    let Ok(geolocation) = window.navigator().geolocation() else {
        return GeolocationOutcome::Unavailable;
    };

    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let on_error_reject = reject.clone();
        let on_success = Closure::once_into_js(move |position: JsValue| {
            let _ = resolve.call1(&JsValue::UNDEFINED, &position);
        });
        let on_error = Closure::once_into_js(move |error: JsValue| {
            let _ = on_error_reject.call1(&JsValue::UNDEFINED, &error);
        });

        if let Err(err) = geolocation.get_current_position_with_error_callback(
            on_success.unchecked_ref(),
            Some(on_error.unchecked_ref()),
        ) {
            let _ = reject.call1(&JsValue::UNDEFINED, &err);
        }
    });

    match JsFuture::from(promise).await {
        Ok(position) => coordinate_from_position(&position)
            .map(GeolocationOutcome::Success)
            .unwrap_or(GeolocationOutcome::Unavailable),
        Err(error) => GeolocationOutcome::from_error_code(
            read_f64(&error, "code").map(|code| code as u16),
        ),
    }
}
