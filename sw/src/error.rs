use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("js error: {0}")]
    Js(String),

    #[error("network error for {key}: {reason}")]
    Network { key: String, reason: String },

    #[error("bad status {status} for {key}")]
    BadStatus { key: String, status: u16 },

    #[error("cache error: {0}")]
    Cache(String),

    #[error("offline and {key} is not cached")]
    Offline { key: String },
}

impl GatewayError {
    pub fn from_js_value(value: JsValue) -> Self {
        GatewayError::Js(crate::js_value_to_string(&value))
    }
}

impl From<GatewayError> for JsValue {
    fn from(err: GatewayError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
