use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::config::GatewayConfig;

/// Messages posted to the worker by the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlMessage {
    Notify {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        body: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

pub fn parse_control_message(json: &str) -> Result<ControlMessage, serde_json::Error> {
    serde_json::from_str(json)
}

/// Decode a posted message. `JSON.stringify` yields `undefined` rather than
/// throwing for `undefined`, functions and symbols; those are rejected too.
pub fn control_message_from_js(data: &JsValue) -> Result<ControlMessage, String> {
    let json = js_sys::JSON::stringify(data)
        .map_err(|err| crate::js_value_to_string(&err))?
        .as_string()
        .ok_or_else(|| "payload has no JSON form".to_string())?;
    parse_control_message(&json).map_err(|err| err.to_string())
}

pub fn notification_for(message: &ControlMessage, config: &GatewayConfig) -> Notification {
    match message {
        ControlMessage::Notify { title, body } => Notification {
            title: title
                .clone()
                .unwrap_or_else(|| config.default_title.to_string()),
            body: body.clone().unwrap_or_default(),
            icon: config.notification_icon.to_string(),
        },
    }
}
