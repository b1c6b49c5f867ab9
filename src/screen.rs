use wasm_bindgen::JsValue;
use web_sys::Document;

pub const ACTIVE_CLASS: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Start,
    Compass,
    Map,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Start, Screen::Compass, Screen::Map];

    pub fn container_id(self) -> &'static str {
        match self {
            Screen::Start => "start-screen",
            Screen::Compass => "compass-screen",
            Screen::Map => "map-screen",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Screen::Start => "start",
            Screen::Compass => "compass",
            Screen::Map => "map",
        }
    }
}

/// Mark exactly the container of `current` as active.
pub fn render_screens(document: &Document, current: Screen) -> Result<(), JsValue> {
    for screen in Screen::ALL {
        let container = document
            .get_element_by_id(screen.container_id())
            .ok_or_else(|| JsValue::from_str(&format!("Missing {}", screen.container_id())))?;
        container
            .class_list()
            .toggle_with_force(ACTIVE_CLASS, screen == current)?;
    }
    Ok(())
}
