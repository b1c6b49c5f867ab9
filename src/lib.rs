pub mod bearing;
pub mod compass;
pub mod geolocation;
pub mod host;
pub mod screen;

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, HtmlButtonElement, HtmlElement, Window};

use bearing::qibla_bearing;
use geolocation::GeolocationOutcome;
use screen::Screen;

const QIBLA_BUTTON_LABEL: &str = "Find Qibla";
const RETRY_BUTTON_LABEL: &str = "Try again";

#[doc(hidden)]
pub struct AppState {
    document: Document,
    screen: Screen,
    locating: bool,
    qibla_button: HtmlButtonElement,
    status_text: HtmlElement,
    pointer: HtmlElement,
    degree_label: HtmlElement,
    last_event: String,
}

fn window() -> Window {
    web_sys::window().expect("missing window")
}

pub(crate) fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing #{}", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{} has the wrong element type", id)))
}

fn set_status(document: &Document, status_text: &HtmlElement, status: &str, message: &str) {
    if let Some(el) = document.document_element() {
        let _ = el.set_attribute("data-app-status", status);
    }
    status_text.set_text_content(Some(message));
}

fn record_event(state: &mut AppState, event: impl Into<String>) {
    state.last_event = event.into();
    if let Some(el) = state.document.document_element() {
        let _ = el.set_attribute("data-last-event", &state.last_event);
    }
    web_sys::console::log_1(&JsValue::from_str(&format!(
        "[{}] {}",
        state.screen.name(),
        state.last_event
    )));
}

fn show_screen(state: &mut AppState, screen: Screen) -> Result<(), JsValue> {
    screen::render_screens(&state.document, screen)?;
    state.screen = screen;
    record_event(state, format!("show_{}", screen.name()));
    Ok(())
}

impl AppState {
    /// Bind to the page's controls and show the start screen.
    #[doc(hidden)]
    pub fn from_document(document: Document) -> Result<Self, JsValue> {
        let mut state = AppState {
            qibla_button: element_by_id(&document, "qibla-button")?,
            status_text: element_by_id(&document, "status")?,
            pointer: element_by_id(&document, "compass-pointer")?,
            degree_label: element_by_id(&document, "compass-degrees")?,
            document,
            screen: Screen::Start,
            locating: false,
            last_event: "init".to_string(),
        };

        show_screen(&mut state, Screen::Start)?;
        state.qibla_button.set_text_content(Some(QIBLA_BUTTON_LABEL));
        set_status(&state.document, &state.status_text, "ready", "");
        Ok(state)
    }

    #[doc(hidden)]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[doc(hidden)]
    pub fn apply_geolocation_outcome(&mut self, outcome: GeolocationOutcome) -> Result<(), JsValue> {
        self.locating = false;
        self.qibla_button.set_disabled(false);
        record_event(self, outcome.event_name());

        match outcome {
            GeolocationOutcome::Success(position) => {
                let bearing = qibla_bearing(position);
                compass::render_bearing(&self.pointer, &self.degree_label, bearing)?;
                self.qibla_button.set_text_content(Some(QIBLA_BUTTON_LABEL));
                set_status(&self.document, &self.status_text, "compass", "");
                show_screen(self, Screen::Compass)
            }
            GeolocationOutcome::Denied | GeolocationOutcome::Unavailable => {
                let message = outcome.failure_message().unwrap_or_default();
                self.qibla_button.set_text_content(Some(RETRY_BUTTON_LABEL));
                set_status(&self.document, &self.status_text, "location_error", message);
                show_screen(self, Screen::Start)
            }
        }
    }
}

fn request_qibla(state: Rc<RefCell<AppState>>) {
    {
        let mut st = state.borrow_mut();
        if st.locating {
            return;
        }
        st.locating = true;
        st.qibla_button.set_disabled(true);
        set_status(&st.document, &st.status_text, "locating", "Finding your location…");
        record_event(&mut st, "geolocation_request");
    }

    spawn_local(async move {
        let outcome = geolocation::request_position(&window()).await;
        let mut st = state.borrow_mut();
        if let Err(err) = st.apply_geolocation_outcome(outcome) {
            web_sys::console::error_1(&err);
        }
    });
}

fn on_click(
    target: &web_sys::EventTarget,
    state: &Rc<RefCell<AppState>>,
    handler: fn(Rc<RefCell<AppState>>),
) -> Result<(), JsValue> {
    let state = Rc::clone(state);
    let callback = Closure::wrap(Box::new(move |_event: Event| {
        handler(Rc::clone(&state));
    }) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn navigate(state: Rc<RefCell<AppState>>, screen: Screen) {
    let mut st = state.borrow_mut();
    if let Err(err) = show_screen(&mut st, screen) {
        web_sys::console::error_1(&err);
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(err) = start_impl() {
        let message = format!("fatal: {}", js_value_to_string(&err));

        if let Some(win) = web_sys::window() {
            if let Some(doc) = win.document() {
                if let Some(el) = doc.document_element() {
                    let _ = el.set_attribute("data-app-status", "error");
                }
                if let Some(status) = doc.get_element_by_id("status") {
                    status.set_text_content(Some(&message));
                }
            }
        }

        web_sys::console::error_1(&err);
    }
}

fn start_impl() -> Result<(), JsValue> {
    let win = window();
    let document = win
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    if let Err(reason) = host::signal_ready(&win) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("telegram_ready_skip ({})", reason)));
    }

    let map_button: HtmlButtonElement = element_by_id(&document, "map-button")?;
    let state = Rc::new(RefCell::new(AppState::from_document(document.clone())?));
    let qibla_button = state.borrow().qibla_button.clone();

    on_click(&qibla_button, &state, request_qibla)?;
    on_click(&map_button, &state, |state| navigate(state, Screen::Map))?;

    let back_buttons = document.get_elements_by_class_name("back-button");
    for index in 0..back_buttons.length() {
        if let Some(button) = back_buttons.item(index) {
            on_click(&button, &state, |state| navigate(state, Screen::Start))?;
        }
    }

    let state_sw = Rc::clone(&state);
    spawn_local(async move {
        let event = match host::register_service_worker(&window()).await {
            Ok(details) => details,
            Err(reason) => format!("sw_register_skip ({})", reason),
        };
        record_event(&mut state_sw.borrow_mut(), event);
    });

    Ok(())
}
