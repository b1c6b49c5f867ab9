use qibla_mini_app::AppState;
use qibla_mini_app::bearing::Coordinate;
use qibla_mini_app::compass::render_bearing;
use qibla_mini_app::geolocation::GeolocationOutcome;
use qibla_mini_app::screen::{ACTIVE_CLASS, Screen, render_screens};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlButtonElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .expect("no window")
        .document()
        .expect("no document")
}

fn ensure_screen_containers(document: &Document) {
    let body = document.body().expect("body");
    for screen in Screen::ALL {
        if document.get_element_by_id(screen.container_id()).is_none() {
            let container = document.create_element("section").expect("create section");
            container.set_id(screen.container_id());
            body.append_child(&container).expect("append section");
        }
    }
}

fn ensure_element(document: &Document, tag: &str, id: &str) {
    if document.get_element_by_id(id).is_none() {
        let element = document.create_element(tag).expect("create element");
        element.set_id(id);
        document
            .body()
            .expect("body")
            .append_child(&element)
            .expect("append element");
    }
}

fn controller(document: &Document) -> AppState {
    ensure_screen_containers(document);
    ensure_element(document, "button", "qibla-button");
    ensure_element(document, "p", "status");
    ensure_element(document, "div", "compass-pointer");
    ensure_element(document, "span", "compass-degrees");
    AppState::from_document(document.clone()).expect("controller")
}

fn text_of(document: &Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .expect("element")
        .text_content()
        .unwrap_or_default()
}

fn app_status(document: &Document) -> Option<String> {
    document
        .document_element()
        .expect("html element")
        .get_attribute("data-app-status")
}

fn qibla_button(document: &Document) -> HtmlButtonElement {
    document
        .get_element_by_id("qibla-button")
        .expect("qibla button")
        .dyn_into::<HtmlButtonElement>()
        .expect("button element")
}

fn is_active(document: &Document, screen: Screen) -> bool {
    document
        .get_element_by_id(screen.container_id())
        .expect("container")
        .class_list()
        .contains(ACTIVE_CLASS)
}

#[wasm_bindgen_test]
fn exactly_one_screen_is_active() {
    let document = document();
    ensure_screen_containers(&document);

    for current in Screen::ALL {
        render_screens(&document, current).expect("render screens");
        for screen in Screen::ALL {
            assert_eq!(is_active(&document, screen), screen == current);
        }
    }
}

#[wasm_bindgen_test]
fn missing_container_is_an_error() {
    let document = document();
    ensure_screen_containers(&document);
    let map = document
        .get_element_by_id(Screen::Map.container_id())
        .expect("map container");
    map.remove();

    assert!(render_screens(&document, Screen::Start).is_err());

    ensure_screen_containers(&document);
}

#[wasm_bindgen_test]
fn bearing_rotates_pointer_and_writes_label() {
    let document = document();
    let pointer = document
        .create_element("div")
        .expect("create pointer")
        .dyn_into::<HtmlElement>()
        .expect("html element");
    let label = document.create_element("span").expect("create label");

    render_bearing(&pointer, &label, 90.0).expect("render bearing");
    assert_eq!(
        pointer.style().get_property_value("transform").expect("transform"),
        "rotate(90deg)"
    );
    assert_eq!(label.text_content().as_deref(), Some("90°"));

    render_bearing(&pointer, &label, 270.4).expect("render bearing");
    assert_eq!(label.text_content().as_deref(), Some("270°"));
}

#[wasm_bindgen_test]
fn controller_starts_on_start_screen() {
    let document = document();
    let state = controller(&document);

    assert_eq!(state.screen(), Screen::Start);
    assert!(is_active(&document, Screen::Start));
    assert_eq!(app_status(&document).as_deref(), Some("ready"));
    assert_eq!(text_of(&document, "qibla-button"), "Find Qibla");
}

#[wasm_bindgen_test]
fn location_failures_offer_a_retry_on_the_start_screen() {
    let document = document();

    for outcome in [GeolocationOutcome::Denied, GeolocationOutcome::Unavailable] {
        let mut state = controller(&document);
        qibla_button(&document).set_disabled(true);

        state.apply_geolocation_outcome(outcome).expect("apply outcome");

        let button = qibla_button(&document);
        assert_eq!(button.text_content().as_deref(), Some("Try again"));
        assert!(!button.disabled());
        assert_eq!(app_status(&document).as_deref(), Some("location_error"));
        assert!(!text_of(&document, "status").is_empty());
        assert_eq!(state.screen(), Screen::Start);
        assert!(is_active(&document, Screen::Start));
        assert!(!is_active(&document, Screen::Compass));
    }
}

#[wasm_bindgen_test]
fn located_user_sees_the_compass() {
    let document = document();
    let mut state = controller(&document);
    state
        .apply_geolocation_outcome(GeolocationOutcome::Denied)
        .expect("apply denied");

    let london = Coordinate::new(51.5074, -0.1278);
    state
        .apply_geolocation_outcome(GeolocationOutcome::Success(london))
        .expect("apply success");

    assert_eq!(state.screen(), Screen::Compass);
    assert!(is_active(&document, Screen::Compass));
    assert!(!is_active(&document, Screen::Start));
    assert_eq!(app_status(&document).as_deref(), Some("compass"));
    assert_eq!(text_of(&document, "compass-degrees"), "119°");
    assert_eq!(text_of(&document, "status"), "");
    assert_eq!(text_of(&document, "qibla-button"), "Find Qibla");
}
