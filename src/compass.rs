use wasm_bindgen::JsValue;
use web_sys::{Element, HtmlElement};

pub fn rotation_transform(bearing: f64) -> String {
    format!("rotate({}deg)", bearing)
}

pub fn degree_label(bearing: f64) -> String {
    format!("{}°", bearing.round() as i64)
}

/// Point the compass needle at `bearing` and print it. Each call overwrites
/// the previous reading with no transition.
pub fn render_bearing(pointer: &HtmlElement, label: &Element, bearing: f64) -> Result<(), JsValue> {
    pointer
        .style()
        .set_property("transform", &rotation_transform(bearing))?;
    label.set_text_content(Some(&degree_label(bearing)));
    Ok(())
}
