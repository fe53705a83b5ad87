//! Helpers for values crossing the JS boundary, shared by the page and the
//! worker.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = r#"
export function js_string(value) {
  return String(value);
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn js_string(value: &JsValue) -> Result<String, JsValue>;
}

/// Text for a thrown JS value, exactly as `String(value)` prints it
/// (`"TypeError: ..."`, `"[object Object]"`, `"undefined"`).
pub fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_string(value).unwrap_or_else(|_| "unprintable value".to_string())
}
