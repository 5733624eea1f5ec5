use crate::buffer::RenderOptions;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn generate_python(program_json: &str) -> Result<String, JsValue> {
    generate_python_with_options(program_json, true)
}

#[wasm_bindgen]
pub fn generate_python_with_options(program_json: &str, header: bool) -> Result<String, JsValue> {
    crate::generate_program_source(program_json, RenderOptions { header })
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
