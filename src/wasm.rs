use wasm_bindgen::prelude::*;

use crate::classify::{CLIENT_ABORT_MESSAGE, classify, find_client_abort};
use crate::failure::WrappedFailure;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js(value: &serde_json::Value) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

/// Classify a JSON-encoded wrapped failure (`{"message", "cause": {kind, message, next}}`).
#[wasm_bindgen]
pub fn classify_chain(json: &str) -> JsValue {
    let failure = match WrappedFailure::from_json(json) {
        Ok(f) => f,
        Err(e) => return error_result(&e.to_string()),
    };

    let matched = find_client_abort(&failure).map(|(index, _)| index);
    let result = serde_json::json!({
        "classification": classify(&failure).as_ref(),
        "matchedIndex": matched,
        "chainLength": failure.chain().count(),
    });
    to_js(&result)
}

/// The exact message treated as a client disconnect.
#[wasm_bindgen]
pub fn client_abort_message() -> String {
    CLIENT_ABORT_MESSAGE.to_string()
}

fn error_result(msg: &str) -> JsValue {
    let obj = serde_json::json!({"error": msg});
    to_js(&obj)
}
