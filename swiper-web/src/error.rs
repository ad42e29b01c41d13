use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised while mounting a slider on a DOM element.
#[derive(Debug, Error)]
pub enum MountError {
    /// No global `window`, e.g. inside a worker.
    #[error("no global window is available")]
    NoWindow,
    /// The window has no document.
    #[error("the window has no document")]
    NoDocument,
    /// The viewport has no element child to use as the strip.
    #[error("the viewport has no strip element as its first child")]
    MissingStrip,
    /// A DOM call failed.
    #[error("DOM call failed: {0}")]
    Js(String),
}

impl From<JsValue> for MountError {
    fn from(value: JsValue) -> Self {
        MountError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
