use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no global `{0}` available")]
    MissingGlobal(&'static str),
    #[error("no element matches `{0}`")]
    MissingElement(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("unexpected http status {0}")]
    HttpStatus(u16),
    #[error("failed to decode json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to convert javascript value: {0}")]
    Convert(#[from] serde_wasm_bindgen::Error),
    #[error("invalid page config: {0}")]
    Config(serde_json::Error),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
