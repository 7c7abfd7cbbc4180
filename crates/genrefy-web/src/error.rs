use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("failed to decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Dom(format!("{:?}", value))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
