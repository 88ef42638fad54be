/// Errors that can occur crossing the Value/JSON bridge.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// The text is not valid JSON.
    #[error("JSON syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The JSON shape has no BlazorPack mapping.
    #[error("JSON shape mismatch: {detail}")]
    SchemaMismatch { detail: String },
}

pub type Result<T> = std::result::Result<T, JsonError>;
