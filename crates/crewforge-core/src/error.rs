use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("epic {number} is out of range (epic count is {count})")]
    EpicOutOfRange { number: u32, count: u32 },

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("invalid agent id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidAgentId(String),

    #[error("duplicate {field} entry: {value}")]
    DuplicateEntry { field: &'static str, value: String },

    #[error("{field} entries must be non-empty")]
    EmptyEntry { field: &'static str },

    #[error("unknown tool '{0}': not in the tool catalog")]
    UnknownTool(String),

    #[error("configuration has {0} validation error(s); export blocked")]
    ExportBlocked(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
