//! Domain-level error taxonomy for agentc.

/// Errors produced when a spec or an invocation's arguments are rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: String },

    #[error("duplicate field '{field}' in {schema}")]
    DuplicateField { schema: String, field: String },

    #[error("duplicate tool id '{id}'")]
    DuplicateTool { id: String },

    #[error("unknown field type '{value}' (expected string, number, boolean, array or object)")]
    InvalidFieldType { value: String },

    #[error("missing required parameter: {field}")]
    MissingParameter { field: String },

    #[error("invalid number for '{field}': {value:?}")]
    InvalidNumber { field: String, value: String },
}

/// Errors produced when a valid spec still cannot be rendered safely.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("system prompt contains a carriage return, which a raw literal cannot preserve")]
    CarriageReturnInPrompt,

    #[error("system prompt needs a {hashes}-hash fence (limit 255)")]
    FenceTooLong { hashes: usize },

    #[error("{field} contains a control character that has no literal form")]
    ControlCharacter { field: String },
}

/// agentc domain errors.
#[derive(Debug, thiserror::Error)]
pub enum AgentcError {
    #[error("invalid agent spec: {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot generate artifact: {0}")]
    Generation(#[from] GenerationError),

    #[error("slug '{slug}' already belongs to agent '{existing}' (requested '{requested}')")]
    SlugCollision {
        slug: String,
        existing: String,
        requested: String,
    },

    #[error("agent already registered: {0}")]
    DuplicateAgent(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for agentc domain operations.
pub type Result<T> = std::result::Result<T, AgentcError>;
