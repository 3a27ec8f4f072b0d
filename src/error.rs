use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Everything the layout core can reject.
///
/// Configuration errors come from templates and node types, reference errors
/// from links and lookups. None of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("node missing type: `{node}`")]
    MissingType { node: String },

    #[error("unknown type `{kind}` on node `{node}`")]
    UnknownType { node: String, kind: String },

    #[error("invalid orientation `{value}` for port `{port}`")]
    InvalidOrientation { port: String, value: String },

    #[error("link endpoint not found: link `{link}` references node `{node}`")]
    EndpointNotFound { link: String, node: String },

    #[error("node `{node}` has no port `{port}`")]
    UnknownPort { node: String, port: String },

    #[error("parent `{parent}` of node `{node}` not found")]
    ParentNotFound { node: String, parent: String },

    #[error("containment cycle through node `{node}`")]
    ContainmentCycle { node: String },

    #[error("node not found: `{0}`")]
    NodeNotFound(String),

    #[error("link not found: `{0}`")]
    LinkNotFound(String),

    #[error("link `{0}` already registered")]
    DuplicateLink(String),

    #[error("no drag in progress for node `{0}`")]
    NotDragging(String),
}
