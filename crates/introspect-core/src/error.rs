//! Error types for configuration, node construction and plugin dispatch.
//!
//! Nothing here is ever propagated out of [`Parser::parse`](crate::Parser::parse):
//! configuration errors are raised by [`Parser::new`](crate::Parser::new) before
//! any traversal starts, and plugin errors are caught at the dispatch boundary
//! and turned into [`PluginDiagnostic`](crate::PluginDiagnostic)s.

/// Invalid [`ParserConfig`](crate::ParserConfig), rejected before traversal begins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The depth limit was negative. `0` means unlimited.
    #[error("depth limit must be zero (unlimited) or positive, got {0}")]
    NegativeDepthLimit(i64),

    /// A caller class was configured but is the empty string.
    #[error("caller class must not be empty; use `None` for an anonymous caller")]
    EmptyCallerClass,
}

/// A node append was rejected during the node's construction window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// Representation labels are unique per node; attached representations
    /// are never replaced.
    #[error("representation `{label}` is already attached to node `{node}`")]
    DuplicateRepresentation { label: String, node: String },
}

/// Failure raised by a [`Plugin`](crate::Plugin) trigger handler.
///
/// Plugin authors can return their own errors through `anyhow`; the engine
/// never inspects the cause beyond logging it.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin tried an append the node refused.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// The plugin gave up on this value with a message.
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PluginError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
