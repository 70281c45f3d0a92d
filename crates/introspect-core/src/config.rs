use bon::Builder;
use serde::Deserialize;

use crate::error::ConfigError;

/// Depth limit used when the caller does not pick one.
pub const DEFAULT_DEPTH_LIMIT: i64 = 7;

/// Parser settings.
///
/// Hosts typically deserialize this from their own configuration; it is
/// validated when the [`Parser`](crate::Parser) is constructed.
///
/// ```
/// use introspect_core::ParserConfig;
///
/// let config = ParserConfig::builder().depth_limit(3).caller_class("Account").build();
/// assert_eq!(config.max_depth(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum node depth; composites at this depth are not descended into.
    /// `0` means unlimited.
    #[builder(default = DEFAULT_DEPTH_LIMIT)]
    pub depth_limit: i64,
    /// Class the dump is taken from. Decides which non-public record fields
    /// get an access path.
    #[builder(into)]
    pub caller_class: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            caller_class: None,
        }
    }
}

impl ParserConfig {
    /// No depth limit and an anonymous caller.
    pub fn unlimited() -> Self {
        Self {
            depth_limit: 0,
            caller_class: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth_limit < 0 {
            return Err(ConfigError::NegativeDepthLimit(self.depth_limit));
        }
        if self.caller_class.as_deref() == Some("") {
            return Err(ConfigError::EmptyCallerClass);
        }
        Ok(())
    }

    /// The depth limit as a node depth, `None` when unlimited or invalid.
    pub fn max_depth(&self) -> Option<usize> {
        match usize::try_from(self.depth_limit) {
            Ok(0) | Err(_) => None,
            Ok(depth) => Some(depth),
        }
    }
}
