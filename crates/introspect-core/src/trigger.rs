//! Points in a node's traversal lifecycle at which plugins are dispatched.

use std::fmt;

use serde::Serialize;

/// The trigger that fired for a single dispatch round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Before the engine's own traversal of the value.
    Begin,
    /// After a traversal that was not curtailed by a limit.
    Success,
    /// The composite is already open further up the current traversal.
    RecursionLimit,
    /// The composite sits at the configured maximum depth.
    DepthLimit,
}

impl Trigger {
    pub fn flag(self) -> Triggers {
        match self {
            Self::Begin => Triggers::BEGIN,
            Self::Success => Triggers::SUCCESS,
            Self::RecursionLimit => Triggers::RECURSION_LIMIT,
            Self::DepthLimit => Triggers::DEPTH_LIMIT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Success => "success",
            Self::RecursionLimit => "recursion_limit",
            Self::DepthLimit => "depth_limit",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// Trigger mask declared by a plugin.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Triggers: u8 {
        const BEGIN           = 0b0001;
        const SUCCESS         = 0b0010;
        const RECURSION_LIMIT = 0b0100;
        const DEPTH_LIMIT     = 0b1000;

        /// Every way a node can finish.
        const COMPLETE = Self::SUCCESS.bits()
            | Self::RECURSION_LIMIT.bits()
            | Self::DEPTH_LIMIT.bits();
    }
}

impl Triggers {
    pub fn fires_on(self, trigger: Trigger) -> bool {
        self.contains(trigger.flag())
    }
}

impl From<Trigger> for Triggers {
    fn from(trigger: Trigger) -> Self {
        trigger.flag()
    }
}
