//! In-process variable introspection.
//!
//! `introspect-core` turns a runtime [`Value`] (possibly self-referential)
//! into a tree of [`DescriptionNode`]s: type, depth, access path, visibility
//! and labeled [`Representation`]s that a renderer can consume without
//! looking at the value again.
//!
//! The [`Parser`] walks the value depth-first, cuts cycles with a
//! side-table [`RecursionGuard`], stops at the configured depth and lets
//! registered [`Plugin`]s hook into each node at BEGIN, SUCCESS,
//! RECURSION_LIMIT and DEPTH_LIMIT.
//!
//! # Example
//!
//! ```
//! use introspect_core::{BaseNode, Parser, ParserConfig, PluginRegistry, Record, Value};
//! use introspect_core::plugins::TablePlugin;
//!
//! let user = Value::record(
//!     Record::new("User")
//!         .with_public("name", "ada")
//!         .with_public("roles", Value::seq(["admin", "ops"])),
//! );
//!
//! let registry = PluginRegistry::new().with(TablePlugin);
//! let parser = Parser::new(ParserConfig::default(), registry)?;
//! let node = parser.parse(&user, BaseNode::root("user"));
//!
//! let roles = node.child("roles").unwrap();
//! assert_eq!(roles.access_path().unwrap().as_str(), "user.roles");
//! assert_eq!(roles.children()[1].display_value(), Some("ops"));
//! # Ok::<(), introspect_core::ConfigError>(())
//! ```

extern crate self as introspect_core;

pub mod config;
pub mod error;
pub mod guard;
pub mod node;
pub mod parser;
pub mod path;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod representation;
pub mod telemetry;
pub mod to_value;
pub mod trigger;
pub mod type_class;
pub mod value;

pub use config::{DEFAULT_DEPTH_LIMIT, ParserConfig};
pub use error::{ConfigError, NodeError, PluginError};
pub use guard::{AlreadyEntered, GuardToken, RecursionGuard};
pub use node::{BaseNode, DescriptionNode, NodeMut, TraversalState};
pub use parser::{
    FailureKind, ParseOutcome, Parser, PluginDiagnostic, Traversal, clean_child_access,
};
pub use path::AccessPath;
pub use plugin::Plugin;
pub use registry::PluginRegistry;
pub use representation::{CONTENTS, Contents, Representation};
pub use telemetry::init_tracing;
pub use to_value::ToValue;
pub use trigger::{Trigger, Triggers};
pub use type_class::{TypeClass, TypeClasses};
pub use value::{Field, Identity, MapKey, Record, Resource, Shared, Value, Visibility};

#[cfg(feature = "derive")]
pub use introspect_derive::Inspect;
