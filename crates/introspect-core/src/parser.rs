//! The traversal engine.
//!
//! [`Parser::parse`] walks a [`Value`] depth-first and builds a
//! [`DescriptionNode`] tree. For every node it:
//!
//! 1. dispatches BEGIN to the applicable plugins,
//! 2. for composites, stops at the depth limit or at a back-edge to an open
//!    ancestor and dispatches DEPTH_LIMIT / RECURSION_LIMIT,
//! 3. otherwise attaches the default `contents` representation (children for
//!    composites, display text for scalars) unless a plugin halted or already
//!    supplied one, and dispatches SUCCESS.
//!
//! Plugin failures never escape a parse. They are rolled back, logged and
//! reported as [`PluginDiagnostic`]s.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::ParserConfig;
use crate::error::ConfigError;
use crate::guard::{AlreadyEntered, RecursionGuard};
use crate::node::{BaseNode, DescriptionNode, NodeMut, TraversalState};
use crate::path::AccessPath;
use crate::registry::PluginRegistry;
use crate::representation::{CONTENTS, Contents};
use crate::trigger::Trigger;
use crate::value::{Record, Value, Visibility};

/// Whether a plugin returned an error or panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Error,
    Panic,
}

/// A plugin failure that was isolated during a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDiagnostic {
    pub plugin: String,
    pub trigger: Trigger,
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_path: Option<AccessPath>,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for PluginDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            FailureKind::Error => "failed",
            FailureKind::Panic => "panicked",
        };
        write!(
            f,
            "plugin `{}` {verb} on {} of `{}`: {}",
            self.plugin, self.trigger, self.node, self.message
        )
    }
}

/// Result of [`Parser::parse_with_diagnostics`].
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub node: DescriptionNode,
    pub diagnostics: Vec<PluginDiagnostic>,
}

/// Describes values using a fixed configuration and plugin set.
///
/// A parser holds no per-parse state, so one instance can serve any number
/// of sequential parses.
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
    registry: PluginRegistry,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            config: ParserConfig::default(),
            registry: PluginRegistry::new(),
        }
    }
}

impl Parser {
    pub fn new(config: ParserConfig, registry: PluginRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Describes `value`. Never fails: plugin failures are logged and
    /// skipped.
    pub fn parse(&self, value: &Value, base: BaseNode) -> DescriptionNode {
        self.parse_with_diagnostics(value, base).node
    }

    /// Like [`Parser::parse`], also returning the isolated plugin failures.
    #[tracing::instrument(
        name = "introspect.parse",
        level = "debug",
        skip(self, value, base),
        fields(name = %base.name, depth = base.depth)
    )]
    pub fn parse_with_diagnostics(&self, value: &Value, base: BaseNode) -> ParseOutcome {
        let mut traversal = Traversal::new(self);
        let node = traversal.parse_node(value, base);
        debug!(
            state = ?node.state(),
            diagnostics = traversal.diagnostics.len(),
            "parse finished"
        );
        ParseOutcome {
            node,
            diagnostics: traversal.diagnostics,
        }
    }
}

/// Per-parse context handed to plugins.
///
/// Owns the recursion guard and the halt flag of the current trigger round.
/// A plugin that parses a sub-value through [`Traversal::parse`] shares the
/// guard, so a decoded value that leads back into an open composite is still
/// cut off.
pub struct Traversal<'p> {
    parser: &'p Parser,
    guard: RecursionGuard,
    halted: bool,
    diagnostics: Vec<PluginDiagnostic>,
}

impl<'p> Traversal<'p> {
    fn new(parser: &'p Parser) -> Self {
        Self {
            parser,
            guard: RecursionGuard::new(),
            halted: false,
            diagnostics: Vec::new(),
        }
    }

    /// Stops the current trigger round after this plugin returns. At BEGIN
    /// this also skips the engine's default traversal of the node.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn config(&self) -> &'p ParserConfig {
        &self.parser.config
    }

    /// Failures isolated so far in this parse.
    pub fn diagnostics(&self) -> &[PluginDiagnostic] {
        &self.diagnostics
    }

    /// Describes a sub-value with the same configuration and plugins. The
    /// caller's halt state is left as it was.
    pub fn parse(&mut self, value: &Value, base: BaseNode) -> DescriptionNode {
        let halted = std::mem::replace(&mut self.halted, false);
        let node = self.parse_node(value, base);
        self.halted = halted;
        node
    }

    fn parse_node(&mut self, value: &Value, base: BaseNode) -> DescriptionNode {
        let mut node = DescriptionNode::from_base(base, value);

        if self.dispatch(Trigger::Begin, value, &mut node) {
            node.set_state(TraversalState::Halted);
            trace!(name = node.name(), "default traversal skipped after halt");
            self.dispatch(Trigger::Success, value, &mut node);
            return node;
        }

        let Some(identity) = value.identity() else {
            if !self.contents_supplied(&node) {
                node.set_contents(Contents::Text(display_text(value)));
            }
            self.dispatch(Trigger::Success, value, &mut node);
            return node;
        };

        if self.at_depth_limit(node.depth()) {
            debug!(name = node.name(), depth = node.depth(), "depth limit reached");
            node.set_state(TraversalState::DepthLimited);
            self.dispatch(Trigger::DepthLimit, value, &mut node);
            return node;
        }

        let token = match self.guard.enter(identity) {
            Ok(token) => token,
            Err(AlreadyEntered(_)) => {
                debug!(name = node.name(), depth = node.depth(), "recursion detected");
                node.set_state(TraversalState::RecursionLimited);
                self.dispatch(Trigger::RecursionLimit, value, &mut node);
                return node;
            }
        };
        if !self.contents_supplied(&node) {
            let children = self.parse_children(value, &node);
            node.set_contents(Contents::Nodes(children));
        }
        token.exit();

        self.dispatch(Trigger::Success, value, &mut node);
        node
    }

    /// A BEGIN plugin that attached `contents` replaces the default walk of
    /// the node, but not the depth and recursion checks before it.
    fn contents_supplied(&self, node: &DescriptionNode) -> bool {
        let supplied = node.representation(CONTENTS).is_some();
        if supplied {
            trace!(name = node.name(), "contents supplied by plugin");
        }
        supplied
    }

    fn parse_children(&mut self, value: &Value, parent: &DescriptionNode) -> Vec<DescriptionNode> {
        let path = parent.access_path();
        match value {
            Value::Seq(items) => {
                let items = items.borrow();
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let base = BaseNode::child_of(
                            parent,
                            index.to_string(),
                            path.map(|path| path.push_index(index)),
                        );
                        self.parse_node(item, base)
                    })
                    .collect()
            }
            Value::Map(entries) => {
                let entries = entries.borrow();
                entries
                    .iter()
                    .map(|(key, item)| {
                        let base = BaseNode::child_of(
                            parent,
                            key.to_string(),
                            path.map(|path| path.push_key(key)),
                        );
                        self.parse_node(item, base)
                    })
                    .collect()
            }
            Value::Record(record) => {
                let record = record.borrow();
                let mut children = Vec::with_capacity(record.fields.len());
                for field in &record.fields {
                    let path = path
                        .filter(|_| self.field_reachable(&record, field.visibility))
                        .map(|path| path.push_field(&field.name));
                    let base = BaseNode::child_of(parent, field.name.clone(), path)
                        .with_visibility(field.visibility);
                    children.push(self.parse_node(&field.value, base));
                }
                children
            }
            _ => Vec::new(),
        }
    }

    fn at_depth_limit(&self, depth: usize) -> bool {
        self.parser
            .config
            .max_depth()
            .is_some_and(|max_depth| depth >= max_depth)
    }

    fn field_reachable(&self, record: &Record, visibility: Visibility) -> bool {
        let caller = self.parser.config.caller_class.as_deref();
        match visibility {
            Visibility::Public | Visibility::Virtual => true,
            Visibility::Private => caller == Some(record.class.as_str()),
            Visibility::Protected => caller.is_some_and(|caller| record.is_a(caller)),
        }
    }

    /// Runs one trigger round over the applicable plugins and reports whether
    /// one of them halted it.
    fn dispatch(&mut self, trigger: Trigger, value: &Value, node: &mut DescriptionNode) -> bool {
        let parser = self.parser;
        self.halted = false;

        for plugin in parser.registry.plugins_for(node.type_class(), trigger) {
            let checkpoint = node.checkpoint();
            let outcome = {
                let _quiet = QuietPanics::enter();
                panic::catch_unwind(AssertUnwindSafe(|| {
                    plugin.on_trigger(value, &mut NodeMut::new(node), trigger, self)
                }))
            };

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some((FailureKind::Error, error.to_string())),
                Err(payload) => Some((FailureKind::Panic, panic_message(payload.as_ref()))),
            };

            if let Some((kind, message)) = failure {
                node.rollback(checkpoint);
                self.halted = false;
                let diagnostic = PluginDiagnostic {
                    plugin: plugin.name().to_string(),
                    trigger,
                    node: node.name().to_string(),
                    access_path: node.access_path().cloned(),
                    kind,
                    message,
                };
                warn!(
                    plugin = %diagnostic.plugin,
                    trigger = %trigger,
                    node = %diagnostic.node,
                    kind = ?kind,
                    "{}",
                    diagnostic.message
                );
                self.diagnostics.push(diagnostic);
                continue;
            }

            if self.halted {
                trace!(plugin = plugin.name(), %trigger, name = node.name(), "halted");
                break;
            }
        }

        std::mem::take(&mut self.halted)
    }
}

impl fmt::Debug for Traversal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traversal")
            .field("open", &self.guard.open_count())
            .field("halted", &self.halted)
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

/// A fresh top-level container holding the same direct entries as `value`,
/// for plugins that want to look at or reorder a composite's contents
/// without touching the original. Scalars are returned as-is.
///
/// The copy has its own identity, so parsing it is never mistaken for
/// re-entering `value`.
pub fn clean_child_access(value: &Value) -> Value {
    value.shallow_copy()
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Int(number) => number.to_string(),
        Value::Float(number) => format!("{number:?}"),
        Value::Str(text) => text.clone(),
        Value::Resource(resource) => resource.to_string(),
        Value::Seq(_) | Value::Map(_) | Value::Record(_) => value.type_name(),
    }
}

thread_local! {
    static QUIET_DEPTH: Cell<usize> = const { Cell::new(0) };
}

static QUIET_HOOK: Once = Once::new();

/// Keeps the panic hook silent on this thread while a plugin runs; the panic
/// is reported as a [`PluginDiagnostic`] instead. Panics elsewhere still reach
/// the hook that was installed before the first dispatch.
struct QuietPanics;

impl QuietPanics {
    fn enter() -> Self {
        QUIET_HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if !Self::active() {
                    previous(info);
                }
            }));
        });
        QUIET_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }

    fn active() -> bool {
        QUIET_DEPTH.with(|depth| depth.get() > 0)
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        QUIET_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "plugin panicked".to_string()
    }
}
