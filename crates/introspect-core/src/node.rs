//! The description tree produced by the parser.
//!
//! A [`DescriptionNode`] is assembled by the engine and by plugins during the
//! node's own traversal, then handed back read-only. Plugins only see a node
//! through [`NodeMut`], which allows appends and nothing else.

use std::ops::Deref;

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};

use crate::error::NodeError;
use crate::path::AccessPath;
use crate::representation::{CONTENTS, Contents, Representation};
use crate::type_class::TypeClass;
use crate::value::{Value, Visibility};

/// How traversal of a node ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalState {
    /// Traversed normally (or the value has nothing to descend into).
    Complete,
    /// A plugin halted at BEGIN; the engine's default traversal was skipped.
    Halted,
    /// The composite was already open on the current traversal path.
    RecursionLimited,
    /// The composite sits at the configured maximum depth.
    DepthLimited,
}

/// Caller-known metadata for a value about to be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseNode {
    pub name: String,
    pub depth: usize,
    pub access_path: Option<AccessPath>,
    pub visibility: Option<Visibility>,
}

impl BaseNode {
    /// Depth 0 and no access path.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Depth 0 with the name doubling as the root access expression.
    pub fn root(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            access_path: Some(AccessPath::new(name.clone())),
            name,
            ..Self::default()
        }
    }

    pub fn with_access_path(mut self, path: impl Into<AccessPath>) -> Self {
        self.access_path = Some(path.into());
        self
    }

    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub(crate) fn child_of(
        parent: &DescriptionNode,
        name: String,
        access_path: Option<AccessPath>,
    ) -> Self {
        Self {
            name,
            depth: parent.depth + 1,
            access_path,
            visibility: None,
        }
    }
}

/// Immutable description of one inspected value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionNode {
    name: String,
    depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_path: Option<AccessPath>,
    type_class: TypeClass,
    type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    state: TraversalState,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    hints: IndexSet<String>,
    #[serde(serialize_with = "serialize_representations")]
    representations: IndexMap<String, Representation>,
}

impl DescriptionNode {
    pub(crate) fn from_base(base: BaseNode, value: &Value) -> Self {
        Self {
            name: base.name,
            depth: base.depth,
            access_path: base.access_path,
            type_class: value.type_class(),
            type_name: value.type_name(),
            visibility: base.visibility,
            size: value.size(),
            state: TraversalState::Complete,
            hints: IndexSet::new(),
            representations: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn access_path(&self) -> Option<&AccessPath> {
        self.access_path.as_ref()
    }

    pub fn type_class(&self) -> TypeClass {
        self.type_class
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Only set for record fields.
    pub fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    pub fn is_recursion_limited(&self) -> bool {
        self.state == TraversalState::RecursionLimited
    }

    pub fn is_depth_limited(&self) -> bool {
        self.state == TraversalState::DepthLimited
    }

    pub fn is_halted(&self) -> bool {
        self.state == TraversalState::Halted
    }

    pub fn hints(&self) -> impl Iterator<Item = &str> {
        self.hints.iter().map(String::as_str)
    }

    pub fn has_hint(&self, hint: &str) -> bool {
        self.hints.contains(hint)
    }

    /// Representations in attachment order.
    pub fn representations(&self) -> impl Iterator<Item = &Representation> {
        self.representations.values()
    }

    pub fn representation(&self, label: &str) -> Option<&Representation> {
        self.representations.get(label)
    }

    /// The default representation attached by the engine.
    pub fn contents(&self) -> Option<&Contents> {
        self.representation(CONTENTS).map(Representation::contents)
    }

    /// Children from the default representation; empty for scalars and for
    /// limited or halted composites.
    pub fn children(&self) -> &[DescriptionNode] {
        self.contents().and_then(Contents::as_nodes).unwrap_or(&[])
    }

    pub fn child(&self, name: &str) -> Option<&DescriptionNode> {
        self.children().iter().find(|child| child.name == name)
    }

    /// Display text of a scalar's default representation.
    pub fn display_value(&self) -> Option<&str> {
        self.contents().and_then(Contents::as_text)
    }

    /// Visits this node and every node nested in any of its representations,
    /// parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DescriptionNode)) {
        visit(self);
        for representation in self.representations.values() {
            for node in representation.contents().nodes() {
                node.walk(visit);
            }
        }
    }

    pub(crate) fn set_state(&mut self, state: TraversalState) {
        self.state = state;
    }

    /// Attaches the engine's default representation. Callers check that no
    /// plugin supplied one first.
    pub(crate) fn set_contents(&mut self, contents: Contents) {
        self.representations
            .insert(CONTENTS.to_string(), Representation::new(CONTENTS, contents));
    }

    pub(crate) fn attach(&mut self, representation: Representation) -> Result<(), NodeError> {
        if self.representations.contains_key(representation.label()) {
            return Err(NodeError::DuplicateRepresentation {
                label: representation.label().to_string(),
                node: self.name.clone(),
            });
        }
        self.representations
            .insert(representation.label().to_string(), representation);
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            representations: self.representations.len(),
            hints: self.hints.len(),
        }
    }

    /// Drops every append made after `checkpoint`.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.representations.truncate(checkpoint.representations);
        self.hints.truncate(checkpoint.hints);
    }
}

fn serialize_representations<S: Serializer>(
    representations: &IndexMap<String, Representation>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(representations.values())
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    representations: usize,
    hints: usize,
}

/// Append-only view of a node under construction, handed to plugins.
#[derive(Debug)]
pub struct NodeMut<'a> {
    node: &'a mut DescriptionNode,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(node: &'a mut DescriptionNode) -> Self {
        Self { node }
    }

    /// Attaches a representation; labels already present are refused.
    pub fn add_representation(&mut self, representation: Representation) -> Result<(), NodeError> {
        self.node.attach(representation)
    }

    /// Adds a hint tag. Returns `false` if the tag was already present.
    pub fn add_hint(&mut self, hint: impl Into<String>) -> bool {
        self.node.hints.insert(hint.into())
    }
}

impl Deref for NodeMut<'_> {
    type Target = DescriptionNode;

    fn deref(&self) -> &DescriptionNode {
        self.node
    }
}
