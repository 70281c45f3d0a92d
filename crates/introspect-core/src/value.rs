//! Dynamic values inspected by the engine.
//!
//! Composites are reference-counted cells so that the same container can be
//! reached through several paths, including paths that lead back to itself.
//! The engine only ever takes shared borrows of these cells; it never writes
//! to a value it inspects.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::type_class::TypeClass;

/// Shared, interior-mutable composite storage.
pub type Shared<T> = Rc<RefCell<T>>;

/// Pointer identity of a composite value.
///
/// Two values share an identity exactly when they are the same container,
/// regardless of their contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    fn of<T>(cell: &Shared<T>) -> Self {
        Self(Rc::as_ptr(cell).cast::<()>() as usize)
    }
}

/// Visibility of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    /// Computed or synthesized field with no storage of its own.
    Virtual,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Virtual => "virtual",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a [`Value::Map`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(key) => write!(f, "{key}"),
            Self::Str(key) => f.write_str(key),
        }
    }
}

impl From<i64> for MapKey {
    fn from(key: i64) -> Self {
        Self::Int(key)
    }
}

impl From<i32> for MapKey {
    fn from(key: i32) -> Self {
        Self::Int(i64::from(key))
    }
}

impl From<&str> for MapKey {
    fn from(key: &str) -> Self {
        Self::Str(key.to_string())
    }
}

impl From<String> for MapKey {
    fn from(key: String) -> Self {
        Self::Str(key)
    }
}

/// A named field of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub visibility: Visibility,
    pub value: Value,
}

/// Object-like value with an ordered list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Class name shown as the node's type name.
    pub class: String,
    /// Ancestor classes, nearest first. Used for protected-field reachability.
    pub parents: Vec<String>,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            parents: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        visibility: Visibility,
        value: impl Into<Value>,
    ) -> Self {
        self.push_field(name, visibility, value);
        self
    }

    /// Shorthand for a public field.
    pub fn with_public(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_field(name, Visibility::Public, value)
    }

    pub fn push_field(
        &mut self,
        name: impl Into<String>,
        visibility: Visibility,
        value: impl Into<Value>,
    ) {
        self.fields.push(Field {
            name: name.into(),
            visibility,
            value: value.into(),
        });
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether `class` is this record's class or one of its ancestors.
    pub fn is_a(&self, class: &str) -> bool {
        self.class == class || self.parents.iter().any(|parent| parent == class)
    }
}

/// Opaque handle such as a file descriptor or socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    pub kind: String,
    pub id: u64,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} resource #{}", self.kind, self.id)
    }
}

/// A runtime value of arbitrary shape.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Shared<Vec<Value>>),
    Map(Shared<IndexMap<MapKey, Value>>),
    Record(Shared<Record>),
    Resource(Resource),
}

impl Value {
    pub fn seq<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Seq(Rc::new(RefCell::new(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<MapKey>,
        V: Into<Value>,
    {
        Self::Map(Rc::new(RefCell::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )))
    }

    pub fn record(record: Record) -> Self {
        Self::Record(Rc::new(RefCell::new(record)))
    }

    pub fn resource(kind: impl Into<String>, id: u64) -> Self {
        Self::Resource(Resource {
            kind: kind.into(),
            id,
        })
    }

    pub fn type_class(&self) -> TypeClass {
        match self {
            Self::Null => TypeClass::Null,
            Self::Bool(_) => TypeClass::Boolean,
            Self::Int(_) => TypeClass::Integer,
            Self::Float(_) => TypeClass::Float,
            Self::Str(_) => TypeClass::String,
            Self::Seq(_) => TypeClass::Sequence,
            Self::Map(_) => TypeClass::Mapping,
            Self::Record(_) => TypeClass::Record,
            Self::Resource(_) => TypeClass::Resource,
        }
    }

    /// Display name of the value's type; records report their class.
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Int(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Str(_) => "string".to_string(),
            Self::Seq(_) => "sequence".to_string(),
            Self::Map(_) => "map".to_string(),
            Self::Record(record) => record.borrow().class.clone(),
            Self::Resource(_) => "resource".to_string(),
        }
    }

    /// Identity of the container for composites, `None` for everything else.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Seq(items) => Some(Identity::of(items)),
            Self::Map(entries) => Some(Identity::of(entries)),
            Self::Record(record) => Some(Identity::of(record)),
            _ => None,
        }
    }

    /// Element count for composites, character count for strings.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Str(text) => Some(text.chars().count()),
            Self::Seq(items) => Some(items.borrow().len()),
            Self::Map(entries) => Some(entries.borrow().len()),
            Self::Record(record) => Some(record.borrow().fields.len()),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.type_class().is_composite()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Shared<IndexMap<MapKey, Value>>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Shared<Record>> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Copies the outer container only; nested composites stay shared with
    /// the original.
    pub fn shallow_copy(&self) -> Value {
        match self {
            Self::Seq(items) => Self::Seq(Rc::new(RefCell::new(items.borrow().clone()))),
            Self::Map(entries) => Self::Map(Rc::new(RefCell::new(entries.borrow().clone()))),
            Self::Record(record) => Self::Record(Rc::new(RefCell::new(record.borrow().clone()))),
            other => other.clone(),
        }
    }

    /// Copies the whole graph, preserving shared and cyclic structure.
    pub fn deep_copy(&self) -> Value {
        self.deep_copy_with(&mut HashMap::new())
    }

    fn deep_copy_with(&self, copies: &mut HashMap<Identity, Value>) -> Value {
        let Some(identity) = self.identity() else {
            return self.clone();
        };
        if let Some(copy) = copies.get(&identity) {
            return copy.clone();
        }

        match self {
            Self::Seq(items) => {
                let target = Rc::new(RefCell::new(Vec::new()));
                copies.insert(identity, Self::Seq(target.clone()));
                let copied: Vec<Value> = items
                    .borrow()
                    .iter()
                    .map(|item| item.deep_copy_with(copies))
                    .collect();
                *target.borrow_mut() = copied;
                Self::Seq(target)
            }
            Self::Map(entries) => {
                let target = Rc::new(RefCell::new(IndexMap::new()));
                copies.insert(identity, Self::Map(target.clone()));
                let copied: IndexMap<MapKey, Value> = entries
                    .borrow()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.deep_copy_with(copies)))
                    .collect();
                *target.borrow_mut() = copied;
                Self::Map(target)
            }
            Self::Record(record) => {
                let source = record.borrow();
                let target = Rc::new(RefCell::new(Record {
                    class: source.class.clone(),
                    parents: source.parents.clone(),
                    fields: Vec::new(),
                }));
                copies.insert(identity, Self::Record(target.clone()));
                let fields: Vec<Field> = source
                    .fields
                    .iter()
                    .map(|field| Field {
                        name: field.name.clone(),
                        visibility: field.visibility,
                        value: field.value.deep_copy_with(copies),
                    })
                    .collect();
                target.borrow_mut().fields = fields;
                Self::Record(target)
            }
            _ => self.clone(),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality. A pair of containers already being compared
    /// further up is assumed equal, so cyclic graphs compare in finite time.
    fn eq(&self, other: &Self) -> bool {
        StructuralEq::default().values(self, other)
    }
}

#[derive(Default)]
struct StructuralEq {
    open: HashSet<(Identity, Identity)>,
}

impl StructuralEq {
    fn values(&mut self, left: &Value, right: &Value) -> bool {
        if let (Some(l), Some(r)) = (left.identity(), right.identity()) {
            if l == r {
                return true;
            }
            if !self.open.insert((l, r)) {
                return true;
            }
            let equal = self.composites(left, right);
            self.open.remove(&(l, r));
            return equal;
        }

        match (left, right) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Float(l), Value::Float(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Resource(l), Value::Resource(r)) => l == r,
            _ => false,
        }
    }

    fn composites(&mut self, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Seq(l), Value::Seq(r)) => {
                let (l, r) = (l.borrow(), r.borrow());
                l.len() == r.len() && l.iter().zip(r.iter()).all(|(a, b)| self.values(a, b))
            }
            (Value::Map(l), Value::Map(r)) => {
                let (l, r) = (l.borrow(), r.borrow());
                l.len() == r.len()
                    && l.iter()
                        .zip(r.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && self.values(va, vb))
            }
            (Value::Record(l), Value::Record(r)) => {
                let (l, r) = (l.borrow(), r.borrow());
                l.class == r.class
                    && l.parents == r.parents
                    && l.fields.len() == r.fields.len()
                    && l.fields.iter().zip(r.fields.iter()).all(|(a, b)| {
                        a.name == b.name
                            && a.visibility == b.visibility
                            && self.values(&a.value, &b.value)
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = RefCell::new(HashSet::new());
        DebugWalk {
            value: self,
            open: &open,
        }
        .fmt(f)
    }
}

/// Debug printer that writes `*RECURSION*` instead of re-entering a
/// container it is already printing.
struct DebugWalk<'a> {
    value: &'a Value,
    open: &'a RefCell<HashSet<Identity>>,
}

impl DebugWalk<'_> {
    fn child<'b>(&'b self, value: &'b Value) -> DebugWalk<'b> {
        DebugWalk {
            value,
            open: self.open,
        }
    }
}

impl fmt::Debug for DebugWalk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = match self.value {
            Value::Null => return f.write_str("Null"),
            Value::Bool(value) => return f.debug_tuple("Bool").field(value).finish(),
            Value::Int(value) => return f.debug_tuple("Int").field(value).finish(),
            Value::Float(value) => return f.debug_tuple("Float").field(value).finish(),
            Value::Str(value) => return f.debug_tuple("Str").field(value).finish(),
            Value::Resource(resource) => return f.debug_tuple("Resource").field(resource).finish(),
            Value::Seq(items) => Identity::of(items),
            Value::Map(entries) => Identity::of(entries),
            Value::Record(record) => Identity::of(record),
        };

        if !self.open.borrow_mut().insert(identity) {
            return f.write_str("*RECURSION*");
        }

        let result = match self.value {
            Value::Seq(items) => f
                .debug_list()
                .entries(items.borrow().iter().map(|item| self.child(item)))
                .finish(),
            Value::Map(entries) => f
                .debug_map()
                .entries(
                    entries
                        .borrow()
                        .iter()
                        .map(|(key, value)| (key, self.child(value))),
                )
                .finish(),
            Value::Record(record) => {
                let record = record.borrow();
                let mut out = f.debug_struct(&record.class);
                for field in &record.fields {
                    out.field(&field.name, &self.child(&field.value));
                }
                out.finish()
            }
            _ => Ok(()),
        };

        self.open.borrow_mut().remove(&identity);
        result
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::record(record)
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        Self::Resource(resource)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Seq(Rc::new(RefCell::new(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_referential() -> Value {
        let list = Value::seq([1, 2]);
        list.as_seq().unwrap().borrow_mut().push(list.clone());
        list
    }

    #[test]
    fn identity_follows_container_not_contents() {
        let a = Value::seq([1]);
        let b = Value::seq([1]);
        assert_eq!(a.identity(), a.clone().identity());
        assert_ne!(a.identity(), b.identity());
        assert_eq!(a, b);
        assert_eq!(Value::Int(1).identity(), None);
    }

    #[test]
    fn debug_marks_back_edges() {
        let list = self_referential();
        assert_eq!(format!("{list:?}"), "[Int(1), Int(2), *RECURSION*]");
    }

    #[test]
    fn debug_prints_records_with_class_name() {
        let value = Value::record(Record::new("Point").with_public("x", 1).with_public("y", 2));
        assert_eq!(format!("{value:?}"), "Point { x: Int(1), y: Int(2) }");
    }

    #[test]
    fn deep_copy_preserves_cycles_without_sharing() {
        let list = self_referential();
        let copy = list.deep_copy();

        assert_eq!(list, copy);
        assert_ne!(list.identity(), copy.identity());
        let inner = copy.as_seq().unwrap().borrow()[2].clone();
        assert_eq!(inner.identity(), copy.identity());
    }

    #[test]
    fn shallow_copy_keeps_nested_containers_shared() {
        let nested = Value::seq([1]);
        let outer = Value::map([("inner", nested.clone())]);
        let copy = outer.shallow_copy();

        assert_ne!(outer.identity(), copy.identity());
        let copied_inner = copy.as_map().unwrap().borrow()[&MapKey::from("inner")].clone();
        assert_eq!(copied_inner.identity(), nested.identity());

        copy.as_map()
            .unwrap()
            .borrow_mut()
            .insert(MapKey::from("extra"), Value::Null);
        assert_eq!(outer.size(), Some(1));
    }

    #[test]
    fn structural_eq_is_order_sensitive_for_maps() {
        let a = Value::map([("a", 1), ("b", 2)]);
        let b = Value::map([("b", 2), ("a", 1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn records_report_class_and_ancestry() {
        let record = Record::new("Child").with_parent("Base");
        assert!(record.is_a("Child"));
        assert!(record.is_a("Base"));
        assert!(!record.is_a("Other"));
        assert_eq!(Value::record(record).type_name(), "Child");
    }
}
