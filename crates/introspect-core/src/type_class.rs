//! Traversal categories and the sets plugins use to declare what they handle.

use std::fmt;

use serde::Serialize;

/// Stable tag for the traversal category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    /// Ordered sequence of values, addressed by position.
    Sequence,
    /// Key-value mapping in insertion order.
    Mapping,
    /// Object-like record with named, visibility-tagged fields.
    Record,
    /// Opaque handle; never descended into.
    Resource,
}

impl TypeClass {
    pub const ALL: [TypeClass; 9] = [
        TypeClass::Null,
        TypeClass::Boolean,
        TypeClass::Integer,
        TypeClass::Float,
        TypeClass::String,
        TypeClass::Sequence,
        TypeClass::Mapping,
        TypeClass::Record,
        TypeClass::Resource,
    ];

    /// Composite classes have children and go through the recursion guard.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Sequence | Self::Mapping | Self::Record)
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Null | Self::Boolean | Self::Integer | Self::Float | Self::String
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Record => "record",
            Self::Resource => "resource",
        }
    }

    /// The single-bit set for this class.
    pub fn flag(self) -> TypeClasses {
        match self {
            Self::Null => TypeClasses::NULL,
            Self::Boolean => TypeClasses::BOOLEAN,
            Self::Integer => TypeClasses::INTEGER,
            Self::Float => TypeClasses::FLOAT,
            Self::String => TypeClasses::STRING,
            Self::Sequence => TypeClasses::SEQUENCE,
            Self::Mapping => TypeClasses::MAPPING,
            Self::Record => TypeClasses::RECORD,
            Self::Resource => TypeClasses::RESOURCE,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// Set of [`TypeClass`]es a plugin applies to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TypeClasses: u16 {
        const NULL     = 1 << 0;
        const BOOLEAN  = 1 << 1;
        const INTEGER  = 1 << 2;
        const FLOAT    = 1 << 3;
        const STRING   = 1 << 4;
        const SEQUENCE = 1 << 5;
        const MAPPING  = 1 << 6;
        const RECORD   = 1 << 7;
        const RESOURCE = 1 << 8;

        const SCALARS = Self::NULL.bits()
            | Self::BOOLEAN.bits()
            | Self::INTEGER.bits()
            | Self::FLOAT.bits()
            | Self::STRING.bits();
        const COMPOSITES = Self::SEQUENCE.bits() | Self::MAPPING.bits() | Self::RECORD.bits();
    }
}

impl TypeClasses {
    pub fn includes(self, class: TypeClass) -> bool {
        self.contains(class.flag())
    }
}

impl From<TypeClass> for TypeClasses {
    fn from(class: TypeClass) -> Self {
        class.flag()
    }
}

impl FromIterator<TypeClass> for TypeClasses {
    fn from_iter<I: IntoIterator<Item = TypeClass>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TypeClasses::empty(), |set, class| set | class.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_and_scalar_partition_excludes_resource() {
        let composites: Vec<_> = TypeClass::ALL
            .into_iter()
            .filter(|class| class.is_composite())
            .collect();
        assert_eq!(
            composites,
            vec![TypeClass::Sequence, TypeClass::Mapping, TypeClass::Record]
        );
        assert!(!TypeClass::Resource.is_composite());
        assert!(!TypeClass::Resource.is_scalar());
    }

    #[test]
    fn sets_match_their_members_only() {
        let set: TypeClasses = [TypeClass::String, TypeClass::Record].into_iter().collect();
        assert!(set.includes(TypeClass::String));
        assert!(set.includes(TypeClass::Record));
        assert!(!set.includes(TypeClass::Mapping));

        for class in TypeClass::ALL {
            assert!(TypeClasses::all().includes(class), "{class}");
            assert_eq!(TypeClasses::COMPOSITES.includes(class), class.is_composite());
            assert_eq!(TypeClasses::SCALARS.includes(class), class.is_scalar());
        }
    }
}
