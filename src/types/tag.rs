//! Declared parameter types
//!
//! A `TypeTag` stands in for the annotation of a function parameter. The
//! resolver turns it into a converter, help text shows its formatted name and
//! static exports carry it verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared parameter type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeTag {
    Str,
    Int,
    Float,
    Bool,
    Path,

    /// The absence marker, only meaningful inside a union
    None,

    /// Alternatives, in declaration order
    Union(Vec<TypeTag>),

    /// A closed set of string literals
    Literal(Vec<String>),

    /// An enumerated symbol set, matched by key
    Enum { name: String, variants: Vec<String> },

    /// A repeatable container of one element type
    List(Box<TypeTag>),

    /// A named wrapper around another type
    Alias { name: String, inner: Box<TypeTag> },

    /// An opaque user type that only a registered converter understands
    Named(String),
}

/// The uninstantiated origin of a compound type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Union,
    Literal,
    Enum,
    List,
    Alias,
}

impl TypeTag {
    /// `union[inner, none]`
    pub fn optional(inner: TypeTag) -> Self {
        TypeTag::Union(vec![inner, TypeTag::None])
    }

    pub fn list(element: TypeTag) -> Self {
        TypeTag::List(Box::new(element))
    }

    pub fn union<I: IntoIterator<Item = TypeTag>>(alternatives: I) -> Self {
        TypeTag::Union(alternatives.into_iter().collect())
    }

    pub fn literal<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeTag::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeTag::Enum {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn alias(name: impl Into<String>, inner: TypeTag) -> Self {
        TypeTag::Alias {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeTag::Named(name.into())
    }

    /// A path that must exist
    pub fn existing_path() -> Self {
        TypeTag::alias("ExistingPath", TypeTag::Path)
    }

    /// A path that must exist and be a file
    pub fn existing_file_path() -> Self {
        TypeTag::alias("ExistingFilePath", TypeTag::Path)
    }

    /// A path that must exist and be a directory
    pub fn existing_dir_path() -> Self {
        TypeTag::alias("ExistingDirPath", TypeTag::Path)
    }

    pub fn existing_path_or_dash() -> Self {
        Self::or_dash(Self::existing_path())
    }

    pub fn existing_file_path_or_dash() -> Self {
        Self::or_dash(Self::existing_file_path())
    }

    pub fn existing_dir_path_or_dash() -> Self {
        Self::or_dash(Self::existing_dir_path())
    }

    /// A path, or `-` for stdin/stdout
    pub fn path_or_dash() -> Self {
        Self::or_dash(TypeTag::Path)
    }

    fn or_dash(path: TypeTag) -> Self {
        TypeTag::Union(vec![path, TypeTag::literal(["-"])])
    }

    pub fn origin(&self) -> Option<Origin> {
        match self {
            TypeTag::Union(_) => Some(Origin::Union),
            TypeTag::Literal(_) => Some(Origin::Literal),
            TypeTag::Enum { .. } => Some(Origin::Enum),
            TypeTag::List(_) => Some(Origin::List),
            TypeTag::Alias { .. } => Some(Origin::Alias),
            _ => None,
        }
    }

    /// Whether this is a union that includes the absence marker
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeTag::Union(alts) if alts.contains(&TypeTag::None))
    }

    /// The first non-absence alternative of an optional union, or the type
    /// itself
    pub fn strip_optional(&self) -> &TypeTag {
        match self {
            TypeTag::Union(alts) if self.is_optional() => alts
                .iter()
                .find(|alt| **alt != TypeTag::None)
                .unwrap_or(self),
            _ => self,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Str => f.write_str("str"),
            TypeTag::Int => f.write_str("int"),
            TypeTag::Float => f.write_str("float"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Path => f.write_str("path"),
            TypeTag::None => f.write_str("none"),
            TypeTag::Union(alts) => {
                let rest: Vec<&TypeTag> = alts.iter().filter(|a| **a != TypeTag::None).collect();
                if self.is_optional() && rest.len() == 1 {
                    write!(f, "optional[{}]", rest[0])
                } else {
                    write!(f, "union[{}]", join(alts))
                }
            }
            TypeTag::Literal(values) => write!(f, "literal[{}]", values.join(", ")),
            TypeTag::Enum { name, .. } => f.write_str(name),
            TypeTag::List(element) => write!(f, "list[{}]", element),
            TypeTag::Alias { name, inner } => write!(f, "{} ({})", name, inner),
            TypeTag::Named(name) => f.write_str(name),
        }
    }
}

fn join(tags: &[TypeTag]) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
