//! Type resolution
//!
//! Maps a declared [`TypeTag`] to the converter that turns a raw token into a
//! [`Value`]. Lookup order is fixed: exact converter, then a converter for
//! the type's origin, then the structural rules for unions, literals, enums,
//! lists, aliases and primitives.

use crate::error::UnresolvableType;
use crate::types::{Origin, TypeTag, Value};
use anyhow::{bail, Context as _};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// A raw token to value conversion
pub type Converter = Rc<dyn Fn(&str) -> anyhow::Result<Value>>;

/// Wrap a closure as a [`Converter`]
pub fn converter<F>(f: F) -> Converter
where
    F: Fn(&str) -> anyhow::Result<Value> + 'static,
{
    Rc::new(f)
}

/// The result of resolving a type
#[derive(Clone)]
pub struct Resolution {
    /// Applied to every raw token of the argument
    pub converter: Converter,

    /// The flag may be given repeatedly, each token converted on its own
    pub repeated: bool,

    /// Omission resolves to [`Value::None`]
    pub optional: bool,

    /// Allowed tokens, for literal and enum types
    pub choices: Option<Vec<String>>,

    /// The converter came from a table entry rather than a built-in rule
    pub from_table: bool,
}

impl Resolution {
    fn single(converter: Converter) -> Self {
        Resolution {
            converter,
            repeated: false,
            optional: false,
            choices: None,
            from_table: false,
        }
    }

    fn registered(converter: Converter) -> Self {
        Resolution {
            from_table: true,
            ..Resolution::single(converter)
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("repeated", &self.repeated)
            .field("optional", &self.optional)
            .field("choices", &self.choices)
            .field("from_table", &self.from_table)
            .finish_non_exhaustive()
    }
}

/// Registered converters by exact type and by origin
#[derive(Clone)]
pub struct ConverterTable {
    exact: HashMap<TypeTag, Converter>,
    origins: HashMap<Origin, Converter>,
}

impl ConverterTable {
    /// A table without any entries, not even the path converters
    pub fn empty() -> Self {
        ConverterTable {
            exact: HashMap::new(),
            origins: HashMap::new(),
        }
    }

    /// Register a converter for exactly this type, replacing any previous one
    pub fn insert(&mut self, ty: TypeTag, converter: Converter) {
        self.exact.insert(ty, converter);
    }

    /// Register a converter for every type with this origin
    pub fn insert_origin(&mut self, origin: Origin, converter: Converter) {
        self.origins.insert(origin, converter);
    }

    /// Layer `other` over this table; its entries win
    pub fn extend(&mut self, other: &ConverterTable) {
        self.exact
            .extend(other.exact.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.origins
            .extend(other.origins.iter().map(|(k, v)| (*k, v.clone())));
    }

    pub fn get(&self, ty: &TypeTag) -> Option<&Converter> {
        self.exact.get(ty)
    }

    /// The exact converter, falling back to the origin converter
    pub fn lookup(&self, ty: &TypeTag) -> Option<&Converter> {
        self.exact
            .get(ty)
            .or_else(|| ty.origin().and_then(|origin| self.origins.get(&origin)))
    }

    /// Resolve a declared type to its converter
    pub fn resolve(&self, ty: &TypeTag) -> Result<Resolution, UnresolvableType> {
        let resolution = self.resolve_inner(ty, true)?;
        tracing::trace!(ty = %ty, ?resolution, "resolved type");
        Ok(resolution)
    }

    fn resolve_inner(&self, ty: &TypeTag, top: bool) -> Result<Resolution, UnresolvableType> {
        if let Some(conv) = self.lookup(ty) {
            return Ok(Resolution::registered(conv.clone()));
        }

        match ty {
            TypeTag::Union(alts) => {
                let optional = alts.contains(&TypeTag::None);
                let first = alts
                    .iter()
                    .find(|alt| **alt != TypeTag::None)
                    .ok_or_else(|| UnresolvableType(ty.to_string()))?;
                let mut resolution = self.resolve_inner(first, top)?;
                resolution.optional |= optional;
                Ok(resolution)
            }
            TypeTag::Literal(values) if !values.is_empty() => {
                let allowed = values.clone();
                let conv = converter(move |s| {
                    if allowed.iter().any(|v| v == s) {
                        Ok(Value::Str(s.to_string()))
                    } else {
                        bail!(invalid_choice(s, &allowed))
                    }
                });
                Ok(Resolution {
                    choices: Some(values.clone()),
                    ..Resolution::single(conv)
                })
            }
            TypeTag::Enum { variants, .. } if !variants.is_empty() => {
                let keys = variants.clone();
                let conv = converter(move |s| match keys.iter().find(|k| *k == s) {
                    Some(key) => Ok(Value::Str(key.clone())),
                    None => bail!(invalid_choice(s, &keys)),
                });
                Ok(Resolution {
                    choices: Some(variants.clone()),
                    ..Resolution::single(conv)
                })
            }
            // Only one level of containers: list[list[..]] has no CLI shape
            TypeTag::List(element) if top => {
                let element = self.resolve_inner(element, false)?;
                if element.repeated {
                    return Err(UnresolvableType(ty.to_string()));
                }
                Ok(Resolution {
                    repeated: true,
                    optional: false,
                    ..element
                })
            }
            TypeTag::Alias { inner, .. } => self.resolve_inner(inner, top),
            TypeTag::Str => Ok(Resolution::single(converter(|s| Ok(Value::Str(s.to_string()))))),
            TypeTag::Int => Ok(Resolution::single(converter(parse_int))),
            TypeTag::Float => Ok(Resolution::single(converter(parse_float))),
            TypeTag::Bool => Ok(Resolution::single(converter(parse_bool))),
            TypeTag::Path => Ok(Resolution::single(converter(|s| {
                Ok(Value::Path(PathBuf::from(s)))
            }))),
            _ => Err(UnresolvableType(ty.to_string())),
        }
    }
}

impl Default for ConverterTable {
    /// A table with the path converters installed
    fn default() -> Self {
        let mut table = ConverterTable::empty();
        table.insert(TypeTag::existing_path(), converter(convert_existing_path));
        table.insert(TypeTag::existing_file_path(), converter(convert_existing_file_path));
        table.insert(TypeTag::existing_dir_path(), converter(convert_existing_dir_path));
        table.insert(
            TypeTag::existing_path_or_dash(),
            or_dash(convert_existing_path),
        );
        table.insert(
            TypeTag::existing_file_path_or_dash(),
            or_dash(convert_existing_file_path),
        );
        table.insert(
            TypeTag::existing_dir_path_or_dash(),
            or_dash(convert_existing_dir_path),
        );
        table.insert(
            TypeTag::path_or_dash(),
            or_dash(|s| Ok(Value::Path(PathBuf::from(s)))),
        );
        table
    }
}

fn invalid_choice(value: &str, allowed: &[String]) -> String {
    let choices: Vec<String> = allowed.iter().map(|c| format!("'{}'", c)).collect();
    format!(
        "invalid choice: '{}' (choose from {})",
        value,
        choices.join(", ")
    )
}

fn parse_int(s: &str) -> anyhow::Result<Value> {
    let i = s
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid int value: '{}'", s))?;
    Ok(Value::Int(i))
}

fn parse_float(s: &str) -> anyhow::Result<Value> {
    let x = s
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid float value: '{}'", s))?;
    Ok(Value::Float(x))
}

fn parse_bool(s: &str) -> anyhow::Result<Value> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Ok(Value::Bool(true)),
        "false" | "0" | "no" | "n" | "off" => Ok(Value::Bool(false)),
        _ => bail!("invalid bool value: '{}'", s),
    }
}

pub fn convert_existing_path(s: &str) -> anyhow::Result<Value> {
    let path = PathBuf::from(s);
    if !path.exists() {
        bail!("path does not exist: {}", s);
    }
    Ok(Value::Path(path))
}

pub fn convert_existing_file_path(s: &str) -> anyhow::Result<Value> {
    let value = convert_existing_path(s)?;
    if !PathBuf::from(s).is_file() {
        bail!("path is not a file path: {}", s);
    }
    Ok(value)
}

pub fn convert_existing_dir_path(s: &str) -> anyhow::Result<Value> {
    let value = convert_existing_path(s)?;
    if !PathBuf::from(s).is_dir() {
        bail!("path is not a directory path: {}", s);
    }
    Ok(value)
}

/// `-` passes through as a string, anything else goes to `path`
fn or_dash<F>(path: F) -> Converter
where
    F: Fn(&str) -> anyhow::Result<Value> + 'static,
{
    converter(move |s| {
        if s == "-" {
            Ok(Value::Str(s.to_string()))
        } else {
            path(s)
        }
    })
}

/// A single-token converter for delimited lists: `a,b,c`, `[a, b]`,
/// `["a", "b"]` or `['a', 'b']`
pub fn list_converter(element: Converter) -> Converter {
    converter(move |s| {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);
        let items = inner
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|item| !item.is_empty())
            .map(|item| element(item))
            .collect::<anyhow::Result<Vec<Value>>>()?;
        Ok(Value::List(items))
    })
}
