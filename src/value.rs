//! # Value Representation for the ObjectIR VM
//!
//! This module defines [`Value`], the runtime type used on the operand
//! stack, in locals, and in arguments. Unlike a dynamically-typed VM's
//! single tagged union, ObjectIR keeps the type tag and payload as an
//! explicit pair: [`ValueType`] is a closed, CIL-inspired set of numeric
//! widths and scalar kinds, and [`ValueData`] is the payload shape for
//! each tag. Keeping them separate (rather than letting the payload
//! variant double as the tag) lets a declared-but-uninitialized local of
//! a non-scalar type carry a typed `Null` distinct from its scalar
//! default (`local s: string` is tagged STRING with no data, not an
//! empty string).
//!
//! ## Coercion rules
//! - Arithmetic (`add`/`sub`/`mul`/`div`/`rem`/`neg`) requires operands of
//!   the same tag and preserves the tag of the left operand.
//! - Comparisons (`ceq`/`cgt`/`clt`/`cge`/`cle`/`cne`) always push `BOOL`
//!   and tolerate cross-width numeric operands via [`Value::as_compare_num`].

use std::fmt;
use std::rc::Rc;

/// Closed set of runtime type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int32,
    Int64,
    Float,
    Double,
    String,
    Bool,
    Void,
    Object,
}

impl ValueType {
    /// Canonical "System.X" textual name for this tag.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            ValueType::Int32 => "System.Int32",
            ValueType::Int64 => "System.Int64",
            ValueType::Float => "System.Float",
            ValueType::Double => "System.Double",
            ValueType::String => "System.String",
            ValueType::Bool => "System.Boolean",
            ValueType::Void => "System.Void",
            ValueType::Object => "System.Object",
        }
    }

    /// Resolves a (possibly `System.`-prefixed, case-insensitive) type
    /// name to a tag, defaulting to `Object` for anything unrecognized.
    pub fn from_type_name(name: &str) -> ValueType {
        let lower = name.trim().to_ascii_lowercase();
        let normalized = lower.strip_prefix("system.").unwrap_or(&lower);
        match normalized {
            "int32" => ValueType::Int32,
            "int64" => ValueType::Int64,
            "float" => ValueType::Float,
            "double" => ValueType::Double,
            "string" => ValueType::String,
            "bool" | "boolean" => ValueType::Bool,
            "void" => ValueType::Void,
            _ => ValueType::Object,
        }
    }
}

/// An opaque host reference. The core never constructs one of these
/// beyond `ldnull`; a handle is just a label carried along for display.
pub type ObjectRef = Rc<str>;

/// The payload half of a [`Value`]. `Null` is only ever produced by
/// `local` declaring a non-scalar type with no initializer.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueData {
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Bool(bool),
    Object(Option<ObjectRef>),
    Null,
}

/// A stack value: a type tag paired with its payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    pub data: ValueData,
    pub type_: ValueType,
}

impl Value {
    pub fn int32(v: i32) -> Value {
        Value { data: ValueData::Int32(v), type_: ValueType::Int32 }
    }

    pub fn int64(v: i64) -> Value {
        Value { data: ValueData::Int64(v), type_: ValueType::Int64 }
    }

    pub fn float(v: f32) -> Value {
        Value { data: ValueData::Float(v), type_: ValueType::Float }
    }

    pub fn double(v: f64) -> Value {
        Value { data: ValueData::Double(v), type_: ValueType::Double }
    }

    pub fn string(v: impl Into<String>) -> Value {
        Value { data: ValueData::Str(v.into()), type_: ValueType::String }
    }

    pub fn bool(v: bool) -> Value {
        Value { data: ValueData::Bool(v), type_: ValueType::Bool }
    }

    pub fn null_object() -> Value {
        Value { data: ValueData::Object(None), type_: ValueType::Object }
    }

    pub fn object(handle: impl Into<ObjectRef>) -> Value {
        Value { data: ValueData::Object(Some(handle.into())), type_: ValueType::Object }
    }

    /// The default value for a declared local of type `ty` (`local name: T`):
    /// scalar numeric/bool types get their literal zero; string/object/void
    /// locals get a typed `Null` payload.
    pub fn default_for(ty: ValueType) -> Value {
        match ty {
            ValueType::Int32 => Value::int32(0),
            ValueType::Int64 => Value::int64(0),
            ValueType::Float => Value::float(0.0),
            ValueType::Double => Value::double(0.0),
            ValueType::Bool => Value::bool(false),
            ValueType::String | ValueType::Object | ValueType::Void => {
                Value { data: ValueData::Null, type_: ty }
            }
        }
    }

    /// String form used for the WriteLine side channel and general display.
    pub fn display_string(&self) -> String {
        match &self.data {
            ValueData::Int32(i) => i.to_string(),
            ValueData::Int64(i) => i.to_string(),
            ValueData::Float(f) => f.to_string(),
            ValueData::Double(f) => f.to_string(),
            ValueData::Str(s) => s.clone(),
            ValueData::Bool(b) => b.to_string(),
            ValueData::Object(Some(r)) => r.to_string(),
            ValueData::Object(None) => "null".to_string(),
            ValueData::Null => "null".to_string(),
        }
    }

    /// Best-effort numeric coercion used by condition evaluation and
    /// cross-width comparisons; non-numeric payloads coerce to `0.0`.
    pub fn as_compare_num(&self) -> f64 {
        match &self.data {
            ValueData::Int32(i) => *i as f64,
            ValueData::Int64(i) => *i as f64,
            ValueData::Float(f) => *f as f64,
            ValueData::Double(f) => *f,
            ValueData::Bool(b) => if *b { 1.0 } else { 0.0 },
            ValueData::Str(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            ValueData::Object(_) | ValueData::Null => 0.0,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}
