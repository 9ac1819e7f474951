//! Shape classification of serializable values.
//!
//! [`classify`] runs a probing serializer over a value and reports which part
//! of the serde data model the value maps onto, without visiting its
//! children. The encoder uses it to pick a strategy for every field, map entry
//! and sequence element before serializing the value for real.

use crate::{Error, Result};
use serde::{ser, Serialize};
use std::fmt;

/// The shape of a value as far as environment transcoding is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    /// Any signed or unsigned integer width.
    Int,
    /// Strings, chars and unit enum variants.
    String,
    Struct,
    Map,
    /// Sequences, tuples and tuple structs.
    Sequence,
    /// A single level of optionality; `None` inside means absent.
    Optional(Option<Box<Kind>>),
    /// Anything the format cannot carry, named for diagnostics.
    Unsupported(&'static str),
}

impl Kind {
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Kind::Bool | Kind::Int | Kind::String)
    }

    /// Whether the value can be transcoded once one optional layer is removed.
    #[must_use]
    pub fn is_transcodable(&self) -> bool {
        match self {
            Kind::Optional(None) => true,
            Kind::Optional(Some(inner)) => inner.is_transcodable(),
            Kind::Unsupported(_) => false,
            _ => true,
        }
    }

    /// Strips the optional layer. Returns `None` for an absent value.
    #[must_use]
    pub fn present(self) -> Option<Kind> {
        match self {
            Kind::Optional(inner) => inner.map(|kind| *kind),
            other => Some(other),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("integer"),
            Kind::String => f.write_str("string"),
            Kind::Struct => f.write_str("struct"),
            Kind::Map => f.write_str("map"),
            Kind::Sequence => f.write_str("sequence"),
            Kind::Optional(None) => f.write_str("absent optional"),
            Kind::Optional(Some(inner)) => write!(f, "optional {}", inner),
            Kind::Unsupported(what) => f.write_str(what),
        }
    }
}

/// Classifies `value`.
///
/// # Examples
///
/// ```rust
/// use serde_environ::{classify, Kind};
///
/// assert_eq!(classify(&8080u16).unwrap(), Kind::Int);
/// assert_eq!(classify(&vec!["a", "b"]).unwrap(), Kind::Sequence);
/// assert_eq!(classify(&None::<String>).unwrap(), Kind::Optional(None));
/// assert!(!classify(&1.5f64).unwrap().is_transcodable());
/// ```
///
/// # Errors
///
/// Only fails when the value's own `Serialize` implementation fails.
pub fn classify<T>(value: &T) -> Result<Kind>
where
    T: ?Sized + Serialize,
{
    value.serialize(Classifier)
}

struct Classifier;

/// Swallows the children of a compound value and yields its kind on `end`.
struct Probe(Kind);

impl ser::Serializer for Classifier {
    type Ok = Kind;
    type Error = Error;

    type SerializeSeq = Probe;
    type SerializeTuple = Probe;
    type SerializeTupleStruct = Probe;
    type SerializeTupleVariant = Probe;
    type SerializeMap = Probe;
    type SerializeStruct = Probe;
    type SerializeStructVariant = Probe;

    fn serialize_bool(self, _v: bool) -> Result<Kind> {
        Ok(Kind::Bool)
    }

    fn serialize_i8(self, _v: i8) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_i16(self, _v: i16) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_i32(self, _v: i32) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_i64(self, _v: i64) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_i128(self, _v: i128) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_u8(self, _v: u8) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_u16(self, _v: u16) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_u32(self, _v: u32) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_u64(self, _v: u64) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_u128(self, _v: u128) -> Result<Kind> {
        Ok(Kind::Int)
    }

    fn serialize_f32(self, _v: f32) -> Result<Kind> {
        Ok(Kind::Unsupported("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Kind> {
        Ok(Kind::Unsupported("f64"))
    }

    fn serialize_char(self, _v: char) -> Result<Kind> {
        Ok(Kind::String)
    }

    fn serialize_str(self, _v: &str) -> Result<Kind> {
        Ok(Kind::String)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Kind> {
        Ok(Kind::Unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<Kind> {
        Ok(Kind::Optional(None))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Kind>
    where
        T: ?Sized + Serialize,
    {
        // Option<Option<T>> collapses to one level.
        match value.serialize(Classifier)? {
            Kind::Optional(inner) => Ok(Kind::Optional(inner)),
            kind => Ok(Kind::Optional(Some(Box::new(kind)))),
        }
    }

    fn serialize_unit(self) -> Result<Kind> {
        Ok(Kind::Unsupported("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Kind> {
        Ok(Kind::Unsupported("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Kind> {
        Ok(Kind::String)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Kind>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Kind>
    where
        T: ?Sized + Serialize,
    {
        Ok(Kind::Unsupported("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Probe> {
        Ok(Probe(Kind::Sequence))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Probe> {
        Ok(Probe(Kind::Sequence))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Probe> {
        Ok(Probe(Kind::Sequence))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Probe> {
        Ok(Probe(Kind::Unsupported("tuple variant")))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Probe> {
        Ok(Probe(Kind::Map))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Probe> {
        Ok(Probe(Kind::Struct))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Probe> {
        Ok(Probe(Kind::Unsupported("struct variant")))
    }
}

impl ser::SerializeSeq for Probe {
    type Ok = Kind;
    type Error = Error;

    fn serialize_element<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Kind> {
        Ok(self.0)
    }
}

impl ser::SerializeTuple for Probe {
    type Ok = Kind;
    type Error = Error;

    fn serialize_element<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Kind> {
        Ok(self.0)
    }
}

impl ser::SerializeTupleStruct for Probe {
    type Ok = Kind;
    type Error = Error;

    fn serialize_field<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Kind> {
        Ok(self.0)
    }
}

impl ser::SerializeTupleVariant for Probe {
    type Ok = Kind;
    type Error = Error;

    fn serialize_field<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Kind> {
        Ok(self.0)
    }
}

impl ser::SerializeMap for Probe {
    type Ok = Kind;
    type Error = Error;

    fn serialize_key<T>(&mut self, _key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn serialize_value<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Kind> {
        Ok(self.0)
    }
}

impl ser::SerializeStruct for Probe {
    type Ok = Kind;
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Kind> {
        Ok(self.0)
    }
}

impl ser::SerializeStructVariant for Probe {
    type Ok = Kind;
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Kind> {
        Ok(self.0)
    }
}
