//! Environment serialization.
//!
//! This module provides the [`Serializer`] that flattens a struct or map into
//! `KEY=VALUE` entries.
//!
//! ## Overview
//!
//! Every field and map entry is classified first (see [`crate::classify`]),
//! then dispatched:
//!
//! - **Scalars** become one entry keyed by the uppercased field path
//! - **Structs and maps** recurse, extending the path with `.`
//! - **Scalar sequences** collapse into one entry holding a CSV record
//! - **Other sequences** recurse once per element under `.0`, `.1`, ...
//! - **Absent options** produce nothing
//! - **Unsupported kinds** (floats, bytes, data-carrying enum variants) are
//!   skipped without error when nested; only the root is validated
//!
//! ## Usage
//!
//! ```rust
//! use serde::Serialize;
//! use serde_environ::to_vec;
//!
//! #[derive(Serialize)]
//! struct Server { addr: String, ports: Vec<u16> }
//!
//! let server = Server { addr: "localhost".into(), ports: vec![80, 443] };
//! assert_eq!(
//!     to_vec(&server).unwrap(),
//!     vec!["ADDR=localhost", "PORTS=80,443"],
//! );
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde_environ::Serializer;
//! use std::collections::BTreeMap;
//!
//! let mut ports = BTreeMap::new();
//! ports.insert("http", 80);
//!
//! let mut serializer = Serializer::new();
//! serializer.encode(&ports).unwrap();
//! assert_eq!(serializer.into_entries(), vec![("HTTP".to_string(), "80".to_string())]);
//! ```

use crate::kind::{classify, Kind};
use crate::path;
use crate::record;
use crate::scalar::{Role, ScalarSerializer};
use crate::{Error, Result};
use serde::ser::{self, Impossible};
use serde::Serialize;
use tracing::trace;

/// The environment serializer.
///
/// Collects `(key, value)` pairs in the order the value is walked. Keys carry
/// no prefix; see [`Serializer::into_lines`].
#[derive(Debug, Default)]
pub struct Serializer {
    entries: Vec<(String, String)>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes a root value, which must be a struct or a map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRootKind`] for any other root, and propagates
    /// the first failure met while walking the value.
    pub fn encode<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match classify(value)? {
            Kind::Struct | Kind::Map => value.serialize(NodeSerializer {
                ser: self,
                path: String::new(),
            }),
            other => Err(Error::invalid_root(other)),
        }
    }

    pub fn into_entries(self) -> Vec<(String, String)> {
        self.entries
    }

    /// Renders the entries as `KEY=VALUE` strings with `prefix` prepended to
    /// every key.
    pub fn into_lines(self, prefix: &str) -> Vec<String> {
        self.entries
            .into_iter()
            .map(|(key, value)| format!("{}{}={}", prefix, key, value))
            .collect()
    }

    fn emit(&mut self, key: &str, value: String) {
        self.entries.push((key.to_uppercase(), value));
    }

    /// Encodes a struct field or map value at `key`.
    fn encode_child<T>(&mut self, key: String, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let Some(kind) = classify(value)?.present() else {
            return Ok(());
        };

        match kind {
            Kind::Bool | Kind::Int | Kind::String => {
                let rendered = value.serialize(ScalarSerializer::new(&key, Role::Value))?;
                self.emit(&key, rendered);
                Ok(())
            }
            Kind::Struct | Kind::Map | Kind::Sequence => {
                value.serialize(NodeSerializer { ser: self, path: key })
            }
            other => {
                trace!(key = %key, kind = %other, "skipping unsupported field");
                Ok(())
            }
        }
    }
}

/// Serializes a container rooted at `path`.
pub struct NodeSerializer<'a> {
    ser: &'a mut Serializer,
    path: String,
}

impl<'a> NodeSerializer<'a> {
    fn leaf<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if self.path.is_empty() {
            return Err(Error::invalid_root(classify(value)?));
        }
        let rendered = value.serialize(ScalarSerializer::new(&self.path, Role::Value))?;
        self.ser.emit(&self.path, rendered);
        Ok(())
    }

    fn skip(self, kind: &'static str) -> Result<()> {
        if self.path.is_empty() {
            return Err(Error::invalid_root(kind));
        }
        trace!(key = %self.path, kind, "skipping unsupported value");
        Ok(())
    }

    fn unsupported_compound<T>(self, kind: &'static str) -> Result<T> {
        Err(Error::custom(format!(
            "cannot encode {} at {:?}",
            kind, self.path
        )))
    }

    fn sequence(self) -> SeqEncoder<'a> {
        SeqEncoder {
            ser: self.ser,
            path: self.path,
            index: 0,
            scalars: Vec::new(),
            absent: false,
            nested: false,
        }
    }
}

impl<'a> ser::Serializer for NodeSerializer<'a> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqEncoder<'a>;
    type SerializeTuple = SeqEncoder<'a>;
    type SerializeTupleStruct = SeqEncoder<'a>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = MapEncoder<'a>;
    type SerializeStruct = StructEncoder<'a>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        self.skip("f32")
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        self.skip("f64")
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.leaf(&v)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.leaf(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        self.skip("bytes")
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.skip("unit")
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.skip("unit struct")
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.leaf(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
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
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.skip("newtype variant")
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        if self.path.is_empty() {
            return Err(Error::invalid_root(Kind::Sequence));
        }
        Ok(self.sequence())
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.unsupported_compound("tuple variant")
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapEncoder {
            ser: self.ser,
            path: self.path,
            key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructEncoder {
            ser: self.ser,
            path: self.path,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.unsupported_compound("struct variant")
    }
}

/// Encodes a sequence either as one CSV entry (scalar elements) or as one
/// subtree per index (everything else).
///
/// An empty sequence emits `KEY=` whatever its element type. A `None` is
/// rejected once a scalar has been seen (or when a scalar follows it), but a
/// sequence holding only `None` emits nothing: serde gives no element type to
/// tell `Vec<Option<u8>>` from `Vec<Option<Struct>>` there.
pub struct SeqEncoder<'a> {
    ser: &'a mut Serializer,
    path: String,
    index: usize,
    scalars: Vec<String>,
    absent: bool,
    nested: bool,
}

impl<'a> SeqEncoder<'a> {
    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = path::indexed(&self.path, self.index);
        self.index += 1;

        match classify(value)?.present() {
            None => {
                // Fatal only once the sequence is known to hold scalars.
                if !self.scalars.is_empty() {
                    return Err(Error::absent_element(&self.path));
                }
                self.absent = true;
                Ok(())
            }
            Some(Kind::Bool | Kind::Int | Kind::String) => {
                if self.absent {
                    return Err(Error::absent_element(&self.path));
                }
                let rendered = value.serialize(ScalarSerializer::new(&self.path, Role::Value))?;
                self.scalars.push(rendered);
                Ok(())
            }
            Some(Kind::Struct | Kind::Map | Kind::Sequence) => {
                self.nested = true;
                value.serialize(NodeSerializer {
                    ser: &mut *self.ser,
                    path: key,
                })
            }
            Some(other) => {
                trace!(key = %key, kind = %other, "skipping unsupported element");
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<()> {
        if !self.scalars.is_empty() || !(self.nested || self.absent) {
            self.ser.emit(&self.path, record::encode(&self.scalars));
        }
        Ok(())
    }
}

impl<'a> ser::SerializeSeq for SeqEncoder<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTuple for SeqEncoder<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleStruct for SeqEncoder<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

pub struct MapEncoder<'a> {
    ser: &'a mut Serializer,
    path: String,
    key: Option<String>,
}

impl<'a> ser::SerializeMap for MapEncoder<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.key = Some(key.serialize(ScalarSerializer::new(&self.path, Role::MapKey))?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        self.ser.encode_child(path::named(&self.path, &key), value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

pub struct StructEncoder<'a> {
    ser: &'a mut Serializer,
    path: String,
}

impl<'a> ser::SerializeStruct for StructEncoder<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if path::is_internal(key) {
            return Ok(());
        }
        self.ser.encode_child(path::named(&self.path, key), value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn encode<T: Serialize>(value: &T) -> Result<Vec<String>> {
        let mut serializer = Serializer::new();
        serializer.encode(value)?;
        Ok(serializer.into_lines(""))
    }

    #[derive(Serialize)]
    struct Address {
        kind: u8,
        street: String,
    }

    #[derive(Serialize)]
    struct Nested {
        name: String,
        addr: Vec<Address>,
        arr_list: Vec<Vec<String>>,
    }

    #[test]
    fn test_flat_struct_in_field_order() {
        #[derive(Serialize)]
        struct Conf {
            addr: String,
            port: i32,
            debug: bool,
        }

        let conf = Conf {
            addr: "someOtherHost.net".into(),
            port: 8090,
            debug: false,
        };
        assert_eq!(
            encode(&conf).unwrap(),
            vec!["ADDR=someOtherHost.net", "PORT=8090", "DEBUG=false"]
        );
    }

    #[test]
    fn test_nested_sequences() {
        let nested = Nested {
            name: "Lufy".into(),
            addr: vec![
                Address { kind: 1, street: "Somewhere str.".into() },
                Address { kind: 0, street: "Elsewhere".into() },
            ],
            arr_list: vec![
                vec!["list".into(), "of".into()],
                vec!["a time, comma".into(), "omg".into()],
            ],
        };
        assert_eq!(
            encode(&nested).unwrap(),
            vec![
                "NAME=Lufy",
                "ADDR.0.KIND=1",
                "ADDR.0.STREET=Somewhere str.",
                "ADDR.1.KIND=0",
                "ADDR.1.STREET=Elsewhere",
                "ARR_LIST.0=list,of",
                "ARR_LIST.1=\"a time, comma\",omg",
            ]
        );
    }

    #[test]
    fn test_map_keys_are_uppercased() {
        let mut ports = BTreeMap::new();
        ports.insert("http", 80u16);
        ports.insert("smtp", 25u16);
        assert_eq!(encode(&ports).unwrap(), vec!["HTTP=80", "SMTP=25"]);
    }

    #[test]
    fn test_absent_options_emit_nothing() {
        #[derive(Serialize)]
        struct Conf {
            nick: Option<String>,
            inner: Option<Address>,
            port: Option<u16>,
        }

        let conf = Conf { nick: None, inner: None, port: Some(1) };
        assert_eq!(encode(&conf).unwrap(), vec!["PORT=1"]);
    }

    #[test]
    fn test_empty_scalar_sequence_emits_empty_value() {
        #[derive(Serialize)]
        struct Conf {
            tags: Vec<String>,
        }

        assert_eq!(encode(&Conf { tags: vec![] }).unwrap(), vec!["TAGS="]);
    }

    #[test]
    fn test_absent_scalar_element_fails() {
        #[derive(Serialize)]
        struct Conf {
            list: Vec<Option<u8>>,
        }

        let err = encode(&Conf { list: vec![Some(1), None] }).unwrap_err();
        assert!(matches!(err, Error::AbsentSequenceElement { .. }));

        let err = encode(&Conf { list: vec![None, Some(2)] }).unwrap_err();
        assert!(matches!(err, Error::AbsentSequenceElement { .. }));

        // Indistinguishable from a list of absent structs.
        assert!(encode(&Conf { list: vec![None, None] }).unwrap().is_empty());
    }

    #[test]
    fn test_empty_struct_sequence_emits_empty_value() {
        #[derive(Serialize)]
        struct Item {
            name: String,
        }

        #[derive(Serialize)]
        struct Conf {
            items: Vec<Item>,
        }

        assert_eq!(encode(&Conf { items: vec![] }).unwrap(), vec!["ITEMS="]);
    }

    #[test]
    fn test_nested_unsupported_fields_are_skipped() {
        #[derive(Serialize)]
        enum Shape {
            Circle { radius: u8 },
        }

        #[derive(Serialize)]
        struct Conf {
            ratio: f64,
            shape: Shape,
            _cache: String,
            name: String,
        }

        let conf = Conf {
            ratio: 0.5,
            shape: Shape::Circle { radius: 1 },
            _cache: "hidden".into(),
            name: "kept".into(),
        };
        assert_eq!(encode(&conf).unwrap(), vec!["NAME=kept"]);
    }

    #[test]
    fn test_root_must_be_struct_or_map() {
        assert!(matches!(encode(&5u8), Err(Error::InvalidRootKind(_))));
        assert!(matches!(encode(&vec![1, 2]), Err(Error::InvalidRootKind(_))));
        assert!(matches!(encode(&"text"), Err(Error::InvalidRootKind(_))));
    }

    #[test]
    fn test_non_scalar_map_key_fails() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "x");
        assert!(matches!(encode(&map), Err(Error::UnsupportedKeyType { .. })));
    }
}
