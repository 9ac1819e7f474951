//! Environment deserialization.
//!
//! This module provides the [`Deserializer`] that rebuilds a struct or map
//! from a [`KeyStore`].
//!
//! ## Overview
//!
//! Decoding is driven by the target type and the key space, not by a scan of
//! the input:
//!
//! - **Struct fields** are read in declaration order at `PATH.FIELD`
//! - **Internal fields** (name starting with `_`) are never read and get the
//!   zero value of their type
//! - **Options** are materialized only when their key, or a key below it, is
//!   still unread; otherwise they stay `None`
//! - **Maps** take their keys from the unread keys under their path, in
//!   sorted order
//! - **Sequences** read one CSV record when their exact key exists, otherwise
//!   `PATH.0`, `PATH.1`, ... until the first missing index
//!
//! Every key is consumed at most once, so a value already claimed by one
//! field is never seen by another.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_environ::from_entries;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Person { name: String, age: u8 }
//!
//! let person: Person = from_entries(["NAME=Lufy", "AGE=66"]).unwrap();
//! assert_eq!(person, Person { name: "Lufy".into(), age: 66 });
//! ```

use crate::path::{self, SEPARATOR};
use crate::record;
use crate::scalar::{Role, ScalarDeserializer};
use crate::store::KeyStore;
use crate::{Error, Result};
use serde::de::{self, DeserializeOwned, Deserializer as _, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::collections::HashSet;

/// The environment deserializer.
///
/// Reads through a [`KeyStore`] and consumes every key it uses. Created via
/// [`Deserializer::new`] and driven with [`Deserializer::decode`].
pub struct Deserializer<'s> {
    store: &'s mut KeyStore,
    path: String,
    entry: bool,
}

impl<'s> Deserializer<'s> {
    pub fn new(store: &'s mut KeyStore) -> Self {
        Deserializer::at(store, String::new())
    }

    fn at(store: &'s mut KeyStore, path: String) -> Self {
        Deserializer {
            store,
            path,
            entry: false,
        }
    }

    /// A map value whose key was discovered from the keys below the map.
    fn entry(store: &'s mut KeyStore, path: String) -> Self {
        Deserializer {
            store,
            path,
            entry: true,
        }
    }

    /// Decodes a root value, which must be a struct or a map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRootKind`] for any other root type, and the
    /// first coercion or sequence error met while decoding.
    pub fn decode<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        T::deserialize(RootDeserializer(self))
    }

    /// Takes the value at the current path for scalar coercion.
    ///
    /// A map entry only exists because some key starts with its path, so when
    /// its exact key is missing the data lies below it and cannot be a scalar.
    fn scalar(self) -> Result<ScalarDeserializer> {
        if self.entry && !self.store.contains_key(&self.path) {
            return Err(Error::ambiguous_map_key(&self.path));
        }
        let value = self.store.get(&self.path);
        Ok(ScalarDeserializer::new(value, &self.path, Role::Value))
    }
}

macro_rules! forward_to_scalar {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                self.scalar()?.$method(visitor)
            }
        )*
    };
}

impl<'de, 's> de::Deserializer<'de> for Deserializer<'s> {
    type Error = Error;

    /// Dynamic targets read a string when the exact key exists and a map when
    /// keys exist below it.
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.store.contains_key(&self.path) {
            self.scalar()?.deserialize_any(visitor)
        } else if self.store.has_key_with_prefix(&path::descendants(&self.path)) {
            self.deserialize_map(visitor)
        } else {
            visitor.visit_unit()
        }
    }

    forward_to_scalar! {
        deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64
        deserialize_char deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf
        deserialize_identifier
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.path.is_empty() || self.store.has_path(&self.path) {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.store.contains_key(&self.path) {
            let raw = self.store.get(&self.path);
            let fields = record::decode(&raw)
                .map_err(|reason| Error::malformed_sequence(&self.path, reason))?;
            visitor.visit_seq(ScalarSeqAccess {
                fields: fields.into_iter(),
                key: self.path,
            })
        } else if self.entry && !self.store.has_path(&path::indexed(&self.path, 0)) {
            Err(Error::ambiguous_map_key(&self.path))
        } else {
            visitor.visit_seq(IndexedSeqAccess {
                store: self.store,
                path: self.path,
                index: 0,
            })
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(EntryAccess {
            prefix: path::descendants(&self.path),
            store: self.store,
            path: self.path,
            seen: HashSet::new(),
            value_path: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(FieldAccess {
            store: self.store,
            path: self.path,
            fields: fields.iter(),
            pending: None,
        })
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.scalar()?.deserialize_enum(name, variants, visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Accepts only structs and maps at the top level.
struct RootDeserializer<'s>(Deserializer<'s>);

impl<'de, 's> de::Deserializer<'de> for RootDeserializer<'s> {
    type Error = Error;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::invalid_root("a value that is neither struct nor map"))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.0.deserialize_map(visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.0.deserialize_struct(name, fields, visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple
        tuple_struct enum identifier ignored_any
    }
}

/// Yields the declared fields of a struct in order.
///
/// Internal fields are yielded too, but never read: they get the zero value
/// of their type.
struct FieldAccess<'s> {
    store: &'s mut KeyStore,
    path: String,
    fields: std::slice::Iter<'static, &'static str>,
    pending: Option<Pending>,
}

enum Pending {
    Read(String),
    Internal,
}

impl<'de, 's> de::MapAccess<'de> for FieldAccess<'s> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some(&field) = self.fields.next() else {
            return Ok(None);
        };
        self.pending = Some(if path::is_internal(field) {
            Pending::Internal
        } else {
            Pending::Read(path::named(&self.path, field))
        });
        seed.deserialize(field.into_deserializer()).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(Pending::Read(path)) => seed.deserialize(Deserializer::at(&mut *self.store, path)),
            Some(Pending::Internal) => seed.deserialize(ZeroValue),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// Yields map entries discovered from the unread keys below `prefix`.
///
/// The key set is re-read on every step, so keys consumed by a previous
/// entry's value are never offered again.
struct EntryAccess<'s> {
    store: &'s mut KeyStore,
    path: String,
    prefix: String,
    seen: HashSet<String>,
    value_path: Option<String>,
}

impl<'s> EntryAccess<'s> {
    fn next_segment(&self) -> Option<String> {
        self.store
            .keys_with_prefix(&self.prefix)
            .map(|key| {
                let rest = &key[self.prefix.len()..];
                rest.split_once(SEPARATOR).map_or(rest, |(head, _)| head)
            })
            .find(|segment| !self.seen.contains(*segment))
            .map(str::to_string)
    }
}

impl<'de, 's> de::MapAccess<'de> for EntryAccess<'s> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some(segment) = self.next_segment() else {
            return Ok(None);
        };

        self.seen.insert(segment.clone());
        self.value_path = Some(path::child(&self.path, &segment));
        seed.deserialize(ScalarDeserializer::new(segment, &self.path, Role::MapKey))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value_path.take() {
            Some(path) => seed.deserialize(Deserializer::entry(&mut *self.store, path)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

/// Elements stored under `PATH.0`, `PATH.1`, ... up to the first gap.
struct IndexedSeqAccess<'s> {
    store: &'s mut KeyStore,
    path: String,
    index: usize,
}

impl<'de, 's> de::SeqAccess<'de> for IndexedSeqAccess<'s> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        let path = path::indexed(&self.path, self.index);
        if !self.store.has_path(&path) {
            return Ok(None);
        }
        self.index += 1;
        seed.deserialize(Deserializer::at(&mut *self.store, path))
            .map(Some)
    }
}

/// Elements of a scalar sequence split out of one CSV record.
struct ScalarSeqAccess {
    fields: std::vec::IntoIter<String>,
    key: String,
}

impl<'de> de::SeqAccess<'de> for ScalarSeqAccess {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.fields.next() {
            Some(field) => seed
                .deserialize(ScalarDeserializer::new(field, &self.key, Role::Value))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// Produces the zero value of any type: `false`, `0`, `""`, `None`, empty
/// collections, structs of zero values, and the first variant of an enum.
struct ZeroValue;

macro_rules! zero_number {
    ($($method:ident => $visit:ident($zero:expr))*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit($zero)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ZeroValue {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    zero_number! {
        deserialize_bool => visit_bool(false)
        deserialize_i8 => visit_i64(0)
        deserialize_i16 => visit_i64(0)
        deserialize_i32 => visit_i64(0)
        deserialize_i64 => visit_i64(0)
        deserialize_i128 => visit_i128(0)
        deserialize_u8 => visit_u64(0)
        deserialize_u16 => visit_u64(0)
        deserialize_u32 => visit_u64(0)
        deserialize_u64 => visit_u64(0)
        deserialize_u128 => visit_u128(0)
        deserialize_f32 => visit_f64(0.0)
        deserialize_f64 => visit_f64(0.0)
        deserialize_char => visit_char('\0')
        deserialize_str => visit_str("")
        deserialize_string => visit_str("")
        deserialize_identifier => visit_str("")
        deserialize_bytes => visit_bytes(&[])
        deserialize_byte_buf => visit_bytes(&[])
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_none()
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroElements(0))
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroElements(len))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroElements(len))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(ZeroFields(NO_FIELDS.iter()))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(ZeroFields(fields.iter()))
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let Some(&first) = variants.first() else {
            return Err(Error::custom(format!("enum {} has no variants", name)));
        };
        let variant: de::value::StrDeserializer<'_, Error> = first.into_deserializer();
        visitor.visit_enum(variant)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

const NO_FIELDS: &[&str] = &[];

/// `n` zero elements.
struct ZeroElements(usize);

impl<'de> de::SeqAccess<'de> for ZeroElements {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.0 == 0 {
            return Ok(None);
        }
        self.0 -= 1;
        seed.deserialize(ZeroValue).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.0)
    }
}

/// Every named field with a zero value.
struct ZeroFields(std::slice::Iter<'static, &'static str>);

impl<'de> de::MapAccess<'de> for ZeroFields {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.0.next() {
            Some(&field) => seed.deserialize(field.into_deserializer()).map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ZeroValue)
    }
}
