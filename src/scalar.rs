//! Scalar coercion between strings and bool, integer and string values.
//!
//! The same rules apply to leaf values, to the fields of a scalar sequence and
//! to map keys; only the error reported for a non-scalar target differs.
//!
//! - booleans: case-insensitive `"true"` is true, anything else is false
//! - integers: base-10, narrowed to the target width with wrapping
//! - strings: the raw value

use crate::{Error, Result};
use serde::de::{self, IntoDeserializer};
use serde::ser::{self, Impossible};
use serde::Serialize;

/// Where a scalar sits, which decides how a non-scalar target is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Value,
    MapKey,
}

impl Role {
    fn reject(self, key: &str, kind: &'static str) -> Error {
        match self {
            Role::Value => Error::unknown_scalar(key, kind),
            Role::MapKey => Error::unsupported_key(key, kind),
        }
    }
}

#[inline]
pub(crate) fn coerce_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Parses a base-10 integer wide enough for every supported width.
pub(crate) fn coerce_integer(key: &str, value: &str) -> Result<i128> {
    value
        .parse::<i128>()
        .map_err(|e| Error::integer_parse(key, value, e))
}

/// Deserializes one scalar from its string form.
pub(crate) struct ScalarDeserializer {
    value: String,
    key: String,
    role: Role,
}

impl ScalarDeserializer {
    pub(crate) fn new(value: String, key: &str, role: Role) -> Self {
        ScalarDeserializer {
            value,
            key: key.to_string(),
            role,
        }
    }

    fn reject<T>(&self, kind: &'static str) -> Result<T> {
        Err(self.role.reject(&self.key, kind))
    }
}

macro_rules! deserialize_narrowed {
    ($($method:ident => $visit:ident as $ty:ty),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let wide = coerce_integer(&self.key, &self.value)?;
                visitor.$visit(wide as $ty)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ScalarDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(coerce_bool(&self.value))
    }

    deserialize_narrowed! {
        deserialize_i8 => visit_i8 as i8,
        deserialize_i16 => visit_i16 as i16,
        deserialize_i32 => visit_i32 as i32,
        deserialize_i64 => visit_i64 as i64,
        deserialize_u8 => visit_u8 as u8,
        deserialize_u16 => visit_u16 as u16,
        deserialize_u32 => visit_u32 as u32,
        deserialize_u64 => visit_u64 as u64,
    }

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i128(coerce_integer(&self.key, &self.value)?)
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self
            .value
            .parse::<u128>()
            .map_err(|e| Error::integer_parse(&self.key, &self.value, e))?;
        visitor.visit_u128(value)
    }

    fn deserialize_f32<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("f32")
    }

    fn deserialize_f64<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("f64")
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value)
    }

    fn deserialize_bytes<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("bytes")
    }

    fn deserialize_byte_buf<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("bytes")
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
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

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("sequence")
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("tuple")
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("tuple struct")
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("map")
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject("struct")
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self.value.into_deserializer())
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Renders one scalar as its string form.
pub(crate) struct ScalarSerializer<'a> {
    key: &'a str,
    role: Role,
}

impl<'a> ScalarSerializer<'a> {
    pub(crate) fn new(key: &'a str, role: Role) -> Self {
        ScalarSerializer { key, role }
    }

    fn reject(&self, kind: &'static str) -> Error {
        self.role.reject(self.key, kind)
    }
}

impl<'a> ser::Serializer for ScalarSerializer<'a> {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(if v { "true" } else { "false" }.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(self.reject("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(self.reject("f64"))
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(self.reject("bytes"))
    }

    fn serialize_none(self) -> Result<String> {
        match self.role {
            Role::Value => Err(Error::absent_element(self.key)),
            Role::MapKey => Err(self.reject("absent optional")),
        }
    }

    fn serialize_some<T>(self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(self.reject("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(self.reject("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
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
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(self.reject("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.reject("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.reject("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.reject("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.reject("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(self.reject("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.reject("struct variant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;

    fn value<T: DeserializeOwned>(raw: &str) -> Result<T> {
        T::deserialize(ScalarDeserializer::new(raw.to_string(), "KEY", Role::Value))
    }

    #[test]
    fn test_bool_is_case_insensitive_and_never_fails() {
        assert!(value::<bool>("true").unwrap());
        assert!(value::<bool>("TRUE").unwrap());
        assert!(value::<bool>("True").unwrap());
        assert!(!value::<bool>("yes").unwrap());
        assert!(!value::<bool>("1").unwrap());
        assert!(!value::<bool>("").unwrap());
    }

    #[test]
    fn test_integers() {
        assert_eq!(value::<i32>("-1002").unwrap(), -1002);
        assert_eq!(value::<u64>("18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(value::<u128>("340282366920938463463374607431768211455").unwrap(), u128::MAX);
        assert!(matches!(value::<u8>("6x"), Err(Error::IntegerParse { .. })));
        assert!(matches!(value::<i64>(""), Err(Error::IntegerParse { .. })));
    }

    #[test]
    fn test_integer_narrowing_wraps() {
        assert_eq!(value::<u8>("300").unwrap(), 44);
        assert_eq!(value::<u16>("-1").unwrap(), u16::MAX);
    }

    #[test]
    fn test_strings_are_raw() {
        assert_eq!(value::<String>("").unwrap(), "");
        assert_eq!(value::<String>(" a=b ").unwrap(), " a=b ");
        assert_eq!(value::<char>("x").unwrap(), 'x');
    }

    #[test]
    fn test_non_scalar_targets() {
        assert!(matches!(value::<f64>("1.5"), Err(Error::UnknownScalarKind { kind: "f64", .. })));

        let key = Vec::<u8>::deserialize(ScalarDeserializer::new("1".into(), "M", Role::MapKey));
        assert!(matches!(key, Err(Error::UnsupportedKeyType { .. })));
    }

    #[test]
    fn test_serializer_renders_scalars() {
        assert_eq!(render(&true), "true");
        assert_eq!(render(&-7i16), "-7");
        assert_eq!(render(&"raw, text"), "raw, text");
    }

    #[test]
    fn test_serializer_rejects_absent_and_containers() {
        let absent = None::<u8>.serialize(ScalarSerializer::new("LIST", Role::Value));
        assert!(matches!(absent, Err(Error::AbsentSequenceElement { .. })));

        let key = vec![1u8].serialize(ScalarSerializer::new("MAP", Role::MapKey));
        assert!(matches!(key, Err(Error::UnsupportedKeyType { .. })));
    }

    fn render<T: Serialize>(value: T) -> String {
        value
            .serialize(ScalarSerializer::new("KEY", Role::Value))
            .unwrap()
    }
}
