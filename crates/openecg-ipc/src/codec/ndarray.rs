//! Packed numeric arrays
//!
//! Lossless encoding of `f64` arrays as a self-describing map:
//!
//! ```text
//! { "nd": true, "type": "<f8", "shape": [rows, cols], "data": <bin> }
//! ```
//!
//! `data` holds the values as little-endian IEEE-754 doubles in row-major
//! order. The layout is the one used by numpy-aware MessagePack readers, so
//! coefficient tables can be loaded directly as arrays on the other side.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use openecg_filters::SosFilter;

use crate::error::{IpcError, IpcResult};

/// Element type tag for little-endian float64.
pub const F64_LE: &str = "<f8";

const ELEMENT_SIZE: usize = std::mem::size_of::<f64>();

/// An n-dimensional `f64` array in packed form.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl PackedArray {
    /// One-dimensional array.
    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Two-dimensional array in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::EncodingFailed`] if `data.len() != rows * cols`.
    pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> IpcResult<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(IpcError::EncodingFailed(format!(
                "{} values do not fill a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Self {
            shape: vec![rows, cols],
            data,
        })
    }

    /// Array dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Values in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Take the values.
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Coefficient table of `filter`: one `[b0, b1, b2, a0, a1, a2]` row per
    /// section.
    pub fn sos_table(filter: &SosFilter) -> Self {
        Self {
            shape: vec![filter.len(), 6],
            data: filter.to_flat(),
        }
    }

    fn packed_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

struct Bin<'a>(&'a [u8]);

impl Serialize for Bin<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

impl Serialize for PackedArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("nd", &true)?;
        map.serialize_entry("type", F64_LE)?;
        map.serialize_entry("shape", &self.shape)?;
        map.serialize_entry("data", &Bin(&self.packed_bytes()))?;
        map.end()
    }
}

/// Map keys, accepted either as strings or as raw bytes.
enum Field {
    Nd,
    Type,
    Shape,
    Data,
    Other,
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldVisitor;

        impl Visitor<'_> for FieldVisitor {
            type Value = Field;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a packed array field name")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Field, E> {
                Ok(match v {
                    b"nd" => Field::Nd,
                    b"type" => Field::Type,
                    b"shape" => Field::Shape,
                    b"data" => Field::Data,
                    _ => Field::Other,
                })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Field, E> {
                self.visit_bytes(v.as_bytes())
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

/// Byte payload accepted as bin, str or a sequence of integers.
struct Bytes(Vec<u8>);

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BytesVisitor;

        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = Bytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte buffer")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Bytes, E> {
                Ok(Bytes(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Bytes, E> {
                Ok(Bytes(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Bytes, E> {
                Ok(Bytes(v.as_bytes().to_vec()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Bytes, A::Error> {
                let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(b) = seq.next_element::<u8>()? {
                    out.push(b);
                }
                Ok(Bytes(out))
            }
        }

        deserializer.deserialize_bytes(BytesVisitor)
    }
}

impl<'de> Deserialize<'de> for PackedArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArrayVisitor;

        impl<'de> Visitor<'de> for ArrayVisitor {
            type Value = PackedArray;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a packed numeric array map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PackedArray, A::Error> {
                let mut nd = None;
                let mut dtype = None;
                let mut shape: Option<Vec<usize>> = None;
                let mut data = None;

                while let Some(key) = map.next_key::<Field>()? {
                    match key {
                        Field::Nd => nd = Some(map.next_value::<bool>()?),
                        Field::Type => dtype = Some(map.next_value::<Bytes>()?.0),
                        Field::Shape => shape = Some(map.next_value()?),
                        Field::Data => data = Some(map.next_value::<Bytes>()?.0),
                        Field::Other => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                if nd != Some(true) {
                    return Err(de::Error::custom("not a packed array (nd != true)"));
                }
                let dtype = dtype.ok_or_else(|| de::Error::missing_field("type"))?;
                if dtype != F64_LE.as_bytes() {
                    return Err(de::Error::custom(format!(
                        "unsupported element type {:?}, expected {F64_LE}",
                        String::from_utf8_lossy(&dtype)
                    )));
                }
                let shape = shape.ok_or_else(|| de::Error::missing_field("shape"))?;
                let data = data.ok_or_else(|| de::Error::missing_field("data"))?;

                let expected = shape
                    .iter()
                    .try_fold(1usize, |acc, d| acc.checked_mul(*d))
                    .and_then(|n| n.checked_mul(ELEMENT_SIZE));
                if expected != Some(data.len()) {
                    return Err(de::Error::custom(format!(
                        "{} data bytes do not match shape {shape:?}",
                        data.len()
                    )));
                }

                let values = data
                    .chunks_exact(ELEMENT_SIZE)
                    .map(|chunk| {
                        let mut le = [0u8; ELEMENT_SIZE];
                        le.copy_from_slice(chunk);
                        f64::from_le_bytes(le)
                    })
                    .collect();
                Ok(PackedArray {
                    shape,
                    data: values,
                })
            }
        }

        deserializer.deserialize_map(ArrayVisitor)
    }
}
