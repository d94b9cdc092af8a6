//! Serde adapters for the JSON wire-format rewrites.
//!
//! Generated message types reference these through `#[serde(with = "...")]`:
//!
//! - **64-bit integers** → JSON strings under the default STRING encoding
//!   (`int64_str`, `uint64_str`); NUMBER-encoded fields use no adapter.
//! - **Bytes** → base64/hex strings per the `bytes_encoding` option.
//! - **Timestamp** → RFC 3339 string, `YYYY-MM-DD` date, or Unix
//!   seconds/milliseconds per the `timestamp_format` option.
//!
//! ## Proto enums
//!
//! Proto3 enum fields are `i32` in generated structs. The
//! [`define_enum_serde`](crate::define_enum_serde) macro generates
//! `#[serde(with)]` modules that serialize the wire token (the `enum_value`
//! override when present, the proto name otherwise) under NAME encoding.
//! NUMBER-encoded enum fields use no adapter.
//!
//! Every adapter ships `optional` and `repeated` submodules for
//! `Option<T>` and `Vec<T>` fields.

/// Serde adapter for `i64` ↔ JSON string.
///
/// The canonical proto3 JSON mapping writes 64-bit integers as strings so
/// values above 2^53 survive IEEE-754 readers; zero is the string `"0"`.
/// Deserialization also accepts bare JSON numbers for interoperability.
pub mod int64_str {
    use serde::{Deserializer, Serializer};

    /// Serialize an `i64` as a decimal JSON string.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the serializer rejects the string.
    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserialize an `i64` from a JSON string or number.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if the value is neither.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        use serde::de;

        struct Int64Visitor;

        impl de::Visitor<'_> for Int64Visitor {
            type Value = i64;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a 64-bit integer as a string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
                Ok(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
                i64::try_from(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(Int64Visitor)
    }

    /// Adapter for `Option<i64>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod optional {
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional `i64` as a decimal string or null.
        #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<i64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional `i64` from a string, number, or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            let opt: Option<serde_json::Value> = Option::deserialize(deserializer)?;
            match opt {
                None => Ok(None),
                Some(value) => super::deserialize(value).map(Some).map_err(serde::de::Error::custom),
            }
        }
    }

    /// Adapter for `Vec<i64>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod repeated {
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize repeated `i64` values as decimal strings.
        pub fn serialize<S: Serializer>(
            values: &[i64],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for v in values {
                seq.serialize_element(&v.to_string())?;
            }
            seq.end()
        }

        /// Deserialize repeated `i64` values from strings or numbers.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<i64>, D::Error> {
            let values: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
            values
                .into_iter()
                .map(|v| super::deserialize(v).map_err(serde::de::Error::custom))
                .collect()
        }
    }
}

/// Serde adapter for `u64` ↔ JSON string.
///
/// Unsigned counterpart of [`int64_str`].
pub mod uint64_str {
    use serde::{Deserializer, Serializer};

    /// Serialize a `u64` as a decimal JSON string.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the serializer rejects the string.
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserialize a `u64` from a JSON string or number.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if the value is neither, or is negative.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        use serde::de;

        struct Uint64Visitor;

        impl de::Visitor<'_> for Uint64Visitor {
            type Value = u64;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an unsigned 64-bit integer as a string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
                u64::try_from(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(Uint64Visitor)
    }

    /// Adapter for `Option<u64>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod optional {
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional `u64` as a decimal string or null.
        #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<u64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional `u64` from a string, number, or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            let opt: Option<serde_json::Value> = Option::deserialize(deserializer)?;
            match opt {
                None => Ok(None),
                Some(value) => super::deserialize(value).map(Some).map_err(serde::de::Error::custom),
            }
        }
    }

    /// Adapter for `Vec<u64>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod repeated {
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize repeated `u64` values as decimal strings.
        pub fn serialize<S: Serializer>(
            values: &[u64],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for v in values {
                seq.serialize_element(&v.to_string())?;
            }
            seq.end()
        }

        /// Deserialize repeated `u64` values from strings or numbers.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<u64>, D::Error> {
            let values: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
            values
                .into_iter()
                .map(|v| super::deserialize(v).map_err(serde::de::Error::custom))
                .collect()
        }
    }
}

/// Serde adapter for maps with non-string keys.
///
/// The canonical proto3 JSON mapping writes every map key as a string;
/// serde_json additionally refuses to serialize integer-keyed maps at all.
/// Keys go through `Display`/`FromStr`, values through their own impls.
pub mod map_key {
    use std::collections::HashMap;
    use std::fmt::Display;
    use std::hash::Hash;
    use std::str::FromStr;

    use serde::de::DeserializeOwned;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a map with stringified keys.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if a value fails to serialize.
    pub fn serialize<K, V, S>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Display + Ord,
        V: Serialize,
        S: Serializer,
    {
        // Sorted so output is deterministic across processes.
        let mut entries: Vec<(&K, &V)> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut out = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            out.serialize_entry(&key.to_string(), value)?;
        }
        out.end()
    }

    /// Deserialize a map, parsing keys back from strings.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if a key does not parse or a value fails to
    /// deserialize.
    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
    where
        K: FromStr + Eq + Hash,
        K::Err: Display,
        V: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let raw: HashMap<String, V> = HashMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                key.parse()
                    .map(|k| (k, value))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// Serde adapter for `HashMap<String, i64>` under STRING int64 encoding.
pub mod map_int64_str {
    use std::collections::HashMap;

    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize string-keyed int64 map values as decimal strings.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the serializer rejects an entry.
    pub fn serialize<S: Serializer>(
        map: &HashMap<String, i64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(&String, &i64)> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut out = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            out.serialize_entry(key, &value.to_string())?;
        }
        out.end()
    }

    /// Deserialize int64 map values from strings or numbers.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if a value is neither.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<String, i64>, D::Error> {
        let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                super::int64_str::deserialize(value)
                    .map(|v| (key, v))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// Serde adapter for `HashMap<String, u64>` under STRING int64 encoding.
pub mod map_uint64_str {
    use std::collections::HashMap;

    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize string-keyed uint64 map values as decimal strings.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the serializer rejects an entry.
    pub fn serialize<S: Serializer>(
        map: &HashMap<String, u64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(&String, &u64)> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut out = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            out.serialize_entry(key, &value.to_string())?;
        }
        out.end()
    }

    /// Deserialize uint64 map values from strings or numbers.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if a value is neither, or is negative.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<String, u64>, D::Error> {
        let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                super::uint64_str::deserialize(value)
                    .map(|v| (key, v))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// Generate a serde adapter module for bytes fields with a fixed base64
/// engine. Internal building block for the `bytes_*` modules below.
macro_rules! define_base64_serde {
    ($(#[$doc:meta])* $name:ident, $engine:expr) => {
        $(#[$doc])*
        pub mod $name {
            use base64::Engine as _;
            use serde::{Deserialize, Deserializer, Serializer};

            /// Serialize bytes as a base64 JSON string.
            ///
            /// # Errors
            ///
            /// Returns `S::Error` if the serializer rejects the string.
            pub fn serialize<S: Serializer>(
                value: &[u8],
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&$engine.encode(value))
            }

            /// Deserialize bytes from a base64 JSON string.
            ///
            /// # Errors
            ///
            /// Returns `D::Error` if the string is not valid base64 for this
            /// alphabet and padding.
            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Vec<u8>, D::Error> {
                let s = String::deserialize(deserializer)?;
                $engine.decode(&s).map_err(serde::de::Error::custom)
            }

            /// Adapter for `Option<Vec<u8>>` fields.
            #[allow(clippy::missing_errors_doc)]
            pub mod optional {
                use serde::{Deserialize, Deserializer, Serializer};

                /// Serialize optional bytes or null.
                #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
                pub fn serialize<S: Serializer>(
                    value: &Option<Vec<u8>>,
                    serializer: S,
                ) -> Result<S::Ok, S::Error> {
                    match value {
                        Some(v) => super::serialize(v, serializer),
                        None => serializer.serialize_none(),
                    }
                }

                /// Deserialize optional bytes from a string or null.
                pub fn deserialize<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Option<Vec<u8>>, D::Error> {
                    let opt: Option<serde_json::Value> = Option::deserialize(deserializer)?;
                    match opt {
                        None => Ok(None),
                        Some(v) => super::deserialize(v)
                            .map(Some)
                            .map_err(serde::de::Error::custom),
                    }
                }
            }

            /// Adapter for `Vec<Vec<u8>>` fields.
            #[allow(clippy::missing_errors_doc)]
            pub mod repeated {
                use serde::ser::SerializeSeq;
                use serde::{Deserialize, Deserializer, Serializer};

                /// Serialize repeated bytes values.
                pub fn serialize<S: Serializer>(
                    values: &[Vec<u8>],
                    serializer: S,
                ) -> Result<S::Ok, S::Error> {
                    use base64::Engine as _;
                    let mut seq = serializer.serialize_seq(Some(values.len()))?;
                    for v in values {
                        seq.serialize_element(&$engine.encode(v))?;
                    }
                    seq.end()
                }

                /// Deserialize repeated bytes values.
                pub fn deserialize<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Vec<Vec<u8>>, D::Error> {
                    let values: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
                    values
                        .into_iter()
                        .map(|v| super::deserialize(v).map_err(serde::de::Error::custom))
                        .collect()
                }
            }
        }
    };
}

define_base64_serde!(
    /// Serde adapter for bytes ↔ standard base64 with padding (the default
    /// `bytes_encoding`).
    bytes_base64,
    base64::engine::general_purpose::STANDARD
);

define_base64_serde!(
    /// Serde adapter for bytes ↔ standard base64, no padding.
    bytes_base64_raw,
    base64::engine::general_purpose::STANDARD_NO_PAD
);

define_base64_serde!(
    /// Serde adapter for bytes ↔ URL-safe base64 with padding.
    bytes_base64url,
    base64::engine::general_purpose::URL_SAFE
);

define_base64_serde!(
    /// Serde adapter for bytes ↔ URL-safe base64, no padding.
    bytes_base64url_raw,
    base64::engine::general_purpose::URL_SAFE_NO_PAD
);

/// Serde adapter for bytes ↔ lowercase hex.
pub mod bytes_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as a lowercase hex JSON string.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the serializer rejects the string.
    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(value))
    }

    /// Deserialize bytes from a hex JSON string (either case).
    ///
    /// # Errors
    ///
    /// Returns `D::Error` on odd length or non-hex characters.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode(&s).map_err(serde::de::Error::custom)
    }

    pub(crate) fn encode(value: &[u8]) -> String {
        use std::fmt::Write as _;
        let mut out = String::with_capacity(value.len() * 2);
        for byte in value {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    pub(crate) fn decode(s: &str) -> Result<Vec<u8>, String> {
        if s.len() % 2 != 0 {
            return Err("hex string has odd length".to_string());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| {
                u8::from_str_radix(&s[i..i + 2], 16)
                    .map_err(|_| format!("invalid hex at offset {i}"))
            })
            .collect()
    }

    /// Adapter for `Option<Vec<u8>>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod optional {
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize optional bytes as hex or null.
        #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize optional bytes from a hex string or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            let opt: Option<String> = Option::deserialize(deserializer)?;
            match opt {
                None => Ok(None),
                Some(s) => super::decode(&s).map(Some).map_err(serde::de::Error::custom),
            }
        }
    }

    /// Adapter for `Vec<Vec<u8>>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod repeated {
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize repeated bytes values as hex strings.
        pub fn serialize<S: Serializer>(
            values: &[Vec<u8>],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for v in values {
                seq.serialize_element(&super::encode(v))?;
            }
            seq.end()
        }

        /// Deserialize repeated bytes values from hex strings.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Vec<u8>>, D::Error> {
            let strings: Vec<String> = Vec::deserialize(deserializer)?;
            strings
                .into_iter()
                .map(|s| super::decode(&s).map_err(serde::de::Error::custom))
                .collect()
        }
    }
}

/// Generate `optional`-companion `repeated` adapters for a timestamp format
/// module (delegating element-wise to the parent module).
macro_rules! timestamp_repeated {
    () => {
        /// Adapter for `Vec<Timestamp>` fields.
        #[allow(clippy::missing_errors_doc)]
        pub mod repeated {
            use prost_types::Timestamp;
            use serde::ser::SerializeSeq;
            use serde::{Deserialize, Deserializer, Serializer};

            /// Serialize repeated timestamps element-wise.
            pub fn serialize<S: Serializer>(
                values: &[Timestamp],
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                struct Element<'a>(&'a Timestamp);
                impl serde::Serialize for Element<'_> {
                    fn serialize<S2: Serializer>(
                        &self,
                        serializer: S2,
                    ) -> Result<S2::Ok, S2::Error> {
                        super::serialize(self.0, serializer)
                    }
                }
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(&Element(value))?;
                }
                seq.end()
            }

            /// Deserialize repeated timestamps element-wise.
            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Vec<Timestamp>, D::Error> {
                let values: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
                values
                    .into_iter()
                    .map(|v| super::deserialize(v).map_err(serde::de::Error::custom))
                    .collect()
            }
        }
    };
}

/// Timestamp parsing shared by the four format adapters.
mod ts {
    use prost_types::Timestamp;

    pub(super) fn to_datetime(value: &Timestamp) -> Result<chrono::DateTime<chrono::Utc>, String> {
        let nanos =
            u32::try_from(value.nanos).map_err(|_| "negative nanos in Timestamp".to_string())?;
        chrono::DateTime::from_timestamp(value.seconds, nanos)
            .ok_or_else(|| "timestamp out of range".to_string())
    }

    pub(super) fn from_rfc3339(s: &str) -> Result<Timestamp, String> {
        let dt = chrono::DateTime::parse_from_rfc3339(s).map_err(|e| e.to_string())?;
        // `timestamp_subsec_nanos()` returns 0..=999_999_999, which always
        // fits in i32.
        #[allow(clippy::cast_possible_wrap)]
        Ok(Timestamp {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos() as i32,
        })
    }

    pub(super) fn from_date(s: &str) -> Result<Timestamp, String> {
        let date =
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| "date out of range".to_string())?;
        Ok(Timestamp {
            seconds: midnight.and_utc().timestamp(),
            nanos: 0,
        })
    }
}

/// Serde adapter for `Timestamp` ↔ RFC 3339 string (the default
/// `timestamp_format`).
///
/// Decoders match the format before parsing: a JSON number here is a decode
/// error, not a Unix timestamp.
pub mod timestamp_rfc3339 {
    use prost_types::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a `Timestamp` as an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the timestamp is out of range or has negative
    /// nanos.
    pub fn serialize<S: Serializer>(
        value: &Timestamp,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let dt = super::ts::to_datetime(value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
    }

    /// Deserialize a `Timestamp` from an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if the value is not a valid RFC 3339 string.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::ts::from_rfc3339(&s).map_err(serde::de::Error::custom)
    }

    /// Adapter for `Option<Timestamp>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod optional {
        use prost_types::Timestamp;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional `Timestamp` as an RFC 3339 string or null.
        #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional `Timestamp` from a string or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            let opt: Option<String> = Option::deserialize(deserializer)?;
            match opt {
                None => Ok(None),
                Some(s) => crate::serde::ts::from_rfc3339(&s)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
            }
        }
    }

    timestamp_repeated!();
}

/// Serde adapter for `Timestamp` ↔ `YYYY-MM-DD` date string.
///
/// The time-of-day portion is dropped on encode and read back as midnight
/// UTC; a full RFC 3339 string here is a decode error.
pub mod timestamp_date {
    use prost_types::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a `Timestamp` as its UTC calendar date.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the timestamp is out of range.
    pub fn serialize<S: Serializer>(
        value: &Timestamp,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let dt = super::ts::to_datetime(value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&dt.format("%Y-%m-%d").to_string())
    }

    /// Deserialize a `Timestamp` from a `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if the value is not a bare calendar date.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::ts::from_date(&s).map_err(serde::de::Error::custom)
    }

    /// Adapter for `Option<Timestamp>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod optional {
        use prost_types::Timestamp;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional `Timestamp` as a date string or null.
        #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional `Timestamp` from a date string or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            let opt: Option<String> = Option::deserialize(deserializer)?;
            match opt {
                None => Ok(None),
                Some(s) => crate::serde::ts::from_date(&s)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
            }
        }
    }

    timestamp_repeated!();
}

/// Serde adapter for `Timestamp` ↔ integer Unix seconds.
///
/// Sub-second precision is dropped on encode; a JSON string here is a decode
/// error.
pub mod timestamp_unix_seconds {
    use prost_types::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a `Timestamp` as Unix seconds.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the serializer rejects the number.
    pub fn serialize<S: Serializer>(
        value: &Timestamp,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.seconds)
    }

    /// Deserialize a `Timestamp` from integer Unix seconds.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if the value is not an integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Ok(Timestamp { seconds, nanos: 0 })
    }

    /// Adapter for `Option<Timestamp>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod optional {
        use prost_types::Timestamp;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional `Timestamp` as Unix seconds or null.
        #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional `Timestamp` from an integer or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            let opt: Option<i64> = Option::deserialize(deserializer)?;
            Ok(opt.map(|seconds| Timestamp { seconds, nanos: 0 }))
        }
    }

    timestamp_repeated!();
}

/// Serde adapter for `Timestamp` ↔ integer Unix milliseconds.
pub mod timestamp_unix_millis {
    use prost_types::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a `Timestamp` as Unix milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `S::Error` if the serializer rejects the number.
    pub fn serialize<S: Serializer>(
        value: &Timestamp,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let millis = value.seconds * 1_000 + i64::from(value.nanos) / 1_000_000;
        serializer.serialize_i64(millis)
    }

    /// Deserialize a `Timestamp` from integer Unix milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if the value is not an integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Ok(from_millis(millis))
    }

    pub(crate) fn from_millis(millis: i64) -> Timestamp {
        // rem_euclid keeps nanos non-negative for pre-epoch instants.
        #[allow(clippy::cast_possible_truncation)]
        Timestamp {
            seconds: millis.div_euclid(1_000),
            nanos: (millis.rem_euclid(1_000) * 1_000_000) as i32,
        }
    }

    /// Adapter for `Option<Timestamp>` fields.
    #[allow(clippy::missing_errors_doc)]
    pub mod optional {
        use prost_types::Timestamp;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional `Timestamp` as Unix milliseconds or null.
        #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional `Timestamp` from an integer or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            let opt: Option<i64> = Option::deserialize(deserializer)?;
            Ok(opt.map(super::from_millis))
        }
    }

    timestamp_repeated!();
}

/// Generate `#[serde(with)]` modules for a proto enum under NAME encoding.
///
/// The enum type must expose `as_json_name(self) -> &'static str` and
/// `from_json_name(&str) -> Option<Self>` — the generator emits both,
/// honoring `enum_value` overrides (the wire token defaults to the proto
/// value name). Deserialization accepts the wire token, the proto name, or a
/// raw integer for forward compatibility.
///
/// For each invocation, three modules are available:
/// - `{name}`            — for `i32` fields
/// - `{name}::optional`  — for `Option<i32>` fields
/// - `{name}::repeated`  — for `Vec<i32>` fields
///
/// NUMBER-encoded enum fields use no adapter; the raw `i32` is the wire form.
#[macro_export]
macro_rules! define_enum_serde {
    ($name:ident, $enum_type:ty) => {
        #[allow(clippy::missing_errors_doc)]
        pub mod $name {
            use serde::{Deserializer, Serializer};

            /// Serialize `i32` → wire token. Unknown numbers fall back to the
            /// raw integer, matching proto3 open-enum semantics.
            pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
                match <$enum_type>::try_from(*value) {
                    Ok(e) => serializer.serialize_str(e.as_json_name()),
                    Err(_) => serializer.serialize_i32(*value),
                }
            }

            /// Deserialize from a wire token, proto name, or integer.
            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<i32, D::Error> {
                use serde::de;

                struct EnumVisitor;

                impl de::Visitor<'_> for EnumVisitor {
                    type Value = i32;

                    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                        write!(f, "an enum token string or integer")
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> Result<i32, E> {
                        <$enum_type>::from_json_name(v).map(|e| e as i32).ok_or_else(
                            || {
                                E::custom(
                                    concat!("unknown ", stringify!($enum_type), " value: ")
                                        .to_string()
                                        + v,
                                )
                            },
                        )
                    }

                    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
                        i32::try_from(v).map_err(E::custom)
                    }

                    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
                        i32::try_from(v).map_err(E::custom)
                    }
                }

                deserializer.deserialize_any(EnumVisitor)
            }

            /// Adapter for `Option<i32>` enum fields.
            #[allow(clippy::missing_errors_doc)]
            pub mod optional {
                use serde::{Deserializer, Serializer};

                /// Serialize an optional enum as a wire token or null.
                #[allow(clippy::ref_option)] // serde `with` protocol requires `&Option<T>`
                pub fn serialize<S: Serializer>(
                    value: &Option<i32>,
                    serializer: S,
                ) -> Result<S::Ok, S::Error> {
                    match value {
                        Some(v) => super::serialize(v, serializer),
                        None => serializer.serialize_none(),
                    }
                }

                /// Deserialize an optional enum from a token, integer, or null.
                pub fn deserialize<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Option<i32>, D::Error> {
                    use serde::de;

                    struct OptionalEnumVisitor;

                    impl<'de> de::Visitor<'de> for OptionalEnumVisitor {
                        type Value = Option<i32>;

                        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                            write!(f, "an enum token string, integer, or null")
                        }

                        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                            Ok(None)
                        }

                        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                            Ok(None)
                        }

                        fn visit_some<D2: de::Deserializer<'de>>(
                            self,
                            deserializer: D2,
                        ) -> Result<Self::Value, D2::Error> {
                            super::deserialize(deserializer).map(Some)
                        }
                    }

                    deserializer.deserialize_option(OptionalEnumVisitor)
                }
            }

            /// Adapter for `Vec<i32>` repeated enum fields.
            #[allow(clippy::missing_errors_doc)]
            pub mod repeated {
                use serde::{Deserializer, Serializer};

                /// Serialize repeated enum values as wire tokens.
                pub fn serialize<S: Serializer>(
                    values: &[i32],
                    serializer: S,
                ) -> Result<S::Ok, S::Error> {
                    use serde::ser::SerializeSeq;

                    let mut seq = serializer.serialize_seq(Some(values.len()))?;
                    for v in values {
                        match <$enum_type>::try_from(*v) {
                            Ok(e) => seq.serialize_element(e.as_json_name())?,
                            Err(_) => seq.serialize_element(v)?,
                        }
                    }
                    seq.end()
                }

                /// Deserialize repeated enum values from tokens or integers.
                pub fn deserialize<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Vec<i32>, D::Error> {
                    use serde::de;

                    struct EnumSeqVisitor;

                    impl<'de> de::Visitor<'de> for EnumSeqVisitor {
                        type Value = Vec<i32>;

                        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                            write!(f, "a sequence of enum tokens or integers")
                        }

                        fn visit_seq<A: de::SeqAccess<'de>>(
                            self,
                            mut seq: A,
                        ) -> Result<Self::Value, A::Error> {
                            let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                            while let Some(val) = seq.next_element_seed(EnumSeed)? {
                                values.push(val);
                            }
                            Ok(values)
                        }
                    }

                    struct EnumSeed;

                    impl<'de> de::DeserializeSeed<'de> for EnumSeed {
                        type Value = i32;

                        fn deserialize<D2: de::Deserializer<'de>>(
                            self,
                            deserializer: D2,
                        ) -> Result<Self::Value, D2::Error> {
                            super::deserialize(deserializer)
                        }
                    }

                    deserializer.deserialize_seq(EnumSeqVisitor)
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use prost_types::Timestamp;
    use serde::{Deserialize, Serialize};

    // --- int64 ---

    #[derive(Serialize, Deserialize, Debug)]
    struct TsField {
        #[serde(with = "super::int64_str")]
        ts: i64,
    }

    #[test]
    fn int64_string_encoding_matches_canonical_json() {
        let v = TsField {
            ts: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"ts":"1700000000000"}"#);
        let back: TsField = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ts, 1_700_000_000_000);
    }

    #[test]
    fn int64_zero_is_string_zero() {
        let json = serde_json::to_string(&TsField { ts: 0 }).unwrap();
        assert_eq!(json, r#"{"ts":"0"}"#);
    }

    #[test]
    fn int64_decodes_bare_numbers_too() {
        let back: TsField = serde_json::from_str(r#"{"ts":42}"#).unwrap();
        assert_eq!(back.ts, 42);
    }

    #[test]
    fn int64_negative_round_trips() {
        let json = serde_json::to_string(&TsField { ts: -7 }).unwrap();
        assert_eq!(json, r#"{"ts":"-7"}"#);
        let back: TsField = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ts, -7);
    }

    #[test]
    fn int64_garbage_string_errors() {
        assert!(serde_json::from_str::<TsField>(r#"{"ts":"abc"}"#).is_err());
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct OptInt {
        #[serde(with = "super::int64_str::optional", default)]
        v: Option<i64>,
    }

    #[test]
    fn optional_int64_none_and_some() {
        let json = serde_json::to_string(&OptInt { v: None }).unwrap();
        assert_eq!(json, r#"{"v":null}"#);
        let back: OptInt = serde_json::from_str(r#"{"v":"9007199254740993"}"#).unwrap();
        assert_eq!(back.v, Some(9_007_199_254_740_993));
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct RepInt {
        #[serde(with = "super::int64_str::repeated")]
        v: Vec<i64>,
    }

    #[test]
    fn repeated_int64_round_trips() {
        let json = serde_json::to_string(&RepInt { v: vec![1, 2] }).unwrap();
        assert_eq!(json, r#"{"v":["1","2"]}"#);
        let back: RepInt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.v, vec![1, 2]);
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct UintField {
        #[serde(with = "super::uint64_str")]
        v: u64,
    }

    #[test]
    fn uint64_round_trips_above_2_53() {
        let v = UintField {
            v: u64::MAX,
        };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"v":"18446744073709551615"}"#);
        let back: UintField = serde_json::from_str(&json).unwrap();
        assert_eq!(back.v, u64::MAX);
    }

    #[test]
    fn uint64_rejects_negative() {
        assert!(serde_json::from_str::<UintField>(r#"{"v":-1}"#).is_err());
    }

    // --- maps ---

    use std::collections::HashMap;

    #[derive(Serialize, Deserialize, Debug)]
    struct IntKeyed {
        #[serde(with = "super::map_key")]
        counts: HashMap<i32, String>,
    }

    #[test]
    fn integer_map_keys_become_strings() {
        let mut counts = HashMap::new();
        counts.insert(2, "two".to_string());
        counts.insert(1, "one".to_string());
        let json = serde_json::to_string(&IntKeyed { counts }).unwrap();
        assert_eq!(json, r#"{"counts":{"1":"one","2":"two"}}"#);
        let back: IntKeyed = serde_json::from_str(&json).unwrap();
        assert_eq!(back.counts.get(&1).map(String::as_str), Some("one"));
    }

    #[test]
    fn map_key_parse_failure_errors() {
        assert!(serde_json::from_str::<IntKeyed>(r#"{"counts":{"x":"one"}}"#).is_err());
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct TotalsByUser {
        #[serde(with = "super::map_int64_str")]
        totals: HashMap<String, i64>,
    }

    #[test]
    fn int64_map_values_are_strings() {
        let mut totals = HashMap::new();
        totals.insert("ada".to_string(), 9_007_199_254_740_993_i64);
        let json = serde_json::to_string(&TotalsByUser { totals }).unwrap();
        assert_eq!(json, r#"{"totals":{"ada":"9007199254740993"}}"#);
        let back: TotalsByUser = serde_json::from_str(&json).unwrap();
        assert_eq!(back.totals["ada"], 9_007_199_254_740_993);
    }

    // --- bytes ---

    #[derive(Serialize, Deserialize, Debug)]
    struct B64 {
        #[serde(with = "super::bytes_base64")]
        data: Vec<u8>,
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct B64Url {
        #[serde(with = "super::bytes_base64url")]
        data: Vec<u8>,
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct Hex {
        #[serde(with = "super::bytes_hex")]
        data: Vec<u8>,
    }

    #[test]
    fn base64_default_pads() {
        let json = serde_json::to_string(&B64 {
            data: b"hi".to_vec(),
        })
        .unwrap();
        assert_eq!(json, r#"{"data":"aGk="}"#);
        let back: B64 = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, b"hi");
    }

    #[test]
    fn base64url_uses_url_alphabet() {
        // 0xfb 0xff encodes to "-_8=" in the URL-safe alphabet ("+/" standard).
        let json = serde_json::to_string(&B64Url {
            data: vec![0xfb, 0xff],
        })
        .unwrap();
        assert_eq!(json, r#"{"data":"-_8="}"#);
    }

    #[test]
    fn hex_round_trips() {
        let json = serde_json::to_string(&Hex {
            data: vec![0xde, 0xad, 0xbe, 0xef],
        })
        .unwrap();
        assert_eq!(json, r#"{"data":"deadbeef"}"#);
        let back: Hex = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn hex_rejects_odd_length() {
        assert!(serde_json::from_str::<Hex>(r#"{"data":"abc"}"#).is_err());
    }

    // --- timestamps ---

    #[derive(Serialize, Deserialize, Debug)]
    struct Rfc {
        #[serde(with = "super::timestamp_rfc3339")]
        at: Timestamp,
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct DateOnly {
        #[serde(with = "super::timestamp_date")]
        at: Timestamp,
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct UnixSecs {
        #[serde(with = "super::timestamp_unix_seconds")]
        at: Timestamp,
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct UnixMillis {
        #[serde(with = "super::timestamp_unix_millis")]
        at: Timestamp,
    }

    const JAN_15_2025: i64 = 1_736_934_600; // 2025-01-15T09:50:00Z

    #[test]
    fn rfc3339_round_trips() {
        let v = Rfc {
            at: Timestamp {
                seconds: JAN_15_2025,
                nanos: 0,
            },
        };
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("2025-01-15"), "date present: {json}");
        let back: Rfc = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at.seconds, JAN_15_2025);
    }

    #[test]
    fn rfc3339_rejects_numbers() {
        assert!(serde_json::from_str::<Rfc>(r#"{"at":1736934600}"#).is_err());
    }

    #[test]
    fn date_format_drops_time_of_day() {
        let v = DateOnly {
            at: Timestamp {
                seconds: JAN_15_2025,
                nanos: 0,
            },
        };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"at":"2025-01-15"}"#);
        let back: DateOnly = serde_json::from_str(&json).unwrap();
        // Midnight UTC of the same day.
        assert_eq!(back.at.seconds, 1_736_899_200);
    }

    #[test]
    fn date_format_rejects_datetime_strings() {
        assert!(serde_json::from_str::<DateOnly>(r#"{"at":"2025-01-15T09:50:00Z"}"#).is_err());
    }

    #[test]
    fn unix_seconds_round_trips() {
        let json = serde_json::to_string(&UnixSecs {
            at: Timestamp {
                seconds: JAN_15_2025,
                nanos: 500,
            },
        })
        .unwrap();
        assert_eq!(json, r#"{"at":1736934600}"#);
        let back: UnixSecs = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at.seconds, JAN_15_2025);
        assert_eq!(back.at.nanos, 0);
    }

    #[test]
    fn unix_seconds_rejects_strings() {
        assert!(serde_json::from_str::<UnixSecs>(r#"{"at":"1736934600"}"#).is_err());
    }

    #[test]
    fn unix_millis_round_trips() {
        let json = serde_json::to_string(&UnixMillis {
            at: Timestamp {
                seconds: JAN_15_2025,
                nanos: 250_000_000,
            },
        })
        .unwrap();
        assert_eq!(json, r#"{"at":1736934600250}"#);
        let back: UnixMillis = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at.seconds, JAN_15_2025);
        assert_eq!(back.at.nanos, 250_000_000);
    }

    #[test]
    fn unix_millis_pre_epoch_keeps_nanos_positive() {
        let ts = super::timestamp_unix_millis::from_millis(-1);
        assert_eq!(ts.seconds, -1);
        assert_eq!(ts.nanos, 999_000_000);
    }

    // --- enums ---

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[repr(i32)]
    enum OrderStatus {
        Unspecified = 0,
        Open = 1,
        Filled = 2,
    }

    impl OrderStatus {
        fn as_json_name(self) -> &'static str {
            match self {
                Self::Unspecified => "ORDER_STATUS_UNSPECIFIED",
                Self::Open => "open",
                Self::Filled => "filled",
            }
        }

        fn from_json_name(s: &str) -> Option<Self> {
            match s {
                "ORDER_STATUS_UNSPECIFIED" => Some(Self::Unspecified),
                "open" | "ORDER_STATUS_OPEN" => Some(Self::Open),
                "filled" | "ORDER_STATUS_FILLED" => Some(Self::Filled),
                _ => None,
            }
        }
    }

    impl TryFrom<i32> for OrderStatus {
        type Error = &'static str;
        fn try_from(value: i32) -> Result<Self, Self::Error> {
            match value {
                0 => Ok(Self::Unspecified),
                1 => Ok(Self::Open),
                2 => Ok(Self::Filled),
                _ => Err("unknown"),
            }
        }
    }

    define_enum_serde!(order_status, crate::serde::tests::OrderStatus);

    #[derive(Serialize, Deserialize, Debug)]
    struct StatusField {
        #[serde(with = "order_status")]
        status: i32,
    }

    #[derive(Serialize, Deserialize, Debug)]
    struct RepStatus {
        #[serde(with = "order_status::repeated")]
        statuses: Vec<i32>,
    }

    #[test]
    fn enum_serializes_wire_token() {
        let json = serde_json::to_string(&StatusField { status: 1 }).unwrap();
        assert_eq!(json, r#"{"status":"open"}"#);
    }

    #[test]
    fn enum_decodes_token_proto_name_and_integer() {
        let a: StatusField = serde_json::from_str(r#"{"status":"open"}"#).unwrap();
        assert_eq!(a.status, 1);
        let b: StatusField = serde_json::from_str(r#"{"status":"ORDER_STATUS_OPEN"}"#).unwrap();
        assert_eq!(b.status, 1);
        let c: StatusField = serde_json::from_str(r#"{"status":2}"#).unwrap();
        assert_eq!(c.status, 2);
    }

    #[test]
    fn enum_unknown_token_errors() {
        assert!(serde_json::from_str::<StatusField>(r#"{"status":"closed"}"#).is_err());
    }

    #[test]
    fn enum_unknown_number_serializes_as_integer() {
        let json = serde_json::to_string(&StatusField { status: 99 }).unwrap();
        assert_eq!(json, r#"{"status":99}"#);
    }

    #[test]
    fn repeated_enum_round_trips() {
        let json = serde_json::to_string(&RepStatus {
            statuses: vec![1, 2, 99],
        })
        .unwrap();
        assert_eq!(json, r#"{"statuses":["open","filled",99]}"#);
        let back: RepStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back.statuses, vec![1, 2, 99]);
    }
}
