//! Round-trip checks for the JSON wire rewrites.
//!
//! The types here are shaped exactly like `protoc-gen-rest-server` output —
//! prost derives plus serde attributes, with hand-rolled impls where the
//! generator emits them (unwrap wrappers, flatten, discriminated oneofs) —
//! so these tests pin the wire format the generated server, client, and
//! TypeScript codec all agree on.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

// --- map-value unwrap -----------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct Bar {
    #[prost(string, tag = "1")]
    #[serde(default)]
    symbol: String,
    #[prost(double, tag = "2")]
    #[serde(default)]
    price: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
struct BarList {
    #[prost(message, repeated, tag = "1")]
    bars: Vec<Bar>,
}

impl Serialize for BarList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;
        let value = serde_json::to_value(&self.bars).map_err(S::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BarList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;
        let value = serde_json::Value::deserialize(deserializer)?;
        let mut message = Self::default();
        message.bars = serde_json::from_value(value).map_err(D::Error::custom)?;
        Ok(message)
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct Resp {
    #[prost(map = "string, message", tag = "1")]
    #[serde(default)]
    bars: HashMap<String, BarList>,
}

#[test]
fn map_value_unwrap_collapses_the_wrapper() {
    let resp = Resp {
        bars: [(
            "AAPL".to_string(),
            BarList {
                bars: vec![Bar {
                    symbol: "AAPL".to_string(),
                    price: 150.0,
                }],
            },
        )]
        .into_iter()
        .collect(),
    };

    let json = serde_json::to_string(&resp).unwrap();
    assert_eq!(
        json,
        r#"{"bars":{"AAPL":[{"symbol":"AAPL","price":150.0}]}}"#,
    );

    let back: Resp = serde_json::from_str(&json).unwrap();
    assert_eq!(back, resp);
}

// --- root unwrap combined with map-value unwrap ---------------------------

#[derive(Clone, PartialEq, prost::Message)]
struct Resp2 {
    #[prost(map = "string, message", tag = "1")]
    data: HashMap<String, BarList>,
}

impl Serialize for Resp2 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;
        let value = serde_json::to_value(&self.data).map_err(S::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Resp2 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;
        let value = serde_json::Value::deserialize(deserializer)?;
        let mut message = Self::default();
        message.data = serde_json::from_value(value).map_err(D::Error::custom)?;
        Ok(message)
    }
}

#[test]
fn root_unwrap_serializes_the_map_at_the_root() {
    let resp = Resp2 {
        data: [(
            "AAPL".to_string(),
            BarList {
                bars: vec![Bar {
                    symbol: "AAPL".to_string(),
                    price: 150.0,
                }],
            },
        )]
        .into_iter()
        .collect(),
    };

    let json = serde_json::to_string(&resp).unwrap();
    assert_eq!(json, r#"{"AAPL":[{"symbol":"AAPL","price":150.0}]}"#);

    let back: Resp2 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, resp);
}

// --- int64 encodings ------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct EventString {
    #[prost(int64, tag = "1")]
    #[serde(with = "proto_rest::serde::int64_str", default)]
    ts: i64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct EventNumber {
    #[prost(int64, tag = "1")]
    #[serde(default)]
    ts: i64,
}

#[test]
fn int64_default_encoding_is_a_string() {
    let json = serde_json::to_string(&EventString {
        ts: 1_700_000_000_000,
    })
    .unwrap();
    assert_eq!(json, r#"{"ts":"1700000000000"}"#);
    let back: EventString = serde_json::from_str(&json).unwrap();
    assert_eq!(back.ts, 1_700_000_000_000);
}

#[test]
fn int64_number_encoding_is_a_number() {
    let json = serde_json::to_string(&EventNumber {
        ts: 1_700_000_000_000,
    })
    .unwrap();
    assert_eq!(json, r#"{"ts":1700000000000}"#);
}

// --- discriminated flattened oneof ----------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct EmailAuth {
    #[prost(string, tag = "1")]
    #[serde(default)]
    address: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    password: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct TokenAuth {
    #[prost(string, tag = "1")]
    #[serde(default)]
    token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
struct Login {
    #[prost(oneof = "LoginMethod", tags = "1, 2")]
    method: Option<LoginMethod>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
enum LoginMethod {
    #[prost(message, tag = "1")]
    Email(EmailAuth),
    #[prost(message, tag = "2")]
    Token(TokenAuth),
}

impl Serialize for Login {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;
        let mut object = serde_json::Map::new();
        match &self.method {
            Some(LoginMethod::Email(value)) => {
                object.insert(
                    "kind".to_string(),
                    serde_json::Value::String("email".to_string()),
                );
                let child = serde_json::to_value(value).map_err(S::Error::custom)?;
                proto_rest::json::merge_flattened(&mut object, child, "");
            }
            Some(LoginMethod::Token(value)) => {
                object.insert(
                    "kind".to_string(),
                    serde_json::Value::String("token".to_string()),
                );
                let child = serde_json::to_value(value).map_err(S::Error::custom)?;
                proto_rest::json::merge_flattened(&mut object, child, "");
            }
            None => {}
        }
        object.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Login {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;
        let value = serde_json::Value::deserialize(deserializer)?;
        let serde_json::Value::Object(mut object) = value else {
            return Err(D::Error::custom("expected a JSON object"));
        };
        let mut message = Self::default();
        if let Some(tag) = object.remove("kind") {
            let tag = tag
                .as_str()
                .ok_or_else(|| D::Error::custom("discriminator 'kind' must be a string"))?
                .to_string();
            message.method = Some(match tag.as_str() {
                "email" => LoginMethod::Email(
                    serde_json::from_value(serde_json::Value::Object(object.clone()))
                        .map_err(D::Error::custom)?,
                ),
                "token" => LoginMethod::Token(
                    serde_json::from_value(serde_json::Value::Object(object.clone()))
                        .map_err(D::Error::custom)?,
                ),
                _ => {
                    return Err(D::Error::custom(proto_rest::json::UnknownVariant::new(
                        "kind", &tag,
                    )))
                }
            });
        }
        Ok(message)
    }
}

#[test]
fn flattened_discriminator_inlines_variant_fields() {
    let login = Login {
        method: Some(LoginMethod::Email(EmailAuth {
            address: "a@b".to_string(),
            password: "p".to_string(),
        })),
    };
    let json = serde_json::to_string(&login).unwrap();
    assert_eq!(json, r#"{"kind":"email","address":"a@b","password":"p"}"#);

    let back: Login = serde_json::from_str(&json).unwrap();
    assert_eq!(back, login);
}

#[test]
fn discriminator_selects_the_variant_on_decode() {
    let back: Login = serde_json::from_str(r#"{"kind":"token","token":"x"}"#).unwrap();
    assert_eq!(
        back.method,
        Some(LoginMethod::Token(TokenAuth {
            token: "x".to_string(),
        })),
    );
}

#[test]
fn unknown_discriminator_value_is_a_typed_failure() {
    let err = serde_json::from_str::<Login>(r#"{"kind":"sms","number":"1"}"#).unwrap_err();
    assert!(
        err.to_string()
            .contains("unknown discriminator value 'sms' for 'kind'"),
        "error: {err}",
    );
}

#[test]
fn absent_oneof_round_trips_as_empty_object() {
    let json = serde_json::to_string(&Login { method: None }).unwrap();
    assert_eq!(json, "{}");
    let back: Login = serde_json::from_str(&json).unwrap();
    assert_eq!(back.method, None);
}

// --- prefixed flatten -----------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct Address {
    #[prost(string, tag = "1")]
    #[serde(default)]
    street: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    zip: String,
}

#[derive(Clone, PartialEq, prost::Message)]
struct Depot {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(message, optional, tag = "2")]
    address: Option<Address>,
}

impl Serialize for Depot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;
        let mut object = serde_json::Map::new();
        object.insert(
            "name".to_string(),
            serde_json::to_value(&self.name).map_err(S::Error::custom)?,
        );
        if let Some(child) = &self.address {
            let child = serde_json::to_value(child).map_err(S::Error::custom)?;
            proto_rest::json::merge_flattened(&mut object, child, "addr_");
        }
        object.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Depot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;
        let value = serde_json::Value::deserialize(deserializer)?;
        let serde_json::Value::Object(mut object) = value else {
            return Err(D::Error::custom("expected a JSON object"));
        };
        let mut message = Self::default();
        if let Some(value) = object.remove("name") {
            if !value.is_null() {
                message.name = serde_json::from_value(value).map_err(D::Error::custom)?;
            }
        }
        {
            let child =
                proto_rest::json::split_flattened(&mut object, "addr_", &["street", "zip"]);
            if !child.is_empty() {
                message.address = Some(
                    serde_json::from_value(serde_json::Value::Object(child))
                        .map_err(D::Error::custom)?,
                );
            }
        }
        Ok(message)
    }
}

#[test]
fn prefixed_flatten_round_trips() {
    let depot = Depot {
        name: "central".to_string(),
        address: Some(Address {
            street: "Main".to_string(),
            zip: "10001".to_string(),
        }),
    };
    let json = serde_json::to_string(&depot).unwrap();
    assert_eq!(
        json,
        r#"{"name":"central","addr_street":"Main","addr_zip":"10001"}"#,
    );
    let back: Depot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, depot);
}

#[test]
fn absent_flattened_child_stays_absent() {
    let depot = Depot {
        name: "central".to_string(),
        address: None,
    };
    let json = serde_json::to_string(&depot).unwrap();
    assert_eq!(json, r#"{"name":"central"}"#);
    let back: Depot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.address, None);
}

// --- boundary shapes ------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct Nothing {}

#[test]
fn zero_field_message_round_trips_as_empty_object() {
    let json = serde_json::to_string(&Nothing {}).unwrap();
    assert_eq!(json, "{}");
    let back: Nothing = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Nothing {});
}

#[test]
fn empty_validation_error_keeps_its_violations_key() {
    let err = proto_rest::ValidationError::new(vec![]);
    assert_eq!(serde_json::to_string(&err).unwrap(), r#"{"violations":[]}"#);
    let back: proto_rest::ValidationError =
        serde_json::from_str(r#"{"violations":[]}"#).unwrap();
    assert!(back.is_empty());
}
