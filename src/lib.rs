//! # protobuf-json-adapter
//!
//! Converts protobuf messages to JSON documents and back, driven by the message schema
//!
//! ## Features
//! * Enums written by name or by number
//! * Field names converted between case formats (`os_build_id` <-> `osBuildId` by default)
//! * Field and enum value names overridden by custom options declared in the schema
//! * Configurable bytes encoding (base64, byte array, etc.)
//! * Works on [`DynamicMessage`](prost_reflect::DynamicMessage) and on compiled types
//!   implementing [`ReflectMessage`](prost_reflect::ReflectMessage)
//!
//! ## Limitations
//! * Schema-less representations (`google.protobuf.Struct`, `Value`, `ListValue`, `Any`)
//!   cannot be conversion targets.
//! * Extension fields of messages are not converted.
//! * `Auto` and `StringLossy` bytes encodings are not invertible for non-text payloads.
//!
//! ## Examples
//!
//! ``` rust
//! use prost::Message;
//! use prost_reflect::{DescriptorPool, DynamicMessage, Value};
//! use prost_types::{
//!     DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
//!     field_descriptor_proto::{Label, Type},
//! };
//! use protobuf_json_adapter::Converter;
//! use serde_json::json;
//!
//! let fds = FileDescriptorSet {
//!     file: vec![FileDescriptorProto {
//!         name: Some("device.proto".to_string()),
//!         package: Some("demo".to_string()),
//!         syntax: Some("proto3".to_string()),
//!         message_type: vec![DescriptorProto {
//!             name: Some("Device".to_string()),
//!             field: vec![FieldDescriptorProto {
//!                 name: Some("os_build_id".to_string()),
//!                 number: Some(1),
//!                 r#type: Some(Type::String.into()),
//!                 label: Some(Label::Optional.into()),
//!                 ..Default::default()
//!             }],
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//! };
//! let pool = DescriptorPool::decode(fds.encode_to_vec().as_slice()).unwrap();
//! let desc = pool.get_message_by_name("demo.Device").unwrap();
//!
//! let mut device = DynamicMessage::new(desc.clone());
//! device.set_field_by_name("os_build_id", Value::String("17A5".to_string()));
//!
//! let converter = Converter::default();
//! let json = converter.dynamic_to_json(&device);
//! assert_eq!(json, json!({ "osBuildId": "17A5" }));
//! assert_eq!(converter.from_json(&json, &desc).unwrap(), device);
//! ```
//!

mod cache;
mod case;
mod config;
mod convert;
pub mod enums;
mod error;
pub mod names;
mod policy;
mod value;

pub use cache::DescriptorCache;
pub use case::CaseFormat;
pub use config::PolicyConfig;
pub use convert::Converter;
pub use error::{ConvertError, ErrorKind, PolicyError};
pub use policy::{BytesEncoding, ConversionPolicy, EnumRepresentation, PolicyBuilder};
