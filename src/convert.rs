//! Message to JSON conversion and back.

use std::{collections::HashMap, sync::Arc};

use prost::Message;
use prost_reflect::{
    DescriptorPool, DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor,
    ReflectMessage, Value as ProtoValue,
};
use serde_json::{Map, Value};

use crate::{
    ConversionPolicy, ConvertError, DescriptorCache, ErrorKind, enums, names,
    value::{bytes_to_json, f32_to_json, f64_to_json, map_key_from_str, map_key_to_string, scalar_from_json},
};

/// Message types whose content has no fixed schema to resolve names against.
const SCHEMALESS_MESSAGES: [&str; 4] = [
    "google.protobuf.Struct",
    "google.protobuf.Value",
    "google.protobuf.ListValue",
    "google.protobuf.Any",
];

/// Converts protobuf messages to JSON documents and back under a
/// [`ConversionPolicy`].
///
/// Cloning is cheap; clones share the policy and the descriptor cache.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    policy: Arc<ConversionPolicy>,
    cache: Arc<DescriptorCache>,
}

impl Converter {
    /// Create a converter with its own descriptor cache.
    pub fn new(policy: ConversionPolicy) -> Self {
        Self::with_cache(policy, Arc::new(DescriptorCache::new()))
    }

    /// Create a converter sharing an existing descriptor cache.
    pub fn with_cache(policy: ConversionPolicy, cache: Arc<DescriptorCache>) -> Self {
        Self {
            policy: Arc::new(policy),
            cache,
        }
    }

    pub fn policy(&self) -> &ConversionPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// Convert a message to a JSON object.
    ///
    /// Only populated fields are written, in declaration order.
    pub fn to_json<M: ReflectMessage>(&self, message: &M) -> Value {
        self.dynamic_to_json(&message.transcode_to_dynamic())
    }

    /// Convert a dynamic message to a JSON object.
    pub fn dynamic_to_json(&self, message: &DynamicMessage) -> Value {
        tracing::trace!(schema = %message.descriptor().full_name(), "converting message to JSON");
        self.message_to_json(message)
    }

    /// Convert a message to compact JSON text.
    pub fn to_json_string<M: ReflectMessage>(&self, message: &M) -> String {
        self.to_json(message).to_string()
    }

    /// Decode a protobuf payload and convert it to a JSON object.
    pub fn decode_to_json(&self, desc: &MessageDescriptor, data: &[u8]) -> Result<Value, ConvertError> {
        let message = DynamicMessage::decode(desc.clone(), data)
            .map_err(|e| ConvertError::new(desc.full_name(), ErrorKind::Decode(e)))?;
        Ok(self.dynamic_to_json(&message))
    }

    /// Build a message of type `target` from a JSON object.
    ///
    /// Members missing from the object or set to `null` leave their field unset.
    /// Members that match no field are ignored.
    pub fn from_json(&self, json: &Value, target: &MessageDescriptor) -> Result<DynamicMessage, ConvertError> {
        tracing::trace!(schema = %target.full_name(), "converting JSON to message");
        self.json_to_message(json, target).map_err(|kind| {
            tracing::debug!(schema = %target.full_name(), error = %kind, "JSON conversion failed");
            ConvertError::new(target.full_name(), kind)
        })
    }

    /// Build a compiled message of type `T` from a JSON object.
    pub fn from_json_as<T>(&self, json: &Value) -> Result<T, ConvertError>
    where
        T: ReflectMessage + Default + 'static,
    {
        let desc = self.cache.descriptor::<T>();
        let message = self.from_json(json, &desc)?;
        message.transcode_to::<T>().map_err(|e| {
            ConvertError::new(
                desc.full_name(),
                ErrorKind::SchemaMismatch {
                    message: desc.full_name().to_string(),
                    detail: e.to_string(),
                },
            )
        })
    }

    /// Build a message of the type named `name` in `pool` from a JSON object.
    pub fn from_json_named(
        &self,
        json: &Value,
        pool: &DescriptorPool,
        name: &str,
    ) -> Result<DynamicMessage, ConvertError> {
        let desc = pool.get_message_by_name(name).ok_or_else(|| {
            ConvertError::new(
                name,
                ErrorKind::SchemaMismatch {
                    message: name.to_string(),
                    detail: format!("message descriptor not found: '{name}'"),
                },
            )
        })?;
        self.from_json(json, &desc)
    }

    /// Parse JSON text and build a message of type `target` from it.
    pub fn from_json_str(&self, text: &str, target: &MessageDescriptor) -> Result<DynamicMessage, ConvertError> {
        let json: Value = serde_json::from_str(text)
            .map_err(|e| ConvertError::new(target.full_name(), ErrorKind::Json(e)))?;
        self.from_json(&json, target)
    }

    /// Build a message of type `target` from a JSON object and encode it.
    pub fn encode_from_json(&self, json: &Value, target: &MessageDescriptor) -> Result<Vec<u8>, ConvertError> {
        Ok(self.from_json(json, target)?.encode_to_vec())
    }

    fn message_to_json(&self, message: &DynamicMessage) -> Value {
        let mut map = Map::new();
        for field in message.descriptor().fields() {
            if !message.has_field(&field) {
                continue;
            }
            let name = names::field_name(&self.policy, &field);
            let value = message.get_field(&field);
            map.insert(name, self.value_to_json(&value, &field.kind()));
        }
        Value::Object(map)
    }

    fn value_to_json(&self, value: &ProtoValue, kind: &Kind) -> Value {
        match value {
            ProtoValue::Bool(v) => Value::Bool(*v),
            ProtoValue::I32(v) => Value::from(*v),
            ProtoValue::I64(v) => Value::from(*v),
            ProtoValue::U32(v) => Value::from(*v),
            ProtoValue::U64(v) => Value::from(*v),
            ProtoValue::F32(v) => f32_to_json(*v),
            ProtoValue::F64(v) => f64_to_json(*v),
            ProtoValue::String(s) => Value::String(s.clone()),
            ProtoValue::Bytes(b) => bytes_to_json(b, self.policy.bytes_encoding()),
            ProtoValue::EnumNumber(n) => match kind {
                Kind::Enum(desc) => enums::number_to_json(&self.policy, desc, *n),
                _ => Value::from(*n),
            },
            ProtoValue::Message(m) => self.message_to_json(m),
            // Repeated enums land here too: the array is built whole and
            // inserted under the field name once.
            ProtoValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.value_to_json(item, kind))
                    .collect(),
            ),
            ProtoValue::Map(entries) => self.map_to_json(entries, kind),
        }
    }

    fn map_to_json(&self, entries: &HashMap<MapKey, ProtoValue>, kind: &Kind) -> Value {
        let value_kind = match kind {
            Kind::Message(entry_desc) if entry_desc.is_map_entry() => {
                entry_desc.map_entry_value_field().kind()
            }
            _ => kind.clone(),
        };
        let mut members: Vec<(String, Value)> = entries
            .iter()
            .map(|(key, value)| (map_key_to_string(key), self.value_to_json(value, &value_kind)))
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Object(members.into_iter().collect())
    }

    fn json_to_message(&self, json: &Value, desc: &MessageDescriptor) -> Result<DynamicMessage, ErrorKind> {
        if SCHEMALESS_MESSAGES.contains(&desc.full_name()) {
            return Err(ErrorKind::UnsupportedTarget {
                message: desc.full_name().to_string(),
            });
        }
        let Value::Object(object) = json else {
            return Err(ErrorKind::malformed(desc.full_name(), "object", json));
        };

        let mut builder = DynamicMessage::new(desc.clone());
        for field in desc.fields() {
            let name = names::field_name(&self.policy, &field);
            let Some(entry) = object.get(&name).filter(|v| !v.is_null()) else {
                continue;
            };
            let value = self.field_from_json(entry, &field)?;
            builder
                .try_set_field(&field, value)
                .map_err(|e| ErrorKind::SchemaMismatch {
                    message: desc.full_name().to_string(),
                    detail: e.to_string(),
                })?;
        }
        Ok(builder)
    }

    fn field_from_json(&self, json: &Value, field: &FieldDescriptor) -> Result<ProtoValue, ErrorKind> {
        let kind = field.kind();
        if field.is_map() {
            return self.map_from_json(json, field, &kind);
        }
        match (json, field.is_list()) {
            (Value::Array(items), true) => items
                .iter()
                .map(|item| self.element_from_json(item, field.full_name(), &kind))
                .collect::<Result<Vec<_>, _>>()
                .map(ProtoValue::List),
            (_, true) => Err(ErrorKind::malformed(field.full_name(), "array", json)),
            // Under `BytesEncoding::ByteArray` a singular bytes field is an array.
            (Value::Array(_), false) if !matches!(kind, Kind::Bytes) => {
                Err(ErrorKind::malformed(field.full_name(), "single value", json))
            }
            (_, false) => self.element_from_json(json, field.full_name(), &kind),
        }
    }

    fn element_from_json(&self, json: &Value, target: &str, kind: &Kind) -> Result<ProtoValue, ErrorKind> {
        match kind {
            Kind::Enum(desc) => enums::from_json(&self.policy, desc, json)
                .map(|value| ProtoValue::EnumNumber(value.number())),
            Kind::Message(desc) => self.json_to_message(json, desc).map(ProtoValue::Message),
            scalar => scalar_from_json(json, scalar, self.policy.bytes_encoding(), target),
        }
    }

    fn map_from_json(&self, json: &Value, field: &FieldDescriptor, kind: &Kind) -> Result<ProtoValue, ErrorKind> {
        let Kind::Message(entry_desc) = kind else {
            return Err(ErrorKind::SchemaMismatch {
                message: field.parent_message().full_name().to_string(),
                detail: format!("map field `{}` has non-message kind", field.name()),
            });
        };
        let Value::Object(object) = json else {
            return Err(ErrorKind::malformed(field.full_name(), "object", json));
        };

        let key_kind = entry_desc.map_entry_key_field().kind();
        let value_kind = entry_desc.map_entry_value_field().kind();
        object
            .iter()
            .map(|(key, value)| {
                let key = map_key_from_str(key, &key_kind, field.full_name())?;
                let value = self.element_from_json(value, field.full_name(), &value_kind)?;
                Ok((key, value))
            })
            .collect::<Result<HashMap<_, _>, ErrorKind>>()
            .map(ProtoValue::Map)
    }
}
