//! Enum value conversion.

use prost_reflect::{EnumDescriptor, EnumValueDescriptor};
use serde_json::Value;

use crate::{ConversionPolicy, EnumRepresentation, ErrorKind, names, value};

/// JSON representation of an enum value under `policy`.
pub fn to_json(policy: &ConversionPolicy, value: &EnumValueDescriptor) -> Value {
    match policy.enum_representation() {
        EnumRepresentation::ByName => Value::String(names::enum_value_name(policy, value)),
        EnumRepresentation::ByNumber => Value::from(value.number()),
    }
}

/// JSON representation of a raw enum number.
///
/// Numbers without a declared value are always written as JSON numbers.
pub fn number_to_json(policy: &ConversionPolicy, desc: &EnumDescriptor, number: i32) -> Value {
    match desc.get_value(number) {
        Some(value) => to_json(policy, &value),
        None => Value::from(number),
    }
}

/// Find the value of `desc` that `json` represents under `policy`.
///
/// By name, values are scanned in declaration order and the first one whose
/// JSON name equals the string wins.
pub fn from_json(
    policy: &ConversionPolicy,
    desc: &EnumDescriptor,
    json: &Value,
) -> Result<EnumValueDescriptor, ErrorKind> {
    match policy.enum_representation() {
        EnumRepresentation::ByName => {
            let Some(name) = json.as_str() else {
                return Err(ErrorKind::malformed(desc.full_name(), "enum name", json));
            };
            desc.values()
                .find(|value| names::enum_value_name(policy, value) == name)
                .ok_or_else(|| ErrorKind::UnknownEnumName {
                    enum_name: desc.full_name().to_string(),
                    name: name.to_string(),
                })
        }
        EnumRepresentation::ByNumber => {
            let Some(number) = value::integral_number(json).and_then(|n| i32::try_from(n).ok()) else {
                return Err(ErrorKind::malformed(desc.full_name(), "enum number", json));
            };
            desc.get_value(number)
                .ok_or_else(|| ErrorKind::UnknownEnumNumber {
                    enum_name: desc.full_name().to_string(),
                    number,
                })
        }
    }
}
