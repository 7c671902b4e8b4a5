//! External name resolution for fields and enum values.

use prost_reflect::{DynamicMessage, EnumValueDescriptor, ExtensionDescriptor, FieldDescriptor};

use crate::ConversionPolicy;

/// JSON member name of `field`.
///
/// The first registered field name override present on the field wins;
/// otherwise the field name is converted between the policy's case formats.
pub fn field_name(policy: &ConversionPolicy, field: &FieldDescriptor) -> String {
    override_name(policy.field_name_overrides(), || field.options())
        .unwrap_or_else(|| policy.schema_case().convert(policy.json_case(), field.name()))
}

/// JSON name of an enum value.
///
/// The first registered enum value override present on the value wins;
/// otherwise the declared name is used verbatim.
pub fn enum_value_name(policy: &ConversionPolicy, value: &EnumValueDescriptor) -> String {
    override_name(policy.enum_value_overrides(), || value.options())
        .unwrap_or_else(|| value.name().to_string())
}

fn override_name(
    extensions: &[ExtensionDescriptor],
    options: impl FnOnce() -> DynamicMessage,
) -> Option<String> {
    if extensions.is_empty() {
        return None;
    }
    let options = options();
    extensions
        .iter()
        .filter(|extension| options.has_extension(extension))
        .find_map(|extension| options.get_extension(extension).as_str().map(str::to_string))
}
