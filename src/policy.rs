//! Conversion policy.

use prost_reflect::{ExtensionDescriptor, Kind};
use serde::{Deserialize, Serialize};

use crate::{CaseFormat, PolicyError};

const FIELD_OPTIONS: &str = "google.protobuf.FieldOptions";
const ENUM_VALUE_OPTIONS: &str = "google.protobuf.EnumValueOptions";

/// How enum values are represented in JSON.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumRepresentation {
    /// Use the value name, or its override, as a JSON string.
    #[default]
    ByName,

    /// Use the value number as a JSON number. Enum value overrides are ignored.
    ByNumber,
}

/// How to encode bytes fields when converting to JSON.
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BytesEncoding {
    /// Encode bytes as a string if valid UTF-8 text, otherwise as base64.
    ///
    /// Strings are read back as UTF-8 text.
    Auto,

    #[default]
    /// Encode bytes as base64 string.
    Base64,

    /// Encode bytes as a JSON array of numbers.
    ByteArray,

    #[cfg(feature = "stfu8")]
    /// Encode bytes as [stfu8](https://crates.io/crates/stfu8) encoded string.
    Stfu8,

    /// Encode bytes as a UTF-8 lossy string.
    ///
    /// Strings are read back as UTF-8 text.
    StringLossy,
}

/// Immutable settings shared by every conversion of a [`Converter`](crate::Converter).
///
/// Build one with [`ConversionPolicy::builder`]. The default policy writes enums
/// by name, converts field names from `lower_underscore` to `lowerCamel`, encodes
/// bytes as base64 and has no name overrides.
#[derive(Debug, Clone)]
pub struct ConversionPolicy {
    enum_representation: EnumRepresentation,
    schema_case: CaseFormat,
    json_case: CaseFormat,
    bytes_encoding: BytesEncoding,
    field_name_overrides: Vec<ExtensionDescriptor>,
    enum_value_overrides: Vec<ExtensionDescriptor>,
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        Self {
            enum_representation: EnumRepresentation::ByName,
            schema_case: CaseFormat::LowerUnderscore,
            json_case: CaseFormat::LowerCamel,
            bytes_encoding: BytesEncoding::default(),
            field_name_overrides: Vec::new(),
            enum_value_overrides: Vec::new(),
        }
    }
}

impl ConversionPolicy {
    /// Start building a policy from the defaults.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder {
            policy: ConversionPolicy::default(),
        }
    }

    /// How enum values are written and read.
    pub fn enum_representation(&self) -> EnumRepresentation {
        self.enum_representation
    }

    /// Case format of field names in the schema.
    pub fn schema_case(&self) -> CaseFormat {
        self.schema_case
    }

    /// Case format of member names in JSON.
    pub fn json_case(&self) -> CaseFormat {
        self.json_case
    }

    /// How bytes fields are written and read.
    pub fn bytes_encoding(&self) -> BytesEncoding {
        self.bytes_encoding
    }

    /// Field name override extensions, in lookup order.
    pub fn field_name_overrides(&self) -> &[ExtensionDescriptor] {
        &self.field_name_overrides
    }

    /// Enum value name override extensions, in lookup order.
    pub fn enum_value_overrides(&self) -> &[ExtensionDescriptor] {
        &self.enum_value_overrides
    }
}

/// Builder for [`ConversionPolicy`].
///
/// Override extensions are looked up in the order they were added. Adding the
/// same extension twice has no effect.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    policy: ConversionPolicy,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        ConversionPolicy::builder()
    }
}

impl PolicyBuilder {
    pub fn enum_representation(&mut self, representation: EnumRepresentation) -> &mut Self {
        self.policy.enum_representation = representation;
        self
    }

    /// Set the case format of schema field names and the format they are
    /// written in JSON when no override applies.
    ///
    /// With `(LowerUnderscore, LowerCamel)`:
    ///
    /// ```text
    /// PROTO       JSON
    /// my_field    myField
    /// foo         foo
    /// n__id_ct    nIdCt
    /// ```
    pub fn field_name_format(&mut self, schema: CaseFormat, json: CaseFormat) -> &mut Self {
        self.policy.schema_case = schema;
        self.policy.json_case = json;
        self
    }

    pub fn bytes_encoding(&mut self, encoding: BytesEncoding) -> &mut Self {
        self.policy.bytes_encoding = encoding;
        self
    }

    /// Add a string extension of `google.protobuf.FieldOptions` that, when set
    /// on a field, replaces its JSON name.
    ///
    /// ```text
    /// string client_app_id = 1 [(serialized_name) = "appId"];
    /// ```
    pub fn add_field_name_override(&mut self, extension: ExtensionDescriptor) -> &mut Self {
        push_unique(&mut self.policy.field_name_overrides, extension);
        self
    }

    /// Add a string extension of `google.protobuf.EnumValueOptions` that, when
    /// set on an enum value, replaces its JSON name.
    ///
    /// ```text
    /// enum MyEnum {
    ///   UNKNOWN = 0;
    ///   CLIENT_APP_ID = 1 [(serialized_value) = "APP_ID"];
    /// }
    /// ```
    ///
    /// Only used with [`EnumRepresentation::ByName`].
    pub fn add_enum_value_override(&mut self, extension: ExtensionDescriptor) -> &mut Self {
        push_unique(&mut self.policy.enum_value_overrides, extension);
        self
    }

    /// Validate the override extensions and produce the policy.
    pub fn build(&self) -> Result<ConversionPolicy, PolicyError> {
        for extension in &self.policy.field_name_overrides {
            check_override(extension, FIELD_OPTIONS)?;
        }
        for extension in &self.policy.enum_value_overrides {
            check_override(extension, ENUM_VALUE_OPTIONS)?;
        }

        let policy = self.policy.clone();
        tracing::debug!(
            enum_representation = ?policy.enum_representation,
            schema_case = ?policy.schema_case,
            json_case = ?policy.json_case,
            field_name_overrides = policy.field_name_overrides.len(),
            enum_value_overrides = policy.enum_value_overrides.len(),
            "built conversion policy"
        );
        Ok(policy)
    }
}

fn push_unique(extensions: &mut Vec<ExtensionDescriptor>, extension: ExtensionDescriptor) {
    if !extensions
        .iter()
        .any(|e| e.full_name() == extension.full_name())
    {
        extensions.push(extension);
    }
}

fn check_override(extension: &ExtensionDescriptor, extendee: &'static str) -> Result<(), PolicyError> {
    let found = extension.containing_message();
    if found.full_name() != extendee {
        return Err(PolicyError::WrongExtendee {
            extension: extension.full_name().to_string(),
            expected: extendee,
            found: found.full_name().to_string(),
        });
    }
    if extension.is_list() || !matches!(extension.kind(), Kind::String) {
        return Err(PolicyError::NotAString {
            extension: extension.full_name().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ConversionPolicy::builder().build().unwrap();
        assert_eq!(policy.enum_representation(), EnumRepresentation::ByName);
        assert_eq!(policy.schema_case(), CaseFormat::LowerUnderscore);
        assert_eq!(policy.json_case(), CaseFormat::LowerCamel);
        assert_eq!(policy.bytes_encoding(), BytesEncoding::Base64);
        assert!(policy.field_name_overrides().is_empty());
        assert!(policy.enum_value_overrides().is_empty());
    }

    #[test]
    fn test_builder_chaining() {
        let policy = ConversionPolicy::builder()
            .enum_representation(EnumRepresentation::ByNumber)
            .field_name_format(CaseFormat::LowerUnderscore, CaseFormat::UpperUnderscore)
            .bytes_encoding(BytesEncoding::ByteArray)
            .build()
            .unwrap();
        assert_eq!(policy.enum_representation(), EnumRepresentation::ByNumber);
        assert_eq!(policy.json_case(), CaseFormat::UpperUnderscore);
        assert_eq!(policy.bytes_encoding(), BytesEncoding::ByteArray);
    }

    #[test]
    fn test_serde_names() {
        let repr: EnumRepresentation = serde_json::from_str("\"by_number\"").unwrap();
        assert_eq!(repr, EnumRepresentation::ByNumber);
        let encoding: BytesEncoding = serde_json::from_str("\"byte_array\"").unwrap();
        assert_eq!(encoding, BytesEncoding::ByteArray);
    }
}
