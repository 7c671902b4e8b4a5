//! Serializable policy configuration.

use prost_reflect::DescriptorPool;
use serde::{Deserialize, Serialize};

use crate::{BytesEncoding, CaseFormat, ConversionPolicy, EnumRepresentation, PolicyError};

/// Plain-data form of a [`ConversionPolicy`], suitable for configuration files.
///
/// Override extensions are referenced by their fully-qualified names and looked
/// up in a [`DescriptorPool`] by [`PolicyConfig::resolve`].
///
/// ```
/// use protobuf_json_adapter::{EnumRepresentation, PolicyConfig};
///
/// let config: PolicyConfig = serde_json::from_str(r#"{ "enum_representation": "by_number" }"#).unwrap();
/// assert_eq!(config.enum_representation, EnumRepresentation::ByNumber);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub enum_representation: EnumRepresentation,
    pub schema_case: CaseFormat,
    pub json_case: CaseFormat,
    pub bytes_encoding: BytesEncoding,
    pub field_name_overrides: Vec<String>,
    pub enum_value_overrides: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let policy = ConversionPolicy::default();
        Self {
            enum_representation: policy.enum_representation(),
            schema_case: policy.schema_case(),
            json_case: policy.json_case(),
            bytes_encoding: policy.bytes_encoding(),
            field_name_overrides: Vec::new(),
            enum_value_overrides: Vec::new(),
        }
    }
}

impl PolicyConfig {
    /// Look up the override extensions in `pool` and build the policy.
    pub fn resolve(&self, pool: &DescriptorPool) -> Result<ConversionPolicy, PolicyError> {
        let mut builder = ConversionPolicy::builder();
        builder
            .enum_representation(self.enum_representation)
            .field_name_format(self.schema_case, self.json_case)
            .bytes_encoding(self.bytes_encoding);

        for name in &self.field_name_overrides {
            builder.add_field_name_override(lookup(pool, name)?);
        }
        for name in &self.enum_value_overrides {
            builder.add_enum_value_override(lookup(pool, name)?);
        }
        builder.build()
    }
}

fn lookup(pool: &DescriptorPool, name: &str) -> Result<prost_reflect::ExtensionDescriptor, PolicyError> {
    pool.get_extension_by_name(name)
        .ok_or_else(|| PolicyError::UnknownExtension {
            name: name.to_string(),
        })
}
