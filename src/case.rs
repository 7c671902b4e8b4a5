//! Identifier case conversion.

use serde::{Deserialize, Serialize};

/// Naming convention of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFormat {
    /// `lower-hyphen`
    LowerHyphen,

    /// `lower_underscore`, the protobuf field name convention.
    LowerUnderscore,

    /// `lowerCamel`, the usual JSON member name convention.
    LowerCamel,

    /// `UpperCamel`
    UpperCamel,

    /// `UPPER_UNDERSCORE`
    UpperUnderscore,
}

impl CaseFormat {
    /// Convert `name`, written in this format, to the `target` format.
    ///
    /// ```
    /// use protobuf_json_adapter::CaseFormat;
    ///
    /// let camel = CaseFormat::LowerUnderscore.convert(CaseFormat::LowerCamel, "os_build_id");
    /// assert_eq!(camel, "osBuildId");
    /// ```
    pub fn convert(self, target: CaseFormat, name: &str) -> String {
        if self == target {
            return name.to_string();
        }

        let mut out = String::with_capacity(name.len() + 4);
        for (i, word) in self.split(name).into_iter().enumerate() {
            if i > 0 {
                if let Some(sep) = target.separator() {
                    out.push(sep);
                }
            }
            target.push_word(&mut out, word, i == 0);
        }
        out
    }

    fn separator(self) -> Option<char> {
        match self {
            CaseFormat::LowerHyphen => Some('-'),
            CaseFormat::LowerUnderscore | CaseFormat::UpperUnderscore => Some('_'),
            CaseFormat::LowerCamel | CaseFormat::UpperCamel => None,
        }
    }

    fn split(self, name: &str) -> Vec<&str> {
        if let Some(sep) = self.separator() {
            return name.split(sep).collect();
        }

        // Every uppercase letter starts a new word.
        let mut words = Vec::new();
        let mut start = 0;
        for (i, c) in name.char_indices() {
            if c.is_uppercase() && i > start {
                words.push(&name[start..i]);
                start = i;
            }
        }
        words.push(&name[start..]);
        words
    }

    fn push_word(self, out: &mut String, word: &str, first: bool) {
        match self {
            CaseFormat::LowerHyphen | CaseFormat::LowerUnderscore => {
                out.push_str(&word.to_lowercase())
            }
            CaseFormat::UpperUnderscore => out.push_str(&word.to_uppercase()),
            CaseFormat::LowerCamel if first => out.push_str(&word.to_lowercase()),
            CaseFormat::LowerCamel | CaseFormat::UpperCamel => {
                let mut chars = word.chars();
                if let Some(c) = chars.next() {
                    out.extend(c.to_uppercase());
                    out.push_str(&chars.as_str().to_lowercase());
                }
            }
        }
    }
}
