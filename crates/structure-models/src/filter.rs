use serde::{Deserialize, Serialize};

/// A declaration of a runtime-settable parameter a [`crate::Source`] or
/// [`crate::Sink`] exposes for the caller to fill in at wiring time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Filter {
    pub name: String,
    /// Identifier used by wiring resolution to merge caller-supplied filters with presets.
    /// Derived from `name` when absent — see [`Filter::derive_internal_name`].
    #[serde(default)]
    pub internal_name: Option<String>,
    #[serde(rename = "type")]
    pub type_: FilterType,
    pub required: bool,
}

impl Filter {
    /// The effective internal name: the authored one, or derived from
    /// `name` by stripping, lower-casing, splitting on whitespace, and
    /// joining with underscores. Deterministic — this is not cosmetic:
    /// Wiring resolution merges filters by this key.
    pub fn internal_name(&self) -> String {
        match &self.internal_name {
            Some(name) => name.clone(),
            None => Self::derive_internal_name(&self.name),
        }
    }

    pub fn derive_internal_name(name: &str) -> String {
        name.trim()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase()
    }
}

/// The closed enum of filter kinds. Presently only `free_text`, modeled as
/// a true enum (not a bare string) so adding a second kind is a compile
/// error at every match site rather than a silent new string value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    FreeText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_internal_name_from_name() {
        assert_eq!(Filter::derive_internal_name("  Timestamp From  "), "timestamp_from");
        assert_eq!(Filter::derive_internal_name("A B\tC"), "a_b_c");
    }
}
