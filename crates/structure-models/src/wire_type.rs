use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed enum of wire-format kinds a [`crate::Source`] or
/// [`crate::Sink`] may carry. Serializes to literal strings, including
/// parenthesized ones like `timeseries(float)` — those can't be expressed
/// with `#[serde(rename_all = ...)]`, so `Display`/`FromStr` (and
/// `Serialize`/`Deserialize` via them) are implemented by hand in one
/// place, shared by the persistence layer's column mapping and the wiring
/// resolver's `metadata(any)` rewrite check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    TimeseriesFloat,
    TimeseriesInt,
    TimeseriesString,
    TimeseriesBool,
    TimeseriesNumeric,
    TimeseriesAny,
    MetadataAny,
    Multitsframe,
    Dataframe,
}

impl WireType {
    const fn as_str(self) -> &'static str {
        match self {
            WireType::TimeseriesFloat => "timeseries(float)",
            WireType::TimeseriesInt => "timeseries(int)",
            WireType::TimeseriesString => "timeseries(string)",
            WireType::TimeseriesBool => "timeseries(bool)",
            WireType::TimeseriesNumeric => "timeseries(numeric)",
            WireType::TimeseriesAny => "timeseries(any)",
            WireType::MetadataAny => "metadata(any)",
            WireType::Multitsframe => "multitsframe",
            WireType::Dataframe => "dataframe",
        }
    }

    pub const fn is_metadata_any(self) -> bool {
        matches!(self, WireType::MetadataAny)
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "timeseries(float)" => WireType::TimeseriesFloat,
            "timeseries(int)" => WireType::TimeseriesInt,
            "timeseries(string)" => WireType::TimeseriesString,
            "timeseries(bool)" => WireType::TimeseriesBool,
            "timeseries(numeric)" => WireType::TimeseriesNumeric,
            "timeseries(any)" => WireType::TimeseriesAny,
            "metadata(any)" => WireType::MetadataAny,
            "multitsframe" => WireType::Multitsframe,
            "dataframe" => WireType::Dataframe,
            other => return Err(format!("unrecognized source/sink type: {other}")),
        })
    }
}

impl Serialize for WireType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WireType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
