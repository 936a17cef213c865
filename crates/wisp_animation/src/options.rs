//! Effect parameters and per-row option overrides
//!
//! Effects declare typed parameters ([`ParamSpec`]). The configuration gives
//! each parameter a screen-wide value, and every rule row may override a few of
//! them with a `"name=value, name2=value2"` string. A row whose override string
//! fails to parse loses all of its overrides.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use wisp_core::Color;

/// Type of an effect parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Text,
    Color,
}

/// A parameter value as written in configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Color(Color),
    Text(String),
}

impl ParamValue {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }
}

/// Declaration of an effect parameter
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ParamSpec {
    pub fn boolean(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: ParamValue::Bool(default),
            min: None,
            max: None,
        }
    }

    pub fn int(name: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            default: ParamValue::Int(default),
            min: Some(min as f64),
            max: Some(max as f64),
        }
    }

    pub fn float(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default: ParamValue::Float(default),
            min: Some(min as f64),
            max: Some(max as f64),
        }
    }

    pub fn text(name: &'static str, default: &str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            default: ParamValue::Text(default.to_string()),
            min: None,
            max: None,
        }
    }

    pub fn color(name: &'static str, default: Color) -> Self {
        Self {
            name,
            kind: ParamKind::Color,
            default: ParamValue::Color(default),
            min: None,
            max: None,
        }
    }

    fn in_range(&self, v: f64) -> bool {
        self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max)
    }

    /// Convert a configured value to this parameter's type
    ///
    /// Returns `None` for a type mismatch or an out-of-range number.
    pub fn coerce(&self, value: &ParamValue) -> Option<ParamValue> {
        match self.kind {
            ParamKind::Bool => value.as_bool().map(ParamValue::Bool),
            ParamKind::Int => match value {
                ParamValue::Int(v) if self.in_range(*v as f64) => Some(ParamValue::Int(*v)),
                _ => None,
            },
            ParamKind::Float => value
                .as_f32()
                .filter(|v| self.in_range(*v as f64))
                .map(ParamValue::Float),
            ParamKind::Text => match value {
                ParamValue::Text(s) => Some(ParamValue::Text(s.clone())),
                _ => None,
            },
            ParamKind::Color => match value {
                ParamValue::Color(c) => Some(ParamValue::Color(*c)),
                ParamValue::Text(s) => Color::from_hex_str(s).map(ParamValue::Color),
                _ => None,
            },
        }
    }

    /// Parse an override value written as text
    fn parse_text(&self, raw: &str, row: &str) -> Result<ParamValue, OverrideError> {
        let token = raw.split_whitespace().next().unwrap_or("");
        let invalid = || OverrideError::InvalidValue {
            value: raw.to_string(),
            row: row.to_string(),
        };
        let out_of_range = || OverrideError::OutOfRange {
            value: raw.to_string(),
            row: row.to_string(),
        };

        match self.kind {
            ParamKind::Bool => match token {
                "true" => Ok(ParamValue::Bool(true)),
                "false" => Ok(ParamValue::Bool(false)),
                _ => token
                    .parse::<i64>()
                    .map(|v| ParamValue::Bool(v != 0))
                    .map_err(|_| invalid()),
            },
            ParamKind::Int => {
                let v = token.parse::<i64>().map_err(|_| invalid())?;
                if self.in_range(v as f64) {
                    Ok(ParamValue::Int(v))
                } else {
                    Err(out_of_range())
                }
            }
            ParamKind::Float => {
                let v = token.parse::<f32>().map_err(|_| invalid())?;
                if self.in_range(v as f64) {
                    Ok(ParamValue::Float(v))
                } else {
                    Err(out_of_range())
                }
            }
            ParamKind::Text => Ok(ParamValue::Text(raw.trim().to_string())),
            ParamKind::Color => {
                // All four components are required
                if token.len() != 9 {
                    return Err(invalid());
                }
                Color::from_hex_str(token)
                    .map(ParamValue::Color)
                    .ok_or_else(invalid)
            }
        }
    }
}

/// Why a row's override string was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OverrideError {
    #[error("Option name missing in \"{row}\"")]
    NameMissing { row: String },
    #[error("Option value missing in \"{row}\"")]
    ValueMissing { row: String },
    #[error("Unknown option \"{name}\" in \"{row}\"")]
    UnknownOption { name: String, row: String },
    #[error("Invalid value \"{value}\" in \"{row}\"")]
    InvalidValue { value: String, row: String },
    #[error("Value \"{value}\" out of range in \"{row}\"")]
    OutOfRange { value: String, row: String },
}

/// Declared parameters keyed by lowercase name
pub type ParamTable = IndexMap<String, ParamSpec>;

/// Parsed overrides of one rule row
pub type OverrideSet = SmallVec<[(String, ParamValue); 4]>;

/// Parse a row's `"name=value, ..."` override string
///
/// Names are matched case-insensitively against `specs`. Any error rejects the
/// whole row.
pub fn parse_overrides(row: &str, specs: &ParamTable) -> Result<OverrideSet, OverrideError> {
    let mut set = OverrideSet::new();
    if row.trim().is_empty() {
        return Ok(set);
    }

    for pair in row.split(',') {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(if pair.trim().is_empty() {
                OverrideError::NameMissing {
                    row: row.to_string(),
                }
            } else {
                OverrideError::ValueMissing {
                    row: row.to_string(),
                }
            });
        };

        let name = name.split_whitespace().next().unwrap_or("");
        if name.is_empty() {
            return Err(OverrideError::NameMissing {
                row: row.to_string(),
            });
        }
        if value.trim().is_empty() {
            return Err(OverrideError::ValueMissing {
                row: row.to_string(),
            });
        }

        let key = name.to_ascii_lowercase();
        let spec = specs
            .get(&key)
            .ok_or_else(|| OverrideError::UnknownOption {
                name: name.to_string(),
                row: row.to_string(),
            })?;
        let parsed = spec.parse_text(value, row)?;
        set.push((key, parsed));
    }
    Ok(set)
}

/// Parameter lookup for one running animation
///
/// Row overrides win over configured values, which win over declared defaults.
#[derive(Clone, Copy)]
pub struct ParamView<'a> {
    pub overrides: &'a [(String, ParamValue)],
    pub configured: &'a IndexMap<String, ParamValue>,
    pub specs: &'a ParamTable,
}

impl<'a> ParamView<'a> {
    pub fn new(
        overrides: &'a [(String, ParamValue)],
        configured: &'a IndexMap<String, ParamValue>,
        specs: &'a ParamTable,
    ) -> Self {
        Self {
            overrides,
            configured,
            specs,
        }
    }

    /// Resolved value of a parameter, `None` if it was never declared
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let key = name.to_ascii_lowercase();
        if let Some((_, v)) = self.overrides.iter().find(|(k, _)| *k == key) {
            return Some(v.clone());
        }
        let spec = self.specs.get(&key)?;
        self.configured
            .get(&key)
            .and_then(|v| spec.coerce(v))
            .or_else(|| Some(spec.default.clone()))
    }

    pub fn float(&self, name: &str) -> f32 {
        self.get(name).and_then(|v| v.as_f32()).unwrap_or(0.0)
    }

    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(|v| v.as_i64()).unwrap_or(0)
    }

    pub fn boolean(&self, name: &str) -> bool {
        self.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn text(&self, name: &str) -> String {
        match self.get(name) {
            Some(ParamValue::Text(s)) => s,
            _ => String::new(),
        }
    }

    pub fn color(&self, name: &str) -> Color {
        match self.get(name) {
            Some(ParamValue::Color(c)) => c,
            _ => Color::WHITE,
        }
    }
}
