use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Runtime parameters substituted into configs and fixtures.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse from CLI args like "key=value".
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut params = Self::new();
        for arg in args {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                Error::Config(format!("invalid param '{}', expected key=value", arg))
            })?;
            params.values.insert(key.to_string(), value.to_string());
        }
        Ok(params)
    }
}

/// Parameter definition in a config or fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamDef {
    #[serde(default)]
    pub required: bool,

    pub default: Option<String>,

    pub description: Option<String>,
}

/// Parse `yaml`, read its `params:` definitions and substitute every `${var}`.
pub fn substituted(yaml: &str, params: &Params) -> Result<serde_yaml::Value> {
    let mut value: serde_yaml::Value = serde_yaml::from_str(yaml)?;

    let defs: HashMap<String, ParamDef> = match value.get("params") {
        Some(v) => serde_yaml::from_value(v.clone())?,
        None => HashMap::new(),
    };

    substitute_value(&mut value, params, &defs)?;
    Ok(value)
}

/// Substitute `${var}` and `${var:default}` patterns in a string.
///
/// A value passed on the command line wins over an inline default, which
/// wins over the default declared under `params`.
pub fn substitute(
    template: &str,
    params: &Params,
    defs: &HashMap<String, ParamDef>,
) -> Result<String> {
    let mut result = template.to_string();
    let mut start = 0;

    while let Some(var_start) = result[start..].find("${") {
        let var_start = start + var_start;
        let Some(var_end) = result[var_start..].find('}') else {
            break;
        };
        let var_end = var_start + var_end;

        let placeholder = &result[var_start + 2..var_end];
        let (var_name, inline_default) = match placeholder.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (placeholder, None),
        };

        let value = if let Some(v) = params.get(var_name) {
            v.to_string()
        } else if let Some(default) = inline_default {
            default.to_string()
        } else if let Some(def) = defs.get(var_name) {
            match (&def.default, def.required) {
                (Some(default), _) => default.clone(),
                (None, true) => {
                    return Err(Error::Config(format!(
                        "missing required parameter: {}",
                        var_name
                    )))
                }
                (None, false) => String::new(),
            }
        } else {
            // Undeclared: left verbatim.
            start = var_end + 1;
            continue;
        };

        result.replace_range(var_start..=var_end, &value);
        start = var_start + value.len();
    }

    Ok(result)
}

/// Recursively substitute params in a serde_yaml::Value.
pub fn substitute_value(
    value: &mut serde_yaml::Value,
    params: &Params,
    defs: &HashMap<String, ParamDef>,
) -> Result<()> {
    match value {
        serde_yaml::Value::String(s) => {
            *s = substitute(s, params, defs)?;
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                substitute_value(v, params, defs)?;
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            for v in seq.iter_mut() {
                substitute_value(v, params, defs)?;
            }
        }
        _ => {}
    }
    Ok(())
}
