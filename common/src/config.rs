use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use hocon::{Hocon, HoconLoader};
use log::debug;

/// Scoped view over a HOCON document.
///
/// Lookups check, in order, an environment variable named after the upper-cased key,
/// the configured scope object and finally the document root.
#[derive(Debug)]
pub struct ConfigLoader {
    hocon: Hocon,
    env: HashMap<String, String>,
    scope: String,
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>, scope: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();

        let hocon = HoconLoader::new()
            .load_file(path)
            .with_context(|| format!("Failed to find or load config file at: {:?}", path))?
            .hocon()
            .with_context(|| format!("Failed to parse config file at: {:?}", path))?;

        debug!("Loaded config from {:?}", path);

        Ok(Self::from_hocon(hocon, scope.into(), std::env::vars().collect()))
    }

    /// Builds a loader from an in-memory document. Environment variables are not consulted.
    pub fn from_str(document: &str, scope: impl Into<String>) -> Result<Self> {
        let hocon = HoconLoader::new()
            .load_str(document)
            .context("Failed to load config document")?
            .hocon()
            .context("Failed to parse config document")?;

        Ok(Self::from_hocon(hocon, scope.into(), HashMap::new()))
    }

    fn from_hocon(hocon: Hocon, scope: String, env: HashMap<String, String>) -> Self {
        Self { hocon, env, scope }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.env.get(&name.to_uppercase()) {
            return Some(Value::String(value.clone()));
        }

        let scope = &self.hocon[self.scope.as_str()];
        if matches!(scope, Hocon::Hash(_)) {
            if let Some(value) = Self::map_hocon(&scope[name]) {
                return Some(value);
            }
        }

        Self::map_hocon(&self.hocon[name])
    }

    pub fn load<T: Config>(&self) -> Result<T> {
        T::load(self)
    }

    fn map_hocon(hocon: &Hocon) -> Option<Value> {
        match hocon {
            Hocon::Real(f64) => Some(Value::Float(*f64)),
            Hocon::Integer(i64) => Some(Value::Integer(*i64)),
            Hocon::String(string) => Some(Value::String(string.clone())),
            Hocon::Boolean(bool) => Some(Value::Boolean(*bool)),
            Hocon::Array(items) => Some(Value::List(
                items.iter().filter_map(Self::map_hocon).collect(),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(val) => Some(*val),
            Value::String(val) => Hocon::String(val.clone()).as_bool(),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Value::Integer(val) => usize::try_from(*val).ok(),
            Value::String(val) => val.parse::<usize>().ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Integer(val) => u64::try_from(*val).ok(),
            Value::String(val) => val.parse::<u64>().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(val) => Some(*val),
            Value::Integer(val) => Some(*val as f64),
            Value::String(val) => val.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(val) => Some(val.clone()),
            Value::Boolean(val) => Some(val.to_string()),
            Value::Float(val) => Some(val.to_string()),
            Value::Integer(val) => Some(val.to_string()),
            Value::List(_) => None,
        }
    }

    /// Flattens a list into its scalar string forms. A whitespace separated string is split
    /// into its words so that `"UCB1 explorationconstant=0.5"` and
    /// `["UCB1", "explorationconstant=0.5"]` read the same.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            Value::List(items) => items.iter().map(Value::as_string).collect(),
            Value::String(val) => Some(val.split_whitespace().map(str::to_owned).collect()),
            other => other.as_string().map(|s| vec![s]),
        }
    }
}

pub trait Config {
    fn load(config: &ConfigLoader) -> Result<Self>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"
        threads = 2
        search {
            threads = 8
            seed = 42
            bias = 0.25
            selection = ["MC-GRAVE", "ref=50"]
            description = "UCB1 explorationconstant=0.5"
        }
    "#;

    #[test]
    fn test_scope_takes_precedence_over_root() {
        let config = ConfigLoader::from_str(DOCUMENT, "search").unwrap();

        assert_eq!(config.get("threads").and_then(|v| v.as_usize()), Some(8));
    }

    #[test]
    fn test_falls_back_to_root_outside_scope() {
        let config = ConfigLoader::from_str(DOCUMENT, "other").unwrap();

        assert_eq!(config.get("threads").and_then(|v| v.as_usize()), Some(2));
        assert_eq!(config.get("seed"), None);
    }

    #[test]
    fn test_numeric_conversions() {
        let config = ConfigLoader::from_str(DOCUMENT, "search").unwrap();

        assert_eq!(config.get("seed").and_then(|v| v.as_u64()), Some(42));
        assert_eq!(config.get("bias").and_then(|v| v.as_f64()), Some(0.25));
        assert_eq!(config.get("seed").and_then(|v| v.as_f64()), Some(42.0));
    }

    #[test]
    fn test_string_lists() {
        let config = ConfigLoader::from_str(DOCUMENT, "search").unwrap();

        assert_eq!(
            config.get("selection").and_then(|v| v.as_string_list()),
            Some(vec!["MC-GRAVE".to_string(), "ref=50".to_string()])
        );
        assert_eq!(
            config.get("description").and_then(|v| v.as_string_list()),
            Some(vec![
                "UCB1".to_string(),
                "explorationconstant=0.5".to_string()
            ])
        );
    }

    #[test]
    fn test_string_values_parse_as_bool() {
        assert_eq!(Value::String("true".to_string()).as_bool(), Some(true));
        assert_eq!(Value::Integer(-1).as_usize(), None);
    }
}
