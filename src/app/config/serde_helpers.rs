use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

/// Loads and parses a variable through `lookup`.
/// Returns Ok(()) if the variable doesn't exist (keeps default).
pub fn load_env_var<T, L>(lookup: &L, name: &str, target: &mut T) -> Result<(), super::ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    L: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|e| super::ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

/// Loads a millisecond duration through `lookup`.
pub fn load_env_millis<L>(lookup: &L, name: &str, target: &mut Duration) -> Result<(), super::ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let mut millis = target.as_millis() as u64;
    load_env_var(lookup, name, &mut millis)?;
    *target = Duration::from_millis(millis);
    Ok(())
}

/// Loads a string variable through `lookup`.
pub fn load_env_string<L>(lookup: &L, name: &str, target: &mut String)
where
    L: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        *target = value;
    }
}
