//! Configuration access port trait.

use crate::domain::error::PortoptError;
use std::str::FromStr;

/// Typed lookups over a sectioned key/value configuration source.
///
/// Adapters supply raw strings. The typed getters return `Ok(None)` for a
/// missing or blank key and `ConfigInvalid` for a value that does not parse,
/// so a typo never silently becomes a default.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, PortoptError> {
        parse_value(self.get_string(section, key), section, key, "an integer")
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, PortoptError> {
        parse_value(self.get_string(section, key), section, key, "a number")
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, PortoptError> {
        let Some(raw) = present(self.get_string(section, key)) else {
            return Ok(None);
        };
        match raw.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(not_a(section, key, &raw, "a boolean")),
        }
    }
}

fn present(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_value<T: FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<Option<T>, PortoptError> {
    match present(raw) {
        None => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| not_a(section, key, &s, expected)),
    }
}

fn not_a(section: &str, key: &str, raw: &str, expected: &str) -> PortoptError {
    PortoptError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{raw:?} is not {expected}"),
    }
}
