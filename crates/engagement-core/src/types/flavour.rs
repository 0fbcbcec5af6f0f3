//! Product flavour under which a feed is scoped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Every feed entity is keyed by `(uid, flavour)`; the same user has one
/// feed per flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flavour {
    /// End-user facing application.
    Consumer,
    /// Professional (practitioner) application.
    Pro,
}

impl Flavour {
    /// Return the flavour in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumer => "CONSUMER",
            Self::Pro => "PRO",
        }
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavour {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONSUMER" => Ok(Self::Consumer),
            "PRO" => Ok(Self::Pro),
            other => Err(AppError::invalid_input(format!(
                "invalid flavour '{other}', expected CONSUMER or PRO"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("pro".parse::<Flavour>().unwrap(), Flavour::Pro);
        assert_eq!("CONSUMER".parse::<Flavour>().unwrap(), Flavour::Consumer);
        assert!("admin".parse::<Flavour>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_form() {
        let json = serde_json::to_string(&Flavour::Consumer).unwrap();
        assert_eq!(json, "\"CONSUMER\"");
        let back: Flavour = serde_json::from_str("\"PRO\"").unwrap();
        assert_eq!(back, Flavour::Pro);
    }
}
