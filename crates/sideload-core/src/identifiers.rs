//! Database and namespace identifiers

use crate::error::{SideloadError, SideloadResult};
use std::fmt;
use std::str::FromStr;

/// Maximum length for a database or namespace name, in bytes
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Suffix appended to a database name to form its temporary restore namespace
pub const TEMPORARY_SUFFIX: &str = "_tmp";

/// Error type for identifier validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    /// The identifier string is empty
    Empty,
    /// The identifier contains only whitespace
    WhitespaceOnly,
    /// The identifier has leading or trailing whitespace
    LeadingTrailingWhitespace,
    /// The identifier contains control characters (newlines, NUL, ...)
    ControlCharacters,
    /// The identifier exceeds the maximum length
    TooLong { length: usize, max: usize },
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Identifier cannot be empty"),
            Self::WhitespaceOnly => write!(f, "Identifier cannot be whitespace-only"),
            Self::LeadingTrailingWhitespace => {
                write!(f, "Identifier cannot have leading or trailing whitespace")
            }
            Self::ControlCharacters => write!(f, "Identifier cannot contain control characters"),
            Self::TooLong { length, max } => {
                write!(f, "Identifier too long ({} bytes, max {})", length, max)
            }
        }
    }
}

impl std::error::Error for IdValidationError {}

/// A validated database or namespace name.
///
/// Identifiers are passed as separate arguments to `influxd`, so they never
/// go through a shell. They do end up inside InfluxQL statements, where
/// [`Identifier::to_influxql`] renders them safely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Validate a name.
    ///
    /// # Validation Rules
    ///
    /// - Non-empty
    /// - At most 128 bytes
    /// - No leading or trailing whitespace
    /// - No control characters
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sideload_core::identifiers::Identifier;
    ///
    /// assert!(Identifier::new("telegraf").is_ok());
    /// assert!(Identifier::new("my-db.prod").is_ok());
    /// assert!(Identifier::new("").is_err());
    /// assert!(Identifier::new("db\nDROP").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, IdValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(IdValidationError::Empty);
        }

        if value.trim().is_empty() {
            return Err(IdValidationError::WhitespaceOnly);
        }

        if value != value.trim() {
            return Err(IdValidationError::LeadingTrailingWhitespace);
        }

        if value.len() > MAX_IDENTIFIER_LENGTH {
            return Err(IdValidationError::TooLong {
                length: value.len(),
                max: MAX_IDENTIFIER_LENGTH,
            });
        }

        if value.chars().any(char::is_control) {
            return Err(IdValidationError::ControlCharacters);
        }

        Ok(Self(value))
    }

    /// Validate a name, reporting failures as a [`SideloadError`]
    pub fn parse(value: &str) -> SideloadResult<Self> {
        Self::new(value).map_err(|e| SideloadError::invalid_identifier(value, e))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the scratch namespace a restore lands in before merging
    pub fn temporary(&self) -> SideloadResult<Self> {
        let name = format!("{}{}", self.0, TEMPORARY_SUFFIX);
        Self::new(name.clone()).map_err(|e| SideloadError::invalid_identifier(name, e))
    }

    /// Whether the name can appear in InfluxQL without quoting
    pub fn is_bare(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Render the name as an InfluxQL identifier.
    ///
    /// Bare names are emitted as-is. Anything else is double-quoted with `\`
    /// and `"` escaped.
    pub fn to_influxql(&self) -> String {
        if self.is_bare() {
            return self.0.clone();
        }

        let mut quoted = String::with_capacity(self.0.len() + 2);
        quoted.push('"');
        for c in self.0.chars() {
            if c == '"' || c == '\\' {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        quoted
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_names() {
        assert!(Identifier::new("stress").is_ok());
        assert!(Identifier::new("telegraf_prod").is_ok());
        assert!(Identifier::new("my-db.v2").is_ok());
        assert!(Identifier::new("a").is_ok());
        assert!(Identifier::new("with space").is_ok());
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(Identifier::new(""), Err(IdValidationError::Empty));
    }

    #[test]
    fn test_validate_whitespace() {
        assert_eq!(
            Identifier::new("   "),
            Err(IdValidationError::WhitespaceOnly)
        );
        assert_eq!(
            Identifier::new(" stress"),
            Err(IdValidationError::LeadingTrailingWhitespace)
        );
        assert_eq!(
            Identifier::new("stress "),
            Err(IdValidationError::LeadingTrailingWhitespace)
        );
    }

    #[test]
    fn test_validate_control_characters() {
        assert_eq!(
            Identifier::new("stress\nDROP DATABASE x"),
            Err(IdValidationError::ControlCharacters)
        );
        assert_eq!(
            Identifier::new("a\0b"),
            Err(IdValidationError::ControlCharacters)
        );
    }

    #[test]
    fn test_validate_too_long() {
        let long = "a".repeat(129);
        match Identifier::new(long) {
            Err(IdValidationError::TooLong { length, max }) => {
                assert_eq!(length, 129);
                assert_eq!(max, MAX_IDENTIFIER_LENGTH);
            }
            other => panic!("Expected TooLong error, got {:?}", other),
        }
        assert!(Identifier::new("a".repeat(128)).is_ok());
    }

    #[test]
    fn test_temporary_namespace() {
        let db = Identifier::new("stress").unwrap();
        assert_eq!(db.temporary().unwrap().as_str(), "stress_tmp");

        let near_limit = Identifier::new("a".repeat(126)).unwrap();
        assert!(matches!(
            near_limit.temporary(),
            Err(SideloadError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_influxql_rendering() {
        assert_eq!(
            Identifier::new("stress").unwrap().to_influxql(),
            "stress"
        );
        assert_eq!(
            Identifier::new("_internal").unwrap().to_influxql(),
            "_internal"
        );
        assert_eq!(
            Identifier::new("my-db").unwrap().to_influxql(),
            "\"my-db\""
        );
        assert_eq!(
            Identifier::new("1db").unwrap().to_influxql(),
            "\"1db\""
        );
        assert_eq!(
            Identifier::new(r#"we"ird\db"#).unwrap().to_influxql(),
            r#""we\"ird\\db""#
        );
    }

    #[test]
    fn test_parse_reports_value() {
        let err = Identifier::parse("").unwrap_err();
        assert_eq!(err.to_string(), "Invalid identifier '': Identifier cannot be empty");
    }
}
