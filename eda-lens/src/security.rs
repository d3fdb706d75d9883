//! SQL identifier handling for column names taken from CSV headers.
//!
//! Headers are arbitrary user text ("Cases (per 100k)", "état", ...), so they
//! are never spliced into SQL without going through [`SqlSecurity::escape_identifier`].

use crate::error::{EdaError, Result};

/// Maximum accepted identifier length in characters.
const MAX_IDENTIFIER_CHARS: usize = 256;

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and quotes an identifier for use in a DataFusion query.
    ///
    /// Quoting preserves case and allows any printable header text; embedded
    /// double quotes are doubled.
    ///
    /// ```rust
    /// use eda_lens::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("cases").unwrap(), "\"cases\"");
    /// assert_eq!(
    ///     SqlSecurity::escape_identifier("say \"hi\"").unwrap(),
    ///     "\"say \"\"hi\"\"\""
    /// );
    /// assert!(SqlSecurity::escape_identifier("").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates an identifier without quoting it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(EdaError::InvalidRequest(
                "column name cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.chars().count() > MAX_IDENTIFIER_CHARS {
            return Err(EdaError::InvalidRequest(format!(
                "column name too long (max {MAX_IDENTIFIER_CHARS} characters)"
            )));
        }

        if identifier.chars().any(|c| c == '\0' || c.is_control()) {
            return Err(EdaError::InvalidRequest(
                "column name cannot contain control characters".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_and_spaced_headers() {
        assert_eq!(
            SqlSecurity::escape_identifier("week_of_year").unwrap(),
            "\"week_of_year\""
        );
        assert_eq!(
            SqlSecurity::escape_identifier("Cases (per 100k)").unwrap(),
            "\"Cases (per 100k)\""
        );
    }

    #[test]
    fn test_injection_attempt_stays_inside_quotes() {
        let escaped = SqlSecurity::escape_identifier("x\" FROM data; DROP TABLE data --").unwrap();
        assert_eq!(escaped, "\"x\"\" FROM data; DROP TABLE data --\"");
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        assert!(SqlSecurity::escape_identifier("   ").is_err());
        assert!(SqlSecurity::escape_identifier("a\0b").is_err());
        assert!(SqlSecurity::escape_identifier("line\nbreak").is_err());
        assert!(SqlSecurity::escape_identifier(&"c".repeat(300)).is_err());
    }
}
