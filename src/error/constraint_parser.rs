use std::sync::OnceLock;

use regex::Regex;

/// Unique index guarding live version names within a service.
pub const VERSION_NAME_CONSTRAINT: &str = "versions_service_id_name_key";

/// Unique index guarding live service names.
pub const SERVICE_NAME_CONSTRAINT: &str = "services_name_key";

/// Utility for pulling structured details out of PostgreSQL constraint
/// violation messages.
///
/// The server normally reports the violated constraint through the error
/// fields, in which case the message is never parsed. The regex fallback
/// covers drivers and proxies that only forward the message text.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    constraint_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            // Matches "Key (field)=(value)" in the DETAIL line
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)")
                .expect("static regex compiles"),
            constraint_name: Regex::new(r#"constraint "([^"]+)""#)
                .expect("static regex compiles"),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Returns the name of the violated constraint.
    ///
    /// Prefers the name reported by the database and falls back to the
    /// quoted name inside the message.
    ///
    /// # Examples
    /// ```
    /// use service_catalog::error::ConstraintParser;
    ///
    /// let message = "duplicate key value violates unique constraint \"versions_service_id_name_key\"";
    /// assert_eq!(
    ///     ConstraintParser::violated_constraint(message, None).as_deref(),
    ///     Some("versions_service_id_name_key"),
    /// );
    /// ```
    pub fn violated_constraint(message: &str, constraint_name: Option<&str>) -> Option<String> {
        if let Some(name) = constraint_name.filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }

        Self::patterns()
            .constraint_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts the `(columns, values)` pair from a DETAIL line.
    pub fn extract_key_value(message: &str) -> Option<(String, String)> {
        let caps = Self::patterns().key_value.captures(message)?;
        let key = caps.get(1)?.as_str().to_string();
        let value = caps.get(2)?.as_str().to_string();
        Some((key, value))
    }

    /// True when the violated constraint is `expected`.
    pub fn is_constraint(message: &str, constraint_name: Option<&str>, expected: &str) -> bool {
        Self::violated_constraint(message, constraint_name).as_deref() == Some(expected)
    }
}
