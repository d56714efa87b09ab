//! Error types for message definition parsing

use thiserror::Error;

/// Main error type for message definition parsing
///
/// Every variant that carries a `line` field reports 1-based line numbers.
/// Errors produced below the line loop start with `line == 0` and get their
/// real position attached via [`ParseError::at_line`].
#[derive(Error, Debug)]
pub enum ParseError {
    /// A line matched neither the constant grammar, the field grammar, a
    /// comment, nor blank
    #[error("malformed definition at line {line}: `{text}` - {reason}")]
    MalformedDefinition {
        /// 1-based line number
        line: usize,
        /// The offending line or token
        text: String,
        /// What was wrong with it
        reason: String,
    },

    /// A constant's literal value does not parse for its declared type
    #[error("invalid constant value at line {line}: {constant}={value} - {reason}")]
    InvalidConstantValue {
        /// 1-based line number
        line: usize,
        /// Constant name
        constant: String,
        /// The rejected literal text
        value: String,
        /// Why the literal was rejected
        reason: String,
    },

    /// A field's default value does not parse for its declared type and arity
    #[error("invalid default value at line {line} for field `{field}`: {value} - {reason}")]
    InvalidDefaultValue {
        /// 1-based line number
        line: usize,
        /// Field name
        field: String,
        /// The rejected default expression
        value: String,
        /// Why the default was rejected
        reason: String,
    },

    /// The same field name was declared twice in one message
    #[error("duplicate field name at line {line}: `{name}`")]
    DuplicateField {
        /// 1-based line number
        line: usize,
        /// The repeated field name
        name: String,
    },

    /// I/O error reading a message file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    /// Attach line context to an error raised while parsing a single line.
    ///
    /// Variants already carrying a non-zero line are left untouched.
    #[must_use]
    pub fn at_line(self, line_number: usize, raw_line: &str) -> Self {
        match self {
            ParseError::MalformedDefinition { line, text, reason } if line == 0 => {
                let text = if text.is_empty() {
                    raw_line.trim().to_string()
                } else {
                    text
                };
                ParseError::MalformedDefinition {
                    line: line_number,
                    text,
                    reason,
                }
            }
            ParseError::InvalidConstantValue {
                line,
                constant,
                value,
                reason,
            } if line == 0 => ParseError::InvalidConstantValue {
                line: line_number,
                constant,
                value,
                reason,
            },
            ParseError::InvalidDefaultValue {
                line,
                field,
                value,
                reason,
            } if line == 0 => ParseError::InvalidDefaultValue {
                line: line_number,
                field,
                value,
                reason,
            },
            ParseError::DuplicateField { line, name } if line == 0 => ParseError::DuplicateField {
                line: line_number,
                name,
            },
            other => other,
        }
    }
}

/// Helper to create a [`ParseError::MalformedDefinition`] without line context
#[must_use]
pub fn malformed(text: &str, reason: &str) -> ParseError {
    ParseError::MalformedDefinition {
        line: 0,
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_fills_missing_context() {
        let err = malformed("", "unknown syntax").at_line(7, "  bogus line  ");
        match err {
            ParseError::MalformedDefinition { line, text, .. } => {
                assert_eq!(line, 7);
                assert_eq!(text, "bogus line");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_at_line_keeps_existing_line() {
        let err = ParseError::DuplicateField {
            line: 3,
            name: "x".to_string(),
        };
        match err.at_line(9, "int32 x") {
            ParseError::DuplicateField { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_display_messages() {
        let err = ParseError::InvalidConstantValue {
            line: 2,
            constant: "MAX".to_string(),
            value: "abc".to_string(),
            reason: "must be a valid integer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MAX"));
        assert!(msg.contains("abc"));
        assert!(msg.contains("line 2"));

        let err = ParseError::InvalidDefaultValue {
            line: 4,
            field: "velocity".to_string(),
            value: "fast".to_string(),
            reason: "must be a valid float".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("velocity"));
        assert!(msg.contains("line 4"));

        let err = ParseError::DuplicateField {
            line: 5,
            name: "x".to_string(),
        };
        assert!(err.to_string().contains("duplicate field"));
    }

    #[test]
    fn test_parse_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let parse_err: ParseError = io_err.into();
        assert!(matches!(parse_err, ParseError::Io(..)));
        assert!(parse_err.to_string().contains("file not found"));
    }
}
