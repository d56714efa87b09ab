//! Message model and the line-oriented definition parser

use std::fs;
use std::path::Path;

use super::catalog::Primitive;
use super::errors::{ParseError, ParseResult, malformed};
use super::types::{Constant, Field, Role, Type};
use super::validation::{
    COMMENT_DELIMITER, CONSTANT_SEPARATOR, is_valid_constant_name, is_valid_message_name,
    is_valid_package_name,
};

/// The structured representation of one parsed message or service side
///
/// Created empty before parsing begins and populated line by line; callers
/// only ever see a fully parsed model, since any parse failure discards the
/// partial value.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageModel {
    /// Owning package name
    pub package: String,
    /// Message name, derived from the source file name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// Constants in declaration order
    pub constants: Vec<Constant>,
    /// Plain message, service request, or service response
    pub role: Role,
}

impl MessageModel {
    /// Create a new empty message model
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedDefinition`] if the package or message
    /// name does not match its naming pattern.
    pub fn new(package: String, name: String, role: Role) -> ParseResult<Self> {
        if !is_valid_package_name(&package) {
            return Err(malformed(&package, "invalid package name pattern"));
        }
        if !is_valid_message_name(&name) {
            return Err(malformed(&name, "invalid message name pattern"));
        }

        Ok(MessageModel {
            package,
            name,
            fields: Vec::new(),
            constants: Vec::new(),
            role,
        })
    }

    /// Get a field by name
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a constant by name
    #[must_use]
    pub fn get_constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// Full name as `package/Name`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.package, self.name)
    }
}

impl std::fmt::Display for MessageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# {}/{}", self.package, self.name)?;
        for constant in &self.constants {
            writeln!(f, "{constant}")?;
        }
        if !self.constants.is_empty() && !self.fields.is_empty() {
            writeln!(f)?;
        }
        for field in &self.fields {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Parse a message definition file.
///
/// The message name is the file stem; the role comes from the filename
/// (`Request`/`Response` substrings mark service sides).
///
/// # Errors
///
/// Returns [`ParseError`] if the file cannot be read or any line is invalid.
pub fn parse_message_file<P: AsRef<Path>>(
    package: &str,
    definition_path: P,
) -> ParseResult<MessageModel> {
    let path = definition_path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| malformed(&path.display().to_string(), "invalid filename"))?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string();
    let role = Role::from_filename(file_name);

    let content = fs::read_to_string(path)?;
    parse_message_string(package, &name, role, &content)
}

/// Parse a message definition from string content.
///
/// The grammar is line-oriented: blank lines and `#` comments are skipped,
/// `TYPE NAME=VALUE` declares a constant, `TYPE NAME [DEFAULT]` declares a
/// field. Declaration order is preserved. No trailing newline is required.
///
/// # Errors
///
/// Returns [`ParseError`] with line context on the first invalid line.
pub fn parse_message_string(
    package: &str,
    name: &str,
    role: Role,
    content: &str,
) -> ParseResult<MessageModel> {
    tracing::debug!(package, name, "parsing message definition");

    // Tabs count as plain whitespace
    let normalized = content.replace('\t', " ");

    let mut model = MessageModel::new(package.to_string(), name.to_string(), role)?;
    for (index, line) in normalized.lines().enumerate() {
        model = parse_line(model, index + 1, line)?;
    }
    Ok(model)
}

/// Consume one line, returning the extended model.
///
/// The model is threaded through by value so the grammar can be exercised
/// line by line without shared mutable state.
fn parse_line(mut model: MessageModel, line_number: usize, raw: &str) -> ParseResult<MessageModel> {
    let content = strip_comment(raw).trim();
    if content.is_empty() {
        return Ok(model);
    }

    if is_constant_line(content) {
        let constant = parse_constant_line(content).map_err(|e| e.at_line(line_number, raw))?;
        model.constants.push(constant);
    } else {
        let field = parse_field_line(content, &model.package)
            .map_err(|e| e.at_line(line_number, raw))?;
        if model.get_field(&field.name).is_some() {
            return Err(ParseError::DuplicateField {
                line: line_number,
                name: field.name,
            });
        }
        model.fields.push(field);
    }
    Ok(model)
}

/// Strip a trailing comment, leaving `#` inside quoted literals alone
fn strip_comment(raw: &str) -> &str {
    let mut quote_char: Option<char> = None;
    let mut escaped = false;
    for (index, ch) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote_char {
            Some(q) => match ch {
                '\\' => escaped = true,
                c if c == q => quote_char = None,
                _ => {}
            },
            None => match ch {
                '"' | '\'' => quote_char = Some(ch),
                COMMENT_DELIMITER => return &raw[..index],
                _ => {}
            },
        }
    }
    raw
}

/// A line declares a constant only when the text before the first `=` reads
/// as `PRIMITIVE NAME`; anything else (array bounds, defaults containing
/// `=`) takes the field path
fn is_constant_line(content: &str) -> bool {
    let Some((left, _)) = content.split_once(CONSTANT_SEPARATOR) else {
        return false;
    };
    let parts: Vec<&str> = left.split_whitespace().collect();
    matches!(
        parts.as_slice(),
        [type_name, constant_name]
            if Primitive::from_name(type_name).is_some()
                && is_valid_constant_name(constant_name)
    )
}

fn parse_constant_line(content: &str) -> ParseResult<Constant> {
    let Some((left, value)) = content.split_once(CONSTANT_SEPARATOR) else {
        return Err(malformed(content, "constant must be TYPE NAME=VALUE"));
    };

    let left_parts: Vec<&str> = left.split_whitespace().collect();
    let [type_name, const_name] = left_parts.as_slice() else {
        return Err(malformed(content, "constant must be TYPE NAME=VALUE"));
    };

    Constant::new(type_name, const_name, value.trim())
}

fn parse_field_line(content: &str, package: &str) -> ParseResult<Field> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(malformed(content, "field must have a type and a name"));
    }

    let ty = Type::parse(parts[0], package)?;
    let name = parts[1];
    let default = if parts.len() > 2 {
        Some(parts[2..].join(" "))
    } else {
        None
    };

    Field::new(ty, name, default.as_deref())
}
