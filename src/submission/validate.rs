use std::fmt;

use crate::models::{RawSubmission, Submission};

pub const NAME_MIN: usize = 1;
pub const NAME_MAX: usize = 50;
pub const MESSAGE_MIN: usize = 5;
pub const MESSAGE_MAX: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing(Field),
    Length { field: Field, min: usize, max: usize },
    MalformedEmail,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing(field) => write!(f, "{}: field required", field.as_str()),
            Violation::Length { field, min, max } => write!(
                f,
                "{}: must be between {min} and {max} characters",
                field.as_str()
            ),
            Violation::MalformedEmail => f.write_str("email: is not a valid email address"),
        }
    }
}

/// Every constraint a submission broke, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl TryFrom<RawSubmission> for Submission {
    type Error = ValidationError;

    fn try_from(raw: RawSubmission) -> Result<Self, Self::Error> {
        validate(raw)
    }
}

/// Check and normalize raw form fields.
///
/// Fields are trimmed before their length is measured in chars, and the
/// email's domain is lower-cased. All violations are collected rather
/// than stopping at the first.
pub fn validate(raw: RawSubmission) -> Result<Submission, ValidationError> {
    let mut violations = Vec::new();

    let name = bounded(raw.name, Field::Name, NAME_MIN, NAME_MAX, &mut violations);
    let email = email(raw.email, &mut violations);
    let message = bounded(
        raw.message,
        Field::Message,
        MESSAGE_MIN,
        MESSAGE_MAX,
        &mut violations,
    );

    match (name, email, message) {
        (Some(name), Some(email), Some(message)) if violations.is_empty() => Ok(Submission {
            name,
            email,
            message,
        }),
        _ => Err(ValidationError { violations }),
    }
}

fn bounded(
    value: Option<String>,
    field: Field,
    min: usize,
    max: usize,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    let Some(value) = value else {
        violations.push(Violation::Missing(field));
        return None;
    };

    let value = value.trim();
    let len = value.chars().count();
    if len < min || len > max {
        violations.push(Violation::Length { field, min, max });
        return None;
    }

    Some(value.to_string())
}

fn email(value: Option<String>, violations: &mut Vec<Violation>) -> Option<String> {
    let Some(value) = value else {
        violations.push(Violation::Missing(Field::Email));
        return None;
    };

    let value = value.trim();
    if !validator::validate_email(value) {
        violations.push(Violation::MalformedEmail);
        return None;
    }

    // validate_email guarantees an '@'
    let (local, domain) = value.rsplit_once('@')?;
    Some(format!("{local}@{}", domain.to_lowercase()))
}
