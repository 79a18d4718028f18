use serde::Serialize;

/// Form fields as they arrived, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// A contact-form submission that passed validation.
///
/// Only obtainable through [`crate::submission::validate`], so holding one
/// means every field is within bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) message: String,
}

impl Submission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Identifier assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
