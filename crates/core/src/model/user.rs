use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::StudentId;
use crate::model::result::StudentIdentity;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
}

/// Signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    email: String,
    role: Role,
}

/// Raw login form input.
#[derive(Debug, Clone, Default)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserDraft {
    #[must_use]
    pub fn student(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: Role::Student,
        }
    }

    #[must_use]
    pub fn instructor(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: Role::Instructor,
        }
    }

    /// Trim and validate the form.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the name is blank or the email has no `@`.
    pub fn validate(self) -> Result<User, UserError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }
        if email.is_empty() || !email.contains('@') {
            return Err(UserError::InvalidEmail);
        }
        Ok(User {
            name,
            email,
            role: self.role,
        })
    }
}

impl User {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        StudentId::new(&self.email)
    }

    #[must_use]
    pub fn identity(&self) -> StudentIdentity {
        StudentIdentity::new(self.name.clone(), self.email.clone())
    }
}
