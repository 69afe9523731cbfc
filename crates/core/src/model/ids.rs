use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters in a quiz access code.
pub const QUIZ_CODE_LEN: usize = 8;

/// Alphabet quiz codes are drawn from.
pub const QUIZ_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Unique identifier for a Quiz
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    /// Creates a new `QuizId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a question, unique within its quiz.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Student identity used for the at-most-one-attempt rule.
///
/// Students are identified by email; the value is trimmed and lowercased so
/// `Ana@School.edu` and `ana@school.edu ` refer to the same student.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    #[must_use]
    pub fn new(email: impl AsRef<str>) -> Self {
        Self(email.as_ref().trim().to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Short access code students type to join a quiz.
///
/// Always stored uppercase so lookups are case-insensitive.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuizCode(String);

impl QuizCode {
    /// Parse and normalize a quiz code.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the trimmed value is not exactly
    /// `QUIZ_CODE_LEN` ASCII alphanumeric characters.
    pub fn parse(raw: &str) -> Result<Self, ParseIdError> {
        let normalized = raw.trim().to_ascii_uppercase();
        let valid = normalized.len() == QUIZ_CODE_LEN
            && normalized.bytes().all(|b| QUIZ_CODE_ALPHABET.contains(&b));
        if valid {
            Ok(Self(normalized))
        } else {
            Err(ParseIdError {
                kind: "QuizCode".to_string(),
            })
        }
    }

    /// Build a code from characters the caller already drew from
    /// `QUIZ_CODE_ALPHABET`.
    pub(crate) fn from_trusted(value: &str) -> Self {
        Self(value.to_ascii_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for QuizCode {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QuizCode> for String {
    fn from(code: QuizCode) -> Self {
        code.0
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Debug for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StudentId({})", self.0)
    }
}

impl fmt::Debug for QuizCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizCode({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for QuizCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuizCode {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_code_is_normalized_to_uppercase() {
        let code: QuizCode = " dcit26qz ".parse().unwrap();
        assert_eq!(code.as_str(), "DCIT26QZ");
        assert_eq!(code, QuizCode::parse("DCIT26QZ").unwrap());
    }

    #[test]
    fn quiz_code_rejects_wrong_length_or_symbols() {
        assert!(QuizCode::parse("ABC").is_err());
        assert!(QuizCode::parse("ABCDEFGHI").is_err());
        assert!(QuizCode::parse("ABCD-FGH").is_err());
        assert!(QuizCode::parse("").is_err());
    }

    #[test]
    fn quiz_code_deserialization_validates() {
        let ok: QuizCode = serde_json::from_str("\"ab12cd34\"").unwrap();
        assert_eq!(ok.to_string(), "AB12CD34");
        assert!(serde_json::from_str::<QuizCode>("\"nope\"").is_err());
    }

    #[test]
    fn student_id_ignores_case_and_whitespace() {
        assert_eq!(StudentId::new(" Ana@School.edu "), StudentId::new("ana@school.edu"));
    }

    #[test]
    fn string_ids_serialize_transparently() {
        let id = QuizId::new("quiz_default_001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"quiz_default_001\"");
        assert_eq!(format!("{id:?}"), "QuizId(quiz_default_001)");
    }
}
