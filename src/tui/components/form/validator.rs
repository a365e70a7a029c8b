//! Field-level validation for the application form
//!
//! Validation is a pure function from a field and its raw value to an
//! optional message. Every field is evaluated on each submission; one failing
//! field never stops the others from being checked.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr, sync::OnceLock};

pub const NAME_REQUIRED: &str = "이름을 입력해주세요.";
pub const NAME_TOO_SHORT: &str = "이름은 2자 이상이어야 합니다.";
pub const EMAIL_REQUIRED: &str = "이메일을 입력해주세요.";
pub const EMAIL_INVALID: &str = "올바른 이메일 형식이 아닙니다.";
pub const CAREER_REQUIRED: &str = "경력을 선택해주세요.";

/// Minimum number of characters in a trimmed name
pub const NAME_MIN_CHARS: usize = 2;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Form field identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Career,
    Github,
}

impl Field {
    /// All fields in form order
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Career, Field::Github];

    /// Fields that take part in validation
    pub const VALIDATED: [Field; 3] = [Field::Name, Field::Email, Field::Career];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Career => "career",
            Field::Github => "github",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::Github)
    }

    /// Id of the inline error element for this field
    pub fn error_id(&self) -> String {
        format!("{}-error", self.as_str())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "career" => Ok(Field::Career),
            "github" => Ok(Field::Github),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// Check one field value. `None` means the value is acceptable.
pub fn validate_field(field: Field, value: &str) -> Option<&'static str> {
    match field {
        Field::Name => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Some(NAME_REQUIRED)
            } else if trimmed.chars().count() < NAME_MIN_CHARS {
                Some(NAME_TOO_SHORT)
            } else {
                None
            }
        }
        Field::Email => {
            if value.trim().is_empty() {
                Some(EMAIL_REQUIRED)
            } else if !email_regex().is_match(value) {
                Some(EMAIL_INVALID)
            } else {
                None
            }
        }
        Field::Career => value.trim().is_empty().then_some(CAREER_REQUIRED),
        // Optional; no format check even for malformed links.
        Field::Github => None,
    }
}

/// Values read from the form on one submission attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub career: String,
    pub github: String,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Career => &self.career,
            Field::Github => &self.github,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Career => self.career = value,
            Field::Github => self.github = value,
        }
    }
}

/// Result of validating every participating field.
///
/// Holds one entry per validated field; a fresh value replaces the previous
/// one on each attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<Field, Option<&'static str>>);

impl FormErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied().flatten()
    }

    pub fn has_errors(&self) -> bool {
        self.0.values().any(Option::is_some)
    }

    /// Fields that failed, in form order
    pub fn failed(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0
            .iter()
            .filter_map(|(field, message)| message.map(|message| (*field, message)))
    }
}

/// Validate every participating field without stopping at the first failure
pub fn validate_values(values: &FormValues) -> FormErrors {
    FormErrors(
        Field::VALIDATED
            .iter()
            .map(|field| (*field, validate_field(*field, values.get(*field))))
            .collect(),
    )
}
