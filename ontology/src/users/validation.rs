//! Checks on user-supplied account input.
//!
//! Every check reports *at most one* [`Violation`] per field, and
//! [`validate`] reports fields in a fixed order (username, password, first
//! name, last name), so hosts can show the messages directly.

use unicode_general_category::{GeneralCategory, get_general_category};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Letters in the Unicode sense: categories `Lu`, `Ll`, `Lt`, `Lm` and `Lo`.
/// Letter-like numbers such as `Ⅷ` and combining marks are not letters.
fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Decimal digits of any script (`Nd`); `²` or `½` are not digits.
fn is_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    Username,
    Password,
    FirstName,
    LastName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Violation {
    #[error("Username cannot be empty")]
    EmptyUsername,
    #[error("Username must consist of only letters, digits and underscore")]
    InvalidUsername,
    #[error("Password must consist of at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("Password must not contain any whitespace")]
    PasswordWhitespace,
    #[error("Name cannot be empty")]
    EmptyName(Field),
    #[error("Name must only consist of letters or space")]
    InvalidName(Field),
}

impl Violation {
    /// The input field this violation belongs to.
    #[must_use]
    pub const fn field(self) -> Field {
        match self {
            Self::EmptyUsername | Self::InvalidUsername => Field::Username,
            Self::PasswordTooShort | Self::PasswordWhitespace => Field::Password,
            Self::EmptyName(f) | Self::InvalidName(f) => f,
        }
    }
}

#[must_use]
pub fn validate_username(username: &str) -> Option<Violation> {
    if username.is_empty() {
        Some(Violation::EmptyUsername)
    } else if !username
        .chars()
        .all(|c| is_letter(c) || is_digit(c) || c == '_')
    {
        Some(Violation::InvalidUsername)
    } else {
        None
    }
}

/// Length is counted in characters, not bytes.
#[must_use]
pub fn validate_password(password: &str) -> Option<Violation> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        Some(Violation::PasswordTooShort)
    } else if password.chars().any(char::is_whitespace) {
        Some(Violation::PasswordWhitespace)
    } else {
        None
    }
}

fn validate_name(name: &str, field: Field) -> Option<Violation> {
    if name.is_empty() {
        Some(Violation::EmptyName(field))
    } else if !name.chars().all(|c| is_letter(c) || c == ' ') {
        Some(Violation::InvalidName(field))
    } else {
        None
    }
}

#[inline]
#[must_use]
pub fn validate_first_name(name: &str) -> Option<Violation> {
    validate_name(name, Field::FirstName)
}

#[inline]
#[must_use]
pub fn validate_last_name(name: &str) -> Option<Violation> {
    validate_name(name, Field::LastName)
}

/// Validates a sign-up form. `password` is skipped if `None`.
#[must_use]
pub fn validate(
    username: &str,
    password: Option<&str>,
    first_name: &str,
    last_name: &str,
) -> Vec<Violation> {
    [
        validate_username(username),
        password.and_then(validate_password),
        validate_first_name(first_name),
        validate_last_name(last_name),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Validates a log-in form.
#[must_use]
pub fn validate_credentials(username: &str, password: &str) -> Vec<Violation> {
    [validate_username(username), validate_password(password)]
        .into_iter()
        .flatten()
        .collect()
}

/// Collapses runs of whitespace to a single space and trims both ends.
#[must_use]
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

crate::utils::tests! {
    valid_usernames(#[values("a", "user_1", "Ünïcode", "___", "X9", "user٣")] name: &str) {
        assert_eq!(validate_username(name), None);
    };
    invalid_usernames(#[values("a b", "user-1", "dot.name", "tab\t", "@", "x²", "½", "aⅧ")] name: &str) {
        assert_eq!(validate_username(name), Some(Violation::InvalidUsername));
    };
    empty_username {
        assert_eq!(validate_username(""), Some(Violation::EmptyUsername));
    };
    passwords {
        assert_eq!(validate_password("12345678"), None);
        assert_eq!(validate_password("pässwörd"), None);
        assert_eq!(validate_password("short"), Some(Violation::PasswordTooShort));
        // length is checked before whitespace
        assert_eq!(validate_password("a b"), Some(Violation::PasswordTooShort));
        assert_eq!(validate_password("long enough"), Some(Violation::PasswordWhitespace));
    };
    names {
        assert_eq!(validate_first_name("Mary Ann"), None);
        assert_eq!(validate_last_name(""), Some(Violation::EmptyName(Field::LastName)));
        assert_eq!(validate_first_name("R2D2"), Some(Violation::InvalidName(Field::FirstName)));
        assert_eq!(validate_first_name("Ⅷ"), Some(Violation::InvalidName(Field::FirstName)));
        assert_eq!(validate_last_name("Zoë Ōtsuka"), None);
        assert_eq!(validate_last_name("Ann²"), Some(Violation::InvalidName(Field::LastName)));
    };
    fields_in_fixed_order {
        let v = validate("bad name", Some("short"), "", "0");
        assert_eq!(
            v.iter().map(|v| v.field()).collect::<Vec<_>>(),
            vec![Field::Username, Field::Password, Field::FirstName, Field::LastName]
        );
        assert!(validate("user", None, "Jo", "Doe").is_empty());
        assert_eq!(validate_credentials("", "12345678"), vec![Violation::EmptyUsername]);
    };
    messages {
        assert_eq!(
            Violation::PasswordTooShort.to_string(),
            "Password must consist of at least 8 characters"
        );
    };
    whitespace_is_normalized {
        assert_eq!(normalize_whitespace("  Mary \t  Ann "), "Mary Ann");
        assert_eq!(normalize_whitespace("   "), "");
    }
}
