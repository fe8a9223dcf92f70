//! Field-format rules for account-identity fields.
//!
//! These mirror the signup/recovery constraints enforced at the HTTP boundary:
//! login id and password are composite character-class rules ("at least one of
//! each"), which regular expressions in this ecosystem cannot express without
//! lookaheads, so they are written as explicit scans.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DomainError, DomainResult};

/// Special characters permitted (and required, at least one) in passwords.
const PASSWORD_SPECIALS: &str = r##"!@#$%^&*()_+-=[]{};':"\|,.<>/?"##;

/// Display name: 2-32 letters, Latin or Hangul (syllables and jamo).
static PERSON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\u{3131}-\u{314E}\u{AC00}-\u{D7A3}]{2,32}$").unwrap());

/// Login id: ASCII letters and digits only, at least one of each, 6-12 chars.
pub fn valid_login_id(s: &str) -> bool {
    let len_ok = (6..=12).contains(&s.chars().count());
    len_ok
        && s.chars().all(|c| c.is_ascii_alphanumeric())
        && s.chars().any(|c| c.is_ascii_alphabetic())
        && s.chars().any(|c| c.is_ascii_digit())
}

/// Password: letters, digits and specials, at least one of each class, 8-16 chars.
pub fn valid_password(s: &str) -> bool {
    let len_ok = (8..=16).contains(&s.chars().count());
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    len_ok
        && s.chars().all(allowed)
        && s.chars().any(|c| c.is_ascii_alphabetic())
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

/// Display name: 2-32 letters (Latin or Hangul).
pub fn valid_person_name(s: &str) -> bool {
    PERSON_NAME.is_match(s)
}

/// Practical email check: dotted-atom local part (no leading/trailing/double
/// dots), hostname labels without leading/trailing dashes, alphabetic TLD of
/// 2-6 chars, total length capped at 253.
pub fn valid_email(s: &str) -> bool {
    if s.len() > 253 {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    valid_local_part(local) && valid_domain(domain)
}

/// Normalize an email for storage/lookup: trim and lowercase.
pub fn normalize_email(s: &str) -> String {
    s.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Checked variants. Same rules, but the failure carries a user-facing message.
// ─────────────────────────────────────────────────────────────────────────────

pub fn ensure_login_id(s: &str) -> DomainResult<()> {
    if valid_login_id(s) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "login id must be 6-12 letters and digits with at least one of each",
        ))
    }
}

pub fn ensure_password(s: &str) -> DomainResult<()> {
    if valid_password(s) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "password must be 8-16 chars with a letter, a digit and a special character",
        ))
    }
}

pub fn ensure_person_name(s: &str) -> DomainResult<()> {
    if valid_person_name(s) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "name must be 2-32 Latin or Hangul letters",
        ))
    }
}

pub fn ensure_email(s: &str) -> DomainResult<()> {
    if valid_email(s) {
        Ok(())
    } else {
        Err(DomainError::validation("malformed email address"))
    }
}

fn valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    const LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_{|}~-.";
    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(c))
}

fn valid_domain(domain: &str) -> bool {
    if domain.starts_with('-') || domain.contains("--") {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let label_ok = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if !labels.iter().all(|l| label_ok(l)) {
        return false;
    }
    // TLD: alphabetic, 2-6 chars.
    let tld = labels[labels.len() - 1];
    (2..=6).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_id_requires_letter_and_digit() {
        assert!(valid_login_id("duck123"));
        assert!(!valid_login_id("duckling")); // no digit
        assert!(!valid_login_id("1234567")); // no letter
        assert!(!valid_login_id("ab1")); // too short
        assert!(!valid_login_id("abcdefgh12345")); // too long
        assert!(!valid_login_id("duck_123")); // underscore not allowed
    }

    #[test]
    fn password_requires_all_three_classes() {
        assert!(valid_password("passw0rd!"));
        assert!(!valid_password("password!")); // no digit
        assert!(!valid_password("passw0rd")); // no special
        assert!(!valid_password("p0!a")); // too short
        assert!(!valid_password("p0!aaaaaaaaaaaaaaaaaa")); // too long
    }

    #[test]
    fn person_name_accepts_latin_and_hangul() {
        assert!(valid_person_name("Alice"));
        assert!(valid_person_name("김오리"));
        assert!(!valid_person_name("A")); // too short
        assert!(!valid_person_name("Alice Smith")); // space not allowed
        assert!(!valid_person_name("Alice3")); // digits not allowed
    }

    #[test]
    fn email_rejects_dot_abuse() {
        assert!(valid_email("duck@example.com"));
        assert!(valid_email("a.b+c@mail.example.co"));
        assert!(!valid_email(".duck@example.com"));
        assert!(!valid_email("duck.@example.com"));
        assert!(!valid_email("du..ck@example.com"));
        assert!(!valid_email("duck@example"));
        assert!(!valid_email("duck@-example.com"));
        assert!(!valid_email("duck@example.c")); // TLD too short
        assert!(!valid_email("duck@example.toolong")); // TLD too long
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Duck@Example.COM "), "duck@example.com");
    }

    #[test]
    fn checked_variants_report_validation_failures() {
        assert!(ensure_login_id("duck123").is_ok());
        assert!(ensure_password("passw0rd!").is_ok());
        assert!(ensure_person_name("Alice").is_ok());
        assert!(ensure_email("duck@example.com").is_ok());

        let err = ensure_login_id("no").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().contains("login id"));

        let err = ensure_password("password").unwrap_err();
        assert!(err.to_string().contains("password"));
    }
}
