use std::collections::BTreeMap;
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use crate::model::auth::{AuthField, AuthFields, FieldErrors, FocusState, FormKind};

/// `local@domain.tld`, no whitespace and a single `@`
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern: {}", e))
});

/// External collaborator that receives a validated form.
///
/// Any failure (network, rejection, timeout) collapses into one message that
/// the form shows as its top-level error.
pub trait AuthSubmitter {
    fn submit(&mut self, fields: &AuthFields, kind: FormKind) -> Result<(), String>;
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single declarative check on a field value
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Required { message: &'static str },
    /// Length in UTF-16 code units, so a character outside the BMP counts twice
    MinLength { min: usize, message: &'static str },
    Email { message: &'static str },
}

impl Rule {
    /// The rule's message if `value` fails it
    pub fn check(&self, value: &str) -> Option<&'static str> {
        match *self {
            Rule::Required { message } => value.is_empty().then_some(message),
            Rule::MinLength { min, message } => {
                (value.encode_utf16().count() < min).then_some(message)
            }
            Rule::Email { message } => (!EMAIL_RE.is_match(value)).then_some(message),
        }
    }
}

/// Rules for `field`, applied in order; the first failure wins
pub fn rules_for(field: AuthField) -> &'static [Rule] {
    match field {
        AuthField::Username => &[
            Rule::Required {
                message: "Имя обязательно",
            },
            Rule::MinLength {
                min: 3,
                message: "Имя пользователя должно содержать минимум 3 символа",
            },
        ],
        AuthField::Email => &[
            Rule::Required {
                message: "Почта обязательна",
            },
            Rule::Email {
                message: "Некорректный формат email",
            },
        ],
        AuthField::Password => &[
            Rule::Required {
                message: "Пароль обязателен",
            },
            Rule::MinLength {
                min: 6,
                message: "Пароль должен содержать минимум 6 символов",
            },
        ],
    }
}

/// Validate one field value
pub fn validate_field(field: AuthField, value: &str) -> Option<&'static str> {
    rules_for(field).iter().find_map(|rule| rule.check(value))
}

/// Validate every field a form shows
pub fn validate_fields(kind: FormKind, fields: &AuthFields) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for &field in kind.fields() {
        let value = match field {
            AuthField::Username => fields.username.as_deref().unwrap_or(""),
            AuthField::Email => fields.email.as_str(),
            AuthField::Password => fields.password.as_str(),
        };
        if let Some(message) = validate_field(field, value) {
            errors.insert(field, message.to_string());
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the submitter was not called
    Invalid,
    /// The submitter reported an error
    Rejected(String),
    Accepted,
}

/// State of one auth form: values, per-field errors, focus, and the
/// top-level error reported by the last submit.
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub kind: FormKind,
    values: BTreeMap<AuthField, String>,
    pub errors: FieldErrors,
    pub focus: FocusState,
    /// `regis_error` / `auth_error`, depending on the form
    pub submit_error: Option<String>,
    pub is_loading: bool,
}

impl AuthForm {
    pub fn new(kind: FormKind) -> Self {
        AuthForm {
            kind,
            values: kind.fields().iter().map(|&f| (f, String::new())).collect(),
            errors: FieldErrors::new(),
            focus: FocusState::default(),
            submit_error: None,
            is_loading: false,
        }
    }

    pub fn value(&self, field: AuthField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Set a field value and re-run that field's rules.
    /// Fields the form does not show are ignored.
    pub fn set_value(&mut self, field: AuthField, value: impl Into<String>) {
        let Some(slot) = self.values.get_mut(&field) else {
            return;
        };
        *slot = value.into();
        match validate_field(field, slot) {
            Some(message) => {
                self.errors.insert(field, message.to_string());
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub fn focus(&mut self, field: AuthField) {
        self.focus.set(field, true);
    }

    pub fn blur(&mut self, field: AuthField) {
        self.focus.set(field, false);
    }

    /// Error to display for `field`: hidden while the field has focus
    pub fn visible_error(&self, field: AuthField) -> Option<&str> {
        if self.focus.is_focused(field) {
            return None;
        }
        self.errors.get(&field).map(String::as_str)
    }

    /// Current values in the shape the submitter expects
    pub fn fields(&self) -> AuthFields {
        AuthFields {
            username: match self.kind {
                FormKind::Register => Some(self.value(AuthField::Username).to_string()),
                FormKind::Login => None,
            },
            email: self.value(AuthField::Email).to_string(),
            password: self.value(AuthField::Password).to_string(),
        }
    }

    /// Validate every field, replacing the error map
    pub fn validate(&mut self) -> bool {
        self.errors = validate_fields(self.kind, &self.fields());
        self.errors.is_empty()
    }

    /// Validate, then hand the values to `submitter` exactly once if valid.
    pub fn submit(&mut self, submitter: &mut dyn AuthSubmitter) -> SubmitOutcome {
        self.submit_error = None;
        if !self.validate() {
            debug!(
                "event=auth_invalid type={} fields={}",
                self.kind,
                self.errors.len()
            );
            return SubmitOutcome::Invalid;
        }

        self.is_loading = true;
        let result = submitter.submit(&self.fields(), self.kind);
        self.is_loading = false;

        match result {
            Ok(()) => {
                info!("event=auth_accepted type={}", self.kind);
                SubmitOutcome::Accepted
            }
            Err(message) => {
                info!("event=auth_rejected type={}", self.kind);
                self.submit_error = Some(message.clone());
                SubmitOutcome::Rejected(message)
            }
        }
    }
}
