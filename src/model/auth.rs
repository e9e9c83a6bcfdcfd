use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two auth forms fired a submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Register,
    Login,
}

impl FormKind {
    /// Fields shown by this form, in display order
    pub fn fields(self) -> &'static [AuthField] {
        match self {
            FormKind::Register => &[AuthField::Username, AuthField::Email, AuthField::Password],
            FormKind::Login => &[AuthField::Email, AuthField::Password],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Register => "register",
            FormKind::Login => "login",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input of an auth form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthField {
    Username,
    Email,
    Password,
}

impl AuthField {
    pub fn placeholder(self) -> &'static str {
        match self {
            AuthField::Username => "Имя пользователя",
            AuthField::Email => "Email",
            AuthField::Password => "Пароль",
        }
    }
}

/// Values handed to the submit collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFields {
    /// Only the register form carries a username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
    pub password: String,
}

/// One validation message per invalid field
pub type FieldErrors = BTreeMap<AuthField, String>;

/// Which fields currently hold input focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    pub username: bool,
    pub email: bool,
    pub password: bool,
}

impl FocusState {
    pub fn is_focused(&self, field: AuthField) -> bool {
        match field {
            AuthField::Username => self.username,
            AuthField::Email => self.email,
            AuthField::Password => self.password,
        }
    }

    pub fn set(&mut self, field: AuthField, focused: bool) {
        match field {
            AuthField::Username => self.username = focused,
            AuthField::Email => self.email = focused,
            AuthField::Password => self.password = focused,
        }
    }
}
