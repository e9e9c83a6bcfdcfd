use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, atomic_write, log_recovery};
use crate::model::auth::{AuthFields, FormKind};
use crate::ops::auth_ops::AuthSubmitter;

pub const DUPLICATE_EMAIL: &str = "Пользователь с такой почтой уже существует";
pub const UNKNOWN_USER: &str = "Пользователь не найден";

/// A registered account. Passwords are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub email: String,
}

/// Offline submit collaborator backed by `<data_dir>/accounts.json`.
///
/// Stands in for the remote auth service: register records the account,
/// login checks that the email was registered. Credentials are not checked.
#[derive(Debug)]
pub struct LocalAccounts {
    path: PathBuf,
    accounts: Vec<Account>,
    /// Email of the last successful submit
    pub signed_in: Option<String>,
}

impl LocalAccounts {
    /// Load accounts from the data directory. A missing file starts empty;
    /// an unreadable or malformed one also starts empty, with its contents
    /// kept in the recovery log before the next register overwrites it.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join("accounts.json");
        let accounts = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(accounts) => accounts,
                Err(e) => {
                    set_aside(data_dir, &path, &e.to_string(), &text);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                set_aside(data_dir, &path, &e.to_string(), "");
                Vec::new()
            }
        };
        LocalAccounts {
            path,
            accounts,
            signed_in: None,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    fn find(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }

    fn save(&self, accounts: &[Account]) -> Result<(), String> {
        let json = serde_json::to_string_pretty(accounts).map_err(|e| e.to_string())?;
        atomic_write(&self.path, json.as_bytes()).map_err(|e| {
            warn!(
                "event=accounts_write module=accounts status=error path={} error={}",
                self.path.display(),
                e
            );
            e.to_string()
        })
    }
}

fn set_aside(data_dir: &Path, path: &Path, reason: &str, raw: &str) {
    warn!(
        "event=accounts_load module=accounts status=malformed path={} error={}",
        path.display(),
        reason
    );
    log_recovery(
        data_dir,
        RecoveryEntry::now(RecoveryCategory::Storage, "unreadable accounts file")
            .field("Path", path.display().to_string())
            .field("Reason", reason)
            .body(raw),
    );
}

impl AuthSubmitter for LocalAccounts {
    fn submit(&mut self, fields: &AuthFields, kind: FormKind) -> Result<(), String> {
        match kind {
            FormKind::Register => {
                if self.find(&fields.email).is_some() {
                    return Err(DUPLICATE_EMAIL.to_string());
                }
                let mut accounts = self.accounts.clone();
                accounts.push(Account {
                    username: fields.username.clone().unwrap_or_default(),
                    email: fields.email.clone(),
                });
                self.save(&accounts)?;
                self.accounts = accounts;
            }
            FormKind::Login => {
                if self.find(&fields.email).is_none() {
                    return Err(UNKNOWN_USER.to_string());
                }
            }
        }
        info!("event=auth_submit module=accounts status=ok type={}", kind);
        self.signed_in = Some(fields.email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use tempfile::TempDir;

    fn register_fields(email: &str) -> AuthFields {
        AuthFields {
            username: Some("alice".into()),
            email: email.into(),
            password: "secret1".into(),
        }
    }

    #[test]
    fn register_then_login() {
        let tmp = TempDir::new().unwrap();
        let mut accounts = LocalAccounts::open(tmp.path());
        accounts
            .submit(&register_fields("a@b.cd"), FormKind::Register)
            .unwrap();

        let mut reopened = LocalAccounts::open(tmp.path());
        assert_eq!(reopened.accounts().len(), 1);
        let login = AuthFields {
            username: None,
            email: "A@B.CD".into(),
            password: "whatever".into(),
        };
        reopened.submit(&login, FormKind::Login).unwrap();
        assert_eq!(reopened.signed_in.as_deref(), Some("A@B.CD"));
    }

    #[test]
    fn password_is_not_persisted() {
        let tmp = TempDir::new().unwrap();
        let mut accounts = LocalAccounts::open(tmp.path());
        accounts
            .submit(&register_fields("a@b.cd"), FormKind::Register)
            .unwrap();
        let text = fs::read_to_string(tmp.path().join("accounts.json")).unwrap();
        assert!(!text.contains("secret1"));
    }

    #[test]
    fn duplicate_register_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut accounts = LocalAccounts::open(tmp.path());
        accounts
            .submit(&register_fields("a@b.cd"), FormKind::Register)
            .unwrap();
        let err = accounts
            .submit(&register_fields("a@b.cd"), FormKind::Register)
            .unwrap_err();
        assert_eq!(err, DUPLICATE_EMAIL);
    }

    #[test]
    fn unknown_login_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut accounts = LocalAccounts::open(tmp.path());
        let err = accounts
            .submit(&register_fields("x@y.zz"), FormKind::Login)
            .unwrap_err();
        assert_eq!(err, UNKNOWN_USER);
        assert!(accounts.signed_in.is_none());
    }

    #[test]
    fn malformed_file_is_kept_in_recovery_log() {
        let tmp = TempDir::new().unwrap();
        let garbled = r#"[{"username":"bob","email":"#;
        fs::write(tmp.path().join("accounts.json"), garbled).unwrap();

        let mut accounts = LocalAccounts::open(tmp.path());
        assert!(accounts.accounts().is_empty());
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Storage);
        assert_eq!(entries[0].body, garbled);

        accounts
            .submit(&register_fields("a@b.cd"), FormKind::Register)
            .unwrap();
        assert_eq!(read_recovery_entries(tmp.path(), None)[0].body, garbled);
    }

    #[test]
    fn missing_file_leaves_no_recovery_entry() {
        let tmp = TempDir::new().unwrap();
        LocalAccounts::open(tmp.path());
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
    }

    #[test]
    fn failed_save_keeps_memory_unchanged() {
        let tmp = TempDir::new().unwrap();
        let mut accounts = LocalAccounts::open(&tmp.path().join("gone"));

        assert!(
            accounts
                .submit(&register_fields("a@b.cd"), FormKind::Register)
                .is_err()
        );
        assert!(accounts.accounts().is_empty());
        assert!(accounts.signed_in.is_none());

        let err = accounts
            .submit(&register_fields("a@b.cd"), FormKind::Login)
            .unwrap_err();
        assert_eq!(err, UNKNOWN_USER);
    }
}
