use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::warn;
use tempfile::NamedTempFile;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- taskdesk recovery log: data that could not be kept in storage.
     View with: td recovery
     Prune old entries: td recovery prune -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Stored value could not be read or parsed and was set aside
    Storage,
    /// A write failed; the unsaved list is kept here
    Write,
    /// A task was deleted
    Delete,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Storage => write!(f, "storage"),
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Delete => write!(f, "delete"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "storage" => Some(RecoveryCategory::Storage),
            "write" => Some(RecoveryCategory::Write),
            "delete" => Some(RecoveryCategory::Delete),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn now(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    /// Format this entry as a markdown block for the recovery log.
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        // Body as fenced code block
        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push_str("\n---\n");
        out
    }

    /// Serialize to a JSON value for `td recovery --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

// ---------------------------------------------------------------------------
// Appending
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Failures are logged, never returned.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(data_dir, &entry) {
        warn!(
            "event=recovery_write module=io status=error category={} error={}",
            entry.category, e
        );
    }
}

fn log_recovery_inner(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(data_dir);
    let needs_header = fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries, most recent first.
pub fn read_recovery_entries(data_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match fs::read_to_string(recovery_log_path(data_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries.reverse();
    entries
}

/// Parse all entries from the log content string (oldest first).
fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some((timestamp, category, description)) =
            line.strip_prefix("## ").and_then(parse_entry_header)
        else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }
            if line == "---" {
                break;
            }
            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }
            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(" [")?;
    let (category_str, description) = rest.split_once("] ")?;

    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let category = RecoveryCategory::parse_category(category_str)?;

    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Drop entries older than `before` (default: `PRUNE_AGE_DAYS` ago), or every
/// entry when `all` is set. Returns the number of entries removed.
pub fn prune_recovery(
    data_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }

    let content = fs::read_to_string(&path)?;
    let entries = parse_entries(&content);
    let original_count = entries.len();

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let mut out = String::from(FILE_HEADER);
    let mut kept = 0;
    for entry in entries {
        if !all && entry.timestamp >= cutoff {
            out.push_str(&entry.to_markdown());
            kept += 1;
        }
    }

    atomic_write(&path, out.as_bytes())?;
    Ok(original_count - kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_entry(category: RecoveryCategory, desc: &str, body: &str) -> RecoveryEntry {
        RecoveryEntry::now(category, desc)
            .field("Key", "projects")
            .field("Reason", "expected value at line 1 column 1")
            .body(body)
    }

    #[test]
    fn test_entry_formatting() {
        let entry = make_entry(RecoveryCategory::Storage, "malformed value", "not json");
        let md = entry.to_markdown();
        assert!(md.starts_with("## "));
        assert!(md.contains("[storage] malformed value"));
        assert!(md.contains("Key: projects"));
        assert!(md.contains("```text\nnot json\n```"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn test_log_and_read() {
        let tmp = TempDir::new().unwrap();
        log_recovery(
            tmp.path(),
            make_entry(RecoveryCategory::Storage, "first", "{{{"),
        );
        log_recovery(
            tmp.path(),
            make_entry(RecoveryCategory::Delete, "second", "[x] task"),
        );

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 2);
        // Most recent first
        assert_eq!(entries[0].description, "second");
        assert_eq!(entries[0].category, RecoveryCategory::Delete);
        assert_eq!(entries[1].body, "{{{");
        assert_eq!(
            entries[1].fields[0],
            ("Key".to_string(), "projects".to_string())
        );

        let content = fs::read_to_string(recovery_log_path(tmp.path())).unwrap();
        assert!(content.starts_with("<!-- taskdesk recovery log"));
        assert_eq!(content.matches("<!--").count(), 1);
    }

    #[test]
    fn test_read_with_limit() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            log_recovery(
                tmp.path(),
                make_entry(RecoveryCategory::Write, &format!("entry {}", i), ""),
            );
        }
        let entries = read_recovery_entries(tmp.path(), Some(2));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "entry 4");
        assert_eq!(entries[1].description, "entry 3");
    }

    #[test]
    fn test_read_nonexistent_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
    }

    #[test]
    fn test_multiline_body_round_trip() {
        let tmp = TempDir::new().unwrap();
        let body = "[\n  {\"title\": \"broken\"\n---\n";
        log_recovery(
            tmp.path(),
            make_entry(RecoveryCategory::Storage, "multi", body),
        );
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, body.trim_end_matches('\n'));
    }

    #[test]
    fn test_prune_before_cutoff() {
        let tmp = TempDir::new().unwrap();
        let mut old = make_entry(RecoveryCategory::Write, "old", "");
        old.timestamp = Utc::now() - chrono::Duration::days(60);
        log_recovery(tmp.path(), old);
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Write, "new", ""));

        let removed = prune_recovery(tmp.path(), None, false).unwrap();
        assert_eq!(removed, 1);
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "new");
    }

    #[test]
    fn test_prune_all() {
        let tmp = TempDir::new().unwrap();
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Write, "a", ""));
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Write, "b", ""));
        assert_eq!(prune_recovery(tmp.path(), None, true).unwrap(), 2);
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
    }

    #[test]
    fn test_prune_no_log_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(prune_recovery(tmp.path(), None, false).unwrap(), 0);
    }

    #[test]
    fn test_parse_entry_header() {
        let (ts, cat, desc) =
            parse_entry_header("2025-05-14T10:00:00Z [delete] task 1a2b3c4d deleted").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-05-14T10:00:00+00:00");
        assert_eq!(cat, RecoveryCategory::Delete);
        assert_eq!(desc, "task 1a2b3c4d deleted");
        assert!(parse_entry_header("garbage").is_none());
        assert!(parse_entry_header("2025-05-14T10:00:00Z [bogus] x").is_none());
    }

    #[test]
    fn test_entry_to_json() {
        let entry = make_entry(RecoveryCategory::Storage, "desc", "body");
        let json = entry.to_json();
        assert_eq!(json["category"], "storage");
        assert_eq!(json["fields"]["Key"], "projects");
        assert_eq!(json["body"], "body");
    }

    #[test]
    fn test_atomic_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        atomic_write(&path, b"[]").unwrap();
        atomic_write(&path, b"[1]").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1]");
    }
}
