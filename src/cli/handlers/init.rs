use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::workspace::{self, DATA_DIR_NAME};

const CONFIG_TEMPLATE: &str = r##"[storage]
# Storage key holding the project list; the list lives in .taskdesk/<key>.json
key = "{key}"

[log]
# trace, debug, info, warn or error. TASKDESK_LOG overrides this.
level = "info"

[ui]
# Project opened when no --project is given
default_project = 0
show_key_hints = true
#
# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# red = "#FF4444"
# green = "#44FF88"
# selection_bg = "#3D1438"
# edit_bg = "#241040"
"##;

/// Config text for a new workspace
fn render_config(key: &str) -> String {
    CONFIG_TEMPLATE.replace("{key}", key)
}

pub fn cmd_init(args: InitArgs, start_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match start_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let data_dir = root.join(DATA_DIR_NAME);

    if data_dir.join("config.toml").exists() && !args.force {
        return Err(format!(
            "taskdesk workspace already exists in {}/ (use --force to rewrite config)",
            data_dir.display()
        )
        .into());
    }

    // Warn about an enclosing workspace
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = workspace::discover_workspace(parent)
    {
        eprintln!(
            "Note: enclosing workspace found at {}/",
            parent_root.join(DATA_DIR_NAME).display()
        );
    }

    let key = args.key.as_deref().unwrap_or("projects");
    let config = render_config(key);
    // Reject keys the storage layer would refuse
    crate::io::storage::FileStorage::new(&data_dir).path_for(key)?;

    workspace::create_data_dir(&root, &config)?;
    println!("Initialized taskdesk workspace in {}/", data_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::Config;

    #[test]
    fn template_parses_with_key() {
        let config: Config = toml::from_str(&render_config("work")).unwrap();
        assert_eq!(config.storage.key, "work");
        assert_eq!(config.log.level, "info");
        assert_eq!(config.ui.default_project, 0);
        assert!(config.ui.show_key_hints);
    }

    #[test]
    fn init_creates_data_dir_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        let args = || InitArgs {
            key: None,
            force: false,
        };
        cmd_init(args(), Some(tmp.path())).unwrap();
        assert!(tmp.path().join(DATA_DIR_NAME).join("config.toml").exists());
        assert!(cmd_init(args(), Some(tmp.path())).is_err());
    }

    #[test]
    fn init_rejects_bad_key() {
        let tmp = tempfile::TempDir::new().unwrap();
        let args = InitArgs {
            key: Some("../x".into()),
            force: false,
        };
        assert!(cmd_init(args, Some(tmp.path())).is_err());
        assert!(!tmp.path().join(DATA_DIR_NAME).exists());
    }
}
