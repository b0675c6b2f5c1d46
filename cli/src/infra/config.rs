//! Infrastructure implementation of the `ConfigStore` port.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{ThemerConfig, resolve_target};

/// Production implementation of `ConfigStore` that uses JSON files on disk.
pub struct JsonConfigStore;

impl ConfigStore for JsonConfigStore {
    fn load(&self, path: &Path) -> Result<ThemerConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let mut config: ThemerConfig = serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;

        if let Some(target) = config.target.take() {
            let real = std::fs::canonicalize(path)
                .with_context(|| format!("cannot resolve {}", path.display()))?;
            let dir = real.parent().unwrap_or_else(|| Path::new("."));
            config.target = Some(resolve_target(dir, &target));
        }
        Ok(config)
    }

    fn save(&self, path: &Path, config: &ThemerConfig) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(config).context("cannot serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", path.display()))?;
        }
        Ok(())
    }
}
