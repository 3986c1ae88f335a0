use crate::advisor::Advisor;
use crate::catalog::Catalog;
use crate::config::ConfigManager;
use crate::query::QueryEngine;
use anyhow::{Context as AnyhowContext, Result};
use log::debug;
use std::path::Path;
use std::sync::Arc;

pub struct AppContext {
    pub engine: QueryEngine,
    pub config_manager: ConfigManager,
}

impl AppContext {
    /// Build the context for a run in `base_path`. An explicit `config_path`
    /// replaces the global and workspace config files.
    pub fn new(base_path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config_manager = match config_path {
            Some(path) => ConfigManager::from_file(path)?,
            None => ConfigManager::new(Some(base_path))?,
        };

        let catalog = Arc::new(Catalog::kcc().context("Invalid built-in catalog")?);
        debug!("Loaded catalog with {} records", catalog.len());

        Ok(Self {
            engine: QueryEngine::new(catalog),
            config_manager,
        })
    }

    /// Advisor client built from the current config; fails without an API key.
    pub fn advisor(&self) -> Result<Advisor> {
        Advisor::new(self.config_manager.get_advisor_config())
            .context("Advisor is not configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_with_explicit_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[search]\ntop_k = 8\nmin_score = 0.0\n").unwrap();

        let ctx = AppContext::new(dir.path(), Some(config_path.as_path())).unwrap();
        let search = ctx.config_manager.get_search_config();
        let results = ctx.engine.search("rice", search.top_k, search.min_score);

        assert_eq!(results.len(), ctx.engine.catalog().len());
    }
}
