//! Catalog sources.

use super::{CardTemplate, CatalogError, CatalogResult};
use async_trait::async_trait;
use std::path::PathBuf;

const BUILTIN_CATALOG: &str = include_str!("../../assets/cards.json");

/// Where card templates come from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the raw template list
    async fn fetch(&self) -> CatalogResult<Vec<CardTemplate>>;

    /// Human-readable origin, used in log lines
    fn describe(&self) -> String;
}

/// Catalog stored as a JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    async fn fetch(&self) -> CatalogResult<Vec<CardTemplate>> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        parse_templates(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    templates: Vec<CardTemplate>,
}

impl StaticSource {
    pub fn new(templates: Vec<CardTemplate>) -> Self {
        Self { templates }
    }

    /// The catalog bundled with the crate
    ///
    /// # Errors
    ///
    /// Only fails if the bundled asset itself is broken.
    pub fn builtin() -> CatalogResult<Self> {
        Ok(Self::new(parse_templates(BUILTIN_CATALOG)?))
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn fetch(&self) -> CatalogResult<Vec<CardTemplate>> {
        Ok(self.templates.clone())
    }

    fn describe(&self) -> String {
        format!("static catalog ({} templates)", self.templates.len())
    }
}

/// Parse a JSON array of templates
pub fn parse_templates(json: &str) -> CatalogResult<Vec<CardTemplate>> {
    Ok(serde_json::from_str(json)?)
}
