//! Schema Catalog Adapter
//!
//! Holds every named flow schema in memory and tracks which one is
//! active. Schemas are loaded once, from a directory of `.json`, `.yaml`
//! or `.yml` files (the file stem is the schema name), and validated on
//! load.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::schema::FlowSchema;
use crate::ports::{SchemaError, SchemaProvider};

#[derive(Debug)]
struct CatalogState {
    schemas: BTreeMap<String, Arc<FlowSchema>>,
    active: String,
}

/// In-memory catalog of validated flow schemas.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    inner: Arc<RwLock<CatalogState>>,
}

impl SchemaCatalog {
    /// Builds a catalog from named schemas.
    ///
    /// The active schema is `default` when given, otherwise the first name
    /// in sorted order.
    ///
    /// # Errors
    ///
    /// Fails when the list is empty, a schema is invalid, or `default`
    /// names no schema.
    pub fn from_schemas<I>(schemas: I, default: Option<&str>) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (String, FlowSchema)>,
    {
        let mut map = BTreeMap::new();
        for (name, schema) in schemas {
            schema.validate().map_err(|source| SchemaError::Invalid {
                name: name.clone(),
                source,
            })?;
            map.insert(name, Arc::new(schema));
        }

        let active = match default {
            Some(name) if map.contains_key(name) => name.to_string(),
            Some(name) => return Err(SchemaError::NotFound(name.to_string())),
            None => map.keys().next().cloned().ok_or(SchemaError::Empty)?,
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(CatalogState {
                schemas: map,
                active,
            })),
        })
    }

    /// Loads every schema file in `dir`.
    pub async fn load_dir(dir: impl AsRef<Path>, default: Option<&str>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| SchemaError::Io(format!("{}: {}", dir.display(), e)))?;

        let mut schemas = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SchemaError::Io(e.to_string()))?
        {
            let path = entry.path();
            let Some(format) = SchemaFormat::from_path(&path) else {
                continue;
            };
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            let text = fs::read_to_string(&path)
                .await
                .map_err(|e| SchemaError::Io(format!("{}: {}", path.display(), e)))?;
            let schema = format.parse(&name, &text)?;
            tracing::info!(schema = %name, path = %path.display(), "schema loaded");
            schemas.push((name, schema));
        }

        Self::from_schemas(schemas, default)
    }
}

#[derive(Debug, Clone, Copy)]
enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(SchemaFormat::Json),
            Some("yaml") | Some("yml") => Some(SchemaFormat::Yaml),
            _ => None,
        }
    }

    fn parse(self, name: &str, text: &str) -> Result<FlowSchema, SchemaError> {
        let parsed = match self {
            SchemaFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            SchemaFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| SchemaError::Parse {
            name: name.to_string(),
            message,
        })
    }
}

#[async_trait]
impl SchemaProvider for SchemaCatalog {
    async fn active(&self) -> Arc<FlowSchema> {
        let inner = self.inner.read().await;
        // `active` always names a loaded schema: set from the map and only
        // replaced by `switch` after a successful lookup.
        Arc::clone(&inner.schemas[&inner.active])
    }

    async fn active_name(&self) -> String {
        self.inner.read().await.active.clone()
    }

    async fn list(&self) -> Vec<String> {
        self.inner.read().await.schemas.keys().cloned().collect()
    }

    async fn switch(&self, name: &str) -> Result<Arc<FlowSchema>, SchemaError> {
        let mut inner = self.inner.write().await;
        let schema = inner
            .schemas
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        inner.active = name.to_string();
        tracing::info!(schema = %name, "active schema switched");
        Ok(schema)
    }
}
