//! Collection spec files
//!
//! YAML or JSON, one collection per file. Only `name` and `indexes` are read;
//! other attributes (schema, description, ...) are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{IndexCheckError, IndexCheckResult};
use crate::executor::IndexInfo;

/// Declared indexes of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    #[serde(default)]
    pub indexes: Vec<IndexInfo>,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>, indexes: Vec<IndexInfo>) -> Self {
        Self {
            name: name.into(),
            indexes,
        }
    }
}

/// Loads every collection spec under `dir`, sorted by path
pub fn load_collection_specs(dir: &Path) -> IndexCheckResult<Vec<CollectionSpec>> {
    let mut paths = Vec::new();
    collect(dir, &mut paths)?;
    paths.sort();

    paths.iter().map(|path| load_file(path)).collect()
}

fn load_file(path: &Path) -> IndexCheckResult<CollectionSpec> {
    let origin = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| IndexCheckError::Io {
        path: origin.clone(),
        reason: e.to_string(),
    })?;

    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
        _ => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| IndexCheckError::InvalidSpec {
        path: origin,
        reason,
    })
}

fn collect(dir: &Path, out: &mut Vec<PathBuf>) -> IndexCheckResult<()> {
    let io_err = |e: std::io::Error| IndexCheckError::Io {
        path: dir.display().to_string(),
        reason: e.to_string(),
    };

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect(&path, out)?;
        } else if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml") | Some("json")
        ) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml_and_json_specs() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("ncbi_taxon.yaml"),
            "name: ncbi_taxon\ntype: vertex\nindexes:\n  - type: fulltext\n    fields: [scientific_name]\n    minLength: 1\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("ncbi_child_of_taxon.json"),
            r#"{"name": "ncbi_child_of_taxon", "type": "edge"}"#,
        )
        .unwrap();

        let specs = load_collection_specs(temp_dir.path()).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "ncbi_child_of_taxon");
        assert!(specs[0].indexes.is_empty());
        assert_eq!(specs[1].indexes[0].fields, vec!["scientific_name".to_string()]);
        assert_eq!(
            specs[1].indexes[0].options.get("minLength"),
            Some(&serde_json::json!(1))
        );
    }

    #[test]
    fn test_malformed_spec_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.yaml"), "indexes: []\n").unwrap();

        let err = load_collection_specs(temp_dir.path()).unwrap_err();
        assert!(matches!(err, IndexCheckError::InvalidSpec { .. }));
    }
}
