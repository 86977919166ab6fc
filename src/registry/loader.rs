//! Template loader for stored query definition files
//!
//! - Definitions are YAML (`.yaml`, `.yml`) or JSON (`.json`)
//! - One stored query per file, directories are walked recursively
//! - A malformed file fails the whole load; nothing is partially registered

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{RegistryError, RegistryResult};
use super::registry::RegistrySnapshot;
use super::template::{QueryTemplate, TemplateDefinition};

const TAXONOMY_SEARCH_SPECIES_STRAIN_NO_SORT: &str =
    include_str!("../../stored_queries/taxonomy/taxonomy_search_species_strain_no_sort.yaml");

/// Reads stored query definitions from text or disk.
pub struct TemplateLoader {
    /// Directory containing definition files
    template_dir: PathBuf,
}

impl TemplateLoader {
    pub fn new(template_dir: &Path) -> Self {
        Self {
            template_dir: template_dir.to_path_buf(),
        }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Parses a YAML definition.
    pub fn parse_yaml(source: &str, origin: &str) -> RegistryResult<QueryTemplate> {
        let def: TemplateDefinition = serde_yaml::from_str(source)
            .map_err(|e| RegistryError::invalid(origin, format!("Invalid YAML: {}", e)))?;
        QueryTemplate::try_from(def)
    }

    /// Parses a JSON definition.
    pub fn parse_json(source: &str, origin: &str) -> RegistryResult<QueryTemplate> {
        let def: TemplateDefinition = serde_json::from_str(source)
            .map_err(|e| RegistryError::invalid(origin, format!("Invalid JSON: {}", e)))?;
        QueryTemplate::try_from(def)
    }

    /// Loads every definition under the template directory.
    pub fn load_all(&self) -> RegistryResult<Vec<QueryTemplate>> {
        let mut paths = Vec::new();
        collect_definition_files(&self.template_dir, &mut paths)?;
        paths.sort();

        paths.iter().map(|path| Self::load_file(path)).collect()
    }

    /// Loads the directory into a snapshot, rejecting duplicate names.
    pub fn load_snapshot(&self, include_builtin: bool) -> RegistryResult<RegistrySnapshot> {
        let mut templates = if include_builtin {
            builtin_templates()?
        } else {
            Vec::new()
        };
        templates.extend(self.load_all()?);
        RegistrySnapshot::from_templates(templates)
    }

    /// Loads a single definition file.
    pub fn load_file(path: &Path) -> RegistryResult<QueryTemplate> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| RegistryError::Io {
            path: origin.clone(),
            reason: e.to_string(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&content, &origin),
            _ => Self::parse_yaml(&content, &origin),
        }
    }
}

fn is_definition_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}

fn collect_definition_files(dir: &Path, out: &mut Vec<PathBuf>) -> RegistryResult<()> {
    let io_err = |e: std::io::Error| RegistryError::Io {
        path: dir.display().to_string(),
        reason: e.to_string(),
    };

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_definition_files(&path, out)?;
        } else if is_definition_file(&path) {
            out.push(path);
        }
    }

    Ok(())
}

/// Stored queries compiled into the binary.
pub fn builtin_templates() -> RegistryResult<Vec<QueryTemplate>> {
    Ok(vec![TemplateLoader::parse_yaml(
        TAXONOMY_SEARCH_SPECIES_STRAIN_NO_SORT,
        "builtin:taxonomy_search_species_strain_no_sort",
    )?])
}
