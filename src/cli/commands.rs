//! CLI command implementations
//!
//! Every command loads the configuration, builds the registry and store it
//! needs, runs once and exits. Command output is a single JSON object on
//! stdout; logs go to stderr as JSON lines.

use std::path::Path;
use std::sync::Arc;

use crate::executor::MemoryStore;
use crate::indexes::{ensure_indexes, load_collection_specs};
use crate::observability::{LogTarget, Logger};
use crate::registry::{builtin_templates, RegistrySnapshot, TemplateLoader, TemplateRegistry};
use crate::service::{summarize, QueryService};

use super::args::Command;
use super::config::ServiceConfig;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
///
/// Stdout is reserved for the command's JSON response, so log lines are
/// routed to stderr first.
pub fn run_command(cmd: Command) -> CliResult<()> {
    Logger::set_target(LogTarget::Stderr);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    match cmd {
        Command::Query { config, data, name } => rt.block_on(query(&config, &data, &name)),
        Command::List { config } => list(&config),
        Command::Ensure {
            config,
            data,
            specs,
        } => rt.block_on(ensure(&config, &data, &specs)),
    }
}

/// Load configuration and apply its log level
fn load_config(config_path: &Path) -> CliResult<ServiceConfig> {
    let config = ServiceConfig::load(config_path)?;
    Logger::set_min_severity(config.severity());
    Ok(config)
}

/// Build the registry: built-ins first, then the template directory
pub fn build_registry(config: &ServiceConfig) -> CliResult<TemplateRegistry> {
    let snapshot = match config.templates_path() {
        Some(dir) => TemplateLoader::new(&dir).load_snapshot(config.include_builtin_templates)?,
        None => RegistrySnapshot::from_templates(builtin_templates()?)?,
    };
    Ok(TemplateRegistry::from_snapshot(snapshot))
}

fn load_store(data_path: &Path) -> CliResult<MemoryStore> {
    let store = MemoryStore::load_jsonl(data_path)?;
    Logger::info(
        "STORE_LOADED",
        &[("path", &data_path.display().to_string())],
    );
    Ok(store)
}

/// Execute one stored query
///
/// Parameters are read from stdin as a JSON object. The result set or
/// the error body is written to stdout.
pub async fn query(config_path: &Path, data_path: &Path, name: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let registry = build_registry(&config)?;
    let store = load_store(data_path)?;

    let service = QueryService::new(Arc::new(registry), Arc::new(store))
        .with_timeout(config.query_timeout());

    let params = read_request()?;

    match service.execute(name, &params).await {
        Ok(result) => write_response(serde_json::to_value(&result)?),
        Err(err) => {
            write_error(err.to_json())?;
            Err(CliError::query_failed(err.code()))
        }
    }
}

/// List registered stored queries
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let registry = build_registry(&config)?;

    let summaries = summarize(&*registry.snapshot()?);
    write_response(serde_json::to_value(&summaries)?)
}

/// Check declared collection indexes against the store
pub async fn ensure(config_path: &Path, data_path: &Path, specs_dir: &Path) -> CliResult<()> {
    let _config = load_config(config_path)?;
    let store = load_store(data_path)?;
    let specs = load_collection_specs(specs_dir)?;

    let report = ensure_indexes(&store, &specs).await?;
    write_response(serde_json::to_value(&report)?)?;

    if report.is_ok() {
        Ok(())
    } else {
        Err(CliError::indexes_missing(report.failed_names.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EXTRA_TEMPLATE: &str = r#"
name: taxonomy_search_exact
params:
  type: object
  required: [search_text]
  properties:
    search_text: {type: string}
    sciname_field: {type: string, default: scientific_name}
query: |
  FOR doc IN FULLTEXT(@@taxon_coll, @sciname_field, @search_text)
    RETURN doc
pipeline:
  - stage: search
    collection: "@taxon_coll"
    field: sciname_field
    text: search_text
"#;

    #[test]
    fn test_build_registry_builtin_only() {
        let registry = build_registry(&ServiceConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec!["taxonomy_search_species_strain_no_sort".to_string()]
        );
    }

    #[test]
    fn test_build_registry_with_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("exact.yaml"), EXTRA_TEMPLATE).unwrap();

        let config = ServiceConfig {
            templates_dir: Some(temp_dir.path().display().to_string()),
            ..ServiceConfig::default()
        };
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 2);

        let config = ServiceConfig {
            include_builtin_templates: false,
            ..config
        };
        assert_eq!(build_registry(&config).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_data_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_store(&temp_dir.path().join("absent.jsonl")).unwrap_err();
        assert_eq!(err.code_str(), "SQ_CLI_DATA_ERROR");
    }
}
