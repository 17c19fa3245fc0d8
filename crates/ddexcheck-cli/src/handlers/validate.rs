//! Validation command handler and related utilities

use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::{Config, DiscoveryConfig};
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputFormatter, OutputWriter};
use ddexcheck_core::{default_rules, BatchOrchestrator, BatchReport, DocumentSource, PipelineConfig, Validator};
use ddexcheck_schemas::loader::builtin_for_version;
use ddexcheck_schemas::{normalize_version, SchemaLoader, SchemaSource};
use glob::Pattern;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Handle the validate command
#[instrument(skip_all, fields(inputs = args.paths.len()))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("{} input path(s)", args.paths.len()));

    let discovery = discovery_settings(&args, &config.discovery);
    let files = collect_inputs(&args.paths, &discovery)?;
    info!(files = files.len(), "Collected input files");

    let pipeline = build_pipeline_config(&args, config)?;
    for id in unknown_rule_ids(&pipeline.disabled_rules) {
        output.warning(&format!("Unknown rule id '{}' in disabled rules", id))?;
    }
    if output.is_verbose() {
        let schema = pipeline
            .schema_source
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "detected per document".to_string());
        output.info(&format!(
            "Validating {} file(s) with {} worker(s), schema: {}",
            files.len(),
            pipeline.worker_count(),
            schema
        ))?;
    }

    let validator = Validator::from_config(pipeline)?;
    let report = run_batch(&validator, &files, output);

    output.report(&report)?;
    if let Some(path) = &args.save_to {
        save_report(&report, path, output.format())?;
        output.success(&format!("Report saved to {}", path.display()))?;
    }

    if report.all_valid() {
        Ok(())
    } else {
        let stats = report.statistics();
        Err(Error::ValidationFailed {
            invalid: stats.total_documents - stats.valid,
            total: stats.total_documents,
        })
    }
}

fn run_batch(validator: &Validator, files: &[PathBuf], output: &OutputWriter) -> BatchReport {
    let sources: Vec<DocumentSource> = files.iter().map(DocumentSource::from_path).collect();

    let progress = if sources.len() > 1 {
        output.progress_bar(sources.len() as u64, "Validating")
    } else {
        None
    };

    let mut orchestrator = BatchOrchestrator::new(validator);
    if let Some(pb) = progress.clone() {
        orchestrator = orchestrator.on_progress(move |_, source_id| {
            pb.set_message(source_id.to_string());
            pb.inc(1);
        });
    }

    let report = orchestrator.run(&sources);
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    report
}

/// Command-line discovery flags layered over the config file
fn discovery_settings(args: &ValidateArgs, config: &DiscoveryConfig) -> DiscoveryConfig {
    DiscoveryConfig {
        pattern: args.pattern.clone().unwrap_or_else(|| config.pattern.clone()),
        recursive: args.recursive || config.recursive,
    }
}

/// Expand the input paths into a sorted, de-duplicated list of files
///
/// Files named directly are always included; directories contribute the
/// files whose name matches the pattern.
pub(crate) fn collect_inputs(paths: &[PathBuf], discovery: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(&discovery.pattern)
        .map_err(|e| Error::invalid_args(format!("invalid pattern '{}': {}", discovery.pattern, e)))?;

    let mut files = BTreeSet::new();
    for path in paths {
        if path.is_file() {
            files.insert(path.clone());
        } else if path.is_dir() {
            let found = expand_directory(path, &pattern, discovery.recursive)?;
            if found.is_empty() {
                return Err(Error::NoInputFiles {
                    path: path.clone(),
                    pattern: discovery.pattern.clone(),
                });
            }
            files.extend(found);
        } else {
            return Err(Error::FileNotFound { path: path.clone() });
        }
    }

    Ok(files.into_iter().collect())
}

fn expand_directory(dir: &Path, pattern: &Pattern, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::other(format!("filesystem loop under {}", dir.display())),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if pattern.matches(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "Skipping file not matching pattern");
        }
    }

    Ok(found)
}

/// Pipeline options: config file first, then command-line flags
pub(crate) fn build_pipeline_config(args: &ValidateArgs, config: &Config) -> Result<PipelineConfig> {
    let mut pipeline = config.validation.clone();

    if let Some(source) = resolve_schema_source(args)? {
        pipeline.schema_source = Some(source);
    }
    if args.rules_only {
        pipeline.enable_schema_validation = false;
    }
    if args.no_business_rules {
        pipeline.enable_business_rules = false;
    }
    pipeline.strict_mode |= args.strict;
    pipeline.warnings_as_errors |= args.warnings_as_errors;
    pipeline.continue_on_error |= args.continue_on_error;
    for id in &args.disable_rules {
        if !pipeline.is_rule_disabled(id) {
            pipeline.disabled_rules.push(id.clone());
        }
    }
    if let Some(jobs) = args.jobs {
        if jobs == 0 {
            return Err(Error::invalid_args("--jobs must be at least 1"));
        }
        pipeline.workers = Some(jobs);
    }
    if let Some(seconds) = args.timeout {
        pipeline = pipeline.with_timeout(Duration::from_secs(seconds));
    }

    debug!(config = ?pipeline, "Resolved pipeline configuration");
    Ok(pipeline)
}

/// Schema chosen on the command line, if any
fn resolve_schema_source(args: &ValidateArgs) -> Result<Option<SchemaSource>> {
    if let Some(schema) = &args.schema {
        return Ok(Some(SchemaSource::from(schema.clone())));
    }

    let Some(requested) = &args.schema_version else {
        return Ok(None);
    };
    let version = normalize_version(requested)
        .ok_or_else(|| Error::invalid_args(format!("invalid schema version '{}'", requested)))?;

    if let Some(dir) = &args.schema_dir {
        let path = SchemaLoader::discover(dir, &version)?;
        return Ok(Some(SchemaSource::Path(path)));
    }

    builtin_for_version(&version)
        .map(|id| Some(SchemaSource::Resource(id.to_string())))
        .ok_or_else(|| {
            Error::invalid_args(format!(
                "no built-in schema for ERN {}; pass --schema or --schema-dir",
                version
            ))
        })
}

fn unknown_rule_ids(disabled: &[String]) -> Vec<&str> {
    let known: Vec<&'static str> = default_rules().iter().map(|rule| rule.id()).collect();
    disabled
        .iter()
        .map(String::as_str)
        .filter(|id| !known.contains(id))
        .collect()
}

/// Write the report to a file, format taken from its extension
fn save_report(report: &BatchReport, path: &Path, fallback: OutputFormat) -> Result<()> {
    let format = OutputFormat::from_extension(path).unwrap_or_else(|| {
        warn!(path = %path.display(), "Unrecognized report extension, using the output format");
        fallback
    });
    let content = format.format_report(report, false)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "<NewReleaseMessage/>").unwrap();
        path
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collect_inputs_expands_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.xml");
        touch(dir.path(), "a.xml");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "nested/c.xml");

        let flat = collect_inputs(&[dir.path().to_path_buf()], &DiscoveryConfig::default()).unwrap();
        assert_eq!(names(&flat, dir.path()), vec!["a.xml", "b.xml"]);

        let deep = DiscoveryConfig {
            recursive: true,
            ..DiscoveryConfig::default()
        };
        let all = collect_inputs(&[dir.path().to_path_buf()], &deep).unwrap();
        assert_eq!(names(&all, dir.path()), vec!["a.xml", "b.xml", "nested/c.xml"]);
    }

    #[test]
    fn test_collect_inputs_dedupes_and_keeps_explicit_files() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.xml");
        let notes = touch(dir.path(), "notes.txt");

        let files = collect_inputs(
            &[a.clone(), dir.path().to_path_buf(), notes.clone()],
            &DiscoveryConfig::default(),
        )
        .unwrap();
        assert_eq!(names(&files, dir.path()), vec!["a.xml", "notes.txt"]);
    }

    #[test]
    fn test_collect_inputs_errors() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "notes.txt");

        let empty = collect_inputs(&[dir.path().to_path_buf()], &DiscoveryConfig::default());
        assert!(matches!(empty, Err(Error::NoInputFiles { .. })));

        let missing = collect_inputs(&[dir.path().join("nope.xml")], &DiscoveryConfig::default());
        assert!(matches!(missing, Err(Error::FileNotFound { .. })));

        let bad_pattern = DiscoveryConfig {
            pattern: "[".into(),
            recursive: false,
        };
        let result = collect_inputs(&[dir.path().to_path_buf()], &bad_pattern);
        assert!(matches!(result, Err(Error::InvalidArgs(_))));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut config = Config::default();
        config.validation.disabled_rules = vec!["language-code".into()];
        config.validation.workers = Some(8);

        let args = ValidateArgs {
            rules_only: true,
            strict: true,
            jobs: Some(2),
            timeout: Some(5),
            disable_rules: vec!["language-code".into(), "duration-presence".into()],
            ..ValidateArgs::default()
        };
        let pipeline = build_pipeline_config(&args, &config).unwrap();

        assert!(!pipeline.enable_schema_validation);
        assert!(pipeline.enable_business_rules);
        assert!(pipeline.strict_mode);
        assert_eq!(pipeline.workers, Some(2));
        assert_eq!(pipeline.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(pipeline.disabled_rules, vec!["language-code", "duration-presence"]);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let args = ValidateArgs {
            jobs: Some(0),
            ..ValidateArgs::default()
        };
        assert!(matches!(
            build_pipeline_config(&args, &Config::default()),
            Err(Error::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_schema_version_selects_builtin() {
        let args = ValidateArgs {
            schema_version: Some("41".into()),
            ..ValidateArgs::default()
        };
        assert_eq!(
            resolve_schema_source(&args).unwrap(),
            Some(SchemaSource::Resource("ern-41".into()))
        );

        let unknown = ValidateArgs {
            schema_version: Some("3.7".into()),
            ..ValidateArgs::default()
        };
        assert!(matches!(resolve_schema_source(&unknown), Err(Error::InvalidArgs(_))));
    }

    #[test]
    fn test_schema_dir_discovery() {
        let dir = TempDir::new().unwrap();
        let schema = dir.path().join("ddex_4-1.yaml");
        fs::write(&schema, "version: \"4.1\"\nroots: {}\n").unwrap();

        let args = ValidateArgs {
            schema_dir: Some(dir.path().to_path_buf()),
            schema_version: Some("4.1".into()),
            ..ValidateArgs::default()
        };
        assert_eq!(resolve_schema_source(&args).unwrap(), Some(SchemaSource::Path(schema)));

        let missing = ValidateArgs {
            schema_dir: Some(dir.path().to_path_buf()),
            schema_version: Some("3.8.2".into()),
            ..ValidateArgs::default()
        };
        assert!(matches!(resolve_schema_source(&missing), Err(Error::Schema(_))));
    }

    #[test]
    fn test_explicit_schema_wins() {
        let args = ValidateArgs {
            schema: Some("builtin:ern-382".into()),
            schema_version: Some("4.1".into()),
            ..ValidateArgs::default()
        };
        assert_eq!(
            resolve_schema_source(&args).unwrap(),
            Some(SchemaSource::Resource("ern-382".into()))
        );
    }

    #[test]
    fn test_unknown_rule_ids() {
        let disabled = vec!["duration-presence".to_string(), "no-such-rule".to_string()];
        assert_eq!(unknown_rule_ids(&disabled), vec!["no-such-rule"]);
    }

    #[test]
    fn test_save_report_by_extension() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "bad.xml");
        let validator = Validator::from_config(PipelineConfig::rules_only()).unwrap();
        let report = validator_report(&validator, &file);

        let csv = dir.path().join("out/report.csv");
        save_report(&report, &csv, OutputFormat::Human).unwrap();
        assert!(fs::read_to_string(&csv).unwrap().starts_with("source,severity,code"));

        let json = dir.path().join("report.json");
        save_report(&report, &json, OutputFormat::Csv).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["total_sources"], 1);
    }

    fn validator_report(validator: &Validator, file: &Path) -> BatchReport {
        ddexcheck_core::validate_batch(validator, &[DocumentSource::from_path(file)])
    }
}
