//! Info command handler: message metadata without validation

use crate::cli::InfoArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use ddexcheck_core::FatalError;
use ddexcheck_schemas::loader::builtin_for_version;
use ddexcheck_schemas::{MessageInfo, XmlDocument};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::instrument;

/// What `info` reports about one file
#[derive(Debug, Serialize)]
struct FileInfo {
    path: String,
    size_bytes: u64,
    lines: usize,
    #[serde(flatten)]
    message: MessageInfo,
    builtin_schema: Option<String>,
}

/// Handle the info command
#[instrument(skip(_config, output), fields(file = %args.file.display()))]
pub fn handle_info(args: InfoArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    let info = inspect(&args.file)?;

    if output.format() != crate::cli::OutputFormat::Human {
        return output.data(&info);
    }

    output.section(&info.path)?;
    let mut rows = vec![
        vec!["Message type".to_string(), info.message.message_type.clone()],
        vec![
            "ERN version".to_string(),
            info.message.schema_version.clone().unwrap_or_else(|| "not detected".into()),
        ],
        vec![
            "Built-in schema".to_string(),
            info.builtin_schema
                .as_ref()
                .map(|id| format!("builtin:{}", id))
                .unwrap_or_else(|| "none".into()),
        ],
    ];
    let optional = [
        ("Namespace", &info.message.namespace),
        ("MessageSchemaVersionId", &info.message.message_schema_version_id),
        ("BusinessProfileVersionId", &info.message.business_profile_version_id),
        ("ReleaseProfileVersionId", &info.message.release_profile_version_id),
        ("LanguageAndScriptCode", &info.message.language_and_script_code),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            rows.push(vec![label.to_string(), value.clone()]);
        }
    }
    rows.push(vec!["Size".to_string(), format!("{} bytes, {} lines", info.size_bytes, info.lines)]);

    output.table(&["Field", "Value"], rows)
}

fn inspect(path: &Path) -> Result<FileInfo> {
    if !path.is_file() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    let document = XmlDocument::parse(&text).map_err(FatalError::from)?;
    let message = MessageInfo::from_document(&document);
    let builtin_schema = message
        .schema_version
        .as_deref()
        .and_then(builtin_for_version)
        .map(str::to_string);

    Ok(FileInfo {
        path: path.display().to_string(),
        size_bytes: text.len() as u64,
        lines: text.lines().count(),
        message,
        builtin_schema,
    })
}
