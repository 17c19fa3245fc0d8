//! Summary statistics over a batch report

use crate::batch::BatchReport;
use crate::diagnostic::Code;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStatistics {
    /// Sources submitted
    pub total_documents: usize,
    /// Sources with an outcome; smaller than the total after a halt
    pub processed: usize,
    pub valid: usize,
    /// Completed with at least one error diagnostic
    pub invalid: usize,
    /// Aborted by a fatal error, recorded or halting
    pub fatal: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Percentage of processed documents that are valid
    pub success_rate: f64,
    pub codes: BTreeMap<Code, usize>,
    pub message_types: BTreeMap<String, usize>,
    pub schema_versions: BTreeMap<String, usize>,
    pub elapsed_ms: u64,
    pub average_ms: f64,
}

impl BatchStatistics {
    pub fn from_report(report: &BatchReport) -> Self {
        let mut stats = Self {
            total_documents: report.total_sources(),
            processed: report.len(),
            elapsed_ms: report.elapsed().as_millis() as u64,
            ..Self::default()
        };

        let mut document_ms = 0u128;
        for entry in report.entries() {
            if entry.fatal().is_some() {
                stats.fatal += 1;
            } else if entry.is_valid() {
                stats.valid += 1;
            } else {
                stats.invalid += 1;
            }

            let Some(result) = entry.result() else {
                if let Some(fatal) = entry.fatal() {
                    stats.total_errors += 1;
                    *stats.codes.entry(fatal.code()).or_default() += 1;
                }
                continue;
            };

            document_ms += result.elapsed().as_millis();
            stats.total_errors += result.error_count();
            stats.total_warnings += result.warning_count();
            for diagnostic in result.diagnostics() {
                *stats.codes.entry(diagnostic.code()).or_default() += 1;
            }
            if let Some(message_type) = result.message_type() {
                *stats.message_types.entry(message_type.to_string()).or_default() += 1;
            }
            if let Some(version) = result.schema_version() {
                *stats.schema_versions.entry(version.to_string()).or_default() += 1;
            }
        }

        if stats.processed > 0 {
            stats.success_rate = stats.valid as f64 / stats.processed as f64 * 100.0;
            stats.average_ms = document_ms as f64 / stats.processed as f64;
        }
        stats
    }

    /// Most frequent codes first; ties keep catalog order
    pub fn top_codes(&self, limit: usize) -> Vec<(Code, usize)> {
        let mut codes: Vec<(Code, usize)> = self.codes.iter().map(|(code, count)| (*code, *count)).collect();
        codes.sort_by(|a, b| b.1.cmp(&a.1));
        codes.truncate(limit);
        codes
    }
}
