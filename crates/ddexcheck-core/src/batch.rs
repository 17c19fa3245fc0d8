//! Batch orchestration
//!
//! Runs the pipeline over many documents on a bounded pool of scoped worker
//! threads. Documents are independent; results come back in input order no
//! matter which worker finished first.
//!
//! - Panics inside a document's pipeline are caught and reported as fatal
//! - A panicking progress callback is logged and never drops an entry
//! - A document exceeding the configured time limit is reported as fatal
//! - Stop-on-error keeps every entry up to and including the first fatal one
//! - Continue-on-error records fatal documents as synthetic results
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::error::{FatalError, Result};
use crate::pipeline::Validator;
use crate::result::ValidationResult;
use crate::statistics::BatchStatistics;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Where a document's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
    Text(String),
    Path(PathBuf),
}

/// One document to validate, identified for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub id: String,
    pub content: SourceContent,
}

impl DocumentSource {
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: SourceContent::Text(text.into()),
        }
    }

    /// File source; the id is the path as given
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            id: path.display().to_string(),
            content: SourceContent::Path(path.to_path_buf()),
        }
    }

    /// Document text; unreadable or non-UTF-8 input is a parse failure
    pub fn read(&self) -> Result<Cow<'_, str>> {
        match &self.content {
            SourceContent::Text(text) => Ok(Cow::Borrowed(text)),
            SourceContent::Path(path) => {
                let bytes = std::fs::read(path)
                    .map_err(|e| FatalError::parse(format!("cannot read {}: {e}", path.display())))?;
                String::from_utf8(bytes)
                    .map(Cow::Owned)
                    .map_err(|e| FatalError::parse(format!("{} is not valid UTF-8: {e}", path.display())))
            }
        }
    }
}

/// Outcome for one source, in input position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub source_id: String,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: Result<ValidationResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum OutcomeRef<'a> {
    Result(&'a ValidationResult),
    Fatal(&'a FatalError),
}

fn serialize_outcome<S: Serializer>(outcome: &Result<ValidationResult>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match outcome {
        Ok(result) => OutcomeRef::Result(result),
        Err(fatal) => OutcomeRef::Fatal(fatal),
    }
    .serialize(serializer)
}

impl BatchEntry {
    pub fn is_valid(&self) -> bool {
        matches!(&self.outcome, Ok(result) if result.is_valid())
    }

    pub fn result(&self) -> Option<&ValidationResult> {
        self.outcome.as_ref().ok()
    }

    /// The fatal error, whether it halted the batch or was recorded in a synthetic result
    pub fn fatal(&self) -> Option<&FatalError> {
        match &self.outcome {
            Ok(result) => result.fatal(),
            Err(fatal) => Some(fatal),
        }
    }
}

/// Ordered outcomes of a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    entries: Vec<BatchEntry>,
    total_sources: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

impl BatchReport {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sources submitted, including any never processed after a halt
    pub fn total_sources(&self) -> usize {
        self.total_sources
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn results(&self) -> impl Iterator<Item = &ValidationResult> {
        self.entries.iter().filter_map(BatchEntry::result)
    }

    /// The error that stopped the batch, if any
    pub fn halted_by(&self) -> Option<&FatalError> {
        self.entries.last().and_then(|entry| entry.outcome.as_ref().err())
    }

    /// Every source was processed
    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.total_sources
    }

    /// Complete and every document valid
    pub fn all_valid(&self) -> bool {
        self.is_complete() && self.entries.iter().all(BatchEntry::is_valid)
    }

    pub fn statistics(&self) -> BatchStatistics {
        BatchStatistics::from_report(self)
    }
}

type ProgressFn = dyn Fn(usize, &str) + Send + Sync;

/// Bounded-parallel runner over a shared validator
pub struct BatchOrchestrator<'a> {
    validator: &'a Validator,
    progress: Option<Box<ProgressFn>>,
}

impl std::fmt::Debug for BatchOrchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("validator", self.validator)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(validator: &'a Validator) -> Self {
        Self {
            validator,
            progress: None,
        }
    }

    /// Called with (input index, source id) as each document finishes
    pub fn on_progress(mut self, callback: impl Fn(usize, &str) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Validate every source and return outcomes in input order
    #[instrument(skip_all, fields(documents = sources.len()))]
    pub fn run(&self, sources: &[DocumentSource]) -> BatchReport {
        let start = Instant::now();
        let config = self.validator.config();
        let workers = config.worker_count().min(sources.len()).max(1);
        let continue_on_error = config.continue_on_error;
        info!(documents = sources.len(), workers, continue_on_error, "Starting batch");

        let next = AtomicUsize::new(0);
        let halt_at = AtomicUsize::new(usize::MAX);
        let (next_ref, halt_ref) = (&next, &halt_at);

        let finished: Vec<(usize, BatchEntry)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let index = next_ref.fetch_add(1, Ordering::SeqCst);
                            if index >= sources.len() || index > halt_ref.load(Ordering::SeqCst) {
                                break;
                            }
                            let entry = self.process(&sources[index], continue_on_error);
                            if entry.outcome.is_err() {
                                halt_ref.fetch_min(index, Ordering::SeqCst);
                            }
                            self.report_progress(index, &entry.source_id);
                            done.push((index, entry));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle.join().unwrap_or_else(|payload| {
                        warn!(error = %panic_message(payload.as_ref()), "Batch worker panicked");
                        Vec::new()
                    })
                })
                .collect()
        });

        let mut slots: Vec<Option<BatchEntry>> = vec![None; sources.len()];
        for (index, entry) in finished {
            slots[index] = Some(entry);
        }

        let halt = halt_at.into_inner();
        let mut kept = if halt == usize::MAX { sources.len() } else { halt + 1 };
        // A slot left empty inside the kept range belongs to a worker that died
        if !continue_on_error {
            if let Some(lost) = slots[..kept].iter().position(Option::is_none) {
                kept = lost + 1;
            }
        }
        if halt != usize::MAX || kept < sources.len() {
            warn!(source = %sources[kept - 1].id, "Batch stopped on fatal error");
        }
        slots.truncate(kept);
        let entries: Vec<BatchEntry> = slots
            .into_iter()
            .zip(sources)
            .map(|(slot, source)| slot.unwrap_or_else(|| Self::lost(source, continue_on_error)))
            .collect();

        let report = BatchReport {
            entries,
            total_sources: sources.len(),
            elapsed: start.elapsed(),
        };
        info!(
            processed = report.len(),
            total = report.total_sources(),
            elapsed_ms = report.elapsed().as_millis() as u64,
            "Batch finished"
        );
        report
    }

    fn process(&self, source: &DocumentSource, continue_on_error: bool) -> BatchEntry {
        let start = Instant::now();
        let outcome = self.guarded(source, start);
        settle(source, outcome, start.elapsed(), continue_on_error)
    }

    /// Entry for a source whose worker died before handing back its outcome
    fn lost(source: &DocumentSource, continue_on_error: bool) -> BatchEntry {
        let fatal = FatalError::Panic {
            message: "worker thread panicked before reporting this document".to_string(),
        };
        settle(source, Err(fatal), Duration::ZERO, continue_on_error)
    }

    fn report_progress(&self, index: usize, source_id: &str) {
        let Some(progress) = &self.progress else {
            return;
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| progress(index, source_id))) {
            warn!(source = %source_id, error = %panic_message(payload.as_ref()), "Progress callback panicked");
        }
    }

    fn guarded(&self, source: &DocumentSource, start: Instant) -> Result<ValidationResult> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.validator.validate_source(source)))
            .unwrap_or_else(|payload| {
                Err(FatalError::Panic {
                    message: panic_message(payload.as_ref()),
                })
            });

        if let Some(limit) = self.validator.config().timeout() {
            let elapsed = start.elapsed();
            if elapsed > limit {
                return Err(FatalError::Timeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                    limit_ms: limit.as_millis() as u64,
                });
            }
        }
        outcome
    }
}

fn settle(
    source: &DocumentSource,
    outcome: Result<ValidationResult>,
    elapsed: Duration,
    continue_on_error: bool,
) -> BatchEntry {
    let outcome = match outcome {
        Err(fatal) if continue_on_error => {
            debug!(source = %source.id, error = %fatal, "Recording fatal error and continuing");
            Ok(ValidationResult::from_fatal(source.id.clone(), fatal, elapsed))
        }
        other => other,
    };
    BatchEntry {
        source_id: source.id.clone(),
        outcome,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "validation panicked".to_string())
}

/// Validate sources with a one-off orchestrator
pub fn validate_batch(validator: &Validator, sources: &[DocumentSource]) -> BatchReport {
    BatchOrchestrator::new(validator).run(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::diagnostic::Code;
    use std::sync::{Arc, Mutex};

    const GOOD: &str = "<NewReleaseMessage><ResourceList><SoundRecording>\
        <ResourceReference>A1</ResourceReference><Duration>PT3M</Duration>\
        </SoundRecording></ResourceList></NewReleaseMessage>";
    const BAD: &str = "<NewReleaseMessage><ResourceList><SoundRecording>\
        <ResourceReference>A1</ResourceReference><ISRC>NOPE</ISRC><Duration>PT3M</Duration>\
        </SoundRecording></ResourceList></NewReleaseMessage>";
    const BROKEN: &str = "<NewReleaseMessage><ResourceList>";

    fn validator(config: PipelineConfig) -> Validator {
        Validator::from_config(config).unwrap()
    }

    fn sources(texts: &[&str]) -> Vec<DocumentSource> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| DocumentSource::from_text(format!("doc-{i}.xml"), *text))
            .collect()
    }

    #[test]
    fn test_results_keep_input_order() {
        let validator = validator(PipelineConfig::rules_only().with_workers(4));
        let texts: Vec<&str> = (0..20).map(|i| if i % 3 == 0 { BAD } else { GOOD }).collect();
        let report = validate_batch(&validator, &sources(&texts));

        assert_eq!(report.len(), 20);
        assert!(report.is_complete());
        for (i, entry) in report.entries().iter().enumerate() {
            assert_eq!(entry.source_id, format!("doc-{i}.xml"));
            assert_eq!(entry.is_valid(), i % 3 != 0);
        }
        assert!(!report.all_valid());
    }

    #[test]
    fn test_stop_on_error_truncates_after_first_fatal() {
        let validator = validator(PipelineConfig::rules_only().with_workers(3));
        let report = validate_batch(&validator, &sources(&[GOOD, BAD, BROKEN, GOOD, BROKEN]));

        assert_eq!(report.len(), 3);
        assert_eq!(report.total_sources(), 5);
        assert!(!report.is_complete());
        assert_eq!(report.halted_by().map(FatalError::code), Some(Code::FatalParseError));
        assert!(report.entries()[0].is_valid());
        assert!(!report.entries()[1].is_valid());
    }

    #[test]
    fn test_continue_on_error_records_synthetic_results() {
        let validator = validator(PipelineConfig::rules_only().with_continue_on_error(true));
        let report = validate_batch(&validator, &sources(&[BROKEN, GOOD, BROKEN]));

        assert_eq!(report.len(), 3);
        assert!(report.halted_by().is_none());
        let broken = report.entries()[0].result().unwrap();
        assert!(broken.is_fatal());
        assert!(broken.has_code(Code::FatalParseError));
        assert!(report.entries()[1].is_valid());
        assert!(report.entries()[2].fatal().is_some());
    }

    #[test]
    fn test_missing_file_is_parse_failure() {
        let validator = validator(PipelineConfig::rules_only().with_continue_on_error(true));
        let missing = DocumentSource::from_path("/nonexistent/release.xml");
        let report = validate_batch(&validator, &[missing]);
        let fatal = report.entries()[0].fatal().unwrap();
        assert_eq!(fatal.code(), Code::FatalParseError);
        assert!(fatal.to_string().contains("/nonexistent/release.xml"));
    }

    #[test]
    fn test_non_utf8_file_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.xml");
        std::fs::write(&path, [0x3c, 0x61, 0xe9, 0x2f, 0x3e]).unwrap();
        let err = DocumentSource::from_path(&path).read().unwrap_err();
        assert!(matches!(err, FatalError::Parse { .. }));
    }

    #[test]
    fn test_progress_reports_every_document() {
        let validator = validator(PipelineConfig::rules_only().with_workers(2));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let report = BatchOrchestrator::new(&validator)
            .on_progress(move |index, _| sink.lock().unwrap().push(index))
            .run(&sources(&[GOOD, GOOD, BAD, GOOD]));

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(report.len(), 4);
    }

    #[test]
    fn test_panicking_progress_callback_keeps_every_entry() {
        let validator = validator(PipelineConfig::rules_only().with_workers(1));
        let report = BatchOrchestrator::new(&validator)
            .on_progress(|index, _| {
                if index == 1 {
                    panic!("progress sink went away");
                }
            })
            .run(&sources(&[GOOD, BAD, GOOD]));

        assert_eq!(report.len(), 3);
        assert!(report.is_complete());
        assert!(report.halted_by().is_none());
        assert!(report.entries()[0].is_valid());
        assert!(!report.entries()[1].is_valid());
        assert!(report.entries()[2].is_valid());
    }

    #[test]
    fn test_lost_entry_is_a_panic_fatal() {
        let source = DocumentSource::from_text("gone.xml", GOOD);

        let stopped = BatchOrchestrator::lost(&source, false);
        assert!(matches!(stopped.outcome, Err(FatalError::Panic { .. })));

        let recorded = BatchOrchestrator::lost(&source, true);
        let result = recorded.result().unwrap();
        assert!(result.is_fatal());
        assert_eq!(recorded.source_id, "gone.xml");
    }

    #[test]
    fn test_zero_timeout_marks_documents_fatal() {
        let config = PipelineConfig::rules_only()
            .with_continue_on_error(true)
            .with_timeout(Duration::ZERO);
        let validator = validator(config);
        let report = validate_batch(&validator, &sources(&[GOOD]));
        // Any measurable elapsed time exceeds a zero limit.
        if let Some(fatal) = report.entries()[0].fatal() {
            assert!(matches!(fatal, FatalError::Timeout { limit_ms: 0, .. }));
            assert!(fatal.is_transient());
        }
    }

    #[test]
    fn test_empty_batch() {
        let validator = validator(PipelineConfig::default());
        let report = validate_batch(&validator, &[]);
        assert!(report.is_empty());
        assert!(report.is_complete());
        assert!(report.all_valid());
    }

    #[test]
    fn test_entry_serialization() {
        let validator = validator(PipelineConfig::rules_only().with_continue_on_error(false));
        let report = validate_batch(&validator, &sources(&[BROKEN]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["source_id"], "doc-0.xml");
        assert_eq!(json["entries"][0]["outcome"]["fatal"]["kind"], "parse");
    }
}
