// Tests for report rendering
//
// Reports are produced by running the real validator over small inline
// messages so the rendered shapes track the core types.

use super::*;
use ddexcheck_core::{validate_batch, Code, DocumentSource, PipelineConfig, Validator};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const GOOD: &str = "<NewReleaseMessage><ResourceList><SoundRecording>\
    <ResourceReference>A1</ResourceReference><Duration>PT3M</Duration>\
    </SoundRecording></ResourceList></NewReleaseMessage>";
const BAD: &str = "<NewReleaseMessage><ResourceList><SoundRecording>\
    <ResourceReference>A1</ResourceReference><ISRC>NOPE, \"really\"</ISRC><Duration>PT3M</Duration>\
    </SoundRecording></ResourceList></NewReleaseMessage>";
const BROKEN: &str = "<NewReleaseMessage><ResourceList>";

fn report(sources: &[(&str, &str)], continue_on_error: bool) -> BatchReport {
    let config = PipelineConfig::rules_only().with_continue_on_error(continue_on_error);
    let validator = Validator::from_config(config).unwrap();
    let sources: Vec<_> = sources
        .iter()
        .map(|(id, text)| DocumentSource::from_text(*id, *text))
        .collect();
    validate_batch(&validator, &sources)
}

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

#[test]
fn test_human_report_lists_diagnostics_and_summary() {
    let report = report(&[("good.xml", GOOD), ("bad.xml", BAD)], false);
    let text = format_report_human(&report, false);

    assert!(text.contains("✓ good.xml"));
    assert!(text.contains("✗ bad.xml"));
    assert!(text.contains("ERROR INVALID_ISRC"));
    assert!(text.contains("1 of 2 document(s) valid (50.0%)"));
    assert!(text.contains("Most frequent: INVALID_ISRC ×1"));
    assert!(!text.contains("Stopped after"));
}

#[test]
fn test_human_report_names_halting_error() {
    let report = report(&[("broken.xml", BROKEN), ("good.xml", GOOD)], false);
    let text = format_report_human(&report, false);

    assert!(text.contains("✗ broken.xml - Failed to parse document"));
    assert!(text.contains("Stopped after 1 of 2 document(s)"));
    assert!(!text.contains("good.xml"));
}

#[test]
fn test_csv_rows_quote_fields() {
    let report = report(&[("good.xml", GOOD), ("bad.xml", BAD), ("broken.xml", BROKEN)], true);
    let csv = format_report_csv(&report);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], CSV_HEADER);
    assert!(lines.iter().all(|l| !l.starts_with("good.xml")));

    let isrc_row = lines
        .iter()
        .find(|l| l.contains("INVALID_ISRC"))
        .expect("ISRC row");
    assert!(isrc_row.starts_with("bad.xml,ERROR,INVALID_ISRC,"));

    let fatal_row = lines
        .iter()
        .find(|l| l.starts_with("broken.xml"))
        .expect("fatal row");
    assert!(fatal_row.contains(Code::FatalParseError.as_str()));
}

#[test]
fn test_csv_field_escaping() {
    assert_eq!(csv_field("plain"), "plain");
    assert_eq!(csv_field("a,b"), "\"a,b\"");
    assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
}

#[test]
fn test_json_report_carries_statistics() {
    let report = report(&[("good.xml", GOOD), ("bad.xml", BAD)], false);
    let json = OutputFormat::Json.format_report(&report, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["all_valid"], false);
    assert_eq!(value["complete"], true);
    assert_eq!(value["total_sources"], 2);
    assert_eq!(value["entries"].as_array().unwrap().len(), 2);
    assert_eq!(value["statistics"]["invalid"], 1);
    assert_eq!(value["statistics"]["codes"]["INVALID_ISRC"], 1);
}

#[test]
fn test_yaml_report() {
    let report = report(&[("good.xml", GOOD)], false);
    let yaml = OutputFormat::Yaml.format_report(&report, false).unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(value["all_valid"], serde_yaml::Value::Bool(true));
}

#[test]
fn test_quiet_writer_shows_only_failures() {
    let buffer = SharedBuffer::default();
    let mut writer = OutputWriter::with_writer(OutputFormat::Human, false, true, 0, Box::new(buffer.clone()));
    let report = report(&[("good.xml", GOOD), ("bad.xml", BAD)], false);

    writer.info("not shown").unwrap();
    writer.report(&report).unwrap();

    let text = buffer.contents();
    assert!(!text.contains("not shown"));
    assert!(!text.contains("good.xml"));
    assert!(text.contains("✗ bad.xml"));
    assert!(text.contains("1 of 2 document(s) valid"));
}

#[test]
fn test_machine_formats_skip_chatter() {
    let buffer = SharedBuffer::default();
    let mut writer = OutputWriter::with_writer(OutputFormat::Json, false, false, 0, Box::new(buffer.clone()));

    writer.info("Validating").unwrap();
    writer.section("Results").unwrap();
    writer.table(&["a"], vec![vec!["b".into()]]).unwrap();
    assert!(buffer.contents().is_empty());
    assert!(writer.progress_bar(3, "x").is_none());
}

#[test]
fn test_table_alignment() {
    let buffer = SharedBuffer::default();
    let mut writer = OutputWriter::with_writer(OutputFormat::Human, false, false, 0, Box::new(buffer.clone()));

    writer
        .table(
            &["Version", "Source"],
            vec![
                vec!["3.8.2".into(), "builtin:ern-382".into()],
                vec!["4.1".into(), "builtin:ern-41".into()],
            ],
        )
        .unwrap();

    let text = buffer.contents();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Version │ Source         ");
    assert_eq!(lines[2], "3.8.2   │ builtin:ern-382");
    assert_eq!(lines[3], "4.1     │ builtin:ern-41");
}
