//! Cross-reference consistency

use super::{Rule, RuleContext};
use crate::diagnostic::{Code, Diagnostic};
use crate::document::{DdexDocument, NodeKind, ReferenceTarget};

/// Resource and release references must resolve to a declaration in the message
pub struct ResourceReferenceRule;

impl Rule for ResourceReferenceRule {
    fn id(&self) -> &'static str {
        "resource-reference"
    }

    fn description(&self) -> &'static str {
        "resource and release references resolve to declared resources and releases"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        let resources = document.anchors(ReferenceTarget::Resource);
        let releases = document.anchors(ReferenceTarget::Release);

        document
            .nodes()
            .iter()
            .filter_map(|node| {
                let NodeKind::Reference(target) = node.kind else {
                    return None;
                };
                let (declared, noun) = match target {
                    ReferenceTarget::Resource => (&resources, "resource"),
                    ReferenceTarget::Release => (&releases, "release"),
                };
                if declared.contains(node.value.as_str()) {
                    return None;
                }

                let message = if node.value.is_empty() {
                    format!("Empty {noun} reference")
                } else {
                    format!("Reference '{}' does not match any declared {noun}", node.value)
                };
                Some(
                    Diagnostic::error(Code::DanglingReference, message, node.path.as_str())
                        .with_context(node.value.as_str())
                        .with_suggestion(format!(
                            "Declare a {noun} with <{}>{}</{}> or correct the reference",
                            target.anchor_name(),
                            node.value,
                            target.anchor_name()
                        ))
                        .at(node.position),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(xml: &str) -> Vec<Diagnostic> {
        let document = DdexDocument::parse(xml).unwrap();
        ResourceReferenceRule.evaluate(&document, &RuleContext::default())
    }

    #[test]
    fn test_resolved_references() {
        let xml = r#"<M>
            <ResourceList>
              <SoundRecording><ResourceReference>A1</ResourceReference></SoundRecording>
              <Video ResourceReference="A2"/>
            </ResourceList>
            <ReleaseList>
              <Release>
                <ReleaseReference>R0</ReleaseReference>
                <ReleaseResourceReference>A1</ReleaseResourceReference>
                <LinkedReleaseResourceReference>A2</LinkedReleaseResourceReference>
              </Release>
            </ReleaseList>
            <DealList><ReleaseDeal><DealReleaseReference>R0</DealReleaseReference></ReleaseDeal></DealList>
          </M>"#;
        assert!(run(xml).is_empty());
    }

    #[test]
    fn test_midi_and_user_defined_resources_are_targets() {
        let xml = r#"<M>
            <ResourceList>
              <MIDI><ResourceReference>A3</ResourceReference></MIDI>
              <UserDefinedResource><ResourceReference>A4</ResourceReference></UserDefinedResource>
            </ResourceList>
            <ReleaseList>
              <Release>
                <ReleaseResourceReference>A3</ReleaseResourceReference>
                <ReleaseResourceReference>A4</ReleaseResourceReference>
              </Release>
            </ReleaseList>
          </M>"#;
        assert!(run(xml).is_empty());
    }

    #[test]
    fn test_dangling_references() {
        let xml = r#"<M>
            <ResourceList><SoundRecording><ResourceReference>A1</ResourceReference></SoundRecording></ResourceList>
            <ReleaseList><Release><ReleaseResourceReference>A9</ReleaseResourceReference></Release></ReleaseList>
            <DealList><ReleaseDeal><DealReleaseReference>R7</DealReleaseReference></ReleaseDeal></DealList>
          </M>"#;
        let diagnostics = run(xml);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code() == Code::DanglingReference));
        assert_eq!(diagnostics[0].context(), Some("A9"));
        assert_eq!(diagnostics[1].element_path(), "/M/DealList/ReleaseDeal/DealReleaseReference");
    }

    #[test]
    fn test_release_anchor_does_not_satisfy_resource_reference() {
        let xml = r#"<M>
            <ReleaseList><Release><ReleaseReference>A1</ReleaseReference><ReleaseResourceReference>A1</ReleaseResourceReference></Release></ReleaseList>
          </M>"#;
        assert_eq!(run(xml).len(), 1);
    }

    #[test]
    fn test_empty_reference() {
        let diagnostics = run("<M><ReleaseResourceReference/></M>");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message().starts_with("Empty resource reference"));
    }
}
