//! Tagged document model built once from the XML tree
//!
//! Rules never walk the raw tree. They match on the [`Node`] variants
//! collected here, in document order.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

pub mod node;

pub use node::{DateKind, DealTerms, Node, NodeKind, ReferenceTarget, ResourceKind};

use crate::error::FatalError;
use crate::identifiers::IdentifierKind;
use ddexcheck_schemas::{MessageInfo, XmlDocument, XmlElement};
use std::collections::HashSet;

const LANGUAGE_ATTRIBUTE: &str = "LanguageAndScriptCode";
const TERRITORY_ELEMENTS: &[&str] = &["TerritoryCode", "ExcludedTerritoryCode", "Territory"];
const LANGUAGE_ELEMENTS: &[&str] = &[
    "LanguageOfPerformance",
    "LanguageOfDubbing",
    "SubTitleLanguage",
    "LanguageOfSubtitles",
];

/// A parsed DDEX message, classified for rule evaluation
#[derive(Debug, Clone)]
pub struct DdexDocument {
    info: MessageInfo,
    nodes: Vec<Node>,
}

impl DdexDocument {
    /// Parse XML text and classify it
    pub fn parse(text: &str) -> Result<Self, FatalError> {
        let tree = XmlDocument::parse(text)?;
        Ok(Self::from_tree(&tree))
    }

    /// Classify an already parsed tree
    pub fn from_tree(tree: &XmlDocument) -> Self {
        let root = tree.root();
        let mut nodes = Vec::new();

        if let Some(code) = root.attribute(LANGUAGE_ATTRIBUTE) {
            nodes.push(Node {
                kind: NodeKind::Language,
                value: code.trim().to_string(),
                path: format!("{}/@{LANGUAGE_ATTRIBUTE}", root.path),
                position: root.position,
            });
        }
        collect(root, None, &mut nodes);

        Self {
            info: MessageInfo::from_document(tree),
            nodes,
        }
    }

    pub fn info(&self) -> &MessageInfo {
        &self.info
    }

    pub fn message_type(&self) -> &str {
        &self.info.message_type
    }

    /// Every classified node in document order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Identifier nodes with their kind
    pub fn identifiers(&self) -> impl Iterator<Item = (IdentifierKind, &Node)> {
        self.nodes.iter().filter_map(|node| match node.kind {
            NodeKind::Identifier(kind) => Some((kind, node)),
            _ => None,
        })
    }

    /// Values declared as reference targets of the given kind
    pub fn anchors(&self, target: ReferenceTarget) -> HashSet<&str> {
        self.nodes
            .iter()
            .filter_map(|node| match (&node.kind, target) {
                (NodeKind::Resource { reference, .. }, ReferenceTarget::Resource) => reference.as_deref(),
                (NodeKind::Release { reference }, ReferenceTarget::Release) => reference.as_deref(),
                _ => None,
            })
            .collect()
    }
}

fn collect(element: &XmlElement, parent: Option<&XmlElement>, nodes: &mut Vec<Node>) {
    if let Some(kind) = classify(element, parent) {
        let value = match kind {
            NodeKind::Resource { .. } | NodeKind::Release { .. } | NodeKind::Deal(_) => String::new(),
            _ => element.text.trim().to_string(),
        };
        nodes.push(Node {
            kind,
            value,
            path: element.path.clone(),
            position: element.position,
        });
    }

    for child in &element.children {
        collect(child, Some(element), nodes);
    }
}

fn classify(element: &XmlElement, parent: Option<&XmlElement>) -> Option<NodeKind> {
    let name = element.name.as_str();
    let parent_name = parent.map(|p| p.name.as_str());
    let has_text = !element.text.trim().is_empty();

    if let Some(kind) = IdentifierKind::from_element_name(name) {
        return Some(NodeKind::Identifier(kind));
    }
    if let Some(target) = ReferenceTarget::from_element_name(name) {
        return Some(NodeKind::Reference(target));
    }

    if let Some(kind) = resource_kind(element, parent_name) {
        return Some(NodeKind::Resource {
            kind,
            reference: anchor_value(element, ReferenceTarget::Resource),
            has_duration: has_descendant(element, &["Duration"]),
        });
    }
    if parent_name == Some("ReleaseList") && matches!(name, "Release" | "TrackRelease") {
        return Some(NodeKind::Release {
            reference: anchor_value(element, ReferenceTarget::Release),
        });
    }
    if name == "Deal" {
        return Some(NodeKind::Deal(deal_terms(element, parent)));
    }

    if !has_text {
        return None;
    }
    if let Some(kind) = DateKind::from_element_name(name) {
        return Some(NodeKind::Date(kind));
    }
    if name == "Duration" {
        return Some(NodeKind::Duration);
    }
    if TERRITORY_ELEMENTS.contains(&name) {
        return Some(NodeKind::Territory);
    }
    if LANGUAGE_ELEMENTS.contains(&name) {
        return Some(NodeKind::Language);
    }
    None
}

/// Resource elements are recognized by name wherever they appear; unknown
/// `ResourceList` entries count when they declare a resource reference.
fn resource_kind(element: &XmlElement, parent_name: Option<&str>) -> Option<ResourceKind> {
    ResourceKind::from_element_name(&element.name).or_else(|| {
        (parent_name == Some("ResourceList") && anchor_value(element, ReferenceTarget::Resource).is_some())
            .then_some(ResourceKind::Other)
    })
}

/// Reference value an element declares, as a child element or an attribute
fn anchor_value(element: &XmlElement, target: ReferenceTarget) -> Option<String> {
    let name = target.anchor_name();
    element
        .child_text(name)
        .or_else(|| element.attribute(name))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn has_descendant(element: &XmlElement, names: &[&str]) -> bool {
    element.descendants().skip(1).any(|e| names.contains(&e.name.as_str()))
}

fn deal_terms(deal: &XmlElement, parent: Option<&XmlElement>) -> DealTerms {
    let release_reference = parent
        .filter(|p| p.name == "ReleaseDeal")
        .and_then(|p| p.child_text("DealReleaseReference"))
        .is_some();

    DealTerms {
        references_content: release_reference || has_descendant(deal, &["DealResourceReference"]),
        has_territory: has_descendant(deal, &["TerritoryCode", "Territory"]),
        has_start_date: has_descendant(deal, &["StartDate", "StartDateTime"]),
        has_usage: has_descendant(deal, &["UseType", "CommercialModelType"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &str = r#"<NewReleaseMessage MessageSchemaVersionId="ern/382" LanguageAndScriptCode="en">
  <ResourceList>
    <SoundRecording>
      <ResourceReference>A1</ResourceReference>
      <ISRC>USRC17607839</ISRC>
      <Duration>PT3M45S</Duration>
    </SoundRecording>
    <Image ResourceReference="A2"/>
  </ResourceList>
  <ReleaseList>
    <Release>
      <ReleaseReference>R0</ReleaseReference>
      <GRid>A12425GABC1234002M</GRid>
      <ReleaseResourceReference>A1</ReleaseResourceReference>
      <ReleaseDate>2024-03-01</ReleaseDate>
    </Release>
  </ReleaseList>
  <DealList>
    <ReleaseDeal>
      <DealReleaseReference>R0</DealReleaseReference>
      <Deal>
        <DealTerms>
          <CommercialModelType>PayAsYouGoModel</CommercialModelType>
          <TerritoryCode>Worldwide</TerritoryCode>
          <ValidityPeriod><StartDate>2024-03-01</StartDate></ValidityPeriod>
        </DealTerms>
      </Deal>
    </ReleaseDeal>
  </DealList>
</NewReleaseMessage>"#;

    fn kinds(document: &DdexDocument) -> Vec<&NodeKind> {
        document.nodes().iter().map(|n| &n.kind).collect()
    }

    #[test]
    fn test_classifies_in_document_order() {
        let document = DdexDocument::parse(MESSAGE).unwrap();
        let kinds = kinds(&document);

        assert_eq!(kinds[0], &NodeKind::Language);
        assert!(matches!(
            kinds[1],
            NodeKind::Resource { kind: ResourceKind::SoundRecording, has_duration: true, .. }
        ));
        assert_eq!(kinds[2], &NodeKind::Identifier(IdentifierKind::Isrc));
        assert_eq!(kinds[3], &NodeKind::Duration);
        assert!(matches!(kinds[4], NodeKind::Resource { kind: ResourceKind::Image, has_duration: false, .. }));
        assert!(matches!(kinds[5], NodeKind::Release { .. }));
        assert_eq!(document.nodes()[0].path, "/NewReleaseMessage/@LanguageAndScriptCode");
        assert_eq!(document.message_type(), "NewReleaseMessage");
    }

    #[test]
    fn test_anchors() {
        let document = DdexDocument::parse(MESSAGE).unwrap();
        let resources = document.anchors(ReferenceTarget::Resource);
        assert!(resources.contains("A1"));
        assert!(resources.contains("A2"));
        assert_eq!(resources.len(), 2);
        assert_eq!(document.anchors(ReferenceTarget::Release).into_iter().collect::<Vec<_>>(), vec!["R0"]);
    }

    #[test]
    fn test_deal_terms_from_release_deal() {
        let document = DdexDocument::parse(MESSAGE).unwrap();
        let terms = document
            .nodes()
            .iter()
            .find_map(|n| match n.kind {
                NodeKind::Deal(terms) => Some(terms),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            terms,
            DealTerms {
                references_content: true,
                has_territory: true,
                has_start_date: true,
                has_usage: true,
            }
        );
    }

    #[test]
    fn test_resources_outside_resource_list() {
        let xml = r#"<M>
            <ResourceList>
              <ResourceGroup><SoundRecording><ISRC>USRC17607839</ISRC></SoundRecording></ResourceGroup>
              <MIDI><ResourceReference>A3</ResourceReference></MIDI>
              <VendorAudio ResourceReference="A5"/>
              <Comment>not a resource</Comment>
            </ResourceList>
          </M>"#;
        let document = DdexDocument::parse(xml).unwrap();
        let resources: Vec<(ResourceKind, Option<&str>)> = document
            .nodes()
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Resource { kind, reference, .. } => Some((*kind, reference.as_deref())),
                _ => None,
            })
            .collect();
        assert_eq!(
            resources,
            vec![
                (ResourceKind::SoundRecording, None),
                (ResourceKind::Midi, Some("A3")),
                (ResourceKind::Other, Some("A5")),
            ]
        );
    }

    #[test]
    fn test_empty_leaves_are_not_classified() {
        let document = DdexDocument::parse("<M><Duration/><TerritoryCode> </TerritoryCode></M>").unwrap();
        assert!(document.nodes().is_empty());
    }

    #[test]
    fn test_parse_failure_is_fatal() {
        let err = DdexDocument::parse("<M><Open></M>").unwrap_err();
        assert!(matches!(err, FatalError::Parse { .. }));
    }
}
