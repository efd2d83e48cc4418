//! Blueprint XML wire format.
//!
//! `quick-xml`'s serde support has no clean way to map a tagged-union
//! enum (`NodeKind`) onto XML elements, so the wire DTO is a flat
//! struct with a `kind` discriminant attribute and optional fields,
//! converted to/from the domain model by hand.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::models::{Blueprint, Node, NodeKind};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "blueprint")]
struct BlueprintXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@startsAt")]
    starts_at: String,
    #[serde(rename = "@timing")]
    timing: String,
    #[serde(rename = "node", default)]
    nodes: Vec<NodeXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@kind")]
    kind: String,
    #[serde(rename = "@eventName", skip_serializing_if = "Option::is_none", default)]
    event_name: Option<String>,
    #[serde(rename = "@deadlineSecs", skip_serializing_if = "Option::is_none", default)]
    deadline_secs: Option<u64>,
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none", default)]
    handler_name: Option<String>,
    #[serde(rename = "@address", skip_serializing_if = "Option::is_none", default)]
    address: Option<String>,
    #[serde(rename = "downstream", default)]
    downstream: Vec<String>,
}

impl From<&Blueprint> for BlueprintXml {
    fn from(bp: &Blueprint) -> Self {
        Self {
            name: bp.name.clone(),
            starts_at: bp.starts_at.to_rfc3339(),
            timing: bp.timing.clone(),
            nodes: bp.nodes.iter().map(NodeXml::from).collect(),
        }
    }
}

impl From<&Node> for NodeXml {
    fn from(node: &Node) -> Self {
        match &node.kind {
            NodeKind::EventNode { event_name, deadline } => Self {
                id: node.id.clone(),
                kind: "event".to_string(),
                event_name: Some(event_name.clone()),
                deadline_secs: deadline.map(|d| d.as_secs()),
                handler_name: None,
                address: None,
                downstream: node.downstream.clone(),
            },
            NodeKind::HandlerNode { name, address } => Self {
                id: node.id.clone(),
                kind: "handler".to_string(),
                event_name: None,
                deadline_secs: None,
                handler_name: Some(name.clone()),
                address: Some(address.clone()),
                downstream: node.downstream.clone(),
            },
        }
    }
}

impl TryFrom<BlueprintXml> for Blueprint {
    type Error = DomainError;

    fn try_from(xml: BlueprintXml) -> Result<Self, Self::Error> {
        let starts_at = chrono::DateTime::parse_from_rfc3339(&xml.starts_at)
            .map_err(|e| DomainError::InvalidStartTime(e.to_string()))?
            .with_timezone(&chrono::Utc);

        let nodes = xml
            .nodes
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Blueprint {
            name: xml.name,
            starts_at,
            timing: xml.timing,
            nodes,
        })
    }
}

impl TryFrom<NodeXml> for Node {
    type Error = DomainError;

    fn try_from(xml: NodeXml) -> Result<Self, Self::Error> {
        let kind = match xml.kind.as_str() {
            "event" => NodeKind::EventNode {
                event_name: xml.event_name.ok_or_else(|| {
                    DomainError::ValidationFailed(format!("node {} missing eventName", xml.id))
                })?,
                deadline: xml.deadline_secs.map(std::time::Duration::from_secs),
            },
            "handler" => NodeKind::HandlerNode {
                name: xml.handler_name.ok_or_else(|| {
                    DomainError::ValidationFailed(format!("node {} missing name", xml.id))
                })?,
                address: xml.address.ok_or_else(|| {
                    DomainError::ValidationFailed(format!("node {} missing address", xml.id))
                })?,
            },
            other => {
                return Err(DomainError::ValidationFailed(format!(
                    "node {} has unknown kind {other:?}",
                    xml.id
                )))
            }
        };

        Ok(Node {
            id: xml.id,
            kind,
            downstream: xml.downstream,
        })
    }
}

/// Encode a blueprint to its canonical XML representation.
pub fn to_xml(blueprint: &Blueprint) -> Result<String, DomainError> {
    let xml = BlueprintXml::from(blueprint);
    quick_xml::se::to_string(&xml).map_err(|e| DomainError::ValidationFailed(e.to_string()))
}

/// Decode a blueprint from its XML representation.
pub fn from_xml(xml: &str) -> Result<Blueprint, DomainError> {
    let parsed: BlueprintXml =
        quick_xml::de::from_str(xml).map_err(|e| DomainError::ValidationFailed(e.to_string()))?;
    Blueprint::try_from(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> Blueprint {
        Blueprint {
            name: "nightly-etl".to_string(),
            starts_at: Utc::now(),
            timing: "1h".to_string(),
            nodes: vec![
                Node {
                    id: "extract".to_string(),
                    kind: NodeKind::EventNode {
                        event_name: "extract".to_string(),
                        deadline: Some(std::time::Duration::from_secs(600)),
                    },
                    downstream: vec!["load".to_string()],
                },
                Node {
                    id: "load".to_string(),
                    kind: NodeKind::EventNode {
                        event_name: "load".to_string(),
                        deadline: Some(std::time::Duration::from_secs(1800)),
                    },
                    downstream: vec![],
                },
            ],
        }
    }

    #[test]
    fn round_trips_through_xml() {
        let bp = sample();
        let xml = to_xml(&bp).expect("encode");
        let decoded = from_xml(&xml).expect("decode");
        assert_eq!(bp, decoded);
    }

    #[test]
    fn handler_node_round_trips() {
        let mut bp = sample();
        bp.nodes.push(Node {
            id: "on-fail".to_string(),
            kind: NodeKind::HandlerNode {
                name: "email".to_string(),
                address: "ops@example.com".to_string(),
            },
            downstream: vec![],
        });
        let xml = to_xml(&bp).expect("encode");
        let decoded = from_xml(&xml).expect("decode");
        assert_eq!(bp, decoded);
    }

    #[test]
    fn rejects_unknown_kind() {
        let xml = r#"<blueprint name="b" startsAt="2024-01-01T00:00:00Z" timing="1h"><node id="n" kind="bogus"/></blueprint>"#;
        assert!(from_xml(xml).is_err());
    }
}
