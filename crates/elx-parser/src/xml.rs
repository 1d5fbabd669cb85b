use std::collections::BTreeMap;

use elx_core::{
    ElixirError, SourceLocation, SourceSpan, XmlDocument, XmlElementNode, XmlNode, XmlTextNode,
};
use roxmltree::{Document, Node, NodeType};

const XML_PREFIX: &str = "xml";

pub fn parse_xml_document(source: &str) -> Result<XmlDocument, ElixirError> {
    let document = Document::parse(source).map_err(|error| {
        let pos = error.pos();
        ElixirError::with_span(
            "XML_PARSE_ERROR",
            error.to_string(),
            SourceSpan::point(pos.row as usize, pos.col as usize),
        )
    })?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(ElixirError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(XmlDocument {
        root: parse_element(&document, root),
    })
}

fn parse_element(document: &Document<'_>, node: Node<'_, '_>) -> XmlElementNode {
    let mut attributes = declared_namespaces(node);
    for attribute in node.attributes() {
        attributes.insert(
            qualified_name(node, attribute.namespace(), attribute.name()),
            attribute.value().to_string(),
        );
    }

    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(XmlNode::Element(parse_element(document, child))),
            NodeType::Text => {
                let value = child.text().unwrap_or_default().to_string();
                if value.is_empty() {
                    continue;
                }
                children.push(XmlNode::Text(XmlTextNode {
                    value,
                    location: node_span(document, child.range().start, child.range().end),
                }));
            }
            _ => {}
        }
    }

    let tag = node.tag_name();
    XmlElementNode {
        name: qualified_name(node, tag.namespace(), tag.name()),
        attributes,
        children,
        location: node_span(document, node.range().start, node.range().end),
    }
}

/// `xmlns` declarations made on this element itself. roxmltree resolves them
/// away, so they are put back as attributes to keep prefixes meaningful when
/// the element is written out on its own.
fn declared_namespaces(node: Node<'_, '_>) -> BTreeMap<String, String> {
    let inherited = node
        .parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .map(|ns| (ns.name(), ns.uri()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some(XML_PREFIX))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| {
            let key = match ns.name() {
                Some(prefix) => format!("xmlns:{}", prefix),
                None => "xmlns".to_string(),
            };
            (key, ns.uri().to_string())
        })
        .collect()
}

fn qualified_name(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn node_span(document: &Document<'_>, start: usize, end: usize) -> SourceSpan {
    let start_pos = document.text_pos_at(start);
    let end_pos = document.text_pos_at(end);
    SourceSpan {
        start: SourceLocation {
            line: start_pos.row as usize,
            column: start_pos.col as usize,
        },
        end: SourceLocation {
            line: end_pos.row as usize,
            column: end_pos.col as usize,
        },
    }
}
