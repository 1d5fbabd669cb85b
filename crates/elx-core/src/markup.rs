use std::collections::BTreeMap;

use crate::types::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElementNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElementNode),
    Text(XmlTextNode),
}

/// Element names and attribute names keep their namespace prefix (`xsi:type`).
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElementNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlNode>,
    pub location: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlTextNode {
    pub value: String,
    pub location: SourceSpan,
}

impl XmlElementNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn element_children(&self) -> impl Iterator<Item = &XmlElementNode> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn into_element_children(self) -> impl Iterator<Item = XmlElementNode> {
        self.children.into_iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod markup_tests {
    use super::*;

    fn element(name: &str, children: Vec<XmlNode>) -> XmlElementNode {
        XmlElementNode {
            name: name.to_string(),
            attributes: BTreeMap::from([("class".to_string(), "Part".to_string())]),
            children,
            location: SourceSpan::synthetic(),
        }
    }

    #[test]
    fn element_children_skip_text_nodes() {
        let text = XmlNode::Text(XmlTextNode {
            value: "\n  ".to_string(),
            location: SourceSpan::synthetic(),
        });
        let root = element(
            "roblox",
            vec![
                text.clone(),
                XmlNode::Element(element("Item", Vec::new())),
                text,
                XmlNode::Element(element("Item", Vec::new())),
            ],
        );

        assert_eq!(root.element_children().count(), 2);
        assert_eq!(root.attribute("class"), Some("Part"));
        assert_eq!(root.attribute("missing"), None);
        let owned = root.into_element_children().collect::<Vec<_>>();
        assert!(owned.iter().all(|child| child.name == "Item"));
    }
}
