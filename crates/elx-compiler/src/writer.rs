use std::collections::BTreeSet;

use elx_core::{Child, ElixirError, Instance, PropertyKind, XmlElementNode, XmlNode};

use crate::processor::ENVELOPE_TAG;

pub const ENVELOPE_ATTRIBUTES: &[(&str, &str)] = &[
    ("xmlns:xmime", "http://www.w3.org/2005/05/xmlmime"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    (
        "xsi:noNamespaceSchemaLocation",
        "http://www.roblox.com/roblox.xsd",
    ),
    ("version", "4"),
];

const INDENT: &str = "  ";
const REFERENT_ATTRIBUTE: &str = "referent";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Give every compiled `Item` a `referent="RBX<n>"` attribute.
    pub referents: bool,
}

/// Renders the tree as a complete document. Every element gets an explicit
/// closing tag; the importer rejects self-closing ones.
pub fn render_document(root: &Instance, options: WriterOptions) -> Result<String, ElixirError> {
    let mut writer = DocumentWriter::new(options);
    if options.referents {
        collect_grafted_referents(root, &mut writer.taken_referents);
    }
    writer.open(ENVELOPE_TAG, ENVELOPE_ATTRIBUTES.iter().copied(), 0);
    writer.instance(root, 1)?;
    writer.close(ENVELOPE_TAG, 0);
    Ok(writer.out)
}

struct DocumentWriter {
    out: String,
    options: WriterOptions,
    next_referent: usize,
    /// Ids already used by grafted items; numbering skips them.
    taken_referents: BTreeSet<String>,
}

impl DocumentWriter {
    fn new(options: WriterOptions) -> Self {
        Self {
            out: String::new(),
            options,
            next_referent: 0,
            taken_referents: BTreeSet::new(),
        }
    }

    fn allocate_referent(&mut self) -> String {
        loop {
            let referent = format!("RBX{}", self.next_referent);
            self.next_referent += 1;
            if !self.taken_referents.contains(&referent) {
                return referent;
            }
        }
    }

    fn instance(&mut self, instance: &Instance, depth: usize) -> Result<(), ElixirError> {
        let mut attributes = vec![("class", instance.class_name.clone())];
        if self.options.referents {
            let referent = self.allocate_referent();
            attributes.push((REFERENT_ATTRIBUTE, referent));
        }
        self.open(
            "Item",
            attributes.iter().map(|(name, value)| (*name, value.as_str())),
            depth,
        );

        self.open("Properties", std::iter::empty(), depth + 1);
        for property in instance.properties.effective() {
            if property.kind == PropertyKind::Bool && property.bool_value().is_none() {
                return Err(ElixirError::new(
                    "PROPERTY_VALUE_INVALID",
                    format!(
                        "{}.{} must be \"true\" or \"false\", got \"{}\"",
                        instance.name(),
                        property.name,
                        property.value
                    ),
                ));
            }
            self.indent(depth + 2);
            self.out.push('<');
            self.out.push_str(property.kind.tag());
            self.out.push_str(" name=\"");
            self.out.push_str(&escape_attribute(&property.name));
            self.out.push_str("\">");
            self.out.push_str(&escape_text(&property.value));
            self.out.push_str("</");
            self.out.push_str(property.kind.tag());
            self.out.push_str(">\n");
        }
        self.close("Properties", depth + 1);

        for child in &instance.children {
            match child {
                Child::Instance(child) => self.instance(child, depth + 1)?,
                Child::Grafted(element) => {
                    self.indent(depth + 1);
                    self.grafted(element);
                    self.out.push('\n');
                }
            }
        }

        self.close("Item", depth);
        Ok(())
    }

    /// Re-emits an element taken from a model fragment, keeping its own
    /// whitespace instead of indenting it.
    fn grafted(&mut self, element: &XmlElementNode) {
        self.start_tag(
            &element.name,
            element
                .attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        for child in &element.children {
            match child {
                XmlNode::Element(child) => self.grafted(child),
                XmlNode::Text(text) => self.out.push_str(&escape_text(&text.value)),
            }
        }
        self.end_tag(&element.name);
    }

    fn open<'a>(
        &mut self,
        name: &str,
        attributes: impl Iterator<Item = (&'a str, &'a str)>,
        depth: usize,
    ) {
        self.indent(depth);
        self.start_tag(name, attributes);
        self.out.push('\n');
    }

    fn close(&mut self, name: &str, depth: usize) {
        self.indent(depth);
        self.end_tag(name);
        self.out.push('\n');
    }

    fn start_tag<'a>(&mut self, name: &str, attributes: impl Iterator<Item = (&'a str, &'a str)>) {
        self.out.push('<');
        self.out.push_str(name);
        for (attribute, value) in attributes {
            self.out.push(' ');
            self.out.push_str(attribute);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attribute(value));
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn end_tag(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }
}

fn collect_grafted_referents(instance: &Instance, taken: &mut BTreeSet<String>) {
    for child in &instance.children {
        match child {
            Child::Instance(child) => collect_grafted_referents(child, taken),
            Child::Grafted(element) => collect_element_referents(element, taken),
        }
    }
}

fn collect_element_referents(element: &XmlElementNode, taken: &mut BTreeSet<String>) {
    if let Some(referent) = element.attribute(REFERENT_ATTRIBUTE) {
        taken.insert(referent.to_string());
    }
    for child in element.element_children() {
        collect_element_referents(child, taken);
    }
}

/// Carriage returns are written as character references because parsers
/// normalize a literal `\r\n` to `\n`.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#13;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\r' => escaped.push_str("&#13;"),
            '\n' => escaped.push_str("&#10;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
