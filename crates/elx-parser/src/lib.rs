mod embedded;
mod xml;

pub use elx_core::{XmlDocument, XmlElementNode, XmlNode, XmlTextNode};
pub use embedded::{parse_embedded_properties, EmbeddedProperties, EmbeddedProperty};
pub use xml::parse_xml_document;
