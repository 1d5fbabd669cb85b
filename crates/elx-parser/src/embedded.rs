//! Metadata embedded in the leading line comments of a script:
//!
//! ```text
//! -- Name: HelloWorld
//! -- ClassName: LocalScript
//! ```

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedProperty {
    pub name: String,
    pub value: String,
}

/// Overrides in the order their keys first appear. A repeated key keeps its
/// first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedProperties {
    entries: Vec<EmbeddedProperty>,
}

impl EmbeddedProperties {
    fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.value = value.to_string(),
            None => self.entries.push(EmbeddedProperty {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmbeddedProperty> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns `None` when the source has no leading comment block, or when the
/// block holds no `Key: Value` lines.
pub fn parse_embedded_properties(source: &str) -> Option<EmbeddedProperties> {
    let mut properties = EmbeddedProperties::default();
    for line in leading_comment_block(source) {
        let Some(caps) = property_regex().captures(line) else {
            continue;
        };
        let value = caps["value"].trim();
        if value.is_empty() {
            continue;
        }
        properties.insert(&caps["name"], value);
    }

    if properties.is_empty() {
        None
    } else {
        Some(properties)
    }
}

fn leading_comment_block(source: &str) -> Vec<&str> {
    let mut block = Vec::new();
    for line in source.split_inclusive('\n') {
        if comment_regex().is_match(line) {
            block.push(line);
        } else {
            // Either the block just ended, or the file does not open with one.
            break;
        }
    }
    block
}

// `--` followed by whitespace, which keeps `--[[` block comments out.
fn comment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^--\s").expect("comment regex"))
}

fn property_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?P<name>\w+):[ \t]+(?P<value>[^\r\n]+)").expect("property regex")
    })
}
