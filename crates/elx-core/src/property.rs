#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Text,
    Bool,
    /// Verbatim text such as script source.
    ProtectedText,
}

impl PropertyKind {
    /// Element tag used for this kind inside a `<Properties>` block.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Bool => "bool",
            Self::ProtectedText => "ProtectedString",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub kind: PropertyKind,
    pub name: String,
    pub value: String,
}

impl Property {
    /// `Some` only for the canonical lowercase tokens.
    pub fn bool_value(&self) -> Option<bool> {
        match self.value.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

pub fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Property set of one instance. Entries are appended without duplicate
/// checks; lookups and updates see the most recent entry for a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        kind: PropertyKind,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &Property {
        let index = self.entries.len();
        self.entries.push(Property {
            kind,
            name: name.into(),
            value: value.into(),
        });
        &self.entries[index]
    }

    pub fn add_bool(&mut self, name: impl Into<String>, value: bool) -> &Property {
        self.add(PropertyKind::Bool, name, bool_text(value))
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.iter().rev().find(|entry| entry.name == name)
    }

    /// Updates an existing property. Unknown names are ignored and report `false`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().rev().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter()
    }

    /// One entry per name, at the position it was first added, holding the
    /// last value written for it.
    pub fn effective(&self) -> Vec<&Property> {
        let mut seen: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for entry in &self.entries {
            if seen.contains(&entry.name.as_str()) {
                continue;
            }
            seen.push(entry.name.as_str());
            if let Some(latest) = self.get(&entry.name) {
                out.push(latest);
            }
        }
        out
    }
}
