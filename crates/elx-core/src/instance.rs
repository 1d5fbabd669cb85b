use crate::markup::XmlElementNode;
use crate::property::{Properties, PropertyKind};

pub const FOLDER_CLASS: &str = "Folder";
pub const SCRIPT_CLASS: &str = "Script";
pub const LOCAL_SCRIPT_CLASS: &str = "LocalScript";
pub const MODULE_SCRIPT_CLASS: &str = "ModuleScript";

pub const NAME_PROPERTY: &str = "Name";
pub const SOURCE_PROPERTY: &str = "Source";
pub const DISABLED_PROPERTY: &str = "Disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Container,
    Script,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Instance(Instance),
    /// An element taken over unchanged from a model fragment.
    Grafted(XmlElementNode),
}

/// A node of the compiled hierarchy. The display name lives in the `Name`
/// property so that overrides and serialization never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub kind: InstanceKind,
    pub class_name: String,
    pub properties: Properties,
    pub children: Vec<Child>,
}

impl Instance {
    pub fn new(kind: InstanceKind, class_name: impl Into<String>, name: Option<&str>) -> Self {
        let class_name = class_name.into();
        let name = name
            .filter(|name| !name.is_empty())
            .unwrap_or(class_name.as_str())
            .to_string();

        let mut properties = Properties::new();
        properties.add(PropertyKind::Text, NAME_PROPERTY, name);

        Self {
            kind,
            class_name,
            properties,
            children: Vec::new(),
        }
    }

    pub fn container(name: Option<&str>) -> Self {
        Self::new(InstanceKind::Container, FOLDER_CLASS, name)
    }

    pub fn script(
        class_name: Option<&str>,
        name: Option<&str>,
        source: &str,
        disabled: bool,
    ) -> Self {
        let class_name = class_name
            .filter(|class_name| !class_name.is_empty())
            .unwrap_or(SCRIPT_CLASS);
        let mut script = Self::new(InstanceKind::Script, class_name, name);
        script
            .properties
            .add(PropertyKind::ProtectedText, SOURCE_PROPERTY, source);
        script.properties.add_bool(DISABLED_PROPERTY, disabled);
        script
    }

    pub fn name(&self) -> &str {
        self.properties
            .get(NAME_PROPERTY)
            .map(|property| property.value.as_str())
            .unwrap_or(self.class_name.as_str())
    }

    pub fn source(&self) -> Option<&str> {
        self.properties
            .get(SOURCE_PROPERTY)
            .map(|property| property.value.as_str())
    }

    pub fn disabled(&self) -> Option<bool> {
        self.properties
            .get(DISABLED_PROPERTY)
            .and_then(|property| property.bool_value())
    }

    pub fn push_child(&mut self, child: Instance) {
        self.children.push(Child::Instance(child));
    }

    /// Appends the fragment's items to this instance's children and returns
    /// how many were added. The fragment's envelope contributes nothing.
    pub fn graft(&mut self, fragment: ModelFragment) -> usize {
        let count = fragment.items.len();
        self.children
            .extend(fragment.items.into_iter().map(Child::Grafted));
        count
    }

    /// Number of compiled instances in this subtree, this one included.
    /// Grafted elements are not counted.
    pub fn instance_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| match child {
                Child::Instance(instance) => instance.instance_count(),
                Child::Grafted(_) => 0,
            })
            .sum::<usize>()
    }

    pub fn child_instances(&self) -> impl Iterator<Item = &Instance> {
        self.children.iter().filter_map(|child| match child {
            Child::Instance(instance) => Some(instance),
            Child::Grafted(_) => None,
        })
    }

    pub fn find_child(&self, name: &str) -> Option<&Instance> {
        self.child_instances().find(|child| child.name() == name)
    }
}

/// A pre-built document whose envelope has been stripped, leaving the
/// elements to splice into the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFragment {
    pub envelope: String,
    pub items: Vec<XmlElementNode>,
}

/// What a processor turns one filesystem entry into.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Instance(Instance),
    Fragment(ModelFragment),
}
