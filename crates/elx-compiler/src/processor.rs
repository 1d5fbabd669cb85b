use std::sync::OnceLock;

use elx_core::{
    ElixirError, Instance, ModelFragment, MODULE_SCRIPT_CLASS, NAME_PROPERTY, SCRIPT_CLASS,
};
use elx_parser::{parse_embedded_properties, parse_xml_document, XmlElementNode};
use regex::Regex;
use tracing::warn;

use crate::writer::ENVELOPE_ATTRIBUTES;

pub const ENVELOPE_TAG: &str = "roblox";
pub const CLASS_NAME_OVERRIDE: &str = "ClassName";

pub const NEVERMORE_LOADER_NAME: &str = "NevermoreEngineLoader";
pub const NEVERMORE_MAIN_MARKER: &str = ".main";

/// Envelope children that describe the file rather than an instance.
const ENVELOPE_METADATA_TAGS: &[&str] = &["External", "Meta"];

/// Decides what each entry of the source tree becomes.
///
/// The compiler only talks to this trait, so a new engine layout is a new
/// implementation plus an entry in [`processor_by_name`].
pub trait Processor {
    fn name(&self) -> &'static str;

    fn process_folder(&self, name: &str) -> Instance {
        Instance::container(Some(name))
    }

    /// `name` is the file name without its extension.
    fn process_script(&self, name: &str, source: &str) -> Instance;

    fn process_model(&self, content: &str) -> Result<ModelFragment, ElixirError> {
        model_fragment_from_xml(content)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseProcessor;

impl Processor for BaseProcessor {
    fn name(&self) -> &'static str {
        "base"
    }

    fn process_script(&self, name: &str, source: &str) -> Instance {
        let class_name = script_class(source);
        let Some(embedded) = parse_embedded_properties(source) else {
            return Instance::script(Some(class_name), Some(name), source, false);
        };

        let mut script = Instance::script(
            Some(embedded.get(CLASS_NAME_OVERRIDE).unwrap_or(class_name)),
            Some(embedded.get(NAME_PROPERTY).unwrap_or(name)),
            source,
            false,
        );
        for property in embedded.iter() {
            if property.name == NAME_PROPERTY || property.name == CLASS_NAME_OVERRIDE {
                continue;
            }
            script.properties.set(&property.name, property.value.as_str());
        }
        script
    }
}

/// Layout of NevermoreEngine before its loader rewrite: one enabled loader
/// script, disabled `.main` scripts, everything else a disabled module.
/// Embedded headers are not read.
#[derive(Debug, Clone, Copy, Default)]
pub struct NevermoreProcessor;

impl Processor for NevermoreProcessor {
    fn name(&self) -> &'static str {
        "nevermore"
    }

    fn process_script(&self, name: &str, source: &str) -> Instance {
        if name == NEVERMORE_LOADER_NAME {
            Instance::script(Some(SCRIPT_CLASS), Some(name), source, false)
        } else if name.to_lowercase().contains(NEVERMORE_MAIN_MARKER) {
            Instance::script(Some(SCRIPT_CLASS), Some(name), source, true)
        } else {
            Instance::script(Some(MODULE_SCRIPT_CLASS), Some(name), source, true)
        }
    }
}

pub const PROCESSOR_NAMES: &[&str] = &["base", "nevermore"];

/// Case-insensitive; accepts both the short names and the type names.
pub fn processor_by_name(name: &str) -> Option<Box<dyn Processor>> {
    match name.to_ascii_lowercase().as_str() {
        "base" | "baseprocessor" => Some(Box::new(BaseProcessor)),
        "nevermore" | "nevermoreprocessor" => Some(Box::new(NevermoreProcessor)),
        _ => None,
    }
}

/// Unknown names fall back to [`BaseProcessor`].
pub fn resolve_processor(name: Option<&str>) -> Box<dyn Processor> {
    let Some(name) = name else {
        return Box::new(BaseProcessor);
    };
    processor_by_name(name).unwrap_or_else(|| {
        warn!(
            processor = name,
            known = ?PROCESSOR_NAMES,
            "unknown processor, using base"
        );
        Box::new(BaseProcessor)
    })
}

pub fn script_class(source: &str) -> &'static str {
    if is_module(source) {
        MODULE_SCRIPT_CLASS
    } else {
        SCRIPT_CLASS
    }
}

/// True when the source ends with a `return` of some value. The value may
/// sit on a line after the keyword.
pub fn is_module(source: &str) -> bool {
    module_return_regex().is_match(source.trim_end())
}

fn module_return_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\breturn\s+\S[^\n]*$").expect("module return regex"))
}

pub fn model_fragment_from_xml(content: &str) -> Result<ModelFragment, ElixirError> {
    let document = parse_xml_document(content)?;
    let envelope = document.root.name.clone();
    if envelope != ENVELOPE_TAG {
        warn!(
            envelope = %envelope,
            expected = ENVELOPE_TAG,
            "model envelope has an unexpected tag, splicing its children anyway"
        );
    }

    let inherited = envelope_namespaces(&document.root);
    let items = document
        .root
        .into_element_children()
        .filter(|element| !ENVELOPE_METADATA_TAGS.contains(&element.name.as_str()))
        .map(|mut element| {
            for (name, uri) in &inherited {
                element
                    .attributes
                    .entry(name.clone())
                    .or_insert_with(|| uri.clone());
            }
            element
        })
        .collect();

    Ok(ModelFragment { envelope, items })
}

/// Namespace declarations on the fragment's envelope that the output
/// envelope does not already make. Spliced items carry them so their
/// prefixes stay bound once the envelope is gone.
fn envelope_namespaces(envelope: &XmlElementNode) -> Vec<(String, String)> {
    envelope
        .attributes
        .iter()
        .filter(|(name, _)| name.as_str() == "xmlns" || name.starts_with("xmlns:"))
        .filter(|(name, uri)| {
            !ENVELOPE_ATTRIBUTES.contains(&(name.as_str(), uri.as_str()))
        })
        .map(|(name, uri)| (name.clone(), uri.clone()))
        .collect()
}

#[cfg(test)]
mod processor_tests {
    use super::*;
    use elx_core::{InstanceKind, LOCAL_SCRIPT_CLASS};

    const HELLO_MODULE: &str = r#"
-- Name: Hello
-- ClassName: LocalScript

local module = {}

function module.hello(name)
  name = name or "World"
  return "Hello" .. name .. "!"
end

return module
"#;

    #[test]
    fn module_heuristic_matches_trailing_return() {
        assert!(is_module("return value"));
        assert!(is_module("return value\n\n\n\n"));
        assert!(is_module("return setmetatable(module, mt)"));
        assert!(is_module("local m = {}\n\treturn   m  \n"));
        assert!(is_module("local t = {}\nreturn t"));
        assert!(is_module("local t = {}\nreturn\n  t\n"));
    }

    #[test]
    fn module_heuristic_rejects_other_endings() {
        assert!(!is_module("print(\"hi\")\n"));
        assert!(!is_module("return\n"));
        assert!(!is_module("return value\nprint(1)"));
        assert!(!is_module("local returned = 1"));
        assert!(!is_module(""));
        assert_eq!(script_class("print(1)"), SCRIPT_CLASS);
        assert_eq!(script_class("return {}"), MODULE_SCRIPT_CLASS);
    }

    #[test]
    fn base_folder_uses_entry_name() {
        let folder = BaseProcessor.process_folder("Shared");
        assert_eq!(folder.kind, InstanceKind::Container);
        assert_eq!(folder.name(), "Shared");
        assert_eq!(folder.class_name, "Folder");
    }

    #[test]
    fn base_script_without_header_uses_defaults() {
        let script = BaseProcessor.process_script("Util", "local t = {}\nreturn t\n");
        assert_eq!(script.name(), "Util");
        assert_eq!(script.class_name, MODULE_SCRIPT_CLASS);
        assert_eq!(script.disabled(), Some(false));

        let plain = BaseProcessor.process_script("Boot", "print(1)\n");
        assert_eq!(plain.class_name, SCRIPT_CLASS);
    }

    #[test]
    fn base_script_header_overrides_name_and_class() {
        let script = BaseProcessor.process_script("hello", HELLO_MODULE);
        // The header is only found when it starts the file.
        assert_eq!(script.name(), "hello");
        assert_eq!(script.class_name, MODULE_SCRIPT_CLASS);

        let script = BaseProcessor.process_script("hello", HELLO_MODULE.trim_start());
        assert_eq!(script.name(), "Hello");
        assert_eq!(script.class_name, LOCAL_SCRIPT_CLASS);
        assert_eq!(script.source(), Some(HELLO_MODULE.trim_start()));
    }

    #[test]
    fn base_script_applies_known_overrides_and_drops_unknown_ones() {
        let source = "-- Disabled: true\n-- Archivable: false\nprint(1)\n";
        let script = BaseProcessor.process_script("Job", source);
        assert_eq!(script.disabled(), Some(true));
        assert!(script.properties.get("Archivable").is_none());
        assert!(script.properties.get(CLASS_NAME_OVERRIDE).is_none());
        assert_eq!(script.properties.len(), 3);
    }

    #[test]
    fn nevermore_loader_stays_enabled() {
        let script = NevermoreProcessor.process_script(NEVERMORE_LOADER_NAME, "");
        assert_eq!(script.class_name, SCRIPT_CLASS);
        assert_eq!(script.disabled(), Some(false));
    }

    #[test]
    fn nevermore_main_scripts_are_disabled_scripts() {
        for name in ["Server.Main", "client.main", "Game.MAIN.Start"] {
            let script = NevermoreProcessor.process_script(name, "print(1)");
            assert_eq!(script.class_name, SCRIPT_CLASS, "{}", name);
            assert_eq!(script.disabled(), Some(true), "{}", name);
        }
    }

    #[test]
    fn nevermore_other_scripts_are_disabled_modules() {
        let script = NevermoreProcessor.process_script("Script", "");
        assert_eq!(script.class_name, MODULE_SCRIPT_CLASS);
        assert_eq!(script.disabled(), Some(true));

        // Headers are not consulted by this layout.
        let headed = NevermoreProcessor.process_script("Lib", "-- ClassName: LocalScript\n");
        assert_eq!(headed.class_name, MODULE_SCRIPT_CLASS);
        assert_eq!(headed.name(), "Lib");
    }

    #[test]
    fn loader_match_is_exact() {
        let script = NevermoreProcessor.process_script("nevermoreengineloader", "");
        assert_eq!(script.class_name, MODULE_SCRIPT_CLASS);
    }

    #[test]
    fn processor_registry_resolves_names() {
        assert_eq!(processor_by_name("base").map(|p| p.name()), Some("base"));
        assert_eq!(
            processor_by_name("NevermoreProcessor").map(|p| p.name()),
            Some("nevermore")
        );
        assert_eq!(processor_by_name("NEVERMORE").map(|p| p.name()), Some("nevermore"));
        assert!(processor_by_name("rojo").is_none());

        assert_eq!(resolve_processor(None).name(), "base");
        assert_eq!(resolve_processor(Some("rojo")).name(), "base");
        assert_eq!(resolve_processor(Some("nevermore")).name(), "nevermore");
    }

    #[test]
    fn model_fragment_keeps_envelope_children_only() {
        let fragment = BaseProcessor
            .process_model(
                r#"<roblox version="4">
  <External>null</External>
  <External>nil</External>
  <Item class="Part"><Properties><string name="Name">A</string></Properties></Item>
  <Item class="Model"><Properties><string name="Name">B</string></Properties></Item>
</roblox>"#,
            )
            .expect("model should parse");

        assert_eq!(fragment.envelope, ENVELOPE_TAG);
        assert_eq!(fragment.items.len(), 2);
        assert_eq!(fragment.items[0].attribute("class"), Some("Part"));
        assert_eq!(fragment.items[1].attribute("class"), Some("Model"));
    }

    #[test]
    fn model_fragment_with_other_envelope_still_splices() {
        let fragment = model_fragment_from_xml("<model><Item class=\"Part\"></Item></model>")
            .expect("model should parse");
        assert_eq!(fragment.envelope, "model");
        assert_eq!(fragment.items.len(), 1);
    }

    #[test]
    fn model_fragment_items_keep_envelope_only_namespaces() {
        let fragment = model_fragment_from_xml(
            r#"<roblox xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:ext="urn:ext" version="4"><Item class="Part" ext:tag="a"></Item></roblox>"#,
        )
        .expect("model should parse");

        let item = &fragment.items[0];
        assert_eq!(item.attribute("xmlns:ext"), Some("urn:ext"));
        assert_eq!(item.attribute("ext:tag"), Some("a"));
        assert_eq!(item.attribute("xmlns:xsi"), None);
    }

    #[test]
    fn model_fragment_keeps_a_prefix_rebound_on_the_item() {
        let fragment = model_fragment_from_xml(
            r#"<roblox xmlns:ext="urn:outer"><Item class="Part" xmlns:ext="urn:inner" ext:tag="a"></Item></roblox>"#,
        )
        .expect("model should parse");
        assert_eq!(fragment.items[0].attribute("xmlns:ext"), Some("urn:inner"));
    }

    #[test]
    fn malformed_model_fails() {
        let error = BaseProcessor
            .process_model("<roblox><Item></roblox>")
            .expect_err("malformed model should fail");
        assert_eq!(error.code, "XML_PARSE_ERROR");
    }
}
