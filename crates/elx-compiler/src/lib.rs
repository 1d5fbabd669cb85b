use std::path::PathBuf;

use elx_core::{ElixirError, EntryOrder, Instance};
use tracing::info;

mod hierarchy;
mod processor;
mod writer;

pub use hierarchy::build_hierarchy;
pub use processor::{
    is_module, model_fragment_from_xml, processor_by_name, resolve_processor, script_class,
    BaseProcessor, NevermoreProcessor, Processor, CLASS_NAME_OVERRIDE, ENVELOPE_TAG,
    NEVERMORE_LOADER_NAME, NEVERMORE_MAIN_MARKER, PROCESSOR_NAMES,
};
pub use writer::{
    escape_attribute, escape_text, render_document, WriterOptions, ENVELOPE_ATTRIBUTES,
};

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub source: PathBuf,
    /// Name of the top-level folder; defaults to the source directory's name.
    pub model_name: Option<String>,
    pub entry_order: EntryOrder,
    pub referents: bool,
}

#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub root: Instance,
    pub document: String,
}

pub fn compile_model(
    options: &CompileOptions,
    processor: &dyn Processor,
) -> Result<CompiledModel, ElixirError> {
    let root = build_hierarchy(options, processor)?;
    let document = render_document(
        &root,
        WriterOptions {
            referents: options.referents,
        },
    )?;

    info!(
        source = %options.source.display(),
        processor = processor.name(),
        instances = root.instance_count(),
        bytes = document.len(),
        "model compiled"
    );

    Ok(CompiledModel { root, document })
}
