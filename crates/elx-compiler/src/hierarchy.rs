use std::fs;
use std::path::{Path, PathBuf};

use elx_core::{Classified, ElixirError, EntryOrder, Instance};
use tracing::debug;
use walkdir::WalkDir;

use crate::processor::Processor;
use crate::CompileOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Script,
    Model,
}

fn detect_source_kind(path: &Path) -> Option<SourceKind> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("lua") => Some(SourceKind::Script),
        Some("rbxmx") => Some(SourceKind::Model),
        _ => None,
    }
}

/// Walks `options.source` depth-first and builds the instance tree under one
/// root container.
///
/// Open containers are kept on an explicit stack indexed by walk depth, so
/// deep trees never recurse. A container is attached to its parent once the
/// walk leaves it, which happens before the next sibling is appended.
pub fn build_hierarchy(
    options: &CompileOptions,
    processor: &dyn Processor,
) -> Result<Instance, ElixirError> {
    let source_root = resolve_source_dir(&options.source)?;
    let model_name = match &options.model_name {
        Some(name) => name.clone(),
        None => default_model_name(&source_root),
    };

    let mut stack = vec![processor.process_folder(&model_name)];

    let mut walker = WalkDir::new(&source_root).min_depth(1).follow_links(true);
    if options.entry_order == EntryOrder::Lexical {
        walker = walker.sort_by_file_name();
    }

    for entry in walker {
        let entry = entry.map_err(map_walk_error)?;
        close_containers(&mut stack, entry.depth());

        let path = entry.path();
        let relative = relative_display(&source_root, path);

        if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy();
            debug!(path = %relative, "folder");
            stack.push(processor.process_folder(&name));
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(classified) = classify_file(processor, path, &relative)? else {
            continue;
        };
        let parent = stack
            .last_mut()
            .ok_or_else(|| ElixirError::new("HIERARCHY_EMPTY", "no open container"))?;
        match classified {
            Classified::Instance(instance) => {
                debug!(
                    path = %relative,
                    class = %instance.class_name,
                    name = %instance.name(),
                    "script"
                );
                parent.push_child(instance);
            }
            Classified::Fragment(fragment) => {
                let count = parent.graft(fragment);
                debug!(path = %relative, items = count, "model spliced");
            }
        }
    }

    close_containers(&mut stack, 1);
    stack
        .pop()
        .ok_or_else(|| ElixirError::new("HIERARCHY_EMPTY", "no root container"))
}

/// Pops containers until `depth` remain, attaching each to the one below it.
fn close_containers(stack: &mut Vec<Instance>, depth: usize) {
    while stack.len() > depth.max(1) {
        let Some(done) = stack.pop() else {
            return;
        };
        if let Some(parent) = stack.last_mut() {
            parent.push_child(done);
        }
    }
}

fn classify_file(
    processor: &dyn Processor,
    path: &Path,
    relative: &str,
) -> Result<Option<Classified>, ElixirError> {
    let Some(kind) = detect_source_kind(path) else {
        debug!(path = %relative, "skipped");
        return Ok(None);
    };

    let content = read_source(path, relative)?;
    match kind {
        SourceKind::Script => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Some(Classified::Instance(
                processor.process_script(&name, &content),
            )))
        }
        SourceKind::Model => processor
            .process_model(&content)
            .map(|fragment| Some(Classified::Fragment(fragment)))
            .map_err(|error| error.in_file(relative)),
    }
}

fn read_source(path: &Path, relative: &str) -> Result<String, ElixirError> {
    let bytes = fs::read(path).map_err(|error| {
        ElixirError::new("SOURCE_READ", format!("Failed to read {}: {}", relative, error))
    })?;
    String::from_utf8(bytes).map_err(|error| {
        ElixirError::new(
            "SOURCE_ENCODING",
            format!("{} is not valid UTF-8: {}", relative, error),
        )
    })
}

/// Returns the canonical source directory, so `..` and `.` segments are
/// gone before the root folder is named after it.
pub(crate) fn resolve_source_dir(source: &Path) -> Result<PathBuf, ElixirError> {
    let absolute = if source.is_absolute() {
        source.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|error| ElixirError::new("SOURCE_PATH", error.to_string()))?
            .join(source)
    };

    if !absolute.exists() {
        return Err(ElixirError::new(
            "SOURCE_NOT_FOUND",
            format!("source does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(ElixirError::new(
            "SOURCE_NOT_DIR",
            format!("source is not a directory: {}", absolute.display()),
        ));
    }

    fs::canonicalize(&absolute).map_err(|error| {
        ElixirError::new(
            "SOURCE_PATH",
            format!("cannot resolve {}: {}", absolute.display(), error),
        )
    })
}

pub(crate) fn default_model_name(source_root: &Path) -> String {
    source_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn map_walk_error(error: walkdir::Error) -> ElixirError {
    let path = error
        .path()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    ElixirError::new("SOURCE_WALK", format!("Failed to walk {}: {}", path, error))
}
