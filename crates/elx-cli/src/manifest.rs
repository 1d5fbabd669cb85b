use std::fs;
use std::path::{Path, PathBuf};

use elx_compiler::CompileOptions;
use elx_core::{ElixirError, EntryOrder};
use serde::Deserialize;

use crate::{map_manifest_invalid, map_manifest_read, Cli};

/// Build settings stored next to a project, e.g. `build.json`:
///
/// ```json
/// { "source": "src", "dest": "build/model.rbxmx", "modelName": "SampleProject" }
/// ```
///
/// `source` and `dest` are relative to the manifest's directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct BuildManifest {
    pub(crate) source: Option<String>,
    pub(crate) dest: Option<String>,
    pub(crate) model_name: Option<String>,
    pub(crate) processor: Option<String>,
    pub(crate) entry_order: Option<EntryOrder>,
    pub(crate) referents: Option<bool>,
}

#[derive(Debug, Clone)]
pub(crate) struct BuildPlan {
    pub(crate) options: CompileOptions,
    pub(crate) dest: PathBuf,
    pub(crate) processor: Option<String>,
}

pub(crate) fn load_manifest(path: &Path) -> Result<BuildManifest, ElixirError> {
    let raw = fs::read_to_string(path).map_err(map_manifest_read)?;
    serde_json::from_str(&raw).map_err(map_manifest_invalid)
}

pub(crate) fn resolve_build_plan(cli: &Cli) -> Result<BuildPlan, ElixirError> {
    let (manifest, base) = match &cli.manifest {
        Some(path) => {
            let path = PathBuf::from(path);
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (load_manifest(&path)?, base)
        }
        None => (BuildManifest::default(), PathBuf::new()),
    };

    let source = cli
        .source
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| manifest.source.as_ref().map(|raw| base.join(raw)))
        .ok_or_else(|| missing_argument("source"))?;
    let dest = cli
        .dest
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| manifest.dest.as_ref().map(|raw| base.join(raw)))
        .ok_or_else(|| missing_argument("dest"))?;

    Ok(BuildPlan {
        options: CompileOptions {
            source,
            model_name: cli.model_name.clone().or(manifest.model_name),
            entry_order: cli
                .entry_order
                .map(EntryOrder::from)
                .or(manifest.entry_order)
                .unwrap_or_default(),
            referents: cli.referents || manifest.referents.unwrap_or(false),
        },
        dest,
        processor: cli.processor.clone().or(manifest.processor),
    })
}

fn missing_argument(name: &str) -> ElixirError {
    ElixirError::new(
        "CLI_ARGS_MISSING",
        format!("No {} given on the command line or in a manifest.", name),
    )
}
