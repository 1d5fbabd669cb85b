use std::path::PathBuf;

pub const DEMO_MANIFEST_FILE: &str = "build.json";

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn demos_root() -> PathBuf {
    workspace_root().join("demos")
}

pub fn demo_dir(name: &str) -> PathBuf {
    demos_root().join(name)
}

pub fn demo_source_dir(name: &str) -> PathBuf {
    demo_dir(name).join("src")
}

pub fn demo_manifest_path(name: &str) -> PathBuf {
    demo_dir(name).join(DEMO_MANIFEST_FILE)
}
