use std::fs;
use std::path::Path;

use elx_core::ElixirError;

use crate::map_output_write;

/// Creates the destination's missing parent directories.
pub(crate) fn prepare_output_dir(dest: &Path) -> Result<(), ElixirError> {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(map_output_write)
        }
        _ => Ok(()),
    }
}

/// Writes the finished document in a single call.
pub(crate) fn write_output(dest: &Path, bytes: &[u8]) -> Result<(), ElixirError> {
    prepare_output_dir(dest)?;
    fs::write(dest, bytes).map_err(map_output_write)
}
