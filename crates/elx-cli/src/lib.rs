use std::ffi::OsString;

use clap::Parser;
use elx_compiler::{compile_model, resolve_processor};
use elx_core::ElixirError;
use tracing::debug;

mod cli_args;
mod error_map;
mod logging;
mod manifest;
mod output;

pub(crate) use cli_args::Cli;
pub(crate) use error_map::{emit_error, map_manifest_invalid, map_manifest_read, map_output_write};
pub(crate) use manifest::{resolve_build_plan, BuildPlan};
pub(crate) use output::{prepare_output_dir, write_output};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    logging::init_logging(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, ElixirError> {
    let BuildPlan {
        options,
        dest,
        processor,
    } = resolve_build_plan(&cli)?;
    let processor = resolve_processor(processor.as_deref());
    debug!(
        source = %options.source.display(),
        dest = %dest.display(),
        processor = processor.name(),
        "build plan"
    );

    prepare_output_dir(&dest)?;
    let compiled = compile_model(&options, processor.as_ref())?;
    write_output(&dest, compiled.document.as_bytes())?;

    println!("RESULT:OK");
    println!("OUTPUT:{}", dest.display());
    println!("ITEMS:{}", compiled.root.instance_count());
    Ok(0)
}

#[cfg(test)]
mod cli_test_support;
