use elx_core::ElixirError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> ElixirError {
    ElixirError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: ElixirError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    if let Some(span) = &error.span {
        println!("ERROR_AT:{}:{}", span.start.line, span.start.column);
    }
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| format!("{:?}", error.message))
    );
    1
}

pub(crate) fn map_output_write(error: std::io::Error) -> ElixirError {
    map_error("OUTPUT_WRITE", error)
}

pub(crate) fn map_manifest_read(error: std::io::Error) -> ElixirError {
    map_error("MANIFEST_READ", error)
}

pub(crate) fn map_manifest_invalid(error: serde_json::Error) -> ElixirError {
    map_error("MANIFEST_INVALID", error)
}
