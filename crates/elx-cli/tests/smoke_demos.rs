use std::fs;
use std::path::Path;
use std::process::Command;

fn demos_root() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

#[test]
fn cli_compiles_every_demo() {
    let bin = env!("CARGO_BIN_EXE_elixir");

    let mut directories = fs::read_dir(demos_root())
        .expect("demos root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    directories.sort();

    assert!(!directories.is_empty(), "expected demo projects");

    for directory in directories {
        let dest = std::env::temp_dir().join(format!(
            "elixir-rs-smoke-{}.rbxmx",
            directory.file_name().unwrap_or_default().to_string_lossy()
        ));

        let output = Command::new(bin)
            .arg(directory.join("src"))
            .arg(&dest)
            .arg("--manifest")
            .arg(directory.join("build.json"))
            .output()
            .expect("cli should execute");

        if !output.status.success() {
            panic!(
                "demo {} failed\nstdout:\n{}\nstderr:\n{}",
                directory.display(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("RESULT:OK"),
            "stdout missing RESULT:OK for {}",
            directory.display()
        );
        assert!(stdout.contains("ITEMS:"), "stdout missing ITEMS for {}", directory.display());

        let written = fs::read_to_string(&dest).expect("model should be written");
        assert!(written.starts_with("<roblox "));
        assert!(!written.contains("/>"), "self-closing tag in {}", directory.display());
    }
}

#[test]
fn cli_reports_missing_source_on_stdout() {
    let bin = env!("CARGO_BIN_EXE_elixir");
    let missing = std::env::temp_dir().join("elixir-rs-smoke-does-not-exist");

    let output = Command::new(bin)
        .arg(&missing)
        .arg(missing.join("model.rbxmx"))
        .output()
        .expect("cli should execute");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESULT:ERROR"));
    assert!(stdout.contains("ERROR_CODE:SOURCE_NOT_FOUND"));
}
