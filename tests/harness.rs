//! Golden-file test harness for decolegacy.
//!
//! Discovers `.input.ts` files under `tests/fixtures/`, runs the pipeline
//! (parse → desugar → codegen), and compares output against the
//! corresponding `.expected.ts` file. Both sides go through a parse/emit
//! round trip first, so only the code has to match, not its layout.
//!
//! - `errors/` inputs must be rejected by the desugaring.
//! - `roundtrip/` outputs must parse again with no decorator left.
//!
//! Set `DL_UPDATE_FIXTURES=1` to overwrite expected files with actual output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dl_ast::DecoratorSyntax;
use dl_desugar::desugar_module;
use dl_parser::parse_decorated;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/dl_test/, so go up two levels to workspace root.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("tests")
        .join("fixtures")
}

fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = walkdir(dir)
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".input.ts"))
        })
        .collect();
    files.sort();
    files
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                result.extend(walkdir(&path));
            } else {
                result.push(path);
            }
        }
    }
    result
}

fn emit(module: &swc_ecma_ast::Module, cm: swc_common::sync::Lrc<swc_common::SourceMap>) -> Result<String> {
    let mut buf = Vec::new();
    {
        let writer = JsWriter::new(cm.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default()
                .with_target(swc_ecma_ast::EsVersion::latest()),
            cm,
            comments: None,
            wr: writer,
        };
        module.emit_with(&mut emitter)?;
    }
    Ok(String::from_utf8(buf)?)
}

fn run_pipeline(source: &str, filename: &str) -> Result<String> {
    let parsed = parse_decorated(source, filename, &DecoratorSyntax::default())?;
    let module = desugar_module(parsed.module)?;
    emit(&module, parsed.source_map)
}

/// Parse decorator-free code and print it back in the emitter's layout.
fn canonicalize(code: &str, filename: &str) -> Result<String> {
    let syntax = DecoratorSyntax {
        object_members: false,
    };
    let parsed = parse_decorated(code, filename, &syntax)?;
    emit(&parsed.module, parsed.source_map)
}

fn test_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn is_special(path: &Path, fixtures: &Path) -> bool {
    path.strip_prefix(fixtures)
        .ok()
        .and_then(|rel| rel.components().next())
        .is_some_and(|dir| dir.as_os_str() == "errors" || dir.as_os_str() == "roundtrip")
}

fn check_golden(input_path: &Path, update_mode: bool) -> Result<()> {
    let expected_path = PathBuf::from(
        input_path
            .to_string_lossy()
            .replace(".input.ts", ".expected.ts"),
    );
    let source = std::fs::read_to_string(input_path).context("failed to read input")?;
    let filename = input_path.display().to_string();
    let actual = run_pipeline(&source, &filename).context("pipeline failed")?;

    if update_mode {
        std::fs::write(&expected_path, &actual).context("failed to write expected")?;
        return Ok(());
    }

    let expected = std::fs::read_to_string(&expected_path)
        .with_context(|| format!("missing expected file: {}", expected_path.display()))?;
    let expected = canonicalize(&expected, &expected_path.display().to_string())
        .context("expected file does not parse")?;
    let actual = canonicalize(&actual, &format!("{filename}.output"))
        .with_context(|| format!("output does not parse:\n{actual}"))?;

    anyhow::ensure!(
        actual.trim() == expected.trim(),
        "output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
        expected.trim(),
        actual.trim()
    );
    Ok(())
}

#[track_caller]
fn report(kind: &str, failures: Vec<String>) {
    if !failures.is_empty() {
        panic!(
            "\n{} {kind} test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir();
    let input_files: Vec<_> = collect_input_files(&fixtures)
        .into_iter()
        .filter(|p| !is_special(p, &fixtures))
        .collect();

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("DL_UPDATE_FIXTURES").is_ok();
    let failures = input_files
        .iter()
        .filter_map(|input_path| {
            check_golden(input_path, update_mode)
                .err()
                .map(|e| format!("{}: {e:#}", test_name(input_path, &fixtures)))
        })
        .collect();

    report("golden", failures);
}

#[test]
fn error_tests() {
    let fixtures = fixtures_dir().join("errors");
    let input_files = collect_input_files(&fixtures);
    assert!(!input_files.is_empty(), "No error fixtures found");

    let mut failures = Vec::new();
    for input_path in &input_files {
        let name = test_name(input_path, &fixtures);
        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{name}: failed to read: {e}"));
                continue;
            }
        };
        let parsed = match parse_decorated(&source, &input_path.display().to_string(), &DecoratorSyntax::default()) {
            Ok(parsed) => parsed,
            Err(e) => {
                failures.push(format!("{name}: should parse, got: {e:#}"));
                continue;
            }
        };
        if desugar_module(parsed.module).is_ok() {
            failures.push(format!("{name}: desugaring should have been rejected"));
        }
    }

    report("error", failures);
}

#[test]
fn roundtrip_tests() {
    let fixtures = fixtures_dir().join("roundtrip");
    let input_files = collect_input_files(&fixtures);

    let mut failures = Vec::new();
    for input_path in &input_files {
        let name = test_name(input_path, &fixtures);
        let result = std::fs::read_to_string(input_path)
            .context("failed to read")
            .and_then(|source| run_pipeline(&source, &input_path.display().to_string()))
            .and_then(|output| {
                anyhow::ensure!(!output.contains('@'), "decorator survived:\n{output}");
                canonicalize(&output, &format!("{name}.output"))
                    .with_context(|| format!("output is not valid TypeScript:\n{output}"))
            });
        if let Err(e) = result {
            failures.push(format!("{name}: {e:#}"));
        }
    }

    report("roundtrip", failures);
}
