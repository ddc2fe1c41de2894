//! Binary to generate/update .expected.html and .expected.err fixture files
//!
//! Usage:
//!   cargo run --bin accept_expected              # Update all
//!   cargo run --bin accept_expected -- imports   # Update only cases matching "imports"

use std::fs;
use std::path::Path;
use walkdir::WalkDir;
use webflow::{FsLoader, compile_file};

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let cases_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&cases_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|s| s == "webf").unwrap_or(false))
    {
        let path = entry.path();

        // Import targets, not cases
        if in_dir(path, &cases_dir, "components") {
            continue;
        }

        if let Some(ref f) = filter {
            if !path.to_string_lossy().contains(f) {
                skipped += 1;
                continue;
            }
        }

        process_file(path, &cases_dir);
        updated += 1;
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn in_dir(path: &Path, cases_dir: &Path, name: &str) -> bool {
    path.strip_prefix(cases_dir)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str() == name)
}

fn process_file(path: &Path, cases_dir: &Path) {
    let is_error_test = in_dir(path, cases_dir, "errors");

    match compile_file(&FsLoader, path) {
        Ok(output) => {
            if is_error_test {
                eprintln!("ERROR: {:?} is in errors/ but compiled successfully", path);
                return;
            }
            let expected_html = path.with_extension("expected.html");
            if let Err(e) = fs::write(&expected_html, format!("{}\n", output.html)) {
                eprintln!("Failed to write {:?}: {}", expected_html, e);
            } else {
                println!("  wrote {}", expected_html.display());
            }
        }
        Err(e) => {
            if is_error_test {
                let expected_err = path.with_extension("expected.err");
                let message = e.to_string().replace(&cases_dir.display().to_string(), "<cases>");
                if let Err(err) = fs::write(&expected_err, format!("{}\n", message)) {
                    eprintln!("Failed to write {:?}: {}", expected_err, err);
                } else {
                    println!("  wrote {}", expected_err.display());
                }
            } else {
                eprintln!("ERROR: {:?} failed to compile but is not in errors/: {}", path, e);
            }
        }
    }
}
