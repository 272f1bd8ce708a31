//! Golden-file test runner.
//!
//! Each `.styx` fixture under the given directory is rendered and compared
//! against a sibling snapshot file. Run with `UPDATE_GOLDEN=1` to rewrite the
//! snapshots instead of failing.

use std::fs;
use std::path::{Path, PathBuf};

pub fn run_golden_dir(
    name: &str,
    dir: &Path,
    snap_ext: &str,
    render: impl Fn(&Path, &str) -> String,
) {
    let update = std::env::var("UPDATE_GOLDEN").is_ok_and(|v| v == "1");

    let mut fixtures = Vec::new();
    collect_fixtures(dir, &mut fixtures);
    fixtures.sort();
    assert!(!fixtures.is_empty(), "{name}: no fixtures under {dir:?}");

    let mut failures = Vec::new();
    for fixture in fixtures {
        let source = fs::read_to_string(&fixture)
            .unwrap_or_else(|e| panic!("failed to read {fixture:?}: {e}"));
        let rendered = render(&fixture, &source);
        let snap_path = fixture.with_extension(snap_ext);

        if update {
            fs::write(&snap_path, format!("{rendered}\n"))
                .unwrap_or_else(|e| panic!("failed to write {snap_path:?}: {e}"));
            continue;
        }

        let expected = fs::read_to_string(&snap_path).unwrap_or_default();
        // Snapshot files end with a single newline that is not part of the
        // rendered output.
        let expected = expected.strip_suffix('\n').unwrap_or(expected.as_str());
        if rendered != expected {
            failures.push(format!(
                "{}:\n--- expected ---\n{}\n--- got ---\n{}",
                fixture.display(),
                expected,
                rendered
            ));
        }
    }

    assert!(
        failures.is_empty(),
        "{name}: {} fixture(s) mismatched (UPDATE_GOLDEN=1 to accept)\n{}",
        failures.len(),
        failures.join("\n")
    );
}

fn collect_fixtures(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap_or_else(|e| panic!("cannot read {dir:?}: {e}")) {
        let path = entry.expect("readable directory entry").path();
        if path.is_dir() {
            collect_fixtures(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "styx") {
            out.push(path);
        }
    }
}
