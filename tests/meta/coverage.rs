//! Ties the unit test tree, the mode parsers and the error variants to the source

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const SOURCE: &str = "src";
    const UNIT_TESTS: &str = "tests/unit";

    /// Files that only declare modules or start a binary
    fn is_module_root(relative: &str) -> bool {
        matches!(
            relative.rsplit('/').next(),
            Some("lib.rs" | "main.rs" | "mod.rs")
        )
    }

    /// Every `.rs` file below `root`, as `/`-separated paths relative to it
    fn rust_files(root: &str) -> io::Result<BTreeSet<String>> {
        let root = Path::new(root);
        let mut pending = vec![root.to_path_buf()];
        let mut files = BTreeSet::new();

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path: PathBuf = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "rs") {
                    let relative = path.strip_prefix(root).map_err(io::Error::other)?;
                    let parts: Vec<_> = relative
                        .components()
                        .map(|part| part.as_os_str().to_string_lossy())
                        .collect();
                    files.insert(parts.join("/"));
                }
            }
        }

        Ok(files)
    }

    fn read(root: &str, relative: &str) -> String {
        fs::read_to_string(Path::new(root).join(relative)).expect("readable tree file")
    }

    fn report(problems: &[String]) -> String {
        problems
            .iter()
            .map(|problem| format!("  - {problem}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Tests each source module has a unit test file at the same path and the reverse
    // Verified by deleting tests/unit/math/probability.rs
    #[test]
    fn test_unit_tree_mirrors_src() {
        let source = rust_files(SOURCE).expect("source tree");
        let tests = rust_files(UNIT_TESTS).expect("unit test tree");

        let modules = |files: &BTreeSet<String>| -> BTreeSet<String> {
            files.iter().filter(|file| !is_module_root(file)).cloned().collect()
        };
        let (source, tests) = (modules(&source), modules(&tests));

        let mut problems: Vec<String> = source
            .difference(&tests)
            .map(|file| format!("src/{file} has no {UNIT_TESTS}/{file}"))
            .collect();
        problems.extend(
            tests
                .difference(&source)
                .map(|file| format!("{UNIT_TESTS}/{file} tests no src/{file}")),
        );

        assert!(problems.is_empty(), "unit tree out of step:\n{}", report(&problems));
    }

    // Tests every test file outside module roots declares at least one test
    // Verified by emptying tests/unit/spatial/direction.rs
    #[test]
    fn test_test_files_declare_tests() {
        let files = rust_files("tests").expect("tests tree");
        let empty: Vec<String> = files
            .iter()
            .filter(|file| !is_module_root(file))
            .filter(|file| !read("tests", file).contains("#[test]"))
            .map(|file| format!("tests/{file}"))
            .collect();

        assert!(empty.is_empty(), "files without #[test]:\n{}", report(&empty));
    }

    // Tests each mode parsed from the command line is parsed in its module's unit test
    // Verified by removing the parse assertions from the selection tests
    #[test]
    fn test_mode_parsers_are_tested() {
        let mut parsers = 0;
        let mut untested = Vec::new();

        for file in rust_files(SOURCE).expect("source tree") {
            for line in read(SOURCE, &file).lines() {
                let Some(rest) = line.strip_prefix("impl FromStr for ") else {
                    continue;
                };
                let mode = rest.trim_end_matches(" {").trim();
                parsers += 1;

                let tested = Path::new(UNIT_TESTS).join(&file).exists()
                    && read(UNIT_TESTS, &file).contains(&format!("parse::<{mode}>"));
                if !tested {
                    untested.push(format!("{mode} in src/{file}"));
                }
            }
        }

        assert!(parsers >= 4, "expected the weighting, updating, entropy and shape parsers");
        assert!(untested.is_empty(), "parsers without tests:\n{}", report(&untested));
    }

    // Tests every error variant is constructed or matched by some test
    // Verified by adding an unused variant to the error enum
    #[test]
    fn test_error_variants_are_exercised() {
        let errors = read(SOURCE, "io/error.rs");
        let variants: Vec<&str> = errors
            .split("pub enum AlgorithmError {")
            .nth(1)
            .and_then(|body| body.split("\n}").next())
            .expect("error enum")
            .lines()
            .filter_map(|line| line.strip_prefix("    "))
            .filter(|line| line.starts_with(|c: char| c.is_ascii_uppercase()))
            .filter_map(|line| line.split([' ', ',', '{', '(']).next())
            .collect();

        let corpus: String = rust_files("tests")
            .expect("tests tree")
            .iter()
            .map(|file| read("tests", file))
            .collect();
        let unused: Vec<String> = variants
            .iter()
            .filter(|variant| !corpus.contains(&format!("AlgorithmError::{variant}")))
            .map(|variant| (*variant).to_string())
            .collect();

        assert!(!variants.is_empty());
        assert!(unused.is_empty(), "variants no test touches:\n{}", report(&unused));
    }
}
