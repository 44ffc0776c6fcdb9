//! Discovery of the files a stylesheet depends on through `@import`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::compiler::CompileContext;

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']([^"']+)["']"#).expect("import pattern is valid")
});

/// Returns the compiled file followed by every file reachable through
/// `@import`, depth first, each listed once.
///
/// Imports without an extension fall back to the importing file's
/// extension. Remote URLs and missing files are skipped.
pub fn collect(source: &str, context: &CompileContext) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    seen.insert(context.source_file.clone());
    found.push(context.source_file.clone());
    walk(source, &context.source_file, &context.base_dir, &mut seen, &mut found);
    found
}

fn walk(
    source: &str,
    importer: &Path,
    base_dir: &Path,
    seen: &mut HashSet<PathBuf>,
    found: &mut Vec<PathBuf>,
) {
    for target in imports(source) {
        let Some(path) = resolve(target, importer, base_dir) else {
            continue;
        };
        if !seen.insert(path.clone()) {
            continue;
        }
        let Ok(nested) = std::fs::read_to_string(&path) else {
            tracing::debug!(import = %path.display(), "stylesheet import not readable");
            continue;
        };
        found.push(path.clone());
        let nested_base = path.parent().unwrap_or(base_dir).to_path_buf();
        walk(&nested, &path, &nested_base, seen, found);
    }
}

/// Extracts raw import targets in source order.
pub fn imports(source: &str) -> Vec<&str> {
    IMPORT
        .captures_iter(source)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

fn resolve(target: &str, importer: &Path, base_dir: &Path) -> Option<PathBuf> {
    if target.contains("://") || target.starts_with("//") {
        return None;
    }
    let mut path = base_dir.join(target);
    if path.extension().is_none() {
        if let Some(ext) = importer.extension() {
            path.set_extension(ext);
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extracts_quoted_and_url_imports() {
        let src = r#"@import "base.css";
@import 'theme';
@import url("print.css") print;
.a { color: red; }"#;
        assert_eq!(imports(src), vec!["base.css", "theme", "print.css"]);
    }

    #[test]
    fn recursive_with_extension_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(root.join("main.css"), "@import \"partials/colors\";").unwrap();
        fs::write(
            root.join("partials/colors.css"),
            "@import \"fonts.css\";\n.c { color: red; }",
        )
        .unwrap();
        fs::write(root.join("partials/fonts.css"), ".f { font-weight: bold; }").unwrap();

        let main = root.join("main.css");
        let src = fs::read_to_string(&main).unwrap();
        let refs = collect(&src, &CompileContext::for_file(&main));
        assert_eq!(
            refs,
            vec![
                main.clone(),
                root.join("partials/colors.css"),
                root.join("partials/fonts.css"),
            ]
        );
    }

    #[test]
    fn cycles_and_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.css"), "@import \"b.css\";\n@import \"gone.css\";").unwrap();
        fs::write(root.join("b.css"), "@import \"a.css\";").unwrap();

        let a = root.join("a.css");
        let src = fs::read_to_string(&a).unwrap();
        let refs = collect(&src, &CompileContext::for_file(&a));
        assert_eq!(refs, vec![a.clone(), root.join("b.css")]);
    }

    #[test]
    fn remote_imports_ignored() {
        let ctx = CompileContext::for_file("/site/main.css");
        let refs = collect("@import \"https://cdn.example.com/x.css\";", &ctx);
        assert_eq!(refs, vec![PathBuf::from("/site/main.css")]);
    }
}
