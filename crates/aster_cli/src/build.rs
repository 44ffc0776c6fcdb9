//! `aster build` — builds every declared bundle and writes the outputs.

use std::path::{Path, PathBuf};

use aster_bundles::{HtmlTemplateBundle, ScriptBundle, StylesheetBundle};
use aster_pipeline::{Module, ModuleContainers};

use crate::{pipeline, BuildArgs, GlobalArgs};

/// Per-type totals reported after a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSummary {
    /// Module type name.
    pub kind: &'static str,
    /// Modules in the container.
    pub modules: usize,
    /// Output files written.
    pub written: usize,
}

/// Runs the `aster build` command.
///
/// Returns exit code 0 on success.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let root = pipeline::resolve_project_root(global)?;
    let config = pipeline::load_project_config(global, &root)?;

    if !global.quiet {
        eprintln!(
            "  Building {} v{}",
            config.project.name, config.project.version
        );
    }

    let orchestrator = pipeline::configure(&root, &config)?;
    let use_cache = config.cache.enabled && !args.no_cache;
    let version = pipeline::cache_version(&config)?;
    let containers = orchestrator.create_module_containers(use_cache, &version)?;

    let out_dir = match args.out {
        Some(ref out) => PathBuf::from(out),
        None => root.join(&config.build.output),
    };
    let summary = write_outputs(&containers, &out_dir)?;

    if !global.quiet {
        for entry in &summary {
            eprintln!(
                "  {:>18} {} modules, {} files",
                entry.kind, entry.modules, entry.written
            );
        }
        eprintln!("    Output {}", out_dir.display());
        eprintln!("   Build complete.");
    }
    Ok(0)
}

/// File extension for the output of a module type.
pub fn output_extension(kind: &str) -> &'static str {
    match kind {
        k if k == ScriptBundle::KIND => "js",
        k if k == StylesheetBundle::KIND => "css",
        k if k == HtmlTemplateBundle::KIND => "html",
        _ => "out",
    }
}

/// Output file for a module path, relative to `out_dir`.
pub fn output_path(out_dir: &Path, module_path: &str, kind: &str) -> PathBuf {
    let relative = module_path.trim_start_matches("~/").trim_start_matches('/');
    out_dir.join(format!("{relative}.{}", output_extension(kind)))
}

/// Writes every processed module output under `out_dir`.
pub fn write_outputs(
    containers: &ModuleContainers,
    out_dir: &Path,
) -> Result<Vec<TypeSummary>, Box<dyn std::error::Error>> {
    let mut summary = Vec::new();
    for container in containers.iter() {
        let kind = container.kind();
        let mut written = 0;
        for (path, output) in container.outputs() {
            let Some(output) = output else {
                tracing::warn!(kind, module = path, "module has no output");
                continue;
            };
            let target = output_path(out_dir, path, kind);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
            }
            std::fs::write(&target, output)
                .map_err(|e| format!("failed to write {}: {e}", target.display()))?;
            written += 1;
        }
        tracing::info!(kind, modules = container.len(), written, "outputs.written");
        summary.push(TypeSummary {
            kind,
            modules: container.len(),
            written,
        });
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("aster.toml"),
            r#"
[project]
name = "shop"
version = "1.0.0"

[[scripts]]
base = "scripts"
pattern = "*.js"

[[stylesheets]]
base = "styles"
pattern = "*.css"

[[templates]]
base = "templates"
pattern = "*.html"
layout = "per-directory"
"#,
        )
        .unwrap();
        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::create_dir_all(root.join("styles")).unwrap();
        fs::create_dir_all(root.join("templates/cart")).unwrap();
        fs::write(root.join("scripts/app.js"), "app();\n").unwrap();
        fs::write(root.join("styles/site.css"), ".site { color: red; }\n").unwrap();
        fs::write(root.join("templates/cart/row.html"), "<tr></tr>\n").unwrap();
        dir
    }

    fn global(root: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(root.join("aster.toml").to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn extensions_by_kind() {
        assert_eq!(output_extension("ScriptBundle"), "js");
        assert_eq!(output_extension("StylesheetBundle"), "css");
        assert_eq!(output_extension("HtmlTemplateBundle"), "html");
        assert_eq!(output_extension("Unknown"), "out");
    }

    #[test]
    fn output_path_strips_root_marker() {
        let out = Path::new("/dist");
        assert_eq!(
            output_path(out, "~/scripts/app", "ScriptBundle"),
            PathBuf::from("/dist/scripts/app.js")
        );
    }

    #[test]
    fn builds_project_into_output_dir() {
        let dir = project();
        let args = BuildArgs {
            no_cache: false,
            out: None,
        };
        assert_eq!(run(&args, &global(dir.path())).unwrap(), 0);

        let dist = dir.path().join("dist");
        assert_eq!(
            fs::read_to_string(dist.join("scripts/app.js")).unwrap(),
            "// scripts/app.js\napp();\n"
        );
        assert!(fs::read_to_string(dist.join("styles/site.css"))
            .unwrap()
            .contains(".site"));
        assert!(dist.join("templates/cart.html").is_file());
        assert!(dir.path().join(".aster-cache/ScriptBundle/manifest.json").is_file());
    }

    #[test]
    fn no_cache_writes_no_cache() {
        let dir = project();
        let out = dir.path().join("public");
        let args = BuildArgs {
            no_cache: true,
            out: Some(out.to_string_lossy().into_owned()),
        };
        run(&args, &global(dir.path())).unwrap();
        assert!(out.join("scripts/app.js").is_file());
        assert!(!dir.path().join(".aster-cache").exists());
    }

    #[test]
    fn second_build_reuses_cache() {
        let dir = project();
        let args = BuildArgs {
            no_cache: false,
            out: None,
        };
        run(&args, &global(dir.path())).unwrap();
        let first = fs::read_to_string(dir.path().join("dist/styles/site.css")).unwrap();
        fs::remove_dir_all(dir.path().join("dist")).unwrap();
        run(&args, &global(dir.path())).unwrap();
        let second = fs::read_to_string(dir.path().join("dist/styles/site.css")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn changing_minify_rebuilds_cached_output() {
        let dir = project();
        let args = BuildArgs {
            no_cache: false,
            out: None,
        };
        run(&args, &global(dir.path())).unwrap();
        let script = dir.path().join("dist/scripts/app.js");
        assert_eq!(fs::read_to_string(&script).unwrap(), "// scripts/app.js\napp();\n");

        let config_path = dir.path().join("aster.toml");
        let config = fs::read_to_string(&config_path).unwrap();
        fs::write(
            &config_path,
            config.replace("[[scripts]]", "[build]\nminify = true\n\n[[scripts]]"),
        )
        .unwrap();
        run(&args, &global(dir.path())).unwrap();
        let cached = fs::read_to_string(&script).unwrap();

        let fresh_out = dir.path().join("fresh");
        let fresh_args = BuildArgs {
            no_cache: true,
            out: Some(fresh_out.to_string_lossy().into_owned()),
        };
        run(&fresh_args, &global(dir.path())).unwrap();
        let fresh = fs::read_to_string(fresh_out.join("scripts/app.js")).unwrap();
        assert_eq!(cached, fresh);
        assert_eq!(cached, "app();\n");
    }
}
