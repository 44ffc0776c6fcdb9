//! `aster init` — project scaffolding command.
//!
//! Creates a new Aster project directory with standard layout: `scripts/`,
//! `styles/`, `templates/`, an `aster.toml` config file, and one sample file
//! for each bundle type.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aster_config::CONFIG_FILE;

use crate::GlobalArgs;

/// Runs the `aster init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{}' already exists", n).into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    if project_dir.join(CONFIG_FILE).exists() {
        return Err(format!("{} already exists in {}", CONFIG_FILE, project_dir.display()).into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("site");

    if !global.quiet {
        eprintln!("  Creating new Aster project `{project_name}`");
    }

    let created = scaffold(&project_dir, project_name)?;
    if !global.quiet {
        for path in created {
            eprintln!("     Created {}", path.display());
        }
    }
    Ok(0)
}

/// Writes the configuration and sample files, returning the created files.
fn scaffold(root: &Path, name: &str) -> io::Result<Vec<PathBuf>> {
    for dir in ["scripts", "styles", "templates/main"] {
        fs::create_dir_all(root.join(dir))?;
    }

    let files = [
        (PathBuf::from(CONFIG_FILE), config_template(name)),
        (
            PathBuf::from("scripts/app.js"),
            "document.addEventListener(\"DOMContentLoaded\", function () {\n    console.log(\"ready\");\n});\n"
                .to_string(),
        ),
        (
            PathBuf::from("styles/site.css"),
            "body {\n  margin: 0;\n  font-family: sans-serif;\n}\n".to_string(),
        ),
        (
            PathBuf::from("templates/main/greeting.html"),
            "<p class=\"greeting\">Hello from {{name}}</p>\n".to_string(),
        ),
    ];

    let mut created = Vec::new();
    for (relative, content) in files {
        let path = root.join(relative);
        fs::write(&path, content)?;
        created.push(path);
    }
    Ok(created)
}

/// Renders the `aster.toml` configuration file.
fn config_template(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
version = "0.1.0"

[cache]
enabled = true
dir = ".aster-cache"

[build]
minify = false
output = "dist"

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
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn init_creates_directory_structure() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("test_site");
        run(Some(project_dir.to_str().unwrap().to_string()), &quiet()).unwrap();

        assert!(project_dir.join("aster.toml").exists());
        assert!(project_dir.join("scripts/app.js").is_file());
        assert!(project_dir.join("styles/site.css").is_file());
        assert!(project_dir.join("templates/main/greeting.html").is_file());
    }

    #[test]
    fn init_generates_valid_toml() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("toml_site");
        run(Some(project_dir.to_str().unwrap().to_string()), &quiet()).unwrap();

        let toml_str = fs::read_to_string(project_dir.join("aster.toml")).unwrap();
        let config = aster_config::load_config_from_str(&toml_str);
        assert!(
            config.is_ok(),
            "generated aster.toml should be valid: {config:?}"
        );
        let config = config.unwrap();
        assert_eq!(config.project.name, "toml_site");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.source_count(), 3);
    }

    #[test]
    fn init_existing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        let err = run(Some(tmp.path().to_str().unwrap().to_string()), &quiet()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn scaffold_builds() {
        let tmp = TempDir::new().unwrap();
        scaffold(tmp.path(), "demo").unwrap();
        let config = aster_config::load_config(tmp.path()).unwrap();
        let orchestrator = crate::pipeline::configure(tmp.path(), &config).unwrap();
        let containers = orchestrator.create_module_containers(false, "0.1.0").unwrap();
        assert_eq!(containers.len(), 3);
    }
}
