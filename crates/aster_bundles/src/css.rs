//! The default stylesheet engine, built on lightningcss.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use crate::compiler::{CompileContext, CompileOutput, CompilerEngine};
use crate::error::CompileError;
use crate::references;

/// Parses, optionally minifies and prints CSS with lightningcss.
///
/// `@import` rules are kept in the output as written; the files they name
/// are reported as references. They are recorded on the bundle only and
/// play no part in cache validity, which follows the matched assets.
#[derive(Debug, Default)]
pub struct CssCompiler {
    compiled: u64,
}

impl CssCompiler {
    /// Number of stylesheets this engine has compiled.
    pub fn compiled(&self) -> u64 {
        self.compiled
    }
}

impl CompilerEngine for CssCompiler {
    fn compile(
        &mut self,
        source: &str,
        context: &CompileContext,
    ) -> Result<CompileOutput, CompileError> {
        let file = context.source_file.clone();
        let options = ParserOptions {
            filename: file.to_string_lossy().into_owned(),
            ..ParserOptions::default()
        };

        let mut sheet = StyleSheet::parse(source, options).map_err(|e| CompileError::Syntax {
            file: file.clone(),
            message: e.to_string(),
        })?;

        if context.minify {
            sheet
                .minify(MinifyOptions::default())
                .map_err(|e| CompileError::Emit {
                    file: file.clone(),
                    message: e.to_string(),
                })?;
        }

        let printed = sheet
            .to_css(PrinterOptions {
                minify: context.minify,
                ..PrinterOptions::default()
            })
            .map_err(|e| CompileError::Emit {
                file: file.clone(),
                message: e.to_string(),
            })?;

        self.compiled += 1;
        Ok(CompileOutput {
            css: printed.code,
            references: references::collect(source, context),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx(file: &str, minify: bool) -> CompileContext {
        CompileContext {
            minify,
            ..CompileContext::for_file(file)
        }
    }

    #[test]
    fn compiles_plain_css() {
        let mut engine = CssCompiler::default();
        let out = engine
            .compile(".a { color: red; }", &ctx("/nowhere/a.css", false))
            .unwrap();
        assert!(out.css.contains(".a"));
        assert!(out.css.contains("red"));
        assert_eq!(out.references, vec![PathBuf::from("/nowhere/a.css")]);
        assert_eq!(engine.compiled(), 1);
    }

    #[test]
    fn minify_strips_whitespace() {
        let mut engine = CssCompiler::default();
        let src = ".a {\n  color: red;\n}\n\n.b {\n  margin: 0px;\n}\n";
        let pretty = engine.compile(src, &ctx("/n/a.css", false)).unwrap();
        let small = engine.compile(src, &ctx("/n/a.css", true)).unwrap();
        assert!(small.css.len() < pretty.css.len());
        assert!(!small.css.contains('\n'));
    }

    #[test]
    fn syntax_error_names_file() {
        let mut engine = CssCompiler::default();
        let err = engine
            .compile("..bad { color: red; }", &ctx("/n/broken.css", false))
            .unwrap_err();
        match &err {
            CompileError::Syntax { file, .. } => assert_eq!(file, &PathBuf::from("/n/broken.css")),
            other => panic!("expected syntax error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("error in /n/broken.css"));
        assert_eq!(engine.compiled(), 0);
    }
}
