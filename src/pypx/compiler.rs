//! Top-level compilation pipeline
//!
//! One `Compiler` per project. A single compilation is purely sequential:
//! lex, strip, escape, build, resolve imports, bind variables, resolve
//! assets, wrap in a layout, serialize. Rendering additionally hands the
//! serialized text to the template-logic evaluator. Each top-level call
//! gets its own `ParseContext`, so independent compilations share no
//! mutable state.

use std::path::{Path, PathBuf};

use crate::pypx::ast::{CompileResult, Node};
use crate::pypx::builder;
use crate::pypx::cache::RenderCache;
use crate::pypx::codegen;
use crate::pypx::config::Config;
use crate::pypx::lexer;
use crate::pypx::render;
use crate::pypx::resolve::{assets, imports, layout, vars, BindMode, Scope, Vars};

/// Per-compilation state threaded through the resolver.
#[derive(Debug)]
pub struct ParseContext<'c> {
    pub config: &'c Config,
    /// Files currently being imported, for cycle detection.
    pub import_stack: Vec<PathBuf>,
}

impl<'c> ParseContext<'c> {
    pub fn new(config: &'c Config) -> Self {
        ParseContext {
            config,
            import_stack: Vec::new(),
        }
    }
}

/// Compiles pypx pages under one project configuration.
#[derive(Debug, Default)]
pub struct Compiler {
    config: Config,
    cache: RenderCache,
}

impl Compiler {
    pub fn new(config: Config) -> Self {
        Compiler {
            config,
            cache: RenderCache::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile a page (path relative to the pages directory) to HTML.
    /// Template-logic constructs are left for the downstream evaluator.
    pub fn compile_file(&self, page: impl AsRef<Path>) -> CompileResult<String> {
        self.compile_file_with(page, &Vars::new())
    }

    /// Compile a page with externally injected variables.
    pub fn compile_file_with(&self, page: impl AsRef<Path>, vars: &Vars) -> CompileResult<String> {
        let page = page.as_ref();
        let path = self.config.pages_root.join(page);
        let origin = path.display().to_string();
        let source = std::fs::read_to_string(&path).map_err(|e| crate::pypx::ast::CompileError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let hash = RenderCache::content_hash(&source);
        if self.config.production {
            if let Some(cached) = self.cache.get(&origin, hash) {
                log::debug!("cache hit for {}", origin);
                return Ok(cached);
            }
        }

        let scope = Scope::root(vars.clone());
        let page_dir = path.parent().unwrap_or(&self.config.pages_root).to_path_buf();
        let mut ctx = ParseContext::new(&self.config);
        if let Ok(canonical) = path.canonicalize() {
            ctx.import_stack.push(canonical);
        }
        let output = self.compile_source(&source, &origin, &page_dir, &mut ctx, &scope)?;

        if self.config.production {
            self.cache.store(&origin, hash, output.clone());
        }
        Ok(output)
    }

    /// Compile pypx source text directly. Layout lookup uses the pages
    /// directory; `origin` names the source in diagnostics.
    pub fn compile_str(&self, source: &str, origin: &str) -> CompileResult<String> {
        self.compile_str_with(source, origin, &Vars::new())
    }

    pub fn compile_str_with(
        &self,
        source: &str,
        origin: &str,
        vars: &Vars,
    ) -> CompileResult<String> {
        let scope = Scope::root(vars.clone());
        let mut ctx = ParseContext::new(&self.config);
        let pages_root = self.config.pages_root.clone();
        self.compile_source(source, origin, &pages_root, &mut ctx, &scope)
    }

    /// Compile and evaluate a page, producing final bytes for a caller.
    pub fn render_file(&self, page: impl AsRef<Path>, vars: &Vars) -> CompileResult<String> {
        let html = self.compile_file_with(&page, vars)?;
        render::evaluate(&html, &Scope::root(vars.clone()))
    }

    /// Compile and evaluate source text.
    pub fn render_str(&self, source: &str, origin: &str, vars: &Vars) -> CompileResult<String> {
        let html = self.compile_str_with(source, origin, vars)?;
        render::evaluate(&html, &Scope::root(vars.clone()))
    }

    /// Stages 1-9 for one source unit.
    fn compile_source(
        &self,
        source: &str,
        origin: &str,
        page_dir: &Path,
        ctx: &mut ParseContext<'_>,
        scope: &Scope<'_>,
    ) -> CompileResult<String> {
        let mut forest = self.parse_forest(source, origin, ctx)?;
        vars::bind(&mut forest, scope, BindMode::Page, origin)?;
        assets::resolve(&mut forest, &self.config)?;
        if self.config.use_layout {
            forest = layout::wrap(forest, page_dir, ctx, scope)?;
        }
        codegen::serialize(&forest)
    }

    /// Stages 1-5: lex, strip, escape, build, resolve imports.
    pub fn parse_forest(
        &self,
        source: &str,
        origin: &str,
        ctx: &mut ParseContext<'_>,
    ) -> CompileResult<Vec<Node>> {
        let lines = lexer::lex(source, self.config.indent_width, origin)?;
        let mut forest = builder::build(&lines, origin)?;
        imports::resolve(&mut forest, ctx, origin)?;
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_compiler() -> Compiler {
        let mut config = Config::at("/nonexistent");
        config.use_layout = false;
        Compiler::new(config)
    }

    #[test]
    fn test_compile_str_end_to_end() {
        let compiler = bare_compiler();
        let html = compiler
            .compile_str("html\n    body\n        h1\n            Hello World", "t.pypx")
            .unwrap();
        assert_eq!(html, "<html><body><h1>Hello World</h1></body></html>");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let compiler = bare_compiler();
        let source = "div\n    ;class=\"x\";\n    p\n        one\n        two";
        let first = compiler.compile_str(source, "t.pypx").unwrap();
        let second = compiler.compile_str(source, "t.pypx").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_variable_defaulting() {
        let compiler = bare_compiler();
        let html = compiler
            .compile_str("p\n    Hello, {name=Guest}!", "t.pypx")
            .unwrap();
        assert_eq!(html, "<p>Hello, Guest!</p>");
    }

    #[test]
    fn test_variable_from_context() {
        let compiler = bare_compiler();
        let vars: Vars = [("name".to_string(), "Ann".to_string())].into_iter().collect();
        let html = compiler
            .compile_str_with("p\n    Hello, {name=Guest}!", "t.pypx", &vars)
            .unwrap();
        assert_eq!(html, "<p>Hello, Ann!</p>");
    }

    #[test]
    fn test_render_str_evaluates_logic() {
        let compiler = bare_compiler();
        let vars: Vars = [("show".to_string(), "yes".to_string())].into_iter().collect();
        let out = compiler
            .render_str("div\n    {% if show %}visible{% endif %}", "t.pypx", &vars)
            .unwrap();
        assert_eq!(out, "<div>visible</div>");
    }
}
