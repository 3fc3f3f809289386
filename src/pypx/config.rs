//! Project configuration for pypx
//!
//! A project is a directory holding a `pypx.config.yaml` marker file.
//! Settings deserialize from that file over the defaults; an explicit root
//! with no marker file just uses the defaults, which keeps string-based and
//! test compilations lightweight.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::pypx::ast::{CompileError, CompileResult};

/// Name of the project marker/configuration file.
pub const CONFIG_FILE: &str = "pypx.config.yaml";

/// Name of the per-directory layout file.
pub const LAYOUT_FILE: &str = "_layout.pypx";

/// Default extension appended to extension-less import targets.
pub const COMPONENT_EXTENSION: &str = "pypx";

/// How far upward project-root discovery will walk.
const MAX_DISCOVERY_DEPTH: usize = 16;

/// Raw shape of `pypx.config.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFileData {
    components_dir: String,
    pages_dir: String,
    build_dir: String,
    assets_dir: String,
    indent_width: usize,
    inline_imports: bool,
    strict_imports: bool,
    use_layout: bool,
    production: bool,
}

impl Default for ConfigFileData {
    fn default() -> Self {
        ConfigFileData {
            components_dir: "components".to_string(),
            pages_dir: "pages".to_string(),
            build_dir: "build".to_string(),
            assets_dir: "static".to_string(),
            indent_width: 0,
            inline_imports: true,
            strict_imports: true,
            use_layout: true,
            production: false,
        }
    }
}

/// Resolved configuration for one project.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub components_root: PathBuf,
    pub pages_root: PathBuf,
    pub build_root: PathBuf,
    pub assets_root: PathBuf,
    /// Indentation unit in spaces; 0 infers it per file.
    pub indent_width: usize,
    /// Embed imported assets verbatim instead of emitting references.
    pub inline_imports: bool,
    /// Whether a missing import target aborts the compilation.
    pub strict_imports: bool,
    /// Whether layout wrapping is applied at all.
    pub use_layout: bool,
    /// Production mode enables the render cache.
    pub production: bool,
}

impl Config {
    fn from_data(project_root: &Path, data: ConfigFileData) -> Self {
        Config {
            project_root: project_root.to_path_buf(),
            components_root: project_root.join(&data.components_dir),
            pages_root: project_root.join(&data.pages_dir),
            build_root: project_root.join(&data.build_dir),
            assets_root: project_root.join(&data.assets_dir),
            indent_width: data.indent_width,
            inline_imports: data.inline_imports,
            strict_imports: data.strict_imports,
            use_layout: data.use_layout,
            production: data.production,
        }
    }

    /// Configuration rooted at `project_root`, reading the marker file when
    /// present and falling back to defaults otherwise.
    pub fn load(project_root: impl AsRef<Path>) -> CompileResult<Self> {
        let root = project_root.as_ref();
        let marker = root.join(CONFIG_FILE);
        let data = if marker.is_file() {
            let raw = std::fs::read_to_string(&marker).map_err(|e| CompileError::Io {
                path: marker.clone(),
                message: e.to_string(),
            })?;
            serde_yaml::from_str(&raw).map_err(|e| CompileError::Config {
                message: format!("failed to parse {}: {}", marker.display(), e),
            })?
        } else {
            ConfigFileData::default()
        };
        Ok(Config::from_data(root, data))
    }

    /// Default configuration rooted at `project_root`, ignoring any marker
    /// file. Used by tests and string-based compilation.
    pub fn at(project_root: impl AsRef<Path>) -> Self {
        Config::from_data(project_root.as_ref(), ConfigFileData::default())
    }

    /// Walk upward from `start` looking for the project marker file.
    pub fn discover(start: impl AsRef<Path>) -> CompileResult<Self> {
        let mut dir = start.as_ref().to_path_buf();
        for _ in 0..MAX_DISCOVERY_DEPTH {
            if dir.join(CONFIG_FILE).is_file() {
                return Config::load(&dir);
            }
            if !dir.pop() {
                break;
            }
        }
        Err(CompileError::Config {
            message: format!(
                "project config file not found ({}); create it at your project root",
                CONFIG_FILE
            ),
        })
    }

    /// Whether a layout file exists for the given page directory.
    pub fn layout_exists(&self, page_dir: &Path) -> bool {
        page_dir.join(LAYOUT_FILE).is_file()
    }

    /// Whether a page file exists under the pages directory.
    pub fn page_exists(&self, page: impl AsRef<Path>) -> bool {
        self.pages_root.join(page).is_file()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::at(".")
    }
}
