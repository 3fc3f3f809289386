//! Command-line interface for pypx
//!
//! Compiles a single pypx file to HTML, optionally evaluating template
//! logic, or dumps intermediate pipeline artifacts for inspection.
//!
//! Usage:
//!   pypx `<path>`                                  - Compile to HTML on stdout
//!   pypx `<path>` --format rendered --var name=Ann - Evaluate template logic too
//!   pypx `<path>` --format tree-json               - Dump the resolved node tree

use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pypx::pypx::ast::{format_source_context, CompileError, CompileResult};
use pypx::pypx::compiler::{Compiler, ParseContext};
use pypx::pypx::config::Config;
use pypx::pypx::lexer;
use pypx::pypx::resolve::Vars;

fn main() -> ExitCode {
    env_logger::init();

    let matches = Command::new("pypx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile pypx markup to HTML")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the pypx file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: html, rendered, tree-json, lines-json")
                .default_value("html"),
        )
        .arg(
            Arg::new("var")
                .long("var")
                .short('v')
                .help("Inject a variable as name=value (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .short('r')
                .help("Project root (default: discovered from the file's directory)"),
        )
        .arg(
            Arg::new("no-layout")
                .long("no-layout")
                .help("Disable layout wrapping for this compilation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .short('o')
                .help("Write output to a file instead of stdout"),
        )
        .get_matches();

    let path = PathBuf::from(matches.get_one::<String>("path").expect("path is required"));
    let format = matches.get_one::<String>("format").unwrap();
    let out_file = matches.get_one::<String>("out");

    let mut vars = Vars::new();
    if let Some(values) = matches.get_many::<String>("var") {
        for value in values {
            match value.split_once('=') {
                Some((name, val)) => {
                    vars.insert(name.trim().to_string(), val.to_string());
                }
                None => {
                    eprintln!("--var expects name=value, got '{}'", value);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("cannot read {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut config = load_config(&path, matches.get_one::<String>("root"));
    if matches.get_flag("no-layout") {
        config.use_layout = false;
    }

    let origin = path.display().to_string();
    match run(&source, &origin, config, format, &vars) {
        Ok(output) => match out_file {
            Some(target) => {
                if let Err(e) = std::fs::write(target, output) {
                    eprintln!("cannot write {}: {}", target, e);
                    return ExitCode::FAILURE;
                }
                ExitCode::SUCCESS
            }
            None => {
                println!("{}", output);
                ExitCode::SUCCESS
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            if let Some(location) = e.location() {
                if location.file.as_deref() == Some(origin.as_str()) {
                    eprint!("{}", format_source_context(&source, location.line));
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Discover the project config from the file's directory, or fall back to
/// a standalone setup where everything lives next to the file.
fn load_config(path: &Path, explicit_root: Option<&String>) -> Config {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    if let Some(root) = explicit_root {
        return Config::load(root).unwrap_or_else(|e| {
            eprintln!("warning: {}", e);
            Config::at(root)
        });
    }
    match Config::discover(&parent) {
        Ok(config) => config,
        Err(_) => {
            let mut config = Config::at(&parent);
            config.pages_root = parent.clone();
            config.components_root = parent.clone();
            config.assets_root = parent;
            config
        }
    }
}

fn run(
    source: &str,
    origin: &str,
    config: Config,
    format: &str,
    vars: &Vars,
) -> CompileResult<String> {
    match format {
        "html" => {
            let compiler = Compiler::new(config);
            compiler.compile_str_with(source, origin, vars)
        }
        "rendered" => {
            let compiler = Compiler::new(config);
            compiler.render_str(source, origin, vars)
        }
        "tree-json" => {
            let compiler = Compiler::new(config);
            let mut ctx = ParseContext::new(compiler.config());
            let forest = compiler.parse_forest(source, origin, &mut ctx)?;
            serde_json::to_string_pretty(&forest).map_err(|e| CompileError::Internal {
                message: format!("cannot serialize tree: {}", e),
            })
        }
        "lines-json" => {
            let lines = lexer::lex(source, config.indent_width, origin)?;
            serde_json::to_string_pretty(&lines).map_err(|e| CompileError::Internal {
                message: format!("cannot serialize lines: {}", e),
            })
        }
        other => Err(CompileError::Config {
            message: format!(
                "unknown format '{}' (expected html, rendered, tree-json, lines-json)",
                other
            ),
        }),
    }
}
