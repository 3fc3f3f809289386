//! Layout wrapping tests
//!
//! A `_layout.pypx` in the page directory wraps every page compiled from
//! it; the page's resolved tree lands at the single `{children}` slot.

use pypx::pypx::ast::CompileError;
use pypx::pypx::compiler::Compiler;
use pypx::pypx::config::Config;
use std::fs;
use tempfile::TempDir;

fn project() -> (TempDir, Compiler) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pages")).unwrap();
    fs::create_dir_all(dir.path().join("components")).unwrap();
    let config = Config::at(dir.path());
    let compiler = Compiler::new(config);
    (dir, compiler)
}

fn write_page(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join("pages").join(name), content).unwrap();
}

#[test]
fn test_page_wrapped_at_slot() {
    let (dir, compiler) = project();
    write_page(
        &dir,
        "_layout.pypx",
        "html\n    body\n        header\n            top\n        {children}\n        footer\n            bottom",
    );
    write_page(&dir, "home.pypx", "main\n    Content");
    let html = compiler.compile_file("home.pypx").unwrap();
    assert_eq!(
        html,
        "<html><body><header>top</header><main>Content</main><footer>bottom</footer></body></html>"
    );
}

#[test]
fn test_no_layout_file_leaves_page_unwrapped() {
    let (dir, compiler) = project();
    write_page(&dir, "home.pypx", "main\n    Content");
    assert_eq!(compiler.compile_file("home.pypx").unwrap(), "<main>Content</main>");
}

#[test]
fn test_layout_disabled_by_flag() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pages")).unwrap();
    let mut config = Config::at(dir.path());
    config.use_layout = false;
    let compiler = Compiler::new(config);
    write_page(&dir, "_layout.pypx", "html\n    {children}");
    write_page(&dir, "home.pypx", "main\n    Content");
    assert_eq!(compiler.compile_file("home.pypx").unwrap(), "<main>Content</main>");
}

#[test]
fn test_layout_without_slot_is_fatal() {
    let (dir, compiler) = project();
    write_page(&dir, "_layout.pypx", "html\n    body\n        no slot here");
    write_page(&dir, "home.pypx", "main\n    Content");
    match compiler.compile_file("home.pypx").unwrap_err() {
        CompileError::Layout { message, .. } => assert!(message.contains("found 0")),
        other => panic!("expected layout error, got {:?}", other),
    }
}

#[test]
fn test_layout_with_two_slots_is_fatal() {
    let (dir, compiler) = project();
    write_page(&dir, "_layout.pypx", "div\n    {children}\ndiv\n    {children}");
    write_page(&dir, "home.pypx", "main\n    Content");
    match compiler.compile_file("home.pypx").unwrap_err() {
        CompileError::Layout { message, .. } => assert!(message.contains("found 2")),
        other => panic!("expected layout error, got {:?}", other),
    }
}

#[test]
fn test_layout_variable_defaults_apply() {
    let (dir, compiler) = project();
    write_page(&dir, "_layout.pypx", "html\n    title\n        {title=My Site}\n    {children}");
    write_page(&dir, "home.pypx", "main\n    x");
    let html = compiler.compile_file("home.pypx").unwrap();
    assert_eq!(html, "<html><title>My Site</title><main>x</main></html>");
}

#[test]
fn test_page_values_reach_layout() {
    let (dir, compiler) = project();
    write_page(&dir, "_layout.pypx", "html\n    title\n        {title=My Site}\n    {children}");
    write_page(&dir, "home.pypx", "main\n    x");
    let vars = [("title".to_string(), "Home".to_string())].into_iter().collect();
    let html = compiler.compile_file_with("home.pypx", &vars).unwrap();
    assert_eq!(html, "<html><title>Home</title><main>x</main></html>");
}

#[test]
fn test_head_content_lifted_into_layout() {
    let (dir, compiler) = project();
    write_page(
        &dir,
        "_layout.pypx",
        "html\n    head\n        {headcontent=}\n    body\n        {children}",
    );
    write_page(
        &dir,
        "home.pypx",
        "head\n    <meta charset=\"utf-8\">\nmain\n    Content",
    );
    let html = compiler.compile_file("home.pypx").unwrap();
    assert_eq!(
        html,
        "<html><head><meta charset=\"utf-8\"></head><body><main>Content</main></body></html>"
    );
}

#[test]
fn test_layout_with_imports() {
    let (dir, compiler) = project();
    fs::write(
        dir.path().join("components").join("nav.pypx"),
        "nav\n    links",
    )
    .unwrap();
    write_page(&dir, "_layout.pypx", "body\n    [nav.pypx]\n    {children}");
    write_page(&dir, "home.pypx", "main\n    x");
    let html = compiler.compile_file("home.pypx").unwrap();
    assert_eq!(html, "<body><nav>links</nav><main>x</main></body>");
}

#[test]
fn test_reserved_names_in_page_stay_literal() {
    let (dir, compiler) = project();
    write_page(&dir, "home.pypx", "main\n    {children}");
    // No layout file: the reserved name passes through untouched.
    assert_eq!(
        compiler.compile_file("home.pypx").unwrap(),
        "<main>{children}</main>"
    );
}
