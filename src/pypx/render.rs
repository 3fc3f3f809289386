//! Template-logic handoff
//!
//! The compiler does not execute loops or conditionals. Serialized output
//! still containing `{% ... %}` constructs is handed to Tera together with
//! the variable scope; the evaluator's output is the final document.
//! Auto-escaping is off; the input is already HTML.

use crate::pypx::ast::{CompileError, CompileResult};
use crate::pypx::resolve::Scope;

/// Evaluate template-logic constructs in `template` against `scope`.
pub fn evaluate(template: &str, scope: &Scope<'_>) -> CompileResult<String> {
    let mut context = tera::Context::new();
    for (name, value) in scope.flatten() {
        context.insert(name, &value);
    }
    log::trace!("handing {} bytes to the template evaluator", template.len());
    tera::Tera::one_off(template, &context, false).map_err(|e| CompileError::Render {
        message: e.to_string(),
    })
}
