//! Resolution stages: imports, variables, assets, layout

pub mod assets;
pub mod imports;
pub mod layout;
pub mod scope;
pub mod vars;

pub use scope::{Scope, Vars};
pub use vars::BindMode;
