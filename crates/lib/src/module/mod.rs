//! Module descriptors.
//!
//! A [`ModuleDef`] is the static description of one compilation unit. Modules
//! are declared from Lua with `bg.module{}` (see [`lua`]) and are immutable
//! once the build scripts have been evaluated.

pub mod lua;
mod types;

pub use types::*;
