//! Helper tables exposed to build scripts.

pub mod path;
