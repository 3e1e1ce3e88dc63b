//! buildgraph-lib: Core types and logic for buildgraph
//!
//! This crate turns Lua build scripts describing C++ modules into per-target
//! project plans:
//! - `Module`: a named unit of code with dependencies, rules and conditionals
//! - `Rules`: platform exclusion rules deciding which files compile where
//! - `Graph`: per-target dependency resolution with public/private propagation
//! - `Matrix`: expansion of target matrices into concrete target keys
//! - `Steps`: custom build steps for textures and shader pairs
//! - `Plan` / `Emit`: the resolved plan and its on-disk JSON form

pub mod config;
pub mod consts;
pub mod discover;
pub mod emit;
pub mod error;
pub mod eval;
pub mod graph;
pub mod lua;
pub mod manifest;
pub mod matrix;
pub mod module;
pub mod plan;
pub mod platform;
pub mod predicate;
pub mod rules;
pub mod steps;
pub mod util;
