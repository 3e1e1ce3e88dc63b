//! Lua runtime and evaluation.
//!
//! This module provides the Lua execution environment for build scripts. It
//! manages the Lua VM lifecycle, registers the `bg` global and loads the
//! scripts themselves.
//!
//! # Submodules
//!
//! - [`globals`] - The `bg` table (`bg.module{}`, `bg.include`, target matrices)
//! - [`helpers`] - Helper tables exposed to scripts (`bg.path`)
//! - [`loaders`] - Script loading with `__dir` injection
//! - [`runtime`] - Low-level Lua VM management

pub mod globals;
pub mod helpers;
pub mod loaders;
pub mod runtime;
