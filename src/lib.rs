//! xgomod - module manifests and classfile resolution for XGo projects
//!
//! This crate reads and edits `go.mod` together with the XGo classfile
//! manifest `gox.mod` (or the legacy `gop.mod`), builds the registry that
//! maps class file extensions to the projects that handle them, and
//! locates the directory of any imported package.

pub mod core;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for xgomod unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory filesystem, module fixtures
/// and a fetcher that serves modules from memory.
#[cfg(test)]
pub mod test_support;

pub use core::{GoMod, Manifest, Module, ModuleVersion, Project, Workspace};
pub use resolver::{ClassfileRegistry, PackageLocator, VersionMap};
pub use util::context::GlobalContext;
