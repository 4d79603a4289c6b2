//! Resolving what a module depends on.
//!
//! The [`VersionMap`] gives the effective version of every dependency, the
//! [`PackageLocator`] maps import paths to directories, and the
//! [`ClassfileRegistry`] maps class extensions to the projects handling
//! them. Nothing here solves version constraints: requirements are taken
//! as already resolved in `go.mod`.

pub mod classfile;
pub mod errors;
pub mod locator;
pub mod version_map;

pub use classfile::{build_registry, build_registry_with, builtin_projects, ClassfileRegistry};
pub use errors::ResolveError;
pub use locator::{classify, Package, PackageLocator, PkgKind};
pub use version_map::{build_version_map, VersionMap};
