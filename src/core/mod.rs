//! Core data structures for xgomod.
//!
//! This module contains the foundational types:
//! - The line-oriented manifest syntax shared by `go.mod` and `gox.mod`
//! - The parsed `go.mod` ([`GoMod`]) and classfile manifest ([`Manifest`])
//! - Editing operations that keep formatting and comments intact
//! - [`Module`], which loads and saves both files of a module together

pub mod edit;
pub mod errors;
pub mod ext;
pub mod gomod;
pub mod manifest;
pub mod module;
pub mod module_path;
pub mod syntax;
pub mod workspace;

pub use errors::{DirectiveError, ErrorList, ManifestError, ParseError};
pub use gomod::{GoMod, ModuleVersion, GO_MOD};
pub use manifest::{Manifest, Project, WorkClass, GOX_MOD};
pub use module::{Module, ModuleError};
pub use workspace::Workspace;
