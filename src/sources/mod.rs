//! Where dependency modules come from.
//!
//! Modules are read from the local module cache; missing ones are
//! downloaded into it by a [`Fetcher`].

pub mod cache;
pub mod fetch;
pub mod sumfile;

pub use cache::{ModCache, ModuleCache};
pub use fetch::{FetchError, Fetcher, GoCommandFetcher, OfflineFetcher};
pub use sumfile::SumFile;
