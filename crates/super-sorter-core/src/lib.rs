//! Sort a directory tree into per-extension folders, deleting true duplicates.
//!
//! Every regular file under the root is hashed and moved to `root/<EXT>/`.
//! A file whose name is already taken in its category is deleted when the
//! content matches, renamed to `name_N.ext` when the size differs, and moved
//! to `root/EXISTING/<EXT>/` when only the content differs.

pub mod category;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod placer;
pub mod progress;
pub mod registry;
pub mod scanner;

pub use config::{AppConfig, ArchivePolicy, ErrorPolicy, RenamePolicy};
pub use engine::{organize, Action, FileOutcome, OrganizeReport, Organizer};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use registry::{FileRecord, Registry};
