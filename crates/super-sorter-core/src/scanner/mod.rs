pub mod walk;

pub use walk::{collect_files, compile_patterns, DiscoveredFile};
