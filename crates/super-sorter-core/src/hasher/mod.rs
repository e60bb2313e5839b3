pub mod content;

pub use content::{identify, FileIdentity};
