//! ABI infrastructure - interface resolution, local overrides and caching

mod layered;
mod resolver;
mod scanner;

pub use layered::LayeredSource;
pub use resolver::{InterfaceResolver, DEFAULT_CONCURRENCY};
pub use scanner::{AbiScanner, LocalAbis};
