pub mod scan;

pub use scan::{ScanKind, ScanRecord};
