pub mod commands;
mod controller;
mod decode;
mod gate;
mod loop_worker;
mod still;

pub use controller::{ScannerController, ScannerSnapshot};
