pub mod commands;

#[cfg(target_os = "linux")]
pub mod network_manager;
