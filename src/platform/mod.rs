//! Win32 implementations
//!
//! Everything that talks to the operating system lives here. The rest of
//! the crate only sees the domain traits these types implement.

pub mod instance;
pub mod monitors;
pub mod remote;
pub mod shell;
pub mod windows;

pub use instance::SingleInstance;
pub use monitors::{MonitorError, monitor_areas};
pub use shell::ShellWindowLocator;
