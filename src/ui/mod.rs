#[cfg(windows)]
pub mod overlay;
pub mod renderer;

#[cfg(windows)]
pub use overlay::OverlayWindow;
