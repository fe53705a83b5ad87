//! GSEA computation unit, run inside a dedicated Web Worker.

pub mod unit;

#[cfg(target_arch = "wasm32")]
mod entry;
#[cfg(target_arch = "wasm32")]
mod js_module;

#[cfg(target_arch = "wasm32")]
pub use entry::start_unit;
