//! Frame buffers and compositing primitives.

/// Opaque frames and premultiplied overlays.
pub mod frame;
