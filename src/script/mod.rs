//! Script, scene and media data model.

/// Script document parsing and validation.
pub mod load;
/// Core data types.
pub mod model;
