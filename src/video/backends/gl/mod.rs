//! OpenGL 3.3 / ES 3.0 backend.

pub mod capabilities;
pub mod types;
pub mod visitor;
