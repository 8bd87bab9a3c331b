//! Direct3D 11 backend, rendering into a DXGI swap chain.

pub mod types;
pub mod visitor;
