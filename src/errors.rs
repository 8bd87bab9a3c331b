//! Crate-wide result type. Backends and platform glue report failures as
//! `failure::Error`, typed errors live in `video::errors`.

pub use failure::Error;

pub type Result<T> = ::std::result::Result<T, failure::Error>;
