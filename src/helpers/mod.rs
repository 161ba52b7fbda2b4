//! Low-level helpers shared by the codecs.
pub(crate) mod text;
pub mod xml;
pub(crate) mod zip;
