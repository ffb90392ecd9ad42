//! Request extractors with improved rejection handling.

pub mod enhanced_multipart;

pub use self::enhanced_multipart::Multipart;
