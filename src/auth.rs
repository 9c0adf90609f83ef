//! Credential models and discovered authentication schemes.

pub mod credentials;
pub mod scheme;

pub use credentials::*;
pub use scheme::*;
