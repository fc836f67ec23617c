pub mod types;
pub mod aad;
pub mod aead;
pub mod iv;
pub mod kdf;
pub mod signature;

pub use types::*;
pub use aad::*;
pub use aead::*;
pub use iv::*;
pub use kdf::*;
pub use signature::*;
