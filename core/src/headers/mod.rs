//! headers/mod.rs
//! Public module export for the message header codec.
//!
//! Industry notes:
//! - Self-describing header: suite, message id, encryption context and every
//!   wrapped data key travel with the ciphertext.
//! - The header is authenticated by its own AEAD tag under the message key, so a
//!   decryptor never acts on header fields it has not verified.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
