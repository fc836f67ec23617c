//! materials/mod.rs
//! Cryptographic material, the keyring seam and the materials manager.
//!
//! Industry notes:
//! - Key wrapping lives behind `Keyring`; this crate never sees wrapping keys.
//! - The manager enforces pre/postconditions so a misbehaving keyring cannot
//!   produce a message without a data key or an unsigned message for a signed suite.

pub mod types;
pub mod secret;
pub mod context;
pub mod material;
pub mod keyring;
pub mod manager;
pub mod helpers;

pub use types::*;
pub use secret::*;
pub use context::*;
pub use material::*;
pub use keyring::*;
pub use manager::*;
pub use helpers::*;
