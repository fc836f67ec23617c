//! Frame-level workers.
//!
//! Responsibilities:
//! - Encrypt and decrypt individual frames (or the single block of non-framed content)
//! - Build body AAD
//! - Derive frame IVs from sequence numbers
//! - Encode framing on the way out
//!
//! Non-responsibilities:
//! - IO
//! - Buffering and frame boundaries
//! - Sequence bookkeeping across frames

pub mod types;
pub mod encrypt;
pub mod decrypt;

pub use types::{DecryptedFrame, EncryptedFrame, FrameInput};
pub use encrypt::EncryptFrameWorker;
pub use decrypt::DecryptFrameWorker;
