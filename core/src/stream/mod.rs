//! Message pipelines.
//!
//! Layers, bottom up:
//! - `framing`: body wire codec (frames, single block, trailer)
//! - `frame_worker`: per-frame seal/open
//! - `signature`: trailer signing and verification
//! - `header_parser`: decrypt-side header state machine
//! - `encrypt` / `decrypt`: incremental pipelines
//! - `io`, `pipeline`, `core`: Read/Write drivers and the public entry points

pub mod framing;
pub mod frame_worker;
pub mod signature;
pub mod header_parser;
pub mod encrypt;
pub mod decrypt;
pub mod io;
pub mod pipeline;
pub mod core;

pub use self::core::{
    decrypt, decrypt_stream, encrypt, encrypt_stream, ApiConfig, DecryptOutput, DecryptParams, EncryptOutput,
    EncryptParams,
};
pub use decrypt::{decryptor, DecryptEvent, Decryptor};
pub use encrypt::{encryptor, Encryptor};
pub use header_parser::{HeaderParser, ParseProgress, ParserState, VerifyInfo};
pub use io::{InputSource, OutputSink};
pub use signature::SignatureStage;
