//! telemetry/counters.rs
//! Mutable counters used during streaming runs.
//!
//! Summary: Collects frame counts and byte counts during encrypt/decrypt.
//! Converted into an immutable `TelemetrySnapshot` at the end of the run.

use std::ops::AddAssign;
use serde::{Deserialize, Serialize};

/// Deterministic counters collected during message processing.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub frames_regular: u64,
    pub frames_final: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    pub bytes_overhead: u64,
}

impl TelemetryCounters {
    /// Header, header IV and header tag are pure overhead.
    pub fn add_header(&mut self, header_len: usize) {
        self.bytes_overhead += header_len as u64;
    }

    /// Record one body block.
    ///
    /// - `content_len`: plaintext (= ciphertext) bytes in the block
    /// - `wire_len`: encoded block length including sequence, IV, lengths and tag
    pub fn add_frame(&mut self, is_final: bool, content_len: usize, wire_len: usize) {
        if is_final {
            self.frames_final += 1;
        } else {
            self.frames_regular += 1;
        }
        self.bytes_plaintext += content_len as u64;
        self.bytes_ciphertext += content_len as u64;
        self.bytes_overhead += wire_len.saturating_sub(content_len) as u64;
    }

    /// Signature trailer, length prefix included.
    pub fn add_trailer(&mut self, trailer_len: usize) {
        self.bytes_overhead += trailer_len as u64;
    }

    pub fn frames_total(&self) -> u64 {
        self.frames_regular + self.frames_final
    }

    /// Bytes on the wire for the whole message.
    pub fn wire_bytes(&self) -> u64 {
        self.bytes_ciphertext + self.bytes_overhead
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.frames_regular   += rhs.frames_regular;
        self.frames_final     += rhs.frames_final;
        self.bytes_plaintext  += rhs.bytes_plaintext;
        self.bytes_ciphertext += rhs.bytes_ciphertext;
        self.bytes_overhead   += rhs.bytes_overhead;
    }
}
