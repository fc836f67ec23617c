use std::fmt;
use zeroize::Zeroize;

use crate::crypto::CryptoError;

/// Owned secret key buffer with an explicit zeroed state.
///
/// Zeroing happens exactly once: on `zeroize_once`, or on drop if that never ran.
/// A zeroed key refuses every read.
pub struct DataKey {
    bytes: Vec<u8>,
    len: usize,
    zeroed: bool,
}

impl DataKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self { bytes, len, zeroed: false }
    }

    /// Length the key had when it was set.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_zeroed(&self) -> bool {
        self.zeroed
    }

    pub fn expose(&self) -> Result<&[u8], CryptoError> {
        if self.zeroed {
            return Err(CryptoError::KeyZeroed);
        }
        Ok(&self.bytes)
    }

    pub fn zeroize_once(&mut self) {
        if !self.zeroed {
            self.bytes.zeroize();
            self.zeroed = true;
        }
    }
}

impl Drop for DataKey {
    fn drop(&mut self) {
        self.zeroize_once();
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey")
            .field("len", &self.len)
            .field("zeroed", &self.zeroed)
            .finish_non_exhaustive()
    }
}
