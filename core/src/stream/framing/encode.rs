use bytes::BufMut;

use crate::constants::FINAL_FRAME_MARKER;
use crate::stream::framing::types::{Frame, FrameError};

/// Encode a frame into wire format.
///
/// Layout:
///
/// ```text
/// regular: [ seq u32 ][ iv ][ ciphertext (frame_length) ][ tag ]
/// final:   [ 0xFFFFFFFF ][ seq u32 ][ iv ][ content_len u32 ][ ciphertext ][ tag ]
/// ```
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::with_capacity(12 + frame.iv.len() + frame.ciphertext.len() + frame.auth_tag.len());

    if frame.is_final {
        let content_len = u32::try_from(frame.ciphertext.len()).map_err(|_| FrameError::ContentTooLong {
            len: frame.ciphertext.len() as u64,
            limit: u32::MAX as u64,
        })?;
        out.put_u32(FINAL_FRAME_MARKER);
        out.put_u32(frame.sequence_number);
        out.put_slice(&frame.iv);
        out.put_u32(content_len);
    } else {
        out.put_u32(frame.sequence_number);
        out.put_slice(&frame.iv);
    }
    out.put_slice(&frame.ciphertext);
    out.put_slice(&frame.auth_tag);

    Ok(out)
}

/// Encode a single-block body: `[ iv ][ content_len u64 ][ ciphertext ][ tag ]`.
pub fn encode_non_framed(iv: &[u8], ciphertext: &[u8], auth_tag: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(iv.len() + 8 + ciphertext.len() + auth_tag.len());
    out.put_slice(iv);
    out.put_u64(ciphertext.len() as u64);
    out.put_slice(ciphertext);
    out.put_slice(auth_tag);
    out
}

/// Encode the signature trailer: `[ sig_len u16 ][ DER signature ]`.
pub fn encode_trailer(signature: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u16::try_from(signature.len()).map_err(|_| FrameError::SignatureTooLong { len: signature.len() })?;
    let mut out = Vec::with_capacity(2 + signature.len());
    out.put_u16(len);
    out.put_slice(signature);
    Ok(out)
}
