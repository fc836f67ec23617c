//! Incremental body decoding.
//!
//! Every decoder returns `Ok(None)` until the buffer holds one complete unit and
//! `Ok(Some((view, consumed)))` once it does. Views borrow the caller's buffer;
//! nothing is copied here.

use byteorder::{BigEndian, ByteOrder};

use crate::constants::FINAL_FRAME_MARKER;
use crate::stream::framing::types::{BodyLayout, FrameError, FrameView, NonFramedView, MAX_NON_FRAMED_SIZE};

/// Decode the next frame from the front of `wire`.
pub fn decode_frame<'a>(
    wire: &'a [u8],
    layout: &BodyLayout,
) -> Result<Option<(FrameView<'a>, usize)>, FrameError> {
    if wire.len() < 4 {
        return Ok(None);
    }
    let first = BigEndian::read_u32(&wire[..4]);

    if first != FINAL_FRAME_MARKER {
        let total = layout.regular_frame_len();
        if wire.len() < total {
            return Ok(None);
        }
        let iv_end = 4 + layout.iv_len;
        let ct_end = iv_end + layout.frame_length as usize;
        return Ok(Some((
            FrameView {
                sequence_number: first,
                is_final: false,
                iv: &wire[4..iv_end],
                ciphertext: &wire[iv_end..ct_end],
                auth_tag: &wire[ct_end..total],
            },
            total,
        )));
    }

    // final frame: marker | seq | iv | content_len | ciphertext | tag
    let len_off = 8 + layout.iv_len;
    if wire.len() < len_off + 4 {
        return Ok(None);
    }
    let content_len = BigEndian::read_u32(&wire[len_off..len_off + 4]);
    if content_len > layout.frame_length {
        return Err(FrameError::FinalFrameTooLong { content_len, frame_length: layout.frame_length });
    }
    let total = layout.final_frame_len(content_len as usize);
    if wire.len() < total {
        return Ok(None);
    }
    let ct_start = len_off + 4;
    let ct_end = ct_start + content_len as usize;
    Ok(Some((
        FrameView {
            sequence_number: BigEndian::read_u32(&wire[4..8]),
            is_final: true,
            iv: &wire[8..len_off],
            ciphertext: &wire[ct_start..ct_end],
            auth_tag: &wire[ct_end..total],
        },
        total,
    )))
}

/// Read the declared content length of a single-block body, once available.
///
/// Lets the caller apply a size limit before buffering the body itself.
pub fn peek_non_framed_len(wire: &[u8], layout: &BodyLayout) -> Result<Option<u64>, FrameError> {
    let len_off = layout.iv_len;
    if wire.len() < len_off + 8 {
        return Ok(None);
    }
    let content_len = BigEndian::read_u64(&wire[len_off..len_off + 8]);
    if content_len > MAX_NON_FRAMED_SIZE {
        return Err(FrameError::ContentTooLong { len: content_len, limit: MAX_NON_FRAMED_SIZE });
    }
    Ok(Some(content_len))
}

/// Decode a single-block body from the front of `wire`.
pub fn decode_non_framed<'a>(
    wire: &'a [u8],
    layout: &BodyLayout,
) -> Result<Option<(NonFramedView<'a>, usize)>, FrameError> {
    let Some(content_len) = peek_non_framed_len(wire, layout)? else {
        return Ok(None);
    };
    let content_len = content_len as usize;
    let total = layout.non_framed_len(content_len);
    if wire.len() < total {
        return Ok(None);
    }
    let ct_start = layout.iv_len + 8;
    let ct_end = ct_start + content_len;
    Ok(Some((
        NonFramedView {
            iv: &wire[..layout.iv_len],
            ciphertext: &wire[ct_start..ct_end],
            auth_tag: &wire[ct_end..total],
        },
        total,
    )))
}

/// Decode the signature trailer. Returns the DER signature and bytes consumed.
pub fn decode_trailer(wire: &[u8]) -> Option<(&[u8], usize)> {
    if wire.len() < 2 {
        return None;
    }
    let len = BigEndian::read_u16(&wire[..2]) as usize;
    if wire.len() < 2 + len {
        return None;
    }
    Some((&wire[2..2 + len], 2 + len))
}
