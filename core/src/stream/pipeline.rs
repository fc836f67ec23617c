// ## 📂 File: `src/stream/pipeline.rs`
// ## Pipeline wiring over Read/Write (no crypto logic)

use std::io::{Read, Write};

use tracing::debug;

use crate::materials::MaterialsManager;
use crate::stream::decrypt::{DecryptEvent, Decryptor};
use crate::stream::encrypt::Encryptor;
use crate::stream::io;
use crate::telemetry::{Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;

// ============================================================
// Encrypt pipeline
// ============================================================

/// Drive `encryptor` from `reader` to `writer` in `chunk_size` reads.
///
/// `timer` should be started before the encryptor was built so material
/// acquisition falls inside the measured run.
pub fn run_encrypt_pipeline<R, W>(
    reader: &mut R,
    writer: &mut W,
    encryptor: &mut Encryptor,
    chunk_size: usize,
    mut timer: TelemetryTimer,
) -> Result<TelemetrySnapshot, StreamError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{

    timer.time(Stage::Write, || writer.write_all(encryptor.header_bytes()))?;

    loop {
        let chunk = timer.time(Stage::Read, || io::read_exact_or_eof(&mut *reader, chunk_size))?;
        if chunk.is_empty() {
            break;
        }
        let wire = encryptor.update(&chunk)?;
        if !wire.is_empty() {
            timer.time(Stage::Write, || writer.write_all(&wire))?;
        }
    }

    let tail = encryptor.finish()?;
    timer.time(Stage::Write, || writer.write_all(&tail))?;
    timer.time(Stage::Write, || writer.flush())?;

    timer.stage_times.merge(encryptor.stage_times());
    timer.finish();

    let counters = encryptor.counters();
    debug!(frames = counters.frames_total(), wire_bytes = counters.wire_bytes(), "encrypt pipeline done");
    Ok(TelemetrySnapshot::from(counters, &timer))
}

// ============================================================
// Decrypt pipeline
// ============================================================

/// Drive `decryptor` from `reader` to `writer` in `chunk_size` reads.
///
/// Plaintext is written frame by frame as each frame authenticates. For signed
/// messages the trailer is checked only at the end; callers that must not act
/// on unverified output should write to a buffer and discard it on error.
pub async fn run_decrypt_pipeline<M, R, W>(
    reader: &mut R,
    writer: &mut W,
    decryptor: &mut Decryptor<'_, M>,
    chunk_size: usize,
    mut timer: TelemetryTimer,
) -> Result<TelemetrySnapshot, StreamError>
where
    M: MaterialsManager + ?Sized,
    R: Read + ?Sized,
    W: Write + ?Sized,
{

    loop {
        let chunk = timer.time(Stage::Read, || io::read_exact_or_eof(&mut *reader, chunk_size))?;
        if chunk.is_empty() {
            break;
        }
        for event in decryptor.update(&chunk).await? {
            match event {
                DecryptEvent::MessageHeader(header) => {
                    debug!(suite = %header.suite_id, frame_length = header.frame_length, "header available");
                }
                DecryptEvent::MaterialReady { suite_id, signed, .. } => {
                    debug!(suite = %suite_id, signed, "material available");
                }
                DecryptEvent::Plaintext(bytes) => {
                    timer.time(Stage::Write, || writer.write_all(&bytes))?;
                }
            }
        }
    }

    decryptor.finish()?;
    timer.time(Stage::Write, || writer.flush())?;

    timer.stage_times.merge(&decryptor.stage_times());
    timer.finish();

    let counters = decryptor.counters();
    debug!(frames = counters.frames_total(), plaintext = counters.bytes_plaintext, "decrypt pipeline done");
    Ok(TelemetrySnapshot::from(&counters, &timer))
}
