// ## 2️⃣ `core.rs`: stable public API

use crate::{
    constants::{DEFAULT_CHUNK_SIZE, DEFAULT_FRAME_LENGTH, ENCODED_SIGNER_KEY, MAX_CHUNK_SIZE},
    headers::{ContentType, MessageHeader},
    materials::{EncryptionContext, MaterialsManager},
    stream::{
        decrypt::{DecryptEvent, Decryptor},
        encrypt::Encryptor,
        io::{open_input, open_output, take_shared_output, InputSource, OutputSink},
        pipeline::{run_decrypt_pipeline, run_encrypt_pipeline},
    },
    suites::AlgorithmSuiteId,
    telemetry::{TelemetrySnapshot, TelemetryTimer},
    types::StreamError,
};

#[derive(Clone, Debug)]
pub struct EncryptParams {
    /// `None` → default suite (HKDF-SHA384, AES-256-GCM, ECDSA P-384).
    pub suite_id: Option<AlgorithmSuiteId>,
    pub context: EncryptionContext,
    pub frame_length: u32,
    pub content_type: ContentType,
    /// Declared plaintext length; when set, the input must match it exactly.
    pub plaintext_length: Option<u64>,
}

impl Default for EncryptParams {
    fn default() -> Self {
        Self {
            suite_id: None,
            context: EncryptionContext::new(),
            frame_length: DEFAULT_FRAME_LENGTH,
            content_type: ContentType::Framed,
            plaintext_length: None,
        }
    }
}

impl EncryptParams {
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.content_type == ContentType::Framed && self.frame_length == 0 {
            return Err(StreamError::Validation("frame length must be at least 1".into()));
        }
        if self.context.contains_key(ENCODED_SIGNER_KEY) {
            return Err(StreamError::Validation(format!(
                "encryption context key {ENCODED_SIGNER_KEY:?} is reserved"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct DecryptParams {
    /// Upper bound on the frame length (framed) or body length (non-framed)
    /// a message may declare. `None` → unbounded.
    pub max_body_size: Option<usize>,
}

impl DecryptParams {
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.max_body_size == Some(0) {
            return Err(StreamError::Validation("max body size must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Whether to capture the output buffer in memory.
    /// - `None` or `Some(false)` → no buffer capture (production default).
    /// - `Some(true)` → capture buffer for tests/benchmarks.
    pub with_buf: Option<bool>,

    /// Read size of the streaming drivers. `None` → 64 KiB.
    pub chunk_size: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            with_buf: Some(false),
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
        }
    }
}

impl ApiConfig {
    pub fn new(with_buf: Option<bool>, chunk_size: Option<usize>) -> Self {
        Self {
            with_buf: with_buf.or(Some(false)),
            chunk_size: chunk_size.or(Some(DEFAULT_CHUNK_SIZE)),
        }
    }

    pub fn with_buf_enabled() -> Self {
        Self { with_buf: Some(true), ..Self::default() }
    }

    pub fn validate(&self) -> Result<usize, StreamError> {
        let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(StreamError::Validation(format!(
                "invalid chunk size: {chunk_size}, must be 1..={MAX_CHUNK_SIZE}"
            )));
        }
        Ok(chunk_size)
    }
}

#[derive(Debug, Clone)]
pub struct EncryptOutput {
    pub ciphertext: Vec<u8>,
    pub message_header: MessageHeader,
}

#[derive(Debug, Clone)]
pub struct DecryptOutput {
    pub plaintext: Vec<u8>,
    pub message_header: MessageHeader,
}

/// 🔐 Encrypt a whole plaintext in memory.
///
/// Takes any `MaterialsManager`. A bare keyring goes through
/// `DefaultMaterialsManager::new(keyring)` (or `keyring.into()`).
pub async fn encrypt<M>(manager: &M, plaintext: &[u8], mut params: EncryptParams) -> Result<EncryptOutput, StreamError>
where
    M: MaterialsManager + ?Sized,
{
    params.plaintext_length.get_or_insert(plaintext.len() as u64);

    let mut encryptor = Encryptor::new(manager, params).await?;
    let mut ciphertext = encryptor.header_bytes().to_vec();
    ciphertext.extend_from_slice(&encryptor.update(plaintext)?);
    ciphertext.extend_from_slice(&encryptor.finish()?);

    Ok(EncryptOutput { ciphertext, message_header: encryptor.header().clone() })
}

/// 🔓 Decrypt a whole message in memory.
///
/// Takes any `MaterialsManager`; wrap a bare keyring in `DefaultMaterialsManager`.
/// Plaintext is returned only after every frame and, for signed suites, the
/// trailer signature verified.
pub async fn decrypt<M>(manager: &M, ciphertext: &[u8], params: DecryptParams) -> Result<DecryptOutput, StreamError>
where
    M: MaterialsManager + ?Sized,
{
    let mut decryptor = Decryptor::new(manager, params)?;
    let mut header = None;
    let mut plaintext = Vec::with_capacity(ciphertext.len());

    for event in decryptor.update(ciphertext).await? {
        match event {
            DecryptEvent::MessageHeader(h) => header = Some(h),
            DecryptEvent::MaterialReady { .. } => {}
            DecryptEvent::Plaintext(bytes) => plaintext.extend_from_slice(&bytes),
        }
    }
    decryptor.finish()?;

    let message_header = header.ok_or_else(|| StreamError::Validation("message header never produced".into()))?;
    Ok(DecryptOutput { plaintext, message_header })
}

/// 🔐 Encrypt from an input source to an output sink.
pub async fn encrypt_stream<M>(
    manager: &M,
    input: InputSource,
    output: OutputSink,
    params: EncryptParams,
    config: ApiConfig,
) -> Result<TelemetrySnapshot, StreamError>
where
    M: MaterialsManager + ?Sized,
{
    params.validate()?;
    let chunk_size = config.validate()?;

    let mut reader = open_input(input)?;
    let (mut writer, maybe_buf) = open_output(output, config.with_buf)?;

    let timer = TelemetryTimer::new();
    let mut encryptor = Encryptor::new(manager, params).await?;
    let mut snapshot = run_encrypt_pipeline(&mut reader, &mut writer, &mut encryptor, chunk_size, timer)?;

    // --- Telemetry buffer extraction for tests ---
    if let Some(ref arc_buf) = maybe_buf {
        snapshot.attach_output(take_shared_output(arc_buf)?);
    }

    Ok(snapshot)
}

/// 🔓 Decrypt from an input source to an output sink.
pub async fn decrypt_stream<M>(
    manager: &M,
    input: InputSource,
    output: OutputSink,
    params: DecryptParams,
    config: ApiConfig,
) -> Result<TelemetrySnapshot, StreamError>
where
    M: MaterialsManager + ?Sized,
{
    params.validate()?;
    let chunk_size = config.validate()?;

    let mut reader = open_input(input)?;
    let (mut writer, maybe_buf) = open_output(output, config.with_buf)?;

    let timer = TelemetryTimer::new();
    let mut decryptor = Decryptor::new(manager, params)?;
    let mut snapshot = run_decrypt_pipeline(&mut reader, &mut writer, &mut decryptor, chunk_size, timer).await?;

    // --- Telemetry buffer extraction for tests ---
    if let Some(ref arc_buf) = maybe_buf {
        snapshot.attach_output(take_shared_output(arc_buf)?);
    }

    Ok(snapshot)
}
