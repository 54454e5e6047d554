//! Inscribe wire format: the frame embedded in a transaction.
//!
//! A frame is one version byte followed by the payload:
//!
//! ```text
//! byte[0]   version tag (application-reserved)
//! byte[1..] payload (opaque to this module)
//! ```
//!
//! There is no length prefix. The transport envelope (an OP_RETURN push)
//! already carries the length. The codec never looks inside the payload, so
//! a reader can drop foreign-version frames before paying for a JSON parse.

use bytes::Bytes;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Version byte registered by the names application.
/// Frames carrying any other value belong to somebody else.
pub const APP_VERSION: u8 = 0x00;

/// Size of the frame header (the version byte).
pub const HEADER_LEN: usize = 1;

// ── Frame ─────────────────────────────────────────────────────────────────────

/// A decoded frame. `payload` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub version: u8,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(version: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            version,
            payload: payload.into(),
        }
    }

    /// Serialize to `[version] ++ payload`.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self.version, &self.payload)
    }

    /// Hex form used when the frame travels through string-typed options.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Concatenate the version byte and payload. Total, never fails.
pub fn encode(version: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.push(version);
    out.extend_from_slice(payload);
    out
}

/// Split a frame into version and payload.
///
/// An empty input means the transaction carried no auxiliary data at all.
/// Callers treat `EmptyFrame` as "nothing here", not as a fault.
pub fn decode(frame: &[u8]) -> Result<Frame, FrameError> {
    match frame.split_first() {
        Some((&version, payload)) => Ok(Frame {
            version,
            payload: Bytes::copy_from_slice(payload),
        }),
        None => Err(FrameError::EmptyFrame),
    }
}

/// Zero-copy variant of [`decode`] for callers that already hold `Bytes`.
pub fn decode_bytes(mut frame: Bytes) -> Result<Frame, FrameError> {
    if frame.is_empty() {
        return Err(FrameError::EmptyFrame);
    }
    let head = frame.split_to(HEADER_LEN);
    Ok(Frame {
        version: head[0],
        payload: frame,
    })
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting frame bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("empty frame: transaction carries no embedded data")]
    EmptyFrame,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
