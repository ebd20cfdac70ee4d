use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, WireError};

/// Frame header: magic (2) + length (4) + request id (4) = 10 bytes.
pub const HEADER_SIZE: usize = 10;

/// Magic bytes: "SB" (0x53 0x42).
pub const MAGIC: [u8; 2] = [0x53, 0x42];

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// One request or reply on the channel.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Correlates a reply with the request that produced it.
    pub id: u32,
    /// JSON-encoded body.
    pub payload: Bytes,
}

impl Frame {
    pub fn new(id: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// Header plus payload length.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Append one frame to `dst`.
///
/// ```text
/// ┌────────────┬────────────┬─────────────┬────────────────┐
/// │ Magic (2B) │ Length     │ Request id  │ Payload        │
/// │ "SB"       │ (4B LE)    │ (4B LE)     │ (Length bytes) │
/// └────────────┴────────────┴─────────────┴────────────────┘
/// ```
pub fn encode_frame(id: u32, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| WireError::PayloadTooLarge {
        id,
        size: payload.len(),
        max: u32::MAX as usize,
    })?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(len);
    dst.put_u32_le(id);
    dst.put_slice(payload);
    Ok(())
}

/// Take one complete frame off the front of `src`.
///
/// Returns `Ok(None)` while the buffer holds less than a full frame; in that
/// case nothing is consumed.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(WireError::InvalidMagic);
    }

    let mut header = &src[2..HEADER_SIZE];
    let payload_len = header.get_u32_le() as usize;
    let id = header.get_u32_le();

    if payload_len > max_payload {
        return Err(WireError::PayloadTooLarge {
            id,
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { id, payload }))
}

/// Limits and timeouts applied by frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    pub read_timeout: Option<std::time::Duration>,
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
