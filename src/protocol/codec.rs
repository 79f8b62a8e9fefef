//! Pure encode/decode functions for frames and fixed-width fields
//!
//! All integers are little-endian.

use crate::protocol::error::{ProtocolError, ProtocolResult};
use crate::protocol::types::{
    Frame, FrameHeader, CREDENTIALS_LEN, CREDENTIAL_FIELD_LEN, HEADER_LEN, MOVE_PAYLOAD_LEN,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Encode a header followed by `payload` into one contiguous buffer
pub fn encode_frame(command_id: u32, payload: &[u8]) -> Bytes {
    debug_assert!(payload.len() <= u32::MAX as usize);

    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u32_le(payload.len() as u32);
    buf.put_u32_le(command_id);
    buf.put_slice(payload);
    buf.freeze()
}

/// Decode the 8-byte header at the start of `bytes`.
///
/// Extra trailing bytes are ignored; fewer than 8 is an error.
pub fn decode_header(bytes: &[u8]) -> ProtocolResult<FrameHeader> {
    if bytes.len() < HEADER_LEN {
        return Err(ProtocolError::ShortHeader {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let mut buf = &bytes[..HEADER_LEN];
    Ok(FrameHeader {
        payload_length: buf.get_u32_le(),
        command_id: buf.get_u32_le(),
    })
}

/// Decode a complete frame; the buffer must hold exactly header + payload
pub fn decode_frame(bytes: &[u8]) -> ProtocolResult<Frame> {
    let header = decode_header(bytes)?;
    let body = &bytes[HEADER_LEN..];

    if body.len() != header.payload_length as usize {
        return Err(ProtocolError::PayloadMismatch {
            declared: header.payload_length,
            actual: body.len(),
        });
    }

    Ok(Frame::new(header.command_id, Bytes::copy_from_slice(body)))
}

/// UTF-8 encode `value` into a zero-padded, truncated 32-byte field
pub fn encode_fixed_str(value: &str) -> [u8; CREDENTIAL_FIELD_LEN] {
    let mut field = [0u8; CREDENTIAL_FIELD_LEN];
    let bytes = value.as_bytes();
    let len = bytes.len().min(CREDENTIAL_FIELD_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Strip trailing zero bytes from a fixed-width field
pub fn decode_fixed_str(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != 0)
        .map(|i| i + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Register/login payload: username field then password field
pub fn encode_credentials(username: &str, password: &str) -> [u8; CREDENTIALS_LEN] {
    let mut payload = [0u8; CREDENTIALS_LEN];
    payload[..CREDENTIAL_FIELD_LEN].copy_from_slice(&encode_fixed_str(username));
    payload[CREDENTIAL_FIELD_LEN..].copy_from_slice(&encode_fixed_str(password));
    payload
}

/// Game-move payload: `move_type` then `item_id`, both signed 32-bit
pub fn encode_move(move_type: i32, item_id: i32) -> [u8; MOVE_PAYLOAD_LEN] {
    let mut payload = [0u8; MOVE_PAYLOAD_LEN];
    let mut buf = &mut payload[..];
    buf.put_i32_le(move_type);
    buf.put_i32_le(item_id);
    payload
}
