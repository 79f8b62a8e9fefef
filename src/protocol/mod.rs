//! Wire protocol spoken by the game server
//!
//! Every message is one frame: an 8-byte little-endian header
//! (`payload_length`, `command_id`) followed by exactly `payload_length` bytes.

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{
    decode_fixed_str, decode_frame, decode_header, encode_credentials, encode_fixed_str,
    encode_frame, encode_move,
};
pub use error::{ProtocolError, ProtocolResult};
pub use types::{
    mask_command, Command, CommandTable, Frame, FrameHeader, MoveConfig, CREDENTIALS_LEN,
    CREDENTIAL_FIELD_LEN, HEADER_LEN, MAX_PAYLOAD, MOVE_PAYLOAD_LEN,
};
