//! Frame I/O over an async byte stream

use crate::metrics::recorder::{record_frame_received, record_frame_sent};
use crate::protocol::{decode_header, encode_frame, Frame, ProtocolError, HEADER_LEN, MAX_PAYLOAD};
use crate::session::error::{SessionError, SessionResult};
use crate::session::types::Stage;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Write one frame and flush it
pub async fn write_frame<W>(
    writer: &mut W,
    command_id: u32,
    payload: &[u8],
    stage: Stage,
) -> SessionResult<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = encode_frame(command_id, payload);
    writer
        .write_all(&bytes)
        .await
        .map_err(|e| SessionError::from_io(e, stage))?;
    writer
        .flush()
        .await
        .map_err(|e| SessionError::from_io(e, stage))?;

    record_frame_sent();
    Ok(())
}

/// Read exactly one header and then exactly the payload it declares.
///
/// A peer that closes mid-frame yields `ConnectionClosed`; nothing partial is
/// ever returned.
pub async fn read_frame<R>(reader: &mut R, stage: Stage) -> SessionResult<Frame>
where
    R: AsyncRead + Unpin,
{
    let mut header_buf = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header_buf)
        .await
        .map_err(|e| SessionError::from_io(e, stage))?;
    let header = decode_header(&header_buf)?;

    let len = header.payload_length as usize;
    if len > MAX_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge(len).into());
    }

    let mut payload = vec![0u8; len];
    if len > 0 {
        reader
            .read_exact(&mut payload)
            .await
            .map_err(|e| SessionError::from_io(e, stage))?;
    }

    record_frame_received();
    Ok(Frame::new(header.command_id, payload))
}
