use bytes::BytesMut;
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

use crate::{
    errors::FrameError,
    message_codec::{MessageCodec, PREFIX_LEN},
};

/// A decoded inbound message, always a JSON object.
pub type InboundMessage = Map<String, Value>;

/// Reads one frame and parses its body.
///
/// `Ok(None)` means the stream ended cleanly before a new frame started.
/// Never reads past the declared body length.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<InboundMessage>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; PREFIX_LEN];
    let mut filled = 0;
    while filled < PREFIX_LEN {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    match filled {
        0 => return Ok(None),
        PREFIX_LEN => {}
        _ => return Err(FrameError::InvalidLength),
    }

    let length = MessageCodec::check_length(u32::from_le_bytes(prefix))?;

    let mut body = Vec::with_capacity(length);
    (&mut *reader)
        .take(length as u64)
        .read_to_end(&mut body)
        .await?;
    if body.len() < length {
        return Err(FrameError::Truncated {
            expected: length,
            received: body.len(),
        });
    }

    match serde_json::from_slice::<Value>(&body).map_err(FrameError::InvalidJson)? {
        Value::Object(message) => Ok(Some(message)),
        _ => Err(FrameError::NotAnObject),
    }
}

/// Writes `response` as compact UTF-8 JSON behind its length prefix, then flushes.
pub async fn write_message<W>(writer: &mut W, response: &Value) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(response).map_err(FrameError::Encode)?;
    let mut frame = BytesMut::new();
    MessageCodec.encode(body, &mut frame)?;

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
