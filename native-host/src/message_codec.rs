use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::errors::FrameError;

/// Largest body the host accepts from the browser, 10 MiB.
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Width of the little-endian length prefix.
pub const PREFIX_LEN: usize = 4;

/// Frame format: [length: u32 little-endian][data: bytes]
#[derive(Debug, Default)]
pub struct MessageCodec;

impl MessageCodec {
    /// Validates a declared body length, `0 < length <= MAX_MESSAGE_SIZE`.
    pub fn check_length(length: u32) -> Result<usize, FrameError> {
        let length = length as usize;
        if length == 0 {
            return Err(FrameError::EmptyMessage);
        }
        if length > MAX_MESSAGE_SIZE {
            return Err(FrameError::TooLarge(length));
        }
        Ok(length)
    }
}

impl Encoder<Vec<u8>> for MessageCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let length = u32::try_from(item.len()).map_err(|_| FrameError::TooLarge(item.len()))?;
        dst.reserve(PREFIX_LEN + item.len());
        dst.put_u32_le(length);
        dst.extend_from_slice(&item);
        Ok(())
    }
}
