//! Sync-pattern framed codec for the IMU serial line
//!
//! Each measurement frame is 20 bytes:
//! ```text
//! [ 4 bytes: sync 7F F0 1C AF ][ 4 bytes: sequence (u32, big-endian) ][ 3 x 4 bytes: x/y/z rates (f32, big-endian) ]
//! ```
//!
//! The serial line carries a raw byte stream with no other framing, so the
//! streaming decoder hunts for the sync pattern and discards anything in
//! front of it.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Fixed synchronization pattern at the start of every frame
pub const SYNC_PATTERN: [u8; 4] = [0x7F, 0xF0, 0x1C, 0xAF];

/// Total size of one frame on the wire
pub const FRAME_LEN: usize = 20;

/// Errors from strict single-frame decoding
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Frame does not start with the sync pattern")]
    SyncMismatch,

    #[error("Not enough data: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
}

/// One decoded IMU measurement frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuFrame {
    /// Sequence counter stamped by the sensor
    pub sequence: u32,
    /// Angular rate about the X axis, radians per second
    pub x_rate_rdps: f32,
    /// Angular rate about the Y axis, radians per second
    pub y_rate_rdps: f32,
    /// Angular rate about the Z axis, radians per second
    pub z_rate_rdps: f32,
}

impl ImuFrame {
    /// One-line human-readable form, broadcast over the command channel
    pub fn summary(&self) -> String {
        format!(
            "Packet {} | X={:.2}, Y={:.2}, Z={:.2}",
            self.sequence, self.x_rate_rdps, self.y_rate_rdps, self.z_rate_rdps
        )
    }
}

/// Encode a frame into its 20-byte wire form
pub fn encode(frame: &ImuFrame) -> Bytes {
    let mut buf = BytesMut::with_capacity(FRAME_LEN);
    buf.put_slice(&SYNC_PATTERN);
    buf.put_u32(frame.sequence);
    buf.put_f32(frame.x_rate_rdps);
    buf.put_f32(frame.y_rate_rdps);
    buf.put_f32(frame.z_rate_rdps);
    buf.freeze()
}

/// Strictly decode one frame from the start of `data`
pub fn decode_frame(data: &[u8]) -> Result<ImuFrame, CodecError> {
    if data.len() < FRAME_LEN {
        return Err(CodecError::Truncated {
            needed: FRAME_LEN,
            available: data.len(),
        });
    }
    if data[..SYNC_PATTERN.len()] != SYNC_PATTERN {
        return Err(CodecError::SyncMismatch);
    }

    let mut body = &data[SYNC_PATTERN.len()..FRAME_LEN];
    Ok(ImuFrame {
        sequence: body.get_u32(),
        x_rate_rdps: body.get_f32(),
        y_rate_rdps: body.get_f32(),
        z_rate_rdps: body.get_f32(),
    })
}

/// Streaming decoder that accumulates serial bytes and yields frames
///
/// Garbage in front of a sync pattern is discarded; a partial frame stays
/// buffered until the rest of it arrives.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Partial frame data being accumulated
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
        }
    }

    /// Add raw bytes read from the serial line
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next complete frame
    ///
    /// Call this repeatedly until it returns `None` to drain all buffered
    /// frames.
    pub fn next_frame(&mut self) -> Option<ImuFrame> {
        loop {
            match self.find_sync() {
                Some(start) => {
                    // Discard garbage in front of the sync pattern
                    self.buffer.advance(start);

                    if self.buffer.len() < FRAME_LEN {
                        return None;
                    }

                    let frame_bytes = self.buffer.split_to(FRAME_LEN);
                    match decode_frame(&frame_bytes) {
                        Ok(frame) => return Some(frame),
                        // Frame bytes are already consumed; rescan
                        Err(_) => continue,
                    }
                }
                None => {
                    // Keep the tail: it may be a prefix of the next sync
                    let keep = self.buffer.len().min(SYNC_PATTERN.len() - 1);
                    self.buffer.advance(self.buffer.len() - keep);
                    return None;
                }
            }
        }
    }

    /// Bytes currently buffered (for debugging)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    fn find_sync(&self) -> Option<usize> {
        self.buffer
            .windows(SYNC_PATTERN.len())
            .position(|window| window == SYNC_PATTERN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_frame() -> ImuFrame {
        ImuFrame {
            sequence: 7,
            x_rate_rdps: 1.5,
            y_rate_rdps: -2.0,
            z_rate_rdps: 0.25,
        }
    }

    #[test]
    fn test_encode_known_bytes() {
        let encoded = encode(&test_frame());
        let expected: &[u8] = &[
            0x7F, 0xF0, 0x1C, 0xAF, // sync
            0x00, 0x00, 0x00, 0x07, // sequence 7
            0x3F, 0xC0, 0x00, 0x00, // 1.5
            0xC0, 0x00, 0x00, 0x00, // -2.0
            0x3E, 0x80, 0x00, 0x00, // 0.25
        ];
        assert_eq!(&encoded[..], expected);
    }

    #[test]
    fn test_decode_frame() {
        let encoded = encode(&test_frame());
        let decoded = decode_frame(&encoded).expect("decode failed");
        assert_eq!(decoded, test_frame());
    }

    #[test]
    fn test_decode_truncated() {
        let encoded = encode(&test_frame());
        let result = decode_frame(&encoded[..10]);
        assert_eq!(
            result,
            Err(CodecError::Truncated { needed: FRAME_LEN, available: 10 })
        );
    }

    #[test]
    fn test_decode_bad_sync() {
        let mut bytes = encode(&test_frame()).to_vec();
        bytes[0] = 0x00;
        assert_eq!(decode_frame(&bytes), Err(CodecError::SyncMismatch));
    }

    #[test]
    fn test_streaming_resync_across_garbage() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0xDE, 0xAD, 0xBE, 0xEF, 0x7F]); // noise plus a false start
        decoder.extend(&encode(&test_frame()));

        let frame = decoder.next_frame().expect("should resync onto the frame");
        assert_eq!(frame, test_frame());
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_streaming_split_feed() {
        let encoded = encode(&test_frame());
        let mut decoder = FrameDecoder::new();

        decoder.extend(&encoded[..9]);
        assert!(decoder.next_frame().is_none());

        decoder.extend(&encoded[9..]);
        let frame = decoder.next_frame().expect("should have a frame");
        assert_eq!(frame, test_frame());
    }

    #[test]
    fn test_streaming_multiple_frames() {
        let mut second = test_frame();
        second.sequence = 8;

        let mut decoder = FrameDecoder::new();
        decoder.extend(&encode(&test_frame()));
        decoder.extend(&encode(&second));

        assert_eq!(decoder.next_frame().map(|f| f.sequence), Some(7));
        assert_eq!(decoder.next_frame().map(|f| f.sequence), Some(8));
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_garbage_does_not_accumulate() {
        let mut decoder = FrameDecoder::new();
        for _ in 0..100 {
            decoder.extend(&[0x55; 64]);
            assert!(decoder.next_frame().is_none());
        }
        // Only a possible sync prefix is kept
        assert!(decoder.buffer_len() < SYNC_PATTERN.len());
    }

    #[test]
    fn test_summary_format() {
        let frame = ImuFrame {
            sequence: 42,
            x_rate_rdps: 0.25,
            y_rate_rdps: -0.5,
            z_rate_rdps: 0.0,
        };
        assert_eq!(frame.summary(), "Packet 42 | X=0.25, Y=-0.50, Z=0.00");
    }
}
