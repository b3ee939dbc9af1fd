//! Published frame type

use bytes::Bytes;

/// JPEG Start Of Image marker. A chunk beginning with these bytes starts a
/// new frame in the producer's byte stream.
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// One complete encoded image, immutable once published
///
/// Cheap to clone: the payload is reference counted, so every session shares
/// the same allocation. Frames are identified by publish order; `seq` is
/// strictly increasing and never reused within a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Publish sequence number (1 for the first published frame)
    pub seq: u64,
    /// JPEG payload
    pub data: Bytes,
}

impl Frame {
    /// Create a new frame
    pub fn new(seq: u64, data: Bytes) -> Self {
        Self { seq, data }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clone_shares_payload() {
        let frame = Frame::new(1, Bytes::from_static(&[0xFF, 0xD8, 0x01]));
        let copy = frame.clone();

        assert_eq!(frame, copy);
        // Same allocation, not a deep copy
        assert_eq!(frame.data.as_ptr(), copy.data.as_ptr());
    }

    #[test]
    fn test_frame_len() {
        let frame = Frame::new(7, Bytes::from_static(b"abc"));
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
    }
}
