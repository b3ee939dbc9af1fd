//! Producer-side frame accumulation and publishing
//!
//! The encoder delivers encoded bytes in arbitrary chunks; frame boundaries
//! are self-delimiting via the JPEG SOI marker at the head of a chunk. The
//! buffer accumulates chunks until the next boundary, then publishes the
//! accumulated bytes as one complete frame and wakes every waiting session.

use bytes::{Bytes, BytesMut};
use tokio::sync::watch;

use super::channel::{FrameReceiver, FrameSource};
use super::frame::{Frame, JPEG_SOI};

/// Accumulates encoder output and publishes complete frames
///
/// Owned by the producer; only the producer calls [`append`](Self::append).
/// The server side holds a [`FrameSource`] obtained from
/// [`source`](Self::source) and subscribes one receiver per session.
///
/// The published "latest" value is always either absent (no frame yet) or a
/// complete frame; a partially accumulated frame is never observable.
#[derive(Debug)]
pub struct FrameBuffer {
    /// Bytes of the frame currently being accumulated
    pending: BytesMut,
    /// Sequence number of the last published frame
    seq: u64,
    /// The shared latest-frame slot
    tx: watch::Sender<Option<Frame>>,
}

impl FrameBuffer {
    /// Create an empty frame buffer
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            pending: BytesMut::new(),
            seq: 0,
            tx,
        }
    }

    /// Append a chunk of encoder output
    ///
    /// A chunk starting with the JPEG SOI marker begins a new frame. If bytes
    /// are already accumulated at that point they form one complete frame,
    /// which is published and all blocked sessions are woken. The chunk
    /// itself (marker included) then starts the next accumulation.
    ///
    /// The very first chunk only starts an accumulation; nothing is published
    /// until a second frame start is seen.
    ///
    /// Never blocks and never fails: with no session waiting, the
    /// notification is simply lost.
    pub fn append(&mut self, chunk: &[u8]) {
        if chunk.starts_with(&JPEG_SOI) && !self.pending.is_empty() {
            let data = self.pending.split().freeze();
            self.publish(data);
        }
        self.pending.extend_from_slice(chunk);
    }

    fn publish(&mut self, data: Bytes) {
        self.seq += 1;
        tracing::trace!(
            seq = self.seq,
            len = data.len(),
            receivers = self.tx.receiver_count(),
            "Frame published"
        );
        self.tx.send_replace(Some(Frame::new(self.seq, data)));
    }

    /// Get a cloneable subscription handle for the server side
    pub fn source(&self) -> FrameSource {
        FrameSource::new(self.tx.subscribe())
    }

    /// Subscribe a single consumer directly
    pub fn subscribe(&self) -> FrameReceiver {
        self.source().subscribe()
    }

    /// The most recently published frame, if any
    pub fn latest(&self) -> Option<Frame> {
        self.tx.borrow().clone()
    }

    /// Number of frames published so far
    pub fn published(&self) -> u64 {
        self.seq
    }

    /// Number of live receivers (diagnostics only; racy by nature)
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soi_chunk(tail: &[u8]) -> Vec<u8> {
        let mut chunk = JPEG_SOI.to_vec();
        chunk.extend_from_slice(tail);
        chunk
    }

    #[test]
    fn test_first_chunk_publishes_nothing() {
        let mut buffer = FrameBuffer::new();

        buffer.append(&soi_chunk(b"AAA"));

        assert_eq!(buffer.published(), 0);
        assert!(buffer.latest().is_none());
    }

    #[test]
    fn test_boundary_publishes_accumulated_frame() {
        // Chunks [SOI+AAA], [BB], [SOI+CCC] -> exactly one publish of SOI AAA BB
        let mut buffer = FrameBuffer::new();

        buffer.append(&soi_chunk(b"AAA"));
        buffer.append(b"BB");
        buffer.append(&soi_chunk(b"CCC"));

        assert_eq!(buffer.published(), 1);
        let frame = buffer.latest().unwrap();
        assert_eq!(frame.seq, 1);
        assert_eq!(&frame.data[..], &soi_chunk(b"AAABB")[..]);
    }

    #[test]
    fn test_frames_equal_ranges_between_markers() {
        let mut buffer = FrameBuffer::new();
        let mut rx = buffer.subscribe();
        let mut seen = Vec::new();

        for tail in [&b"one"[..], b"two", b"three", b"four"] {
            buffer.append(&soi_chunk(tail));
            if let Some(frame) = buffer.latest() {
                if frame.seq > seen.len() as u64 {
                    seen.push(frame.data.clone());
                }
            }
        }

        // Three boundaries crossed -> frames are exactly the ranges between them
        assert_eq!(buffer.published(), 3);
        assert_eq!(&seen[0][..], &soi_chunk(b"one")[..]);
        assert_eq!(&seen[1][..], &soi_chunk(b"two")[..]);
        assert_eq!(&seen[2][..], &soi_chunk(b"three")[..]);

        // A subscriber polling now sees only the newest
        let latest = tokio_test::block_on(rx.wait_next()).unwrap();
        assert_eq!(&latest.data[..], &soi_chunk(b"three")[..]);
    }

    #[test]
    fn test_non_boundary_chunks_accumulate() {
        let mut buffer = FrameBuffer::new();

        buffer.append(&soi_chunk(b"A"));
        buffer.append(b"B");
        buffer.append(b"C");
        assert_eq!(buffer.published(), 0);

        buffer.append(&soi_chunk(b"next"));
        let frame = buffer.latest().unwrap();
        assert_eq!(&frame.data[..], &soi_chunk(b"ABC")[..]);
    }

    #[test]
    fn test_append_without_subscribers_never_fails() {
        let mut buffer = FrameBuffer::new();
        assert_eq!(buffer.receiver_count(), 0);

        for _ in 0..100 {
            buffer.append(&soi_chunk(b"payload"));
        }

        assert_eq!(buffer.published(), 99);
    }

    #[test]
    fn test_soi_mid_chunk_is_not_a_boundary() {
        // The marker only delimits at the head of a chunk
        let mut buffer = FrameBuffer::new();

        buffer.append(&soi_chunk(b"A"));
        let mut mid = b"B".to_vec();
        mid.extend_from_slice(&JPEG_SOI);
        buffer.append(&mid);

        assert_eq!(buffer.published(), 0);
    }
}
