//! Reusable Encoder / Zero-Copy Decoder
//!
//! Encoder menulis banyak frame ke satu buffer yang bisa di-reuse.
//! Decoder berjalan di atas receive buffer berisi frame yang disambung,
//! menghasilkan `MessageRef` yang meminjam langsung dari buffer.
//!
//! Frame MessagePack sudah self-delimiting, jadi tidak ada length prefix
//! maupun batch header tambahan.

use std::iter::FusedIterator;

use tracing::{debug, trace};

use super::codec::{self, encoded_len, FrameReader};
use super::error::{DecodeError, EncodeError};
use super::limits::Limits;
use super::message::MessageRef;

/// Default buffer 64KB
const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Encoder dengan buffer internal yang di-reuse
///
/// Setelah `reset`, kapasitas buffer tetap, jadi hot path tidak alokasi
/// ulang selama frame muat.
#[derive(Debug, Clone)]
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Encoder {
    /// Membuat encoder dengan kapasitas awal tertentu
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Reset encoder untuk reuse
    #[inline(always)]
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Encode satu pesan, append ke buffer
    ///
    /// Returns slice frame yang baru ditulis. Jika gagal, buffer
    /// dikembalikan ke kondisi sebelum encode.
    #[inline]
    pub fn encode<'m>(&mut self, msg: impl Into<MessageRef<'m>>) -> Result<&[u8], EncodeError> {
        let start = self.buffer.len();
        if let Err(err) = codec::encode(&mut self.buffer, msg.into()) {
            self.buffer.truncate(start);
            return Err(err);
        }
        Ok(&self.buffer[start..])
    }

    /// Encode beberapa pesan berurutan
    ///
    /// Format: `[Frame1][Frame2]...[FrameN]`, tanpa header batch.
    pub fn encode_batch(&mut self, messages: &[MessageRef<'_>]) -> Result<&[u8], EncodeError> {
        let start = self.buffer.len();
        self.buffer
            .reserve(messages.iter().map(|msg| encoded_len(*msg)).sum());

        for msg in messages {
            if let Err(err) = codec::encode(&mut self.buffer, *msg) {
                self.buffer.truncate(start);
                return Err(err);
            }
        }

        Ok(&self.buffer[start..])
    }

    /// Isi buffer saat ini
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Kapasitas buffer (tidak berkurang setelah reset)
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }
}

/// Zero-copy decoder untuk buffer berisi banyak frame
///
/// Iterator berhenti saat buffer habis tepat di batas frame. Setelah error
/// pertama, iterator tidak menghasilkan apa pun lagi: stream sudah
/// desynchronized.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    reader: FrameReader<'a>,
    failed: bool,
}

impl<'a> Decoder<'a> {
    /// Membuat decoder dari buffer
    #[inline(always)]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_limits(buffer, Limits::default())
    }

    #[inline(always)]
    pub fn with_limits(buffer: &'a [u8], limits: Limits) -> Self {
        Self {
            reader: FrameReader::new(buffer, limits),
            failed: false,
        }
    }

    /// Bytes dari frame lengkap yang sudah dibaca
    ///
    /// Transport cukup `drain(..consumed)` dari receive buffer-nya.
    #[inline(always)]
    pub fn consumed(&self) -> usize {
        self.reader.position()
    }

    /// Remaining bytes
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<MessageRef<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.remaining() == 0 {
            return None;
        }

        match self.reader.read_frame() {
            Ok(msg) => {
                trace!(
                    msg_type = %msg.msg_type,
                    topic_len = msg.topic.len(),
                    body_len = msg.body.len(),
                    "decoded frame"
                );
                Some(Ok(msg))
            }
            Err(err) => {
                self.failed = true;
                debug!(
                    offset = self.reader.position(),
                    truncated = err.is_truncated(),
                    error = %err,
                    "frame decode failed, stream desynchronized"
                );
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Decoder<'_> {}
