//! MessagePack Frame Codec
//!
//! Encode dan decode ditulis manual di atas reader/writer level rendah `rmp`,
//! bukan serde derive, karena bentuk frame dipilih saat runtime:
//!
//! ```text
//! KeepAlive : 00
//! Publish   : 93 04 c4 04 6e 65 77 73 c4 05 68 65 6c 6c 6f
//!             │  │  └ bin8 "news"      └ bin8 "hello"
//!             │  └ fixint tag
//!             └ fixarray(3)
//! ```
//!
//! Decoder membedakan kedua bentuk lewat marker pertama (uint vs array).
//! Decode membaca langsung dari slice, tidak pernah melewati batas buffer.

use std::io;

use rmp::decode as mp_decode;
use rmp::encode as mp_encode;
use rmp::Marker;

use super::error::{DecodeError, EncodeError};
use super::limits::Limits;
use super::message::{MessageRef, MessageType};

/// Jumlah elemen array di frame non-keep-alive
pub const FRAME_FIELDS: u32 = 3;

/// Frame keep-alive: satu positive fixint `0`
pub const KEEP_ALIVE_FRAME: [u8; 1] = [0x00];

/// Panjang maksimum `bin 32`
const MAX_BIN_LEN: usize = u32::MAX as usize;

/// Encode satu pesan ke writer.
///
/// Returns jumlah byte yang ditulis.
pub fn encode<W: io::Write>(wr: &mut W, msg: MessageRef<'_>) -> Result<usize, EncodeError> {
    if msg.msg_type.is_keep_alive() {
        // Untuk efisiensi, keep-alive hanya berisi type
        mp_encode::write_uint(wr, 0)?;
        return Ok(KEEP_ALIVE_FRAME.len());
    }

    check_bin_len("topic", msg.topic)?;
    check_bin_len("body", msg.body)?;

    mp_encode::write_array_len(wr, FRAME_FIELDS)?;
    mp_encode::write_sint(wr, i64::from(msg.msg_type.tag()))?;
    mp_encode::write_bin(wr, msg.topic)?;
    mp_encode::write_bin(wr, msg.body)?;

    Ok(encoded_len(msg))
}

/// Ukuran frame tanpa encode
#[inline]
pub fn encoded_len(msg: MessageRef<'_>) -> usize {
    if msg.msg_type.is_keep_alive() {
        return KEEP_ALIVE_FRAME.len();
    }

    // fixarray marker + tag + dua bin
    1 + sint_len(msg.msg_type.tag()) + bin_len(msg.topic.len()) + bin_len(msg.body.len())
}

#[inline(always)]
fn sint_len(tag: i8) -> usize {
    // -32..=127 muat di fixint, sisanya int8
    if tag >= -32 {
        1
    } else {
        2
    }
}

#[inline(always)]
fn bin_len(len: usize) -> usize {
    let header = if len <= u8::MAX as usize {
        2
    } else if len <= u16::MAX as usize {
        3
    } else {
        5
    };
    header + len
}

#[inline(always)]
fn check_bin_len(field: &'static str, data: &[u8]) -> Result<(), EncodeError> {
    if data.len() > MAX_BIN_LEN {
        return Err(EncodeError::TooLarge {
            field,
            len: data.len(),
        });
    }
    Ok(())
}

/// Decode tepat satu frame dari `buf`.
///
/// Selain buffer terpotong dan frame yang bentuknya salah, byte sisa setelah
/// frame juga error ([`DecodeError::TrailingBytes`]), misalnya `[0x00, 0x00]`.
/// Untuk buffer berisi banyak frame, pakai [`Decoder`](super::Decoder).
pub fn decode(buf: &[u8]) -> Result<MessageRef<'_>, DecodeError> {
    decode_with_limits(buf, Limits::default())
}

/// Seperti [`decode`], dengan batas ukuran topic/body
pub fn decode_with_limits(buf: &[u8], limits: Limits) -> Result<MessageRef<'_>, DecodeError> {
    let mut reader = FrameReader::new(buf, limits);
    let msg = reader.read_frame()?;

    match reader.remaining() {
        0 => Ok(msg),
        count => Err(DecodeError::TrailingBytes { count }),
    }
}

/// Cursor di atas slice, dipakai bersama oleh `decode` dan `Decoder`
#[derive(Debug, Clone)]
pub(crate) struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
    limits: Limits,
}

impl<'a> FrameReader<'a> {
    #[inline(always)]
    pub(crate) fn new(buf: &'a [u8], limits: Limits) -> Self {
        Self {
            buf,
            pos: 0,
            limits,
        }
    }

    #[inline(always)]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Baca satu frame.
    ///
    /// Jika gagal, posisi dikembalikan ke awal frame.
    pub(crate) fn read_frame(&mut self) -> Result<MessageRef<'a>, DecodeError> {
        let start = self.pos;
        let result = match self.peek_marker("frame header")? {
            Marker::FixArray(_) | Marker::Array16 | Marker::Array32 => self.read_array_frame(),
            // nil dibaca sebagai tag 0
            Marker::Null => {
                self.pos += 1;
                Ok(MessageRef::keep_alive())
            }
            _ => self.read_bare_frame(),
        };

        if result.is_err() {
            self.pos = start;
        }
        result
    }

    /// `[tag, topic, body]`, bentuk yang ditulis encoder
    fn read_array_frame(&mut self) -> Result<MessageRef<'a>, DecodeError> {
        let len = self
            .advance(|rd| mp_decode::read_array_len(rd))
            .map_err(|e| DecodeError::from_value_read("frame header", e))?;
        if len != FRAME_FIELDS {
            return Err(DecodeError::FieldCount { found: len });
        }

        let tag: i64 = self
            .advance(|rd| mp_decode::read_int(rd))
            .map_err(|e| DecodeError::from_num_read("message type", e))?;
        let msg_type = to_message_type(tag)?;

        let topic = self.read_bytes("topic", self.limits.max_topic_len)?;
        let body = self.read_bytes("body", self.limits.max_body_len)?;

        if msg_type.is_keep_alive() {
            return Ok(MessageRef::keep_alive());
        }
        Ok(MessageRef::new(msg_type, topic, body))
    }

    /// Leading int. Keep-alive berhenti di sini, tag lain diikuti topic dan
    /// body sebagai value top-level (layout tanpa array header).
    ///
    /// Tag negatif (`int8` dari producer lama) tetap dibawa sebagai `Unknown`.
    fn read_bare_frame(&mut self) -> Result<MessageRef<'a>, DecodeError> {
        let tag: i64 = self
            .advance(|rd| mp_decode::read_int(rd))
            .map_err(|e| DecodeError::from_num_read("message type", e))?;
        let msg_type = to_message_type(tag)?;

        if msg_type.is_keep_alive() {
            return Ok(MessageRef::keep_alive());
        }

        let topic = self.read_bytes("topic", self.limits.max_topic_len)?;
        let body = self.read_bytes("body", self.limits.max_body_len)?;
        Ok(MessageRef::new(msg_type, topic, body))
    }

    /// Byte string: bin 8/16/32, str (raw lama), atau nil sebagai kosong
    fn read_bytes(&mut self, field: &'static str, limit: usize) -> Result<&'a [u8], DecodeError> {
        let declared: u32 = match self.peek_marker(field)? {
            Marker::Null => {
                self.pos += 1;
                return Ok(&[]);
            }
            Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32 => self
                .advance(|rd| mp_decode::read_str_len(rd))
                .map_err(|e| DecodeError::from_value_read(field, e))?,
            _ => self
                .advance(|rd| mp_decode::read_bin_len(rd))
                .map_err(|e| DecodeError::from_value_read(field, e))?,
        };

        let len = declared as usize;
        if len > limit {
            return Err(DecodeError::TooLarge { field, len, limit });
        }

        let buf = self.buf;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= buf.len())
            .ok_or(DecodeError::Truncated { expected: field })?;

        let data = &buf[self.pos..end];
        self.pos = end;
        Ok(data)
    }

    #[inline(always)]
    fn peek_marker(&self, expected: &'static str) -> Result<Marker, DecodeError> {
        self.buf
            .get(self.pos)
            .map(|&b| Marker::from_u8(b))
            .ok_or(DecodeError::Truncated { expected })
    }

    /// Jalankan fungsi `rmp` di sisa buffer lalu majukan posisi
    #[inline(always)]
    fn advance<T, E>(
        &mut self,
        read: impl FnOnce(&mut &'a [u8]) -> Result<T, E>,
    ) -> Result<T, E> {
        let buf = self.buf;
        let mut rd = &buf[self.pos..];
        let before = rd.len();
        let value = read(&mut rd)?;
        self.pos += before - rd.len();
        Ok(value)
    }
}

#[inline(always)]
fn to_message_type(tag: i64) -> Result<MessageType, DecodeError> {
    i8::try_from(tag)
        .map(MessageType::from_tag)
        .map_err(|_| DecodeError::TagOutOfRange)
}
