//! Error types untuk codec
//!
//! Tidak ada retry dan tidak ada default diam-diam. Setelah `DecodeError`,
//! stream dianggap desynchronized karena protokol tidak punya resync marker.

use std::io;

use rmp::decode::{NumValueReadError, ValueReadError};
use rmp::encode::ValueWriteError;
use rmp::Marker;
use thiserror::Error;

/// Sink menolak write saat encode
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Underlying writer gagal (penuh, tertutup, ...)
    #[error("failed to write frame: {0}")]
    Write(#[from] io::Error),

    /// MessagePack `bin 32` maksimal 2^32 - 1 byte
    #[error("{field} is {len} bytes, larger than a msgpack bin can hold")]
    TooLarge { field: &'static str, len: usize },
}

impl From<ValueWriteError<io::Error>> for EncodeError {
    fn from(err: ValueWriteError<io::Error>) -> Self {
        match err {
            ValueWriteError::InvalidMarkerWrite(e) | ValueWriteError::InvalidDataWrite(e) => {
                Self::Write(e)
            }
        }
    }
}

/// Malformed stream: primitive berikutnya tidak bisa dibaca
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input habis di tengah frame
    #[error("truncated frame while reading {expected}")]
    Truncated { expected: &'static str },

    #[error("unexpected marker {marker:?} while reading {expected}")]
    UnexpectedMarker {
        expected: &'static str,
        marker: Marker,
    },

    #[error("frame array has {found} elements, expected 3")]
    FieldCount { found: u32 },

    #[error("message type tag does not fit in 8 bits")]
    TagOutOfRange,

    /// Hanya muncul jika `Limits` di-set
    #[error("{field} length {len} exceeds limit of {limit} bytes")]
    TooLarge {
        field: &'static str,
        len: usize,
        limit: usize,
    },

    #[error("{count} trailing bytes after frame")]
    TrailingBytes { count: usize },
}

impl DecodeError {
    /// True jika gagal karena input kurang.
    ///
    /// Caller streaming boleh menunggu byte tambahan lalu decode ulang dari
    /// awal frame, bukan langsung memutus koneksi.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    pub(crate) fn from_value_read(expected: &'static str, err: ValueReadError<io::Error>) -> Self {
        match err {
            // Membaca dari slice hanya bisa gagal karena EOF
            ValueReadError::InvalidMarkerRead(_) | ValueReadError::InvalidDataRead(_) => {
                Self::Truncated { expected }
            }
            ValueReadError::TypeMismatch(marker) => Self::UnexpectedMarker { expected, marker },
        }
    }

    pub(crate) fn from_num_read(expected: &'static str, err: NumValueReadError<io::Error>) -> Self {
        match err {
            NumValueReadError::InvalidMarkerRead(_) | NumValueReadError::InvalidDataRead(_) => {
                Self::Truncated { expected }
            }
            NumValueReadError::TypeMismatch(marker) => Self::UnexpectedMarker { expected, marker },
            NumValueReadError::OutOfRange => Self::TagOutOfRange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_keeps_io_kind() {
        let err = EncodeError::from(ValueWriteError::InvalidDataWrite(io::Error::new(
            io::ErrorKind::WriteZero,
            "sink closed",
        )));
        match err {
            EncodeError::Write(e) => assert_eq!(e.kind(), io::ErrorKind::WriteZero),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_eof_maps_to_truncated() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err = DecodeError::from_value_read("topic", ValueReadError::InvalidMarkerRead(eof));
        assert!(err.is_truncated());
        assert_eq!(err.to_string(), "truncated frame while reading topic");
    }

    #[test]
    fn test_out_of_range_maps_to_tag_error() {
        let err = DecodeError::from_num_read("message type", NumValueReadError::OutOfRange);
        assert!(matches!(err, DecodeError::TagOutOfRange));
        assert!(!err.is_truncated());
    }
}
