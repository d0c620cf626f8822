//! Protocol Layer: Compact MessagePack Frames
//!
//! Prinsip desain:
//! - Dua bentuk frame: keep-alive 1 byte, sisanya array-of-3 posisional
//! - Stateless: encode/decode murni, aman dipanggil paralel
//! - Zero-copy decode: `MessageRef` meminjam langsung dari receive buffer

mod codec;
mod encoder;
mod error;
mod limits;
mod message;

pub use codec::{decode, decode_with_limits, encode, encoded_len, FRAME_FIELDS, KEEP_ALIVE_FRAME};
pub use encoder::{Decoder, Encoder};
pub use error::{DecodeError, EncodeError};
pub use limits::Limits;
pub use message::{Message, MessageRef, MessageType, ParseMessageTypeError};
