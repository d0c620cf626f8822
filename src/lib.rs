//! pubsub-wire - Wire Codec untuk Pub/Sub Messaging
//!
//! Lima jenis pesan (keep-alive, authenticate, subscribe, unsubscribe,
//! publish) di-encode ke frame MessagePack yang ringkas. Keep-alive cukup
//! satu byte karena dikirim terus-menerus di koneksi idle.
//!
//! Transport, topic routing, dan autentikasi ada di luar crate ini:
//! mereka mengonsumsi `Message` hasil decode dan menyerahkan `Message`
//! untuk di-encode.
//!
//! ```
//! use pubsub_wire::protocol::{Message, MessageType};
//!
//! let frame = Message::publish("news", "hello").to_bytes().unwrap();
//! let decoded = Message::from_bytes(&frame).unwrap();
//! assert_eq!(decoded.msg_type, MessageType::Publish);
//! assert_eq!(decoded.body, b"hello");
//! ```

pub mod protocol;

pub use protocol::{DecodeError, Decoder, EncodeError, Encoder, Limits, Message, MessageRef, MessageType};
