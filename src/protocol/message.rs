//! Pub/Sub Message Model
//!
//! Lima jenis pesan, dua bentuk frame:
//! ┌──────────────────────────┬─────────────────────────────────────────┐
//! │ KeepAlive                │ uint(0)                  -> 1 byte      │
//! ├──────────────────────────┼─────────────────────────────────────────┤
//! │ Authenticate / Subscribe │ [int8 type, bin topic, bin body]        │
//! │ Unsubscribe / Publish    │ array-of-3, posisi tetap, tanpa nama    │
//! └──────────────────────────┴─────────────────────────────────────────┘
//!
//! `MessageRef` adalah versi zero-copy: topic dan body menunjuk langsung
//! ke receive buffer.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

use super::codec::{self, encoded_len};
use super::error::{DecodeError, EncodeError};

/// Tipe pesan dalam protokol pub/sub.
///
/// Tag di wire selebar 8 bit. Tag di luar lima nilai yang dikenal tetap
/// dibawa sebagai `Unknown`, validasinya urusan connection handler.
#[derive(Debug, Clone, Copy, Default)]
pub enum MessageType {
    /// Connection keep-alive, cukup 1 byte di wire
    #[default]
    KeepAlive,
    /// Autentikasi client, credential dibawa di field topic
    Authenticate,
    /// Subscribe ke topic
    Subscribe,
    /// Unsubscribe dari topic
    Unsubscribe,
    /// Publish body ke topic
    Publish,
    /// Tag mentah yang tidak dikenal.
    ///
    /// Bangun lewat [`MessageType::from_tag`]: `Unknown(4)` sama dengan
    /// `Publish` menurut `==`, tapi tidak cocok dengan pattern
    /// `MessageType::Publish`.
    Unknown(i8),
}

impl MessageType {
    pub const KEEP_ALIVE_TAG: i8 = 0;
    pub const AUTHENTICATE_TAG: i8 = 1;
    pub const SUBSCRIBE_TAG: i8 = 2;
    pub const UNSUBSCRIBE_TAG: i8 = 3;
    pub const PUBLISH_TAG: i8 = 4;

    #[inline(always)]
    pub const fn from_tag(tag: i8) -> Self {
        match tag {
            Self::KEEP_ALIVE_TAG => Self::KeepAlive,
            Self::AUTHENTICATE_TAG => Self::Authenticate,
            Self::SUBSCRIBE_TAG => Self::Subscribe,
            Self::UNSUBSCRIBE_TAG => Self::Unsubscribe,
            Self::PUBLISH_TAG => Self::Publish,
            other => Self::Unknown(other),
        }
    }

    #[inline(always)]
    pub const fn tag(self) -> i8 {
        match self {
            Self::KeepAlive => Self::KEEP_ALIVE_TAG,
            Self::Authenticate => Self::AUTHENTICATE_TAG,
            Self::Subscribe => Self::SUBSCRIBE_TAG,
            Self::Unsubscribe => Self::UNSUBSCRIBE_TAG,
            Self::Publish => Self::PUBLISH_TAG,
            Self::Unknown(tag) => tag,
        }
    }

    /// True untuk salah satu dari lima tag yang didefinisikan protokol
    #[inline(always)]
    pub const fn is_known(self) -> bool {
        matches!(self.tag(), 0..=4)
    }

    /// `Unknown(0)` juga dihitung sebagai keep-alive
    #[inline(always)]
    pub const fn is_keep_alive(self) -> bool {
        self.tag() == Self::KEEP_ALIVE_TAG
    }

    pub const fn name(self) -> &'static str {
        match Self::from_tag(self.tag()) {
            Self::KeepAlive => "KeepAlive",
            Self::Authenticate => "Authenticate",
            Self::Subscribe => "Subscribe",
            Self::Unsubscribe => "Unsubscribe",
            Self::Publish => "Publish",
            Self::Unknown(_) => "Unknown",
        }
    }
}

// Equality follows the wire tag, so `Unknown(4) == Publish`.
impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
    }
}

impl From<i8> for MessageType {
    fn from(tag: i8) -> Self {
        Self::from_tag(tag)
    }
}

impl From<MessageType> for i8 {
    fn from(msg_type: MessageType) -> Self {
        msg_type.tag()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message type `{0}` (expected a name like `publish` or a tag in -128..=127)")]
pub struct ParseMessageTypeError(String);

impl FromStr for MessageType {
    type Err = ParseMessageTypeError;

    /// Menerima nama (case-insensitive, `keep-alive`/`keepalive`) atau tag numerik
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(tag) = trimmed.parse::<i8>() {
            return Ok(Self::from_tag(tag));
        }

        let normalized = trimmed.to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "keepalive" => Ok(Self::KeepAlive),
            "authenticate" | "auth" => Ok(Self::Authenticate),
            "subscribe" | "sub" => Ok(Self::Subscribe),
            "unsubscribe" | "unsub" => Ok(Self::Unsubscribe),
            "publish" | "pub" => Ok(Self::Publish),
            _ => Err(ParseMessageTypeError(s.to_string())),
        }
    }
}

/// Pesan lengkap (owned)
///
/// Dibuat producer tepat sebelum encode, atau hasil decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub msg_type: MessageType,
    pub topic: Vec<u8>,
    pub body: Vec<u8>,
}

impl Message {
    pub fn new(msg_type: MessageType, topic: impl Into<Vec<u8>>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            msg_type,
            topic: topic.into(),
            body: body.into(),
        }
    }

    pub fn keep_alive() -> Self {
        Self::default()
    }

    /// Credential dibawa di field topic, body kosong
    pub fn authenticate(credentials: impl Into<Vec<u8>>) -> Self {
        Self::new(MessageType::Authenticate, credentials, Vec::new())
    }

    pub fn subscribe(topic: impl Into<Vec<u8>>) -> Self {
        Self::new(MessageType::Subscribe, topic, Vec::new())
    }

    pub fn unsubscribe(topic: impl Into<Vec<u8>>) -> Self {
        Self::new(MessageType::Unsubscribe, topic, Vec::new())
    }

    pub fn publish(topic: impl Into<Vec<u8>>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(MessageType::Publish, topic, body)
    }

    #[inline(always)]
    #[allow(clippy::should_implement_trait)]
    pub fn as_ref(&self) -> MessageRef<'_> {
        MessageRef {
            msg_type: self.msg_type,
            topic: &self.topic,
            body: &self.body,
        }
    }

    /// Ukuran frame hasil encode, tanpa menulis apa pun
    #[inline]
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.as_ref())
    }

    /// Encode ke `Vec` baru dengan kapasitas yang pas
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let msg = self.as_ref();
        let mut buf = Vec::with_capacity(encoded_len(msg));
        codec::encode(&mut buf, msg)?;
        Ok(buf)
    }

    /// Decode tepat satu frame, sisa byte setelah frame dianggap error
    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        codec::decode(buf).map(|msg| msg.to_owned())
    }
}

/// Pesan zero-copy, topic dan body meminjam dari buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef<'a> {
    pub msg_type: MessageType,
    pub topic: &'a [u8],
    pub body: &'a [u8],
}

impl<'a> MessageRef<'a> {
    #[inline(always)]
    pub const fn new(msg_type: MessageType, topic: &'a [u8], body: &'a [u8]) -> Self {
        Self {
            msg_type,
            topic,
            body,
        }
    }

    #[inline(always)]
    pub const fn keep_alive() -> Self {
        Self::new(MessageType::KeepAlive, &[], &[])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn to_owned(&self) -> Message {
        Message {
            msg_type: self.msg_type,
            topic: self.topic.to_vec(),
            body: self.body.to_vec(),
        }
    }
}

impl<'a> From<&'a Message> for MessageRef<'a> {
    fn from(msg: &'a Message) -> Self {
        msg.as_ref()
    }
}

impl From<MessageRef<'_>> for Message {
    fn from(msg: MessageRef<'_>) -> Self {
        msg.to_owned()
    }
}
