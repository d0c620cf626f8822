//! Batas ukuran field saat decode
//!
//! Default tidak membatasi apa pun. Broker yang menerima input dari jaringan
//! sebaiknya set limit agar frame raksasa ditolak sebelum di-copy.

/// Batas panjang topic dan body (bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_topic_len: usize,
    pub max_body_len: usize,
}

impl Limits {
    pub const UNBOUNDED: Self = Self {
        max_topic_len: usize::MAX,
        max_body_len: usize::MAX,
    };

    pub const fn new(max_topic_len: usize, max_body_len: usize) -> Self {
        Self {
            max_topic_len,
            max_body_len,
        }
    }

    pub const fn with_max_topic_len(mut self, max_topic_len: usize) -> Self {
        self.max_topic_len = max_topic_len;
        self
    }

    pub const fn with_max_body_len(mut self, max_body_len: usize) -> Self {
        self.max_body_len = max_body_len;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}
