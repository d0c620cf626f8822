//! Wire Compatibility Test
//!
//! Memastikan byte layout di wire tetap stabil untuk client lain yang
//! bicara MessagePack, plus property round-trip untuk semua tipe.
//!
//! Usage:
//!   cargo test --test wire_compat_test

use proptest::prelude::*;
use pubsub_wire::protocol::{
    decode, encode, DecodeError, Decoder, Encoder, Message, MessageRef, MessageType,
    KEEP_ALIVE_FRAME,
};

fn payload_type_strategy() -> impl Strategy<Value = MessageType> {
    prop_oneof![
        Just(MessageType::Authenticate),
        Just(MessageType::Subscribe),
        Just(MessageType::Unsubscribe),
        Just(MessageType::Publish),
    ]
}

fn bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    // Melewati batas bin8 -> bin16
    prop::collection::vec(any::<u8>(), 0..600)
}

prop_compose! {
    fn message_strategy()(
        msg_type in payload_type_strategy(),
        topic in bytes_strategy(),
        body in bytes_strategy()
    ) -> Message {
        Message::new(msg_type, topic, body)
    }
}

proptest! {
    #[test]
    fn prop_message_roundtrip(msg in message_strategy()) {
        let encoded = msg.to_bytes().expect("encode");
        prop_assert_eq!(encoded.len(), msg.encoded_len());

        let decoded = Message::from_bytes(&encoded).expect("decode");
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn prop_keep_alive_ignores_payload(topic in bytes_strategy(), body in bytes_strategy()) {
        let msg = Message::new(MessageType::KeepAlive, topic, body);
        let encoded = msg.to_bytes().expect("encode");
        prop_assert_eq!(&encoded[..], &KEEP_ALIVE_FRAME[..]);
        prop_assert_eq!(Message::from_bytes(&encoded).expect("decode"), Message::keep_alive());
    }

    #[test]
    fn prop_truncated_frame_never_panics(msg in message_strategy(), cut in any::<prop::sample::Index>()) {
        let encoded = msg.to_bytes().expect("encode");
        let cut = cut.index(encoded.len());
        let err = decode(&encoded[..cut]).expect_err("prefix must not decode");
        prop_assert!(err.is_truncated());
    }
}

#[test]
fn publish_news_hello_layout() {
    let frame = Message::publish("news", "hello").to_bytes().unwrap();
    assert_eq!(hex::encode(&frame), "9304c4046e657773c40568656c6c6f");

    let decoded = decode(&frame).unwrap();
    assert_eq!(decoded.msg_type.tag(), 4);
    assert_eq!(decoded.topic, b"news");
    assert_eq!(decoded.body, b"hello");
}

#[test]
fn keep_alive_is_bare_zero() {
    let frame = Message::keep_alive().to_bytes().unwrap();
    assert_eq!(frame, vec![0x00]);
}

#[test]
fn keep_alive_smaller_than_smallest_publish() {
    let keep_alive = Message::keep_alive().to_bytes().unwrap();
    let empty_publish = Message::publish("", "").to_bytes().unwrap();

    assert!(keep_alive.len() < empty_publish.len());
    assert_eq!(empty_publish, [0x93, 0x04, 0xc4, 0x00, 0xc4, 0x00]);
}

#[test]
fn empty_topic_and_body_roundtrip() {
    for msg_type in [
        MessageType::Authenticate,
        MessageType::Subscribe,
        MessageType::Unsubscribe,
        MessageType::Publish,
    ] {
        for (topic, body) in [("", ""), ("t", ""), ("", "b")] {
            let msg = Message::new(msg_type, topic, body);
            let decoded = Message::from_bytes(&msg.to_bytes().unwrap()).unwrap();
            assert_eq!(decoded, msg, "{msg_type} topic={topic:?} body={body:?}");
        }
    }
}

#[test]
fn missing_body_is_truncation() {
    let frame = Message::publish("news", "hello").to_bytes().unwrap();
    // Buang seluruh body (marker + data)
    let without_body = &frame[..frame.len() - 7];

    match decode(without_body) {
        Err(DecodeError::Truncated { expected }) => assert_eq!(expected, "body"),
        other => panic!("expected truncation, got {other:?}"),
    }
}

#[test]
fn unknown_tag_passes_through() {
    let msg = Message::new(MessageType::Unknown(17), "t", "b");
    let frame = msg.to_bytes().unwrap();
    assert_eq!(frame[1], 17);

    let decoded = Message::from_bytes(&frame).unwrap();
    assert!(matches!(decoded.msg_type, MessageType::Unknown(17)));
    assert!(!decoded.msg_type.is_known());
}

#[test]
fn bin16_topic_layout() {
    let topic = vec![b'x'; 300];
    let frame = Message::subscribe(topic.clone()).to_bytes().unwrap();

    // fixarray, tag, bin16 marker, len big-endian
    assert_eq!(&frame[..5], &[0x93, 0x02, 0xc5, 0x01, 0x2c]);
    assert_eq!(Message::from_bytes(&frame).unwrap().topic, topic);
}

#[test]
fn stream_of_mixed_frames() {
    let mut encoder = Encoder::default();
    encoder.encode(&Message::authenticate("token")).unwrap();
    encoder.encode(&Message::subscribe("news")).unwrap();
    encoder.encode(&Message::keep_alive()).unwrap();
    encoder.encode(&Message::publish("news", "hello")).unwrap();
    encoder.encode(&Message::unsubscribe("news")).unwrap();

    let types: Vec<MessageType> = Decoder::new(encoder.as_bytes())
        .map(|frame| frame.unwrap().msg_type)
        .collect();

    assert_eq!(
        types,
        [
            MessageType::Authenticate,
            MessageType::Subscribe,
            MessageType::KeepAlive,
            MessageType::Publish,
            MessageType::Unsubscribe,
        ]
    );
}

#[test]
fn receive_buffer_compaction() {
    // Simulasi transport: frame datang terpotong di dua read
    let mut encoder = Encoder::default();
    encoder.encode(&Message::publish("a", "first")).unwrap();
    encoder.encode(&Message::publish("a", "second")).unwrap();
    let wire = encoder.as_bytes().to_vec();

    let split = wire.len() - 3;
    let mut recv_buffer = wire[..split].to_vec();
    let mut bodies = Vec::new();

    let mut decoder = Decoder::new(&recv_buffer);
    for frame in decoder.by_ref() {
        match frame {
            Ok(msg) => bodies.push(msg.body.to_vec()),
            Err(err) => {
                assert!(err.is_truncated());
                break;
            }
        }
    }
    let consumed = decoder.consumed();
    recv_buffer.drain(..consumed);

    // Read kedua melengkapi frame
    recv_buffer.extend_from_slice(&wire[split..]);
    for frame in Decoder::new(&recv_buffer) {
        bodies.push(frame.unwrap().body.to_vec());
    }

    assert_eq!(bodies, [b"first".to_vec(), b"second".to_vec()]);
}

#[test]
fn encode_into_writer_counts_bytes() {
    let mut sink: Vec<u8> = Vec::new();
    let msg = MessageRef::new(MessageType::Publish, b"news", b"hello");
    let written = encode(&mut sink, msg).unwrap();
    assert_eq!(written, 15);
    assert_eq!(sink.len(), 15);
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn public_types_are_send_sync() {
    assert_send_sync::<Message>();
    assert_send_sync::<MessageRef<'static>>();
    assert_send_sync::<MessageType>();
    assert_send_sync::<Encoder>();
    assert_send_sync::<Decoder<'static>>();
    assert_send_sync::<DecodeError>();
}
