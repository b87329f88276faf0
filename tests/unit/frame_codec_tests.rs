//! Unit tests for the `$`-delimited frame codec.

use bytes::BytesMut;
use teleshell::wire::{Frame, FrameCodec};
use teleshell::AppError;
use tokio_util::codec::{Decoder, Encoder};

fn encode(codec: &mut FrameCodec, frame: Frame) -> BytesMut {
    let mut buf = BytesMut::new();
    codec.encode(frame, &mut buf).unwrap();
    buf
}

#[test]
fn tagged_encoding_renders_count_length_payload() {
    let buf = encode(&mut FrameCodec::tagged(), Frame::new(2, "ab"));
    assert_eq!(&buf[..], b"2$2$ab");
}

#[test]
fn plain_encoding_renders_length_payload() {
    let buf = encode(&mut FrameCodec::plain(), Frame::new(0, "abc"));
    assert_eq!(&buf[..], b"3$abc");
}

#[test]
fn round_trip_preserves_payload_with_delimiters_and_digits() {
    let payload = "12$34$rest of the payload";
    let mut codec = FrameCodec::tagged();
    let mut buf = encode(&mut codec, Frame::new(3, payload));

    let decoded = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded.expect, 3);
    assert_eq!(decoded.text().unwrap(), payload);
    assert!(buf.is_empty());
}

#[test]
fn zero_length_payload_decodes_to_empty() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"0$0$"[..]);

    let decoded = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded.expect, 0);
    assert!(decoded.payload.is_empty());
    assert!(buf.is_empty());
}

#[test]
fn decode_buffers_until_header_is_complete() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"2$1"[..]);

    assert!(codec.decode(&mut buf).unwrap().is_none());

    buf.extend_from_slice(b"$");
    assert!(codec.decode(&mut buf).unwrap().is_none());

    buf.extend_from_slice(b"x");
    let decoded = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded.payload, b"x");
}

#[test]
fn decode_buffers_until_payload_is_complete() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"0$5$ab"[..]);

    assert!(codec.decode(&mut buf).unwrap().is_none());

    buf.extend_from_slice(b"cde");
    let decoded = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded.payload, b"abcde");
}

#[test]
fn back_to_back_frames_decode_in_order() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::new();
    codec.encode(Frame::new(0, "first"), &mut buf).unwrap();
    codec.encode(Frame::new(1, "second"), &mut buf).unwrap();

    let first = codec.decode(&mut buf).unwrap().unwrap();
    let second = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(first.payload, b"first");
    assert_eq!(second.expect, 1);
    assert_eq!(second.payload, b"second");
    assert!(codec.decode(&mut buf).unwrap().is_none());
}

#[test]
fn non_numeric_count_field_is_a_framing_error() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"a$3$abc"[..]);

    let err = codec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, AppError::Framing(_)), "got {err:?}");
}

#[test]
fn non_numeric_length_field_is_a_framing_error() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"0$x$abc"[..]);

    let err = codec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, AppError::Framing(_)), "got {err:?}");
}

#[test]
fn empty_header_field_is_a_framing_error() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"$3$abc"[..]);

    let err = codec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, AppError::Framing(_)), "got {err:?}");
}

#[test]
fn declared_length_above_limit_is_a_framing_error() {
    let mut codec = FrameCodec::tagged().with_max_frame_bytes(8);
    let mut buf = BytesMut::from(&b"0$9$"[..]);

    let err = codec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, AppError::Framing(_)), "got {err:?}");
}

#[test]
fn overlong_digit_run_is_rejected_before_the_delimiter() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"99999999999"[..]);

    let err = codec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, AppError::Framing(_)), "got {err:?}");
}

#[test]
fn eof_mid_frame_is_a_peer_disconnect() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"2$5$ab"[..]);

    let err = codec.decode_eof(&mut buf).unwrap_err();
    assert!(
        matches!(err, AppError::PeerDisconnected),
        "eof mid-frame must not be a framing error: {err:?}"
    );
}

#[test]
fn eof_mid_header_is_a_peer_disconnect() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::from(&b"2$1"[..]);

    let err = codec.decode_eof(&mut buf).unwrap_err();
    assert!(matches!(err, AppError::PeerDisconnected), "got {err:?}");
}

#[test]
fn eof_at_frame_boundary_is_a_clean_end_of_stream() {
    let mut codec = FrameCodec::tagged();
    let mut buf = BytesMut::new();

    assert!(codec.decode_eof(&mut buf).unwrap().is_none());
}

#[test]
fn plain_layout_reports_zero_expect() {
    let mut codec = FrameCodec::plain();
    let mut buf = BytesMut::from(&b"5$hello"[..]);

    let decoded = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded.expect, 0);
    assert_eq!(decoded.payload, b"hello");
}

#[test]
fn encode_rejects_payload_above_limit() {
    let mut codec = FrameCodec::tagged().with_max_frame_bytes(4);

    let mut buf = BytesMut::new();
    let err = codec.encode(Frame::new(0, "too long"), &mut buf).unwrap_err();
    assert!(matches!(err, AppError::Framing(_)), "got {err:?}");
}

#[test]
fn frame_text_rejects_invalid_utf8() {
    let frame = Frame::new(0, vec![0xff, 0xfe]);
    let err = frame.text().unwrap_err();
    assert!(matches!(err, AppError::Framing(_)), "got {err:?}");
}
