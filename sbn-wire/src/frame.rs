//! The SBN wire frame.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           MsgSize (u16)      |    MsgType    |   reserved    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          CpuID (u32)                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           Payload ...                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! `MsgSize`, `MsgType`'s reserved byte, and `CpuID` are always network byte
//! order (big-endian). The `Payload` byte order for `APP` frames is an
//! integrator responsibility: SBN forwards it opaquely and never inspects
//! it.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use sbn_core::identity::CpuId;

use crate::error::{Result, WireError};

/// Fixed header length: `MsgSize(2) + MsgType(1) + reserved(1) + CpuID(4)`.
pub const SBN_HEADER_LEN: usize = 8;

/// Maximum length of an `Ident` string carried in an `ANNOUNCE` payload.
pub const SBN_IDENT_LEN: usize = sbn_core::identity::IDENT_MAX_LEN;

/// Maximum total frame size, header included. Large enough for the
/// biggest SB message this bridge is configured to forward.
pub const SBN_MAX_PAYLOAD: usize = 35_000;

/// The `MsgType` byte. `NoMsg` (0) never appears on the wire; it is the
/// sentinel a transport's `recv` returns when no frame is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    NoMsg = 0,
    Subscribe = 1,
    Unsubscribe = 2,
    App = 3,
    Heartbeat = 4,
    Announce = 5,
}

impl MsgType {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Self::NoMsg),
            1 => Ok(Self::Subscribe),
            2 => Ok(Self::Unsubscribe),
            3 => Ok(Self::App),
            4 => Ok(Self::Heartbeat),
            5 => Ok(Self::Announce),
            other => Err(WireError::UnknownMsgType(other)),
        }
    }
}

/// A decoded SBN frame: header fields plus an owned, zero-copy payload.
#[derive(Debug, Clone)]
pub struct Frame {
    pub msg_type: MsgType,
    pub cpu_id: CpuId,
    pub payload: Bytes,
}

impl Frame {
    #[must_use]
    pub fn new(msg_type: MsgType, cpu_id: CpuId, payload: Bytes) -> Self {
        Self {
            msg_type,
            cpu_id,
            payload,
        }
    }

    /// Encode this frame into a fresh buffer, network byte order header
    /// first, payload bytes verbatim.
    pub fn encode(&self) -> Result<Bytes> {
        let total = SBN_HEADER_LEN + self.payload.len();
        if total > SBN_MAX_PAYLOAD {
            return Err(WireError::FrameTooLarge(total));
        }
        let mut buf = BytesMut::with_capacity(total);
        buf.put_u16(total as u16);
        buf.put_u8(self.msg_type.as_u8());
        buf.put_u8(0); // reserved
        buf.put_u32(self.cpu_id.get());
        buf.extend_from_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Decode one frame from `buf`, consuming exactly `MsgSize` bytes on
    /// success. Returns [`WireError::Truncated`] if `buf` doesn't yet hold
    /// a complete frame; the caller should leave `buf` untouched and wait
    /// for more bytes (stream transports) or discard the datagram
    /// (datagram transports, where a short read can never be completed).
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < SBN_HEADER_LEN {
            return Err(WireError::Truncated {
                expected: SBN_HEADER_LEN,
                got: buf.len(),
            });
        }
        let mut cursor = buf;
        let total_len = cursor.get_u16() as usize;
        if buf.len() < total_len {
            return Err(WireError::Truncated {
                expected: total_len,
                got: buf.len(),
            });
        }
        let msg_type = MsgType::from_u8(cursor.get_u8())?;
        let _reserved = cursor.get_u8();
        let cpu_id = CpuId::new(cursor.get_u32());
        let payload = Bytes::copy_from_slice(&buf[SBN_HEADER_LEN..total_len]);
        Ok(Self::new(msg_type, cpu_id, payload))
    }

    /// Total encoded length of this frame, header included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        SBN_HEADER_LEN + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_app_frame() {
        let frame = Frame::new(MsgType::App, CpuId::new(3), Bytes::from_static(b"hello"));
        let encoded = frame.encode().unwrap();
        let decoded = Frame::decode(&encoded).unwrap();
        assert_eq!(decoded.msg_type, MsgType::App);
        assert_eq!(decoded.cpu_id, CpuId::new(3));
        assert_eq!(&decoded.payload[..], b"hello");
    }

    #[test]
    fn round_trips_an_empty_heartbeat() {
        let frame = Frame::new(MsgType::Heartbeat, CpuId::new(1), Bytes::new());
        let encoded = frame.encode().unwrap();
        assert_eq!(encoded.len(), SBN_HEADER_LEN);
        let decoded = Frame::decode(&encoded).unwrap();
        assert_eq!(decoded.msg_type, MsgType::Heartbeat);
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn decode_rejects_short_header() {
        let err = Frame::decode(&[0, 1, 2]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let frame = Frame::new(MsgType::App, CpuId::new(1), Bytes::from_static(b"0123456789"));
        let encoded = frame.encode().unwrap();
        let err = Frame::decode(&encoded[..encoded.len() - 3]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn decode_rejects_unknown_msg_type() {
        let mut bad = vec![0u8, SBN_HEADER_LEN as u8, 99, 0, 0, 0, 0, 1];
        bad[0] = 0;
        bad[1] = SBN_HEADER_LEN as u8;
        let err = Frame::decode(&bad).unwrap_err();
        assert!(matches!(err, WireError::UnknownMsgType(99)));
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let frame = Frame::new(
            MsgType::App,
            CpuId::new(1),
            Bytes::from(vec![0u8; SBN_MAX_PAYLOAD]),
        );
        assert!(matches!(frame.encode(), Err(WireError::FrameTooLarge(_))));
    }

    #[test]
    fn msg_type_round_trips_through_u8() {
        for t in [
            MsgType::NoMsg,
            MsgType::Subscribe,
            MsgType::Unsubscribe,
            MsgType::App,
            MsgType::Heartbeat,
            MsgType::Announce,
        ] {
            assert_eq!(MsgType::from_u8(t.as_u8()).unwrap(), t);
        }
    }
}
