//! LTP Serial Protocol v2
//!
//! This crate defines the binary packet format spoken between a host
//! (pattern generator, media player, controller) and an LED device over a
//! serial link. The protocol is bidirectional: the host sends commands and
//! pixel data, the device answers with acknowledgements, status and query
//! responses.
//!
//! # Packet Format
//!
//! ```text
//! ┌───────┬───────┬────────┬────────┬─────┬──────────────┬──────────┐
//! │ START │ FLAGS │ LEN_LO │ LEN_HI │ CMD │ PAYLOAD      │ CHECKSUM │
//! │ 0xAA  │ 1B    │ 1B     │ 1B     │ 1B  │ 0–1024B      │ 1B       │
//! └───────┴───────┴────────┴────────┴─────┴──────────────┴──────────┘
//! ```
//!
//! The length is little-endian. The checksum is the XOR of every byte
//! between the start marker and the checksum itself.
//!
//! The receive side is a byte-at-a-time state machine ([`PacketParser`]) that
//! resynchronizes on the start marker, drops packets with a bad checksum or an
//! oversized length, and abandons partial packets after an inter-byte timeout.

#![no_std]
#![deny(unsafe_code)]

pub mod codes;
pub mod packet;
pub mod parser;

pub use codes::{ColorFormat, ErrorCode, LedType};
pub use packet::{
    encode_frame, frame_checksum, frame_header, Checksum, Flags, FrameError, Packet, FRAME_OVERHEAD,
    HEADER_SIZE, MAX_PAYLOAD_SIZE, PACKET_START,
};
pub use parser::{
    Feed, PacketParser, ParserStats, DEFAULT_MAX_PAYLOAD, INTER_BYTE_TIMEOUT_MS,
};
