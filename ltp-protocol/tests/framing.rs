//! Property-based tests for packet framing.
//! Every frame the encoder produces must parse back exactly once, and no
//! corruption may leak a packet or wedge the parser.

use ltp_protocol::{
    encode_frame, Feed, Flags, FrameError, PacketParser, FRAME_OVERHEAD, PACKET_START,
};
use proptest::prelude::*;

const CAP: usize = 64;

fn encode(command: u8, payload: &[u8], flags: u8) -> Vec<u8> {
    let mut buf = vec![0u8; FRAME_OVERHEAD + payload.len()];
    let len = encode_frame(Flags::from_bits(flags), command, payload, &mut buf).unwrap();
    buf.truncate(len);
    buf
}

/// Feed every byte, collecting (command, flags, payload) for each ready packet
fn parse_all(parser: &mut PacketParser<CAP>, bytes: &[u8]) -> Vec<(u8, u8, Vec<u8>)> {
    let mut out = Vec::new();
    for &b in bytes {
        if let Ok(Feed::PacketReady) = parser.feed(b, 0) {
            let p = parser.packet().unwrap();
            out.push((p.command(), p.flags().bits(), p.payload().to_vec()));
        }
    }
    out
}

proptest! {
    /// Encoded frames parse back to identical fields, exactly once.
    #[test]
    fn roundtrip_yields_one_identical_packet(
        command in any::<u8>(),
        flags in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..=CAP),
    ) {
        let bytes = encode(command, &payload, flags);
        let mut parser = PacketParser::<CAP>::new();
        let packets = parse_all(&mut parser, &bytes);

        prop_assert_eq!(packets.len(), 1);
        prop_assert_eq!(&packets[0], &(command, flags, payload));
    }

    /// Noise without a start marker before a frame is skipped.
    #[test]
    fn leading_noise_is_skipped(
        noise in proptest::collection::vec(any::<u8>().prop_filter("no start", |b| *b != PACKET_START), 0..32),
        command in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut bytes = noise;
        bytes.extend(encode(command, &payload, 0));

        let mut parser = PacketParser::<CAP>::new();
        let packets = parse_all(&mut parser, &bytes);
        prop_assert_eq!(packets.len(), 1);
        prop_assert_eq!(packets[0].0, command);
    }

    /// A corrupted checksum never surfaces a packet, and the next frame parses.
    #[test]
    fn corrupted_checksum_then_clean_frame(
        command in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..16),
        corruption in 1u8..=255,
        next_command in any::<u8>(),
    ) {
        let mut bytes = encode(command, &payload, 0);
        let last = bytes.len() - 1;
        bytes[last] ^= corruption;

        let mut parser = PacketParser::<CAP>::new();
        let mut dropped = false;
        for &b in &bytes {
            match parser.feed(b, 0) {
                Ok(Feed::PacketReady) => prop_assert!(false, "corrupted packet delivered"),
                Err(FrameError::InvalidChecksum) => dropped = true,
                _ => {}
            }
        }
        prop_assert!(dropped);
        prop_assert!(!parser.in_progress());
        prop_assert!(parser.packet().is_none());

        let packets = parse_all(&mut parser, &encode(next_command, &[1, 2, 3], 0));
        prop_assert_eq!(packets.len(), 1);
        prop_assert_eq!(packets[0].0, next_command);
    }

    /// Declared lengths above the ceiling are rejected before any payload is stored.
    #[test]
    fn oversized_length_never_overflows(
        declared in (CAP as u16 + 1)..=u16::MAX,
        tail in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let [lo, hi] = declared.to_le_bytes();
        let mut parser = PacketParser::<CAP>::new();

        for b in [PACKET_START, 0, lo] {
            prop_assert_eq!(parser.feed(b, 0), Ok(Feed::NeedMore));
        }
        prop_assert_eq!(parser.feed(hi, 0), Err(FrameError::PayloadTooLarge));
        prop_assert!(!parser.in_progress());

        // Whatever follows, the parser stays sound and can still frame packets
        for &b in &tail {
            let _ = parser.feed(b, 0);
        }
        parser.reset();
        let packets = parse_all(&mut parser, &encode(0x05, &[], 0));
        prop_assert_eq!(packets.len(), 1);
    }

    /// Back-to-back frames are each delivered once, in order.
    #[test]
    fn back_to_back_frames(
        commands in proptest::collection::vec(any::<u8>(), 1..8),
    ) {
        let mut bytes = Vec::new();
        for (i, &c) in commands.iter().enumerate() {
            bytes.extend(encode(c, &[i as u8; 3], 0));
        }

        let mut parser = PacketParser::<CAP>::new();
        let packets = parse_all(&mut parser, &bytes);
        let parsed: Vec<u8> = packets.iter().map(|p| p.0).collect();
        prop_assert_eq!(parsed, commands);
    }
}
