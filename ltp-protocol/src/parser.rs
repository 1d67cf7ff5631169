//! Byte-stream packet parser
//!
//! [`PacketParser`] consumes bytes one at a time as they arrive from the
//! serial link. It never blocks and never allocates: the in-progress packet
//! is a single reused buffer owned by the parser.
//!
//! ```text
//!  WaitStart ──0xAA──▶ ReadFlags ──▶ ReadLengthLow ──▶ ReadLengthHigh
//!      ▲                                                   │ len > max: drop
//!      │                                                   ▼
//!  ReadChecksum ◀── ReadPayload ◀──(len > 0)── ReadCommand
//!      ▲                                           │ len == 0
//!      └───────────────────────────────────────────┘
//! ```
//!
//! Any gap longer than the inter-byte timeout while a packet is in flight
//! discards it before the next byte is processed.

use crate::packet::{Checksum, Flags, FrameError, Packet, MAX_PAYLOAD_SIZE, PACKET_START};

/// Maximum gap between bytes of one packet before it is abandoned
pub const INTER_BYTE_TIMEOUT_MS: u32 = 10;

/// Payload ceiling used when a link does not choose one
pub const DEFAULT_MAX_PAYLOAD: u16 = 512;

/// Result of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Feed {
    /// Packet incomplete (or no packet in flight)
    NeedMore,
    /// A packet with a valid checksum is available via [`PacketParser::packet`]
    PacketReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ParseState {
    /// Discarding bytes until START
    WaitStart,
    ReadFlags,
    ReadLengthLow,
    ReadLengthHigh,
    ReadCommand,
    /// Reading payload bytes
    ReadPayload,
    ReadChecksum,
}

/// Link health counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserStats {
    /// Packets delivered with a valid checksum
    pub packets: u32,
    /// Packets dropped for a checksum mismatch
    pub checksum_errors: u32,
    /// Packets dropped for a declared length above the ceiling
    pub oversize_errors: u32,
    /// Partial packets abandoned after the inter-byte timeout
    pub timeouts: u32,
}

/// State machine for parsing incoming packets
///
/// `N` is the payload buffer capacity. The effective ceiling is the smaller
/// of `N`, [`MAX_PAYLOAD_SIZE`] and the `max_payload` chosen at construction;
/// declared lengths above it are rejected before any payload byte is stored.
#[derive(Debug, Clone)]
pub struct PacketParser<const N: usize = MAX_PAYLOAD_SIZE> {
    state: ParseState,
    packet: Packet<N>,
    checksum: Checksum,
    max_payload: u16,
    timeout_ms: u32,
    last_byte_ms: u32,
    ready: bool,
    stats: ParserStats,
}

impl<const N: usize> Default for PacketParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PacketParser<N> {
    /// Create a parser using the full buffer capacity as the ceiling
    pub fn new() -> Self {
        Self::with_limits(u16::MAX, INTER_BYTE_TIMEOUT_MS)
    }

    /// Create a parser with a negotiated payload ceiling
    pub fn with_max_payload(max_payload: u16) -> Self {
        Self::with_limits(max_payload, INTER_BYTE_TIMEOUT_MS)
    }

    /// Create a parser with explicit payload ceiling and inter-byte timeout
    pub fn with_limits(max_payload: u16, timeout_ms: u32) -> Self {
        let capacity = N.min(MAX_PAYLOAD_SIZE).min(u16::MAX as usize) as u16;
        Self {
            state: ParseState::WaitStart,
            packet: Packet::default(),
            checksum: Checksum::new(),
            max_payload: max_payload.min(capacity),
            timeout_ms,
            last_byte_ms: 0,
            ready: false,
            stats: ParserStats::default(),
        }
    }

    /// Effective payload ceiling
    pub fn max_payload(&self) -> u16 {
        self.max_payload
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// True while a packet is partially received
    pub fn in_progress(&self) -> bool {
        self.state != ParseState::WaitStart
    }

    /// The most recent valid packet
    ///
    /// Available from the `PacketReady` result until the next start marker
    /// is consumed or the parser is reset.
    pub fn packet(&self) -> Option<&Packet<N>> {
        if self.ready {
            Some(&self.packet)
        } else {
            None
        }
    }

    /// Discard any in-flight packet and wait for the next start marker
    pub fn reset(&mut self) {
        self.state = ParseState::WaitStart;
        self.packet.clear();
        self.checksum = Checksum::new();
        self.ready = false;
    }

    /// Abandon a partial packet if the sender has stalled
    ///
    /// Returns true if a packet in flight was discarded.
    pub fn check_timeout(&mut self, now_ms: u32) -> bool {
        if self.state != ParseState::WaitStart
            && now_ms.wrapping_sub(self.last_byte_ms) > self.timeout_ms
        {
            self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
            self.reset();
            return true;
        }
        false
    }

    /// Feed a single byte received at `now_ms`
    ///
    /// Returns `Ok(Feed::PacketReady)` exactly once per valid packet.
    /// A dropped packet is reported as `Err` for diagnostics; the parser has
    /// already resynchronized and the next byte may start a new packet.
    pub fn feed(&mut self, byte: u8, now_ms: u32) -> Result<Feed, FrameError> {
        self.check_timeout(now_ms);
        self.last_byte_ms = now_ms;

        match self.state {
            ParseState::WaitStart => {
                if byte == PACKET_START {
                    self.packet.clear();
                    self.checksum = Checksum::new();
                    self.ready = false;
                    self.state = ParseState::ReadFlags;
                }
                // Silently ignore non-START bytes while waiting
            }
            ParseState::ReadFlags => {
                self.packet.flags = Flags::from_bits(byte);
                self.checksum.push(byte);
                self.state = ParseState::ReadLengthLow;
            }
            ParseState::ReadLengthLow => {
                self.packet.length = u16::from(byte);
                self.checksum.push(byte);
                self.state = ParseState::ReadLengthHigh;
            }
            ParseState::ReadLengthHigh => {
                self.packet.length |= u16::from(byte) << 8;
                self.checksum.push(byte);
                if self.packet.length > self.max_payload {
                    self.stats.oversize_errors = self.stats.oversize_errors.wrapping_add(1);
                    self.reset();
                    return Err(FrameError::PayloadTooLarge);
                }
                self.state = ParseState::ReadCommand;
            }
            ParseState::ReadCommand => {
                self.packet.command = byte;
                self.checksum.push(byte);
                self.packet.payload.clear();
                self.state = if self.packet.length == 0 {
                    ParseState::ReadChecksum
                } else {
                    ParseState::ReadPayload
                };
            }
            ParseState::ReadPayload => {
                // Cannot fail: length was checked against max_payload <= N
                if self.packet.payload.push(byte).is_err() {
                    self.reset();
                    return Err(FrameError::PayloadTooLarge);
                }
                self.checksum.push(byte);
                if self.packet.payload.len() >= usize::from(self.packet.length) {
                    self.state = ParseState::ReadChecksum;
                }
            }
            ParseState::ReadChecksum => {
                self.packet.checksum = byte;
                self.state = ParseState::WaitStart;

                if byte != self.checksum.value() {
                    self.stats.checksum_errors = self.stats.checksum_errors.wrapping_add(1);
                    return Err(FrameError::InvalidChecksum);
                }

                self.ready = true;
                self.stats.packets = self.stats.packets.wrapping_add(1);
                return Ok(Feed::PacketReady);
            }
        }

        Ok(Feed::NeedMore)
    }

    /// Feed bytes until a packet completes
    ///
    /// Returns the number of bytes consumed and whether a packet is ready.
    /// Bytes after a completed packet are left for the next call. Dropped
    /// packets are only visible through [`stats`](Self::stats).
    pub fn feed_bytes(&mut self, bytes: &[u8], now_ms: u32) -> (usize, Feed) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Ok(Feed::PacketReady) = self.feed(byte, now_ms) {
                return (i + 1, Feed::PacketReady);
            }
        }
        (bytes.len(), Feed::NeedMore)
    }
}
