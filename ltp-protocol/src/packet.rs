//! Packet representation and encoding.
//!
//! Frame format:
//! - START (1 byte): 0xAA synchronization byte
//! - FLAGS (1 byte): see [`Flags`]
//! - LENGTH (2 bytes): payload length, little-endian
//! - CMD (1 byte): command opcode
//! - PAYLOAD (0-1024 bytes): command-specific data
//! - CHECKSUM (1 byte): XOR of FLAGS, both LENGTH bytes, CMD and all PAYLOAD bytes

use core::ops::{BitOr, BitOrAssign};

use heapless::Vec;

use crate::codes::ErrorCode;

/// Frame synchronization byte
pub const PACKET_START: u8 = 0xAA;

/// Protocol-wide payload ceiling in bytes
pub const MAX_PAYLOAD_SIZE: usize = 1024;

/// Bytes from START through CMD
pub const HEADER_SIZE: usize = 5;

/// Bytes a frame adds around its payload (header + checksum)
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + 1;

/// Errors that can occur during packet parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Declared or supplied payload exceeds the allowed maximum
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Partial packet abandoned after the inter-byte timeout
    Timeout,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl FrameError {
    /// Error code to report to the host in a NAK
    pub const fn error_code(self) -> ErrorCode {
        match self {
            FrameError::PayloadTooLarge => ErrorCode::InvalidLength,
            FrameError::InvalidChecksum => ErrorCode::Checksum,
            FrameError::Timeout => ErrorCode::Timeout,
            FrameError::BufferTooSmall => ErrorCode::BufferOverflow,
        }
    }
}

/// Packet flag bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Flags(u8);

impl Flags {
    /// No flags set
    pub const NONE: Self = Self(0x00);
    /// Payload is compressed
    pub const COMPRESSED: Self = Self(0x10);
    /// More packets follow for the same logical message
    pub const CONTINUED: Self = Self(0x08);
    /// Frame originates from the device
    pub const RESPONSE: Self = Self(0x04);
    /// Sender requests an acknowledgement
    pub const ACK_REQUESTED: Self = Self(0x02);
    /// Frame reports an error
    pub const ERROR: Self = Self(0x01);

    /// Build from the raw wire byte; unknown bits are preserved
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw wire byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Bitwise union
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Running single-byte XOR checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum(u8);

impl Checksum {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Fold one byte into the checksum
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.0 ^= byte;
    }

    /// Fold a byte slice into the checksum
    pub fn extend(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= byte;
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Header bytes (START, FLAGS, LEN_LO, LEN_HI, CMD) for a frame
pub const fn frame_header(flags: Flags, command: u8, length: u16) -> [u8; HEADER_SIZE] {
    let [lo, hi] = length.to_le_bytes();
    [PACKET_START, flags.bits(), lo, hi, command]
}

/// Checksum of a frame: XOR over flags, both length bytes, command and payload
///
/// This is the single definition shared by the encoder and the parser.
pub fn frame_checksum(flags: Flags, command: u8, length: u16, payload: &[u8]) -> u8 {
    let mut checksum = Checksum::new();
    // Skip the start marker
    checksum.extend(&frame_header(flags, command, length)[1..]);
    checksum.extend(payload);
    checksum.value()
}

/// A parsed or constructed packet
///
/// `N` is the payload capacity of this instance. Parsers reuse a single
/// packet between receptions, so the capacity is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<const N: usize = MAX_PAYLOAD_SIZE> {
    pub(crate) flags: Flags,
    pub(crate) length: u16,
    pub(crate) command: u8,
    pub(crate) payload: Vec<u8, N>,
    pub(crate) checksum: u8,
}

impl<const N: usize> Default for Packet<N> {
    fn default() -> Self {
        Self::empty(0)
    }
}

impl<const N: usize> Packet<N> {
    /// Create a new packet with the given command, payload and flags
    ///
    /// The checksum is computed immediately.
    pub fn new(command: u8, payload: &[u8], flags: Flags) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        let length = payload.len() as u16;
        Ok(Self {
            flags,
            length,
            command,
            checksum: frame_checksum(flags, command, length, payload),
            payload: payload_vec,
        })
    }

    /// Create a packet with no payload and no flags
    pub fn empty(command: u8) -> Self {
        Self {
            flags: Flags::NONE,
            length: 0,
            command,
            payload: Vec::new(),
            checksum: frame_checksum(Flags::NONE, command, 0, &[]),
        }
    }

    /// Clear in place, keeping the payload allocation
    pub(crate) fn clear(&mut self) {
        self.flags = Flags::NONE;
        self.length = 0;
        self.command = 0;
        self.payload.clear();
        self.checksum = 0;
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Declared payload length
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Command opcode
    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Checksum byte as received (or as computed for constructed packets)
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Size of this packet on the wire
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this packet into a byte buffer, flags as-is
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        encode_frame(self.flags, self.command, &self.payload, buffer)
    }

    /// Encode as a device-originated frame (RESPONSE flag forced on)
    pub fn encode_response(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        encode_frame(self.flags | Flags::RESPONSE, self.command, &self.payload, buffer)
    }

    /// Encode this packet into a heapless Vec of capacity `M`
    pub fn encode_to_vec<const M: usize>(&self) -> Result<Vec<u8, M>, FrameError> {
        let mut vec = Vec::new();
        vec.resize_default(self.encoded_len())
            .map_err(|_| FrameError::BufferTooSmall)?;
        let len = self.encode(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }
}

/// Encode a frame into `buffer`, returning the number of bytes written
pub fn encode_frame(
    flags: Flags,
    command: u8,
    payload: &[u8],
    buffer: &mut [u8],
) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    let frame_len = FRAME_OVERHEAD + payload.len();
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    let length = payload.len() as u16;
    buffer[..HEADER_SIZE].copy_from_slice(&frame_header(flags, command, length));
    buffer[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);
    buffer[frame_len - 1] = frame_checksum(flags, command, length, payload);

    Ok(frame_len)
}
