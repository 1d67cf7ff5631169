//! Protocol constants: command opcodes, error codes, color formats, LED types
//!
//! Opcodes are grouped in ranges of sixteen:
//! - 0x00-0x0F: system
//! - 0x10-0x1F: queries (host → device)
//! - 0x20-0x2F: query responses (device → host)
//! - 0x30-0x3F: pixel data
//! - 0x40-0x4F: configuration
//! - 0x50-0x5F: events (device → host)

/// Protocol version implemented by this crate
pub const PROTOCOL_MAJOR: u8 = 2;
pub const PROTOCOL_MINOR: u8 = 0;

/// Strip id addressing every strip at once
pub const STRIP_ALL: u8 = 0xFF;

// System commands
pub const CMD_NOP: u8 = 0x00;
pub const CMD_RESET: u8 = 0x01;
pub const CMD_ACK: u8 = 0x02;
pub const CMD_NAK: u8 = 0x03;
pub const CMD_HELLO: u8 = 0x04;
pub const CMD_SHOW: u8 = 0x05;

// Query commands
pub const CMD_GET_INFO: u8 = 0x10;
pub const CMD_GET_PIXELS: u8 = 0x11;
pub const CMD_GET_CONTROL: u8 = 0x12;
pub const CMD_GET_STRIP: u8 = 0x13;
pub const CMD_GET_INPUT: u8 = 0x14;

// Query responses
pub const CMD_INFO_RESPONSE: u8 = 0x20;
pub const CMD_PIXEL_RESPONSE: u8 = 0x21;
pub const CMD_CONTROL_RESPONSE: u8 = 0x22;
pub const CMD_STRIP_RESPONSE: u8 = 0x23;
pub const CMD_CONTROLS_LIST: u8 = 0x24;
pub const CMD_INPUT_RESPONSE: u8 = 0x25;
pub const CMD_INPUTS_LIST: u8 = 0x26;

// Pixel data
pub const CMD_PIXEL_SET_ALL: u8 = 0x30;
pub const CMD_PIXEL_SET_RANGE: u8 = 0x31;
pub const CMD_PIXEL_SET_INDEXED: u8 = 0x32;
pub const CMD_PIXEL_FRAME: u8 = 0x33;
pub const CMD_PIXEL_FRAME_RLE: u8 = 0x34;
pub const CMD_PIXEL_DELTA: u8 = 0x35;

// Configuration
pub const CMD_SET_CONTROL: u8 = 0x40;
pub const CMD_SET_STRIP: u8 = 0x41;
pub const CMD_SAVE_CONFIG: u8 = 0x42;
pub const CMD_LOAD_CONFIG: u8 = 0x43;
pub const CMD_RESET_CONFIG: u8 = 0x44;
pub const CMD_SET_SEGMENT: u8 = 0x45;

// Events
pub const CMD_STATUS_UPDATE: u8 = 0x50;
pub const CMD_FRAME_ACK: u8 = 0x51;
pub const CMD_ERROR_EVENT: u8 = 0x52;
pub const CMD_INPUT_EVENT: u8 = 0x53;

/// Error codes carried in NAK payloads and error events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorCode {
    Ok = 0x00,
    Checksum = 0x01,
    InvalidCommand = 0x02,
    InvalidLength = 0x03,
    InvalidParam = 0x04,
    BufferOverflow = 0x05,
    PixelOverflow = 0x06,
    Busy = 0x07,
    NotSupported = 0x08,
    Timeout = 0x09,
    Hardware = 0x0A,
    Config = 0x0B,
}

impl ErrorCode {
    /// Parse from a wire byte
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => ErrorCode::Ok,
            0x01 => ErrorCode::Checksum,
            0x02 => ErrorCode::InvalidCommand,
            0x03 => ErrorCode::InvalidLength,
            0x04 => ErrorCode::InvalidParam,
            0x05 => ErrorCode::BufferOverflow,
            0x06 => ErrorCode::PixelOverflow,
            0x07 => ErrorCode::Busy,
            0x08 => ErrorCode::NotSupported,
            0x09 => ErrorCode::Timeout,
            0x0A => ErrorCode::Hardware,
            0x0B => ErrorCode::Config,
            _ => return None,
        })
    }

    pub const fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Pixel color format advertised to the host
///
/// The low nibble is the channel count, the high nibble selects the
/// channel order family (0 = RGB, 1 = GRB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ColorFormat {
    Rgb = 0x03,
    Rgbw = 0x04,
    #[default]
    Grb = 0x13,
    Grbw = 0x14,
}

impl ColorFormat {
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x03 => Some(ColorFormat::Rgb),
            0x04 => Some(ColorFormat::Rgbw),
            0x13 => Some(ColorFormat::Grb),
            0x14 => Some(ColorFormat::Grbw),
            _ => None,
        }
    }

    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Channels per pixel on the wire (3 or 4)
    pub const fn channels(self) -> u8 {
        if self.to_byte() & 0x0F == 0x04 {
            4
        } else {
            3
        }
    }

    pub const fn has_white(self) -> bool {
        self.channels() == 4
    }
}

/// LED chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LedType {
    Ws2812 = 0x00,
    Sk6812 = 0x01,
    Apa102 = 0x02,
    Lpd8806 = 0x03,
    DotStar = 0x04,
}

impl LedType {
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(LedType::Ws2812),
            0x01 => Some(LedType::Sk6812),
            0x02 => Some(LedType::Apa102),
            0x03 => Some(LedType::Lpd8806),
            0x04 => Some(LedType::DotStar),
            _ => None,
        }
    }

    pub const fn to_byte(self) -> u8 {
        self as u8
    }
}
