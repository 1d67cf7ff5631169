//! Serial link endpoint
//!
//! [`SerialLink`] owns the UART, a millisecond clock and the packet parser.
//! It is polled from the main loop: [`process_input`](SerialLink::process_input)
//! drains whatever bytes the UART has buffered and stops as soon as one
//! packet is complete, leaving later bytes in the UART for the next poll.
//!
//! Outbound frames are streamed straight to the UART (header, payload,
//! checksum) without an intermediate frame buffer.

use ltp_hal::{Monotonic, UartRx, UartTx};
use ltp_protocol::codes::{CMD_ACK, CMD_NAK};
use ltp_protocol::{
    frame_checksum, frame_header, ErrorCode, Feed, Flags, FrameError, Packet, PacketParser,
    ParserStats, MAX_PAYLOAD_SIZE,
};

use crate::config::LinkConfig;

/// Errors from sending a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Frame could not be built
    Frame(FrameError),
    /// UART write failed
    Uart(E),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(err: FrameError) -> Self {
        LinkError::Frame(err)
    }
}

/// Packet-level view of a UART
///
/// `N` is the receive payload capacity.
pub struct SerialLink<U, C, const N: usize = MAX_PAYLOAD_SIZE> {
    uart: U,
    clock: C,
    parser: PacketParser<N>,
    last_error: Option<FrameError>,
}

impl<U, C, const N: usize> SerialLink<U, C, N> {
    /// Create a link with the default payload ceiling and timeout
    pub fn new(uart: U, clock: C) -> Self {
        Self::with_config(uart, clock, &LinkConfig::DEFAULT)
    }

    pub fn with_config(uart: U, clock: C, config: &LinkConfig) -> Self {
        Self {
            uart,
            clock,
            parser: PacketParser::with_limits(config.max_payload, config.inter_byte_timeout_ms),
            last_error: None,
        }
    }

    /// The packet completed by the last successful `process_input`
    pub fn packet(&self) -> Option<&Packet<N>> {
        self.parser.packet()
    }

    /// Most recent dropped-packet reason, cleared on read
    ///
    /// Lets the command layer answer a corrupted request with a NAK.
    pub fn take_error(&mut self) -> Option<FrameError> {
        self.last_error.take()
    }

    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Effective receive payload ceiling
    pub fn max_payload(&self) -> u16 {
        self.parser.max_payload()
    }

    /// Drop any partial packet
    pub fn reset(&mut self) {
        self.parser.reset();
        self.last_error = None;
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn release(self) -> (U, C) {
        (self.uart, self.clock)
    }
}

impl<U: UartRx, C: Monotonic, const N: usize> SerialLink<U, C, N> {
    /// Drain available bytes into the parser
    ///
    /// Returns `Ok(true)` when a complete, checksum-valid packet is ready in
    /// [`packet`](Self::packet). Returns `Ok(false)` once the UART has no
    /// more bytes. Dropped packets are recorded for [`take_error`](Self::take_error).
    pub fn process_input(&mut self) -> Result<bool, U::Error> {
        if self.parser.check_timeout(self.clock.now_ms()) {
            #[cfg(feature = "defmt")]
            defmt::debug!("link: partial packet timed out");
            self.last_error = Some(FrameError::Timeout);
        }

        while let Some(byte) = self.uart.try_read_byte()? {
            match self.parser.feed(byte, self.clock.now_ms()) {
                Ok(Feed::PacketReady) => {
                    #[cfg(feature = "defmt")]
                    if let Some(packet) = self.parser.packet() {
                        defmt::trace!(
                            "link: packet cmd={=u8:#x} len={=u16}",
                            packet.command(),
                            packet.length()
                        );
                    }
                    return Ok(true);
                }
                Ok(Feed::NeedMore) => {}
                Err(err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("link: dropped packet: {}", err);
                    self.last_error = Some(err);
                }
            }
        }

        Ok(false)
    }
}

impl<U: UartTx, C, const N: usize> SerialLink<U, C, N> {
    /// Send a response frame
    ///
    /// The RESPONSE flag is always set in addition to `flags`.
    pub fn send_packet(
        &mut self,
        command: u8,
        payload: &[u8],
        flags: Flags,
    ) -> Result<(), LinkError<U::Error>> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(LinkError::Frame(FrameError::PayloadTooLarge));
        }
        let flags = flags | Flags::RESPONSE;
        let length = payload.len() as u16;

        let header = frame_header(flags, command, length);
        let checksum = frame_checksum(flags, command, length, payload);

        self.uart.write_blocking(&header).map_err(LinkError::Uart)?;
        if !payload.is_empty() {
            self.uart.write_blocking(payload).map_err(LinkError::Uart)?;
        }
        self.uart.write_blocking(&[checksum]).map_err(LinkError::Uart)?;
        Ok(())
    }

    /// Acknowledge a command; `sequence` echoes the host's sequence byte
    pub fn send_ack(&mut self, command: u8, sequence: u8) -> Result<(), LinkError<U::Error>> {
        self.send_packet(CMD_ACK, &[command, sequence], Flags::NONE)
    }

    /// Reject a command with an error code
    pub fn send_nak(&mut self, command: u8, code: ErrorCode) -> Result<(), LinkError<U::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("link: NAK cmd={=u8:#x} code={}", command, code);
        self.send_packet(CMD_NAK, &[command, code.to_byte()], Flags::ERROR)
    }

    /// Wait for queued output to leave the UART
    pub fn flush(&mut self) -> Result<(), LinkError<U::Error>> {
        self.uart.flush().map_err(LinkError::Uart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use heapless::{Deque, Vec};
    use ltp_protocol::codes::CMD_SHOW;
    use ltp_protocol::{encode_frame, FRAME_OVERHEAD, PACKET_START};

    /// Loopback-style UART: `rx` is what the host sent, `tx` what we wrote
    #[derive(Default)]
    struct MockUart {
        rx: Deque<u8, 64>,
        tx: Vec<u8, 64>,
    }

    impl MockUart {
        fn push_rx(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.rx.push_back(b).unwrap();
            }
        }
    }

    impl UartRx for MockUart {
        type Error = Infallible;

        fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
            Ok(self.rx.pop_front())
        }
    }

    impl UartTx for MockUart {
        type Error = Infallible;

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.tx.extend_from_slice(data).unwrap();
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockClock(Cell<u32>);

    impl MockClock {
        fn advance(&self, ms: u32) {
            self.0.set(self.0.get().wrapping_add(ms));
        }
    }

    impl Monotonic for MockClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    fn frame(command: u8, payload: &[u8], flags: Flags) -> Vec<u8, 32> {
        let mut buf: Vec<u8, 32> = Vec::new();
        buf.resize_default(FRAME_OVERHEAD + payload.len()).unwrap();
        encode_frame(flags, command, payload, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_process_input_stops_after_packet() {
        let clock = MockClock(Cell::new(0));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        link.uart_mut().push_rx(&frame(CMD_SHOW, &[], Flags::NONE));
        link.uart_mut().push_rx(&frame(0x30, &[1, 2, 3], Flags::NONE));

        assert_eq!(link.process_input(), Ok(true));
        assert_eq!(link.packet().unwrap().command(), CMD_SHOW);
        // Second frame is still waiting in the UART
        assert_eq!(link.uart().rx.len(), 9);

        assert_eq!(link.process_input(), Ok(true));
        assert_eq!(link.packet().unwrap().payload(), &[1, 2, 3]);
        assert_eq!(link.process_input(), Ok(false));
        assert_eq!(link.stats().packets, 2);
    }

    #[test]
    fn test_stalled_packet_times_out() {
        let clock = MockClock(Cell::new(1000));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        let bytes = frame(0x30, &[7, 7], Flags::NONE);
        link.uart_mut().push_rx(&bytes[..3]);
        assert_eq!(link.process_input(), Ok(false));

        clock.advance(11);
        link.uart_mut().push_rx(&bytes[3..]);
        // Remainder arrives after the gap and is discarded as noise
        assert_eq!(link.process_input(), Ok(false));
        assert_eq!(link.take_error(), Some(FrameError::Timeout));
        assert_eq!(link.take_error(), None);
        assert_eq!(link.stats().timeouts, 1);

        link.uart_mut().push_rx(&frame(CMD_SHOW, &[], Flags::NONE));
        assert_eq!(link.process_input(), Ok(true));
    }

    #[test]
    fn test_gap_within_timeout_is_tolerated() {
        let clock = MockClock(Cell::new(u32::MAX - 4));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        let bytes = frame(0x30, &[1], Flags::NONE);
        link.uart_mut().push_rx(&bytes[..2]);
        assert_eq!(link.process_input(), Ok(false));

        // Crosses the u32 wrap, still exactly at the limit
        clock.advance(10);
        link.uart_mut().push_rx(&bytes[2..]);
        assert_eq!(link.process_input(), Ok(true));
    }

    #[test]
    fn test_bad_checksum_recorded() {
        let clock = MockClock(Cell::new(0));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        let mut bytes = frame(0x30, &[1, 2], Flags::NONE);
        let last = bytes.len() - 1;
        bytes[last] ^= 0x55;
        link.uart_mut().push_rx(&bytes);

        assert_eq!(link.process_input(), Ok(false));
        assert!(link.packet().is_none());
        let err = link.take_error().unwrap();
        assert_eq!(err, FrameError::InvalidChecksum);
        assert_eq!(err.error_code(), ErrorCode::Checksum);
    }

    #[test]
    fn test_oversize_uses_configured_ceiling() {
        let clock = MockClock(Cell::new(0));
        let config = LinkConfig {
            max_payload: 4,
            ..LinkConfig::DEFAULT
        };
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::with_config(MockUart::default(), &clock, &config);
        assert_eq!(link.max_payload(), 4);

        link.uart_mut().push_rx(&frame(0x30, &[0; 5], Flags::NONE));
        assert_eq!(link.process_input(), Ok(false));
        assert_eq!(link.take_error(), Some(FrameError::PayloadTooLarge));
        assert_eq!(link.stats().oversize_errors, 1);
    }

    #[test]
    fn test_send_ack_bytes() {
        let clock = MockClock(Cell::new(0));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        link.send_ack(0x30, 0x07).unwrap();
        // flags = RESPONSE, len = 2, cmd = ACK
        let checksum = 0x04 ^ 0x02 ^ 0x00 ^ CMD_ACK ^ 0x30 ^ 0x07;
        assert_eq!(
            link.uart().tx.as_slice(),
            &[PACKET_START, 0x04, 0x02, 0x00, CMD_ACK, 0x30, 0x07, checksum]
        );
    }

    #[test]
    fn test_send_nak_sets_error_flag() {
        let clock = MockClock(Cell::new(0));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        link.send_nak(0x31, ErrorCode::Checksum).unwrap();
        let tx = link.uart().tx.as_slice();
        assert_eq!(tx[1], 0x05);
        assert_eq!(tx[4], CMD_NAK);
        assert_eq!(&tx[5..7], &[0x31, 0x01]);
    }

    #[test]
    fn test_sent_frame_parses() {
        let clock = MockClock(Cell::new(0));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        link.send_packet(0x20, &[PACKET_START, 1, 2], Flags::NONE).unwrap();
        let sent: Vec<u8, 64> = link.uart().tx.clone();

        let mut parser: PacketParser<16> = PacketParser::new();
        let (_, feed) = parser.feed_bytes(&sent, 0);
        assert_eq!(feed, Feed::PacketReady);
        let packet = parser.packet().unwrap();
        assert!(packet.flags().contains(Flags::RESPONSE));
        assert_eq!(packet.payload(), &[PACKET_START, 1, 2]);
    }

    #[test]
    fn test_send_rejects_oversize_payload() {
        let clock = MockClock(Cell::new(0));
        let mut link: SerialLink<MockUart, &MockClock, 64> =
            SerialLink::new(MockUart::default(), &clock);

        let big = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            link.send_packet(0x20, &big, Flags::NONE),
            Err(LinkError::Frame(FrameError::PayloadTooLarge))
        );
        assert!(link.uart().tx.is_empty());
    }
}
