//! The bit-exact 1526-byte on-wire frame image.
//!
//! Layout: 7-byte preamble, 1-byte SFD, 6-byte destination address, 6-byte
//! source address, 2-byte length (always 1500), 1500-byte data region,
//! 4-byte CRC-32 over everything preceding it.

use bytes::{BufMut, BytesMut};
use nom::bytes::complete::{tag, take};
use nom::number::complete::be_u16;
use nom::IResult;

use crate::address::{decode_address, encode_address, is_broadcast};
use crate::constants::{
    FRAME_DATA_LEN, FRAME_WIRE_LEN, MAX_PAYLOAD_DATA_LEN, MAX_STATIONS_COUNT, PREAMBLE_BYTE,
    PREAMBLE_LEN, START_OF_FRAME_DELIM,
};
use crate::crc::crc32;
use crate::error::SimError;

/// In-memory image of a CSMA/CD MAC frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    destination_address: [u8; 6],
    source_address: [u8; 6],
    data: [u8; MAX_PAYLOAD_DATA_LEN],
    checksum: u32,
}

impl Frame {
    /// Constructs a new frame from a source id, destination id (or the
    /// broadcast sentinel), and payload data, computing its checksum.
    ///
    /// Rejects a broadcast-range `src_id` and oversized `data`.
    pub fn new(src_id: usize, dst_id: usize, data: &[u8]) -> Result<Self, SimError> {
        if is_broadcast(src_id) {
            return Err(SimError::BroadcastSource { src_id });
        }
        if data.len() > MAX_PAYLOAD_DATA_LEN {
            return Err(SimError::PayloadTooLarge {
                len: data.len(),
                max: MAX_PAYLOAD_DATA_LEN,
            });
        }

        let mut data_region = [0u8; MAX_PAYLOAD_DATA_LEN];
        data_region[..data.len()].copy_from_slice(data);

        let mut frame = Frame {
            destination_address: encode_address(dst_id),
            source_address: encode_address(src_id),
            data: data_region,
            checksum: 0,
        };
        frame.checksum = crc32(0, &frame.checksum_prefix());
        Ok(frame)
    }

    /// Every byte of the wire image except the trailing 4 checksum bytes.
    fn checksum_prefix(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAME_WIRE_LEN - 4);
        buf.extend_from_slice(&[PREAMBLE_BYTE; PREAMBLE_LEN]);
        buf.push(START_OF_FRAME_DELIM);
        buf.extend_from_slice(&self.destination_address);
        buf.extend_from_slice(&self.source_address);
        buf.extend_from_slice(&FRAME_DATA_LEN.to_be_bytes());
        buf.extend_from_slice(&self.data);
        buf
    }

    /// Encodes the frame to its exact 1526-byte wire representation.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(FRAME_WIRE_LEN);
        buf.put_slice(&self.checksum_prefix());
        buf.put_u32(self.checksum);
        buf
    }

    /// Parses a frame from the front of `input`, returning the remaining bytes.
    ///
    /// Only checks structural well-formedness (preamble, SFD, length); it
    /// does not verify the checksum — call [`Frame::verify`] for that.
    pub fn decode(input: &[u8]) -> IResult<&[u8], Frame> {
        let (input, _preamble) = tag([PREAMBLE_BYTE; PREAMBLE_LEN].as_slice())(input)?;
        let (input, _sfd) = tag([START_OF_FRAME_DELIM].as_slice())(input)?;
        let (input, dst) = take(6usize)(input)?;
        let (input, src) = take(6usize)(input)?;
        let (input, _length) = be_u16(input)?;
        let (input, data) = take(MAX_PAYLOAD_DATA_LEN)(input)?;
        let (input, checksum) = nom::number::complete::be_u32(input)?;

        let mut destination_address = [0u8; 6];
        destination_address.copy_from_slice(dst);
        let mut source_address = [0u8; 6];
        source_address.copy_from_slice(src);
        let mut data_region = [0u8; MAX_PAYLOAD_DATA_LEN];
        data_region.copy_from_slice(data);

        Ok((
            input,
            Frame {
                destination_address,
                source_address,
                data: data_region,
                checksum,
            },
        ))
    }

    /// `true` iff the stored checksum matches the freshly computed CRC-32.
    pub fn verify(&self) -> bool {
        crc32(0, &self.checksum_prefix()) == self.checksum
    }

    /// Decodes the source station id, if the source address is well-formed.
    pub fn src_id(&self) -> Option<usize> {
        decode_address(&self.source_address).filter(|id| *id < MAX_STATIONS_COUNT)
    }

    /// Decodes the destination station id or the broadcast sentinel, if the
    /// destination address is well-formed.
    pub fn dst_id(&self) -> Option<usize> {
        decode_address(&self.destination_address)
    }

    /// The payload bytes, i.e. the data region up to its first zero byte.
    pub fn payload_bytes(&self) -> &[u8] {
        let end = self
            .data
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.data.len());
        &self.data[..end]
    }

    /// Inverts the stored checksum, producing a frame that fails [`Frame::verify`]
    /// while remaining otherwise structurally valid. Used to test that
    /// stations reject corrupted frames on the wire.
    #[cfg(any(test, feature = "test-util"))]
    pub fn corrupt_checksum(&mut self) {
        self.checksum = !self.checksum;
    }
}
