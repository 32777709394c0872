//! Outbound payloads and the payload-file format.

use crate::constants::{BROADCAST_SENTINEL, MAX_PAYLOAD_DATA_LEN};
use crate::error::SimError;

/// An outbound unit queued by a station before framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub src_id: usize,
    pub dst_id: usize,
    pub data: Vec<u8>,
}

impl Payload {
    /// `true` iff `dst_id` is the broadcast sentinel rather than a real station.
    pub fn is_broadcast(&self) -> bool {
        self.dst_id >= BROADCAST_SENTINEL
    }
}

/// Parses the whitespace-separated payload-file format: each line is
/// `<src_id> <dst_id> <data...>`, where `data` is the remainder of the line
/// with leading whitespace trimmed.
///
/// `src_id` in the broadcast range is an error (checked again at frame
/// construction, but checked here too so a bad file is reported with its
/// line number). Blank lines are skipped.
pub fn parse_payload_file(contents: &str) -> Result<Vec<Payload>, SimError> {
    let mut payloads = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let src_end = line
            .find(|c: char| c.is_whitespace())
            .ok_or_else(|| malformed(line_no, "expected `<src_id> <dst_id> <data>`"))?;
        let (src_token, rest) = line.split_at(src_end);
        let rest = rest.trim_start();

        let dst_end = rest
            .find(|c: char| c.is_whitespace())
            .ok_or_else(|| malformed(line_no, "expected `<dst_id> <data>` after source id"))?;
        let (dst_token, rest) = rest.split_at(dst_end);
        let data = rest.trim_start();

        let src_id: usize = src_token
            .parse()
            .map_err(|_| malformed(line_no, "source id is not a number"))?;
        let dst_id: usize = dst_token
            .parse()
            .map_err(|_| malformed(line_no, "destination id is not a number"))?;

        if src_id >= BROADCAST_SENTINEL {
            return Err(SimError::BroadcastSource { src_id });
        }
        if data.len() > MAX_PAYLOAD_DATA_LEN {
            return Err(SimError::PayloadTooLarge {
                len: data.len(),
                max: MAX_PAYLOAD_DATA_LEN,
            });
        }

        payloads.push(Payload {
            src_id,
            dst_id,
            data: data.as_bytes().to_vec(),
        });
    }
    Ok(payloads)
}

fn malformed(line_no: usize, reason: &str) -> SimError {
    SimError::MalformedPayloadLine {
        line: line_no + 1,
        reason: reason.to_string(),
    }
}
