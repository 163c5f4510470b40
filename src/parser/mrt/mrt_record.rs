/*!
Record framing: the MRT common header and payload reads.
*/
use crate::error::ParserError;
use bytes::Bytes;
use log::debug;
use std::io::{ErrorKind, Read};

/// The common header as read off the wire, before the type field is
/// resolved. Keeping the raw type here lets the framing loop skip records
/// of unknown type without losing sync.
#[derive(Debug, Copy, Clone)]
pub(crate) struct RawHeader {
    pub timestamp: u32,
    pub entry_type: u16,
    pub entry_subtype: u16,
    pub length: u32,
}

/// Read one framed record: the 12-byte common header plus a payload of
/// exactly `length` bytes.
///
/// Returns `Ok(None)` on a clean end of stream. A partial header or a
/// partial payload is also a clean end: the truncated trailing record is
/// dropped, per the tolerant reading of RFC 6396 archives.
pub(crate) fn read_frame<T: Read>(input: &mut T) -> Result<Option<(RawHeader, Bytes)>, ParserError> {
    let mut raw_bytes = [0u8; 12];
    if !read_exact_or_eof(input, &mut raw_bytes)? {
        return Ok(None);
    }

    let header = RawHeader {
        timestamp: u32::from_be_bytes([raw_bytes[0], raw_bytes[1], raw_bytes[2], raw_bytes[3]]),
        entry_type: u16::from_be_bytes([raw_bytes[4], raw_bytes[5]]),
        entry_subtype: u16::from_be_bytes([raw_bytes[6], raw_bytes[7]]),
        length: u32::from_be_bytes([raw_bytes[8], raw_bytes[9], raw_bytes[10], raw_bytes[11]]),
    };

    // bound the upfront allocation so a corrupt length field cannot demand
    // gigabytes before the stream runs dry
    let mut payload = Vec::with_capacity(header.length.min(1 << 20) as usize);
    input
        .by_ref()
        .take(header.length as u64)
        .read_to_end(&mut payload)?;
    if payload.len() < header.length as usize {
        debug!(
            "dropping truncated trailing record: type {}, {} bytes expected, {} read",
            header.entry_type,
            header.length,
            payload.len()
        );
        return Ok(None);
    }

    Ok(Some((header, Bytes::from(payload))))
}

/// Fill `buf` completely, or report a clean end of stream.
///
/// `read_exact` already retries reads interrupted by signals; an
/// `UnexpectedEof` (including a partial fill) maps to `Ok(false)`.
fn read_exact_or_eof<T: Read>(input: &mut T, buf: &mut [u8]) -> Result<bool, ParserError> {
    match input.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_frame() {
        let stream: Vec<u8> = vec![
            0x5F, 0x00, 0x00, 0x00, // timestamp
            0x00, 0x0D, // type 13
            0x00, 0x01, // subtype 1
            0x00, 0x00, 0x00, 0x02, // length 2
            0xAA, 0xBB, // payload
        ];
        let (header, payload) = read_frame(&mut stream.as_slice()).unwrap().unwrap();
        assert_eq!(header.timestamp, 0x5F00_0000);
        assert_eq!(header.entry_type, 13);
        assert_eq!(header.entry_subtype, 1);
        assert_eq!(header.length, 2);
        assert_eq!(payload.as_ref(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_empty_stream_is_clean_end() {
        assert!(read_frame(&mut [].as_slice()).unwrap().is_none());
    }

    #[test]
    fn test_partial_header_is_clean_end() {
        let stream = [0x5F, 0x00, 0x00];
        assert!(read_frame(&mut stream.as_slice()).unwrap().is_none());

        let eleven = [0u8; 11];
        assert!(read_frame(&mut eleven.as_slice()).unwrap().is_none());
    }

    #[test]
    fn test_partial_payload_is_clean_end() {
        let stream: Vec<u8> = vec![
            0x00, 0x00, 0x00, 0x00, //
            0x00, 0x0D, 0x00, 0x01, //
            0x00, 0x00, 0x00, 0x64, // claims 100 bytes
            0x01, 0x02, 0x03, // carries 3
        ];
        assert!(read_frame(&mut stream.as_slice()).unwrap().is_none());
    }
}
