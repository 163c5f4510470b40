/*!
The streaming parser: framing loop, dispatch, and record delivery.
*/
use std::io::Read;

pub mod attributes;
pub mod mrt;
pub mod nlri;
pub mod utils;

pub use mrt::parse_mrt_body;
pub use utils::ReadUtils;

use crate::error::ParserError;
use crate::models::*;
use crate::parser::mrt::mrt_record::{read_frame, RawHeader};
use bytes::Bytes;
use log::{debug, warn};

type DumpSink<'a> = Box<dyn FnMut(&RibSnapshot, &PeerIndexTable) + 'a>;
type StateSink<'a> = Box<dyn FnMut(&StateChange) + 'a>;
type MessageSink<'a> = Box<dyn FnMut(&BgpMessageRecord) + 'a>;

/// Per-class record callbacks for [`MrtParser::parse`].
///
/// Each sink is optional. A record class without a sink is parsed but not
/// delivered; RIB records are additionally not parsed at all when no dump
/// sink is set, since attribute decoding dominates the cost of a table
/// dump. Sinks borrow the decoded record and the live peer index table for
/// the duration of the call; clone what must outlive it.
///
/// ```
/// use mrt_decoder::RecordSinks;
///
/// let mut count = 0usize;
/// let mut sinks = RecordSinks::new().on_dump(|rib, _peers| {
///     count += rib.entries.len();
/// });
/// ```
#[derive(Default)]
pub struct RecordSinks<'a> {
    dump: Option<DumpSink<'a>>,
    state: Option<StateSink<'a>>,
    message: Option<MessageSink<'a>>,
}

impl<'a> RecordSinks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver RIB snapshots together with the peer index table their
    /// entries reference.
    pub fn on_dump(mut self, sink: impl FnMut(&RibSnapshot, &PeerIndexTable) + 'a) -> Self {
        self.dump = Some(Box::new(sink));
        self
    }

    pub fn on_state(mut self, sink: impl FnMut(&StateChange) + 'a) -> Self {
        self.state = Some(Box::new(sink));
        self
    }

    pub fn on_message(mut self, sink: impl FnMut(&BgpMessageRecord) + 'a) -> Self {
        self.message = Some(Box::new(sink));
        self
    }
}

/// Streaming MRT record decoder.
///
/// Reads framed records off any [`Read`] source and either hands decoded
/// records to [`RecordSinks`] callbacks ([`parse`](MrtParser::parse)) or
/// returns them one at a time ([`next_record`](MrtParser::next_record)).
///
/// The parser owns the cross-record state RFC 6396 requires: the most
/// recent PEER_INDEX_TABLE, which V2 RIB entries reference by index, and a
/// separate single-slot synthetic table backing the legacy formats that
/// carry their peer inline.
///
/// ```no_run
/// use mrt_decoder::{MrtParser, RecordSinks};
///
/// let mut parser = MrtParser::from_path("rib.20240101.0000.bz2").unwrap();
/// let mut sinks = RecordSinks::new().on_dump(|rib, peers| {
///     for entry in &rib.entries {
///         let peer = peers.get_peer_by_id(entry.peer_index);
///         println!("{} via {:?}", rib.prefix, peer.map(|p| p.peer_address));
///     }
/// });
/// parser.parse(&mut sinks).unwrap();
/// ```
pub struct MrtParser<R> {
    reader: R,
    verbose: bool,
    peer_index: PeerIndexTable,
    legacy_peers: PeerIndexTable,
}

#[cfg(feature = "oneio")]
impl MrtParser<Box<dyn Read + Send>> {
    /// Open a local or remote MRT file, transparently decompressed.
    pub fn from_path(path: &str) -> Result<Self, ParserError> {
        Ok(MrtParser::new(crate::io::get_reader(path)?))
    }
}

impl<R: Read> MrtParser<R> {
    pub fn new(reader: R) -> Self {
        MrtParser {
            reader,
            verbose: false,
            peer_index: PeerIndexTable::default(),
            legacy_peers: PeerIndexTable::synthetic(),
        }
    }

    /// Emit skip diagnostics at `warn` level instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Pull the next fully decoded record.
    ///
    /// Returns `Ok(None)` at the end of the stream. Recoverable decode
    /// errors consume the offending record, so callers may keep pulling
    /// after an `Err`. This low-level interface leaves peer index tables
    /// to the caller; [`parse`](MrtParser::parse) manages them instead.
    pub fn next_record(&mut self) -> Result<Option<MrtRecord>, ParserError> {
        let Some((raw, payload)) = read_frame(&mut self.reader)? else {
            return Ok(None);
        };
        let (common_header, payload) = resolve_header(raw, payload)?;
        let body = parse_mrt_body(&common_header, payload)?;
        Ok(Some(MrtRecord {
            common_header,
            body,
        }))
    }

    /// Decode the whole stream, delivering each record to its sink.
    ///
    /// Records that fail to decode for record-local reasons (truncation,
    /// unknown family or type, bad prefix length) are dropped with an
    /// optional diagnostic and framing continues. Pathological records
    /// ([`ParserError::TooManyAttributes`]) and I/O failures abort.
    pub fn parse(&mut self, sinks: &mut RecordSinks) -> Result<(), ParserError> {
        loop {
            let Some((raw, payload)) = read_frame(&mut self.reader)? else {
                return Ok(());
            };
            match self.process_record(raw, payload, sinks) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    self.diag(&format!("skipping record: {e}"));
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn process_record(
        &mut self,
        raw: RawHeader,
        payload: Bytes,
        sinks: &mut RecordSinks,
    ) -> Result<(), ParserError> {
        let entry_type = EntryType::try_from(raw.entry_type)?;
        if entry_type.is_deprecated() {
            self.diag(&format!("skipping deprecated record type {entry_type:?}"));
            return Ok(());
        }
        match entry_type {
            EntryType::TABLE_DUMP
            | EntryType::TABLE_DUMP_V2
            | EntryType::BGP4MP
            | EntryType::BGP4MP_ET => {}
            other => {
                self.diag(&format!("skipping unsupported record type {other:?}"));
                return Ok(());
            }
        }

        // table dumps are expensive to decode; skip them outright when
        // nobody is listening
        if sinks.dump.is_none() && is_rib_record(entry_type, raw.entry_subtype) {
            return Ok(());
        }

        let (common_header, payload) = resolve_header(raw, payload)?;
        match parse_mrt_body(&common_header, payload)? {
            MrtBody::PeerIndexTable(table) => {
                self.peer_index = table;
            }
            MrtBody::Rib(snapshot) => match snapshot.peer {
                Some(peer) => {
                    self.legacy_peers.peers[0] = peer;
                    if let Some(dump) = sinks.dump.as_mut() {
                        dump(&snapshot, &self.legacy_peers);
                    }
                }
                None => {
                    if let Some(dump) = sinks.dump.as_mut() {
                        dump(&snapshot, &self.peer_index);
                    }
                }
            },
            MrtBody::StateChange(state) => {
                if let Some(sink) = sinks.state.as_mut() {
                    sink(&state);
                }
            }
            MrtBody::Message(message) => {
                if let Some(sink) = sinks.message.as_mut() {
                    sink(&message);
                }
            }
        }
        Ok(())
    }

    fn diag(&self, message: &str) {
        match self.verbose {
            true => warn!("{message}"),
            false => debug!("{message}"),
        }
    }
}

/// Resolve the raw header into a typed one, consuming the leading
/// microsecond field of `_ET` payloads.
fn resolve_header(
    raw: RawHeader,
    mut payload: Bytes,
) -> Result<(CommonHeader, Bytes), ParserError> {
    let entry_type = EntryType::try_from(raw.entry_type)?;
    let microsecond_timestamp = match entry_type.has_microseconds() {
        true => Some(payload.read_u32()?),
        false => None,
    };
    Ok((
        CommonHeader {
            timestamp: raw.timestamp,
            microsecond_timestamp,
            entry_type,
            entry_subtype: raw.entry_subtype,
            length: raw.length,
        },
        payload,
    ))
}

fn is_rib_record(entry_type: EntryType, subtype: u16) -> bool {
    match entry_type {
        EntryType::TABLE_DUMP => true,
        EntryType::TABLE_DUMP_V2 => !matches!(
            TableDumpV2Type::try_from(subtype),
            Ok(TableDumpV2Type::PeerIndexTable) | Ok(TableDumpV2Type::GeoPeerTable) | Err(_)
        ),
        EntryType::BGP4MP | EntryType::BGP4MP_ET => {
            matches!(Bgp4MpType::try_from(subtype), Ok(Bgp4MpType::Entry))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(entry_type: u16, subtype: u16, timestamp: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![];
        out.extend_from_slice(&timestamp.to_be_bytes());
        out.extend_from_slice(&entry_type.to_be_bytes());
        out.extend_from_slice(&subtype.to_be_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_peer_index_replaces_context_without_sink_calls() {
        let stream = framed(
            13,
            1,
            0x5F00_0000,
            &[0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00],
        );
        let mut parser = MrtParser::new(stream.as_slice());

        let called = std::cell::Cell::new(false);
        let mut sinks = RecordSinks::new()
            .on_dump(|_, _| called.set(true))
            .on_state(|_| called.set(true))
            .on_message(|_| called.set(true));
        parser.parse(&mut sinks).unwrap();
        drop(sinks);

        assert!(!called.get());
        assert_eq!(
            parser.peer_index.collector_bgp_id,
            std::net::Ipv4Addr::new(1, 2, 3, 4)
        );
        assert!(parser.peer_index.peers.is_empty());
    }

    #[test]
    fn test_rib_skipped_without_dump_sink() {
        let rib_payload = [
            0x00, 0x00, 0x00, 0x01, //
            0x18, 0x0A, 0x00, 0x00, //
            0x00, 0x01, //
            0x00, 0x00, 0x5F, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let stream = framed(13, 2, 0, &rib_payload);

        let mut records = vec![];
        let mut parser = MrtParser::new(stream.as_slice());
        let mut sinks = RecordSinks::new().on_dump(|rib, _| records.push(rib.clone()));
        parser.parse(&mut sinks).unwrap();
        drop(sinks);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence_number, 1);

        // same stream, no dump sink: nothing decoded, clean termination
        let mut parser = MrtParser::new(stream.as_slice());
        parser.parse(&mut RecordSinks::new()).unwrap();
    }

    #[test]
    fn test_deprecated_and_unknown_types_are_skipped() {
        let mut stream = framed(1, 0, 0, &[0xAA, 0xBB]); // START
        stream.extend(framed(11, 0, 0, &[0x01])); // OSPFv2
        stream.extend(framed(14, 0, 0, &[0x01])); // not a defined type
        stream.extend(framed(
            13,
            1,
            0,
            &[0x09, 0x09, 0x09, 0x09, 0x00, 0x00, 0x00, 0x00],
        ));

        let mut parser = MrtParser::new(stream.as_slice()).verbose(true);
        parser.parse(&mut RecordSinks::new()).unwrap();
        assert_eq!(
            parser.peer_index.collector_bgp_id,
            std::net::Ipv4Addr::new(9, 9, 9, 9)
        );
    }

    #[test]
    fn test_bad_record_does_not_stop_good_ones() {
        // truncated peer index table payload (claims 4 peers, has none)
        let mut stream = framed(13, 1, 0, &[0, 0, 0, 0, 0x00, 0x00, 0x00, 0x04]);
        // then a valid IPv4 unicast rib
        stream.extend(framed(
            13,
            2,
            0,
            &[
                0x00, 0x00, 0x00, 0x63, //
                0x18, 0x0A, 0x00, 0x00, //
                0x00, 0x01, //
                0x00, 0x00, 0x5F, 0x00, 0x00, 0x00, 0x00, 0x00,
            ],
        ));

        let mut seen = vec![];
        let mut parser = MrtParser::new(stream.as_slice());
        let mut sinks = RecordSinks::new().on_dump(|rib, _| seen.push(rib.sequence_number));
        parser.parse(&mut sinks).unwrap();
        drop(sinks);
        assert_eq!(seen, vec![99]);
    }

    #[test]
    fn test_legacy_rib_uses_synthetic_peer_table() {
        // a peer index table with one real peer, then a TABLE_DUMP record
        let mut stream = framed(
            13,
            1,
            0,
            &[
                0x01, 0x01, 0x01, 0x01, // collector
                0x00, 0x00, // view
                0x00, 0x01, // one peer
                0x00, 0x02, 0x02, 0x02, 0x02, 10, 0, 0, 9, 0x00, 0x64,
            ],
        );
        let td_payload = [
            0x00, 0x00, // view
            0x00, 0x07, // sequence
            10, 0, 0, 0, 24, 0x01, // prefix, status
            0x5F, 0x00, 0x00, 0x00, // originated
            192, 0, 2, 1, // peer address
            0x01, 0x00, // peer AS 256
            0x00, 0x00, // no attributes
        ];
        stream.extend(framed(12, 1, 0, &td_payload));

        let mut legacy_peer = None;
        let mut parser = MrtParser::new(stream.as_slice());
        let mut sinks = RecordSinks::new().on_dump(|rib, peers| {
            if rib.peer.is_some() {
                legacy_peer = peers.get_peer_by_id(0).copied();
            }
        });
        parser.parse(&mut sinks).unwrap();
        drop(sinks);

        let peer = legacy_peer.unwrap();
        assert_eq!(peer.peer_address.to_string(), "192.0.2.1");
        assert_eq!(peer.peer_asn, Asn::new_16bit(256));
        // the real peer index table is untouched by the legacy record
        assert_eq!(
            parser.peer_index.peers[0].peer_address.to_string(),
            "10.0.0.9"
        );
    }

    #[test]
    fn test_next_record_pull_interface() {
        let mut stream = framed(
            13,
            1,
            0,
            &[0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00],
        );
        stream.extend(framed(11, 0, 0, &[0xFF])); // unsupported, surfaced as Err
        let mut parser = MrtParser::new(stream.as_slice());

        let record = parser.next_record().unwrap().unwrap();
        assert_eq!(record.common_header.entry_type, EntryType::TABLE_DUMP_V2);
        assert!(matches!(record.body, MrtBody::PeerIndexTable(_)));

        assert!(matches!(
            parser.next_record(),
            Err(ParserError::Unsupported(_))
        ));
        assert!(parser.next_record().unwrap().is_none());
    }

    #[test]
    fn test_et_microseconds_consumed_from_payload() {
        let payload = [
            0x00, 0x00, 0x03, 0xE8, // 1000 usec
            0x00, 0x01, 0x00, 0x00, // peer AS
            0x00, 0x02, 0x00, 0x00, // local AS
            0x00, 0x00, 0x00, 0x01, // ifindex, afi
            1, 1, 1, 1, 2, 2, 2, 2, //
            0x00, 0x03, 0x00, 0x06,
        ];
        let stream = framed(17, 5, 0x5F00_0000, &payload);

        let mut states = vec![];
        let mut parser = MrtParser::new(stream.as_slice());
        let mut sinks = RecordSinks::new().on_state(|s| states.push(*s));
        parser.parse(&mut sinks).unwrap();
        drop(sinks);

        assert_eq!(states.len(), 1);
        assert_eq!(states[0].timestamp.seconds, 0x5F00_0000);
        assert_eq!(states[0].timestamp.nanoseconds, 1_000_000);
        assert_eq!(states[0].peer_asn, Asn::new_32bit(0x10000));
        assert_eq!(states[0].old_state, 3);
        assert_eq!(states[0].new_state, 6);
    }

    #[test]
    fn test_too_many_attributes_is_fatal() {
        let mut attr_block = vec![];
        for _ in 0..255 {
            attr_block.extend_from_slice(&[0xC0, 0x63, 0x00]);
        }
        let mut payload = vec![
            0x00, 0x00, 0x00, 0x01, //
            0x18, 0x0A, 0x00, 0x00, //
            0x00, 0x01, //
            0x00, 0x00, 0x5F, 0x00, 0x00, 0x00,
        ];
        payload.extend_from_slice(&(attr_block.len() as u16).to_be_bytes());
        payload.extend_from_slice(&attr_block);
        let stream = framed(13, 2, 0, &payload);

        let mut parser = MrtParser::new(stream.as_slice());
        let mut sinks = RecordSinks::new().on_dump(|_, _| {});
        assert!(matches!(
            parser.parse(&mut sinks),
            Err(ParserError::TooManyAttributes)
        ));
    }
}
