//! MRT record-level decoding: framing, body dispatch, and the per-type
//! structural parsers.

pub(crate) mod mrt_record;

pub mod bgp4mp;
pub mod peer_index_table;
pub mod rib;

pub use bgp4mp::{parse_bgp4mp_message, parse_bgp4mp_state_change};
pub use peer_index_table::parse_peer_index_table;
pub use rib::{
    parse_bgp4mp_entry, parse_rib_afi_entries, parse_rib_generic_entries, parse_table_dump,
};

use crate::error::ParserError;
use crate::models::*;
use bytes::Bytes;

/// Parse an MRT record body with the type and subtype taken from the common
/// header. For `_ET` types the microsecond field has already been consumed
/// into the header by the framing layer.
pub fn parse_mrt_body(
    header: &CommonHeader,
    mut data: Bytes,
) -> Result<MrtBody, ParserError> {
    match header.entry_type {
        EntryType::TABLE_DUMP => {
            let rib = parse_table_dump(header.entry_subtype, data)?;
            Ok(MrtBody::Rib(rib))
        }
        EntryType::TABLE_DUMP_V2 => {
            let v2_type = TableDumpV2Type::try_from(header.entry_subtype)?;
            match v2_type {
                TableDumpV2Type::PeerIndexTable => {
                    Ok(MrtBody::PeerIndexTable(parse_peer_index_table(&mut data)?))
                }
                TableDumpV2Type::RibGeneric | TableDumpV2Type::RibGenericAddPath => Ok(
                    MrtBody::Rib(parse_rib_generic_entries(&mut data, v2_type.is_add_path())?),
                ),
                TableDumpV2Type::GeoPeerTable => Err(ParserError::Unsupported(
                    "geo peer table records are not supported".to_string(),
                )),
                rib_type => Ok(MrtBody::Rib(parse_rib_afi_entries(&mut data, rib_type)?)),
            }
        }
        EntryType::BGP4MP | EntryType::BGP4MP_ET => {
            let timestamp = RecordTime::new(header.timestamp, header.microsecond_timestamp);
            let bgp4mp_type = Bgp4MpType::try_from(header.entry_subtype)?;
            match bgp4mp_type {
                Bgp4MpType::StateChange => Ok(MrtBody::StateChange(parse_bgp4mp_state_change(
                    data,
                    AsnLength::Bits16,
                    timestamp,
                )?)),
                Bgp4MpType::StateChangeAs4 => Ok(MrtBody::StateChange(
                    parse_bgp4mp_state_change(data, AsnLength::Bits32, timestamp)?,
                )),
                Bgp4MpType::Entry => Ok(MrtBody::Rib(parse_bgp4mp_entry(data)?)),
                Bgp4MpType::Snapshot => Err(ParserError::Unsupported(
                    "BGP4MP_SNAPSHOT records are not supported".to_string(),
                )),
                msg_type => Ok(MrtBody::Message(parse_bgp4mp_message(
                    data, msg_type, timestamp,
                )?)),
            }
        }
        mrt_type => Err(ParserError::Unsupported(format!(
            "unsupported MRT record type: {mrt_type:?} (subtype {})",
            header.entry_subtype
        ))),
    }
}
