/*!
BGP4MP state-change and message decoding, RFC 6396 section 4.4.
*/
use crate::error::ParserError;
use crate::models::*;
use crate::parser::ReadUtils;
use bytes::Bytes;

/*
   0                   1                   2                   3
   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |         Peer AS Number        |        Local AS Number        |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |        Interface Index        |        Address Family         |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                      Peer IP Address (variable)               |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                      Local IP Address (variable)              |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |            Old State          |          New State            |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

  The AS4 subtypes widen both AS fields to 32 bits.
*/
pub fn parse_bgp4mp_state_change(
    mut data: Bytes,
    asn_len: AsnLength,
    timestamp: RecordTime,
) -> Result<StateChange, ParserError> {
    let peer_asn = data.read_asn(asn_len)?;
    let local_asn = data.read_asn(asn_len)?;
    let interface_index = data.read_u16()?;
    let family = read_bgp4mp_family(&mut data)?;
    let peer_addr = data.read_address(family)?;
    let local_addr = data.read_address(family)?;
    // out-of-range FSM values are accepted and passed through raw
    let old_state = data.read_u16()?;
    let new_state = data.read_u16()?;

    Ok(StateChange {
        timestamp,
        peer_asn,
        local_asn,
        interface_index,
        peer_addr,
        local_addr,
        old_state,
        new_state,
    })
}

/// Decode a BGP4MP MESSAGE record of any subtype. The wrapped BGP message
/// is captured wholesale; add-path subtypes only set a flag since the
/// message itself stays unparsed.
pub fn parse_bgp4mp_message(
    mut data: Bytes,
    msg_type: Bgp4MpType,
    timestamp: RecordTime,
) -> Result<BgpMessageRecord, ParserError> {
    let asn_len = msg_type.asn_length();
    let peer_asn = data.read_asn(asn_len)?;
    let local_asn = data.read_asn(asn_len)?;
    let interface_index = data.read_u16()?;
    let family = read_bgp4mp_family(&mut data)?;
    let peer_addr = data.read_address(family)?;
    let local_addr = data.read_address(family)?;

    Ok(BgpMessageRecord {
        timestamp,
        peer_asn,
        local_asn,
        interface_index,
        peer_addr,
        local_addr,
        add_path: msg_type.is_add_path(),
        raw_message: data,
    })
}

fn read_bgp4mp_family(data: &mut Bytes) -> Result<AddrFamily, ParserError> {
    let afi = data.read_u16()?;
    AddrFamily::from_afi_safi(afi, Safi::Unicast as u8)
}
