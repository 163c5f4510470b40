/*!
RIB record decoding: TABLE_DUMP (RFC 6396 section 4.2), the TABLE_DUMP_V2
RIB subtypes (section 4.3), and the deprecated BGP4MP_ENTRY form.

All three produce a [`RibSnapshot`]. The legacy single-entry forms embed
the peer carried in the record body in [`RibSnapshot::peer`]; the V2 forms
leave it `None` and reference the peer index table instead.
*/
use crate::error::ParserError;
use crate::models::*;
use crate::parser::attributes::parse_path_attributes;
use crate::parser::nlri::parse_nlri_prefix;
use crate::parser::ReadUtils;
use bytes::Bytes;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr};

///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         View Number           |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Prefix (variable)                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Prefix Length |    Status     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Originated Time                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Peer IP Address (variable)                 |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           Peer AS             |       Attribute Length        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   BGP Attribute... (variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
pub fn parse_table_dump(sub_type: u16, mut data: Bytes) -> Result<RibSnapshot, ParserError> {
    let family = match sub_type {
        1 => AddrFamily::Ipv4,
        2 => AddrFamily::Ipv6,
        _ => {
            return Err(ParserError::Unsupported(format!(
                "unknown TABLE_DUMP subtype: {sub_type}"
            )))
        }
    };

    let _view_number = data.read_u16()?;
    let sequence_number = data.read_u16()? as u32;

    // fixed-width prefix address followed by a separate length octet, not
    // the NLRI encoding
    let prefix_addr = data.read_address(family)?;
    let prefix_len = data.read_u8()?;
    let prefix = match prefix_addr {
        IpAddr::V4(addr) => Ipv4Net::new(addr, prefix_len).map(IpNet::V4),
        IpAddr::V6(addr) => Ipv6Net::new(addr, prefix_len).map(IpNet::V6),
    }
    .map_err(|_| {
        ParserError::InvalidPrefixLength(format!("invalid prefix length {prefix_len}"))
    })?;

    let _status = data.read_u8()?;
    let originated_time = data.read_u32()?;

    let peer_address = data.read_address(family)?;
    let peer_asn = data.read_asn(AsnLength::Bits16)?;

    let attribute_length = data.read_u16()? as usize;
    let attr_data = data.read_n_bytes(attribute_length)?;
    let attributes = parse_path_attributes(attr_data, family, false)?;

    Ok(RibSnapshot {
        sequence_number,
        prefix: NetworkPrefix::new(prefix, None),
        add_path: false,
        entries: vec![RibEntry {
            peer_index: 0,
            originated_time,
            path_id: None,
            attributes,
        }],
        peer: Some(Peer::new(Ipv4Addr::UNSPECIFIED, peer_address, peer_asn)),
    })
}

/// TABLE_DUMP_V2 AFI-specific RIB record, with or without add-path.
pub fn parse_rib_afi_entries(
    data: &mut Bytes,
    rib_type: TableDumpV2Type,
) -> Result<RibSnapshot, ParserError> {
    let family = match rib_type {
        TableDumpV2Type::RibIpv4Unicast
        | TableDumpV2Type::RibIpv4Multicast
        | TableDumpV2Type::RibIpv4UnicastAddPath
        | TableDumpV2Type::RibIpv4MulticastAddPath => AddrFamily::Ipv4,
        TableDumpV2Type::RibIpv6Unicast
        | TableDumpV2Type::RibIpv6Multicast
        | TableDumpV2Type::RibIpv6UnicastAddPath
        | TableDumpV2Type::RibIpv6MulticastAddPath => AddrFamily::Ipv6,
        ty => {
            return Err(ParserError::Unsupported(format!(
                "not an AFI-specific RIB subtype: {ty:?}"
            )))
        }
    };
    let add_path = rib_type.is_add_path();

    let sequence_number = data.read_u32()?;
    let prefix = parse_nlri_prefix(data, family)?;
    let entry_count = data.read_u16()?;

    let mut entries = Vec::with_capacity(entry_count as usize);
    for _i in 0..entry_count {
        entries.push(parse_rib_entry(data, add_path, family)?);
    }

    Ok(RibSnapshot {
        sequence_number,
        prefix,
        add_path,
        entries,
        peer: None,
    })
}

/// TABLE_DUMP_V2 RIB_GENERIC record: the address family travels in the
/// record as an explicit AFI/SAFI pair ahead of the NLRI.
pub fn parse_rib_generic_entries(
    data: &mut Bytes,
    add_path: bool,
) -> Result<RibSnapshot, ParserError> {
    let sequence_number = data.read_u32()?;
    let afi = data.read_u16()?;
    let safi = data.read_u8()?;
    let family = AddrFamily::from_afi_safi(afi, safi)?;

    let prefix = parse_nlri_prefix(data, family)?;
    let entry_count = data.read_u16()?;

    let mut entries = Vec::with_capacity(entry_count as usize);
    for _i in 0..entry_count {
        entries.push(parse_rib_entry(data, add_path, family)?);
    }

    Ok(RibSnapshot {
        sequence_number,
        prefix,
        add_path,
        entries,
        peer: None,
    })
}

fn parse_rib_entry(
    data: &mut Bytes,
    add_path: bool,
    family: AddrFamily,
) -> Result<RibEntry, ParserError> {
    data.require_n_remaining(8, "rib entry")?;

    let peer_index = data.read_u16()?;
    let originated_time = data.read_u32()?;
    let path_id = match add_path {
        true => Some(data.read_u32()?),
        false => None,
    };
    let attribute_length = data.read_u16()? as usize;

    let attr_data = data.read_n_bytes(attribute_length)?;
    // V2 RIB entries always encode AS_PATH with 4-byte AS numbers
    let attributes = parse_path_attributes(attr_data, family, true)?;

    Ok(RibEntry {
        peer_index,
        originated_time,
        path_id,
        attributes,
    })
}

/// Deprecated BGP4MP_ENTRY record: a single RIB entry with the peer
/// carried inline. The destination address of the record is the peer.
pub fn parse_bgp4mp_entry(mut data: Bytes) -> Result<RibSnapshot, ParserError> {
    let _source_as = data.read_u16()?;
    let dest_as = data.read_asn(AsnLength::Bits16)?;
    let _interface_index = data.read_u16()?;

    let header_afi = data.read_u16()?;
    let header_family = AddrFamily::from_afi_safi(header_afi, Safi::Unicast as u8)?;
    let _source_addr = data.read_address(header_family)?;
    let dest_addr = data.read_address(header_family)?;

    let _view_number = data.read_u16()?;
    let _status = data.read_u16()?;
    let originated_time = data.read_u32()?;

    let afi = data.read_u16()?;
    let safi = data.read_u8()?;
    let family = AddrFamily::from_afi_safi(afi, safi)?;

    // next hop is length-prefixed; keep it only if it spans a full address
    // of the record's family
    let next_hop_length = data.read_u8()? as usize;
    let mut next_hop_bytes = data.read_n_bytes(next_hop_length)?;
    let next_hop = match next_hop_length >= family.addr_width() {
        true => Some(next_hop_bytes.read_address(family)?),
        false => None,
    };

    let prefix = parse_nlri_prefix(&mut data, family)?;

    let attribute_length = data.read_u16()? as usize;
    let attr_data = data.read_n_bytes(attribute_length)?;
    let mut attributes = parse_path_attributes(attr_data, family, false)?;
    if attributes.next_hop.is_none() {
        attributes.next_hop = next_hop;
    }

    Ok(RibSnapshot {
        sequence_number: 0,
        prefix,
        add_path: false,
        entries: vec![RibEntry {
            peer_index: 0,
            originated_time,
            path_id: None,
            attributes,
        }],
        peer: Some(Peer::new(Ipv4Addr::UNSPECIFIED, dest_addr, dest_as)),
    })
}
