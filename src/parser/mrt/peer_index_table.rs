/*!
PEER_INDEX_TABLE decoding, RFC 6396 section 4.3.1.
*/
use crate::error::ParserError;
use crate::models::{AddrFamily, AsnLength, Peer, PeerIndexTable, PeerType};
use crate::parser::ReadUtils;
use bytes::Bytes;
use std::net::Ipv4Addr;

/// Decode a PEER_INDEX_TABLE payload into the ordered peer list that
/// subsequent RIB records reference by index.
pub fn parse_peer_index_table(data: &mut Bytes) -> Result<PeerIndexTable, ParserError> {
    let collector_bgp_id = Ipv4Addr::from(data.read_u32()?);
    let view_name_length = data.read_u16()?;
    // the view name is opaque bytes, not necessarily UTF-8 and not
    // null-terminated
    let view_name = data.read_n_bytes(view_name_length as usize)?.to_vec();

    let peer_count = data.read_u16()?;
    let mut peers = vec![];
    for _index in 0..peer_count {
        let peer_type = PeerType::from_bits_retain(data.read_u8()?);
        let family = match peer_type.contains(PeerType::ADDRESS_FAMILY_IPV6) {
            true => AddrFamily::Ipv6,
            false => AddrFamily::Ipv4,
        };
        let asn_len = match peer_type.contains(PeerType::AS_SIZE_32BIT) {
            true => AsnLength::Bits32,
            false => AsnLength::Bits16,
        };

        let peer_bgp_id = Ipv4Addr::from(data.read_u32()?);
        let peer_address = data.read_address(family)?;
        let peer_asn = data.read_asn(asn_len)?;
        peers.push(Peer {
            peer_type,
            peer_bgp_id,
            peer_address,
            peer_asn,
        })
    }

    Ok(PeerIndexTable {
        collector_bgp_id,
        view_name,
        peers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asn;
    use std::net::IpAddr;
    use std::str::FromStr;

    #[test]
    fn test_empty_table() {
        let mut data = Bytes::from_static(&[
            0x01, 0x02, 0x03, 0x04, // collector bgp id
            0x00, 0x00, // view name length 0
            0x00, 0x00, // peer count 0
        ]);
        let table = parse_peer_index_table(&mut data).unwrap();
        assert_eq!(table.collector_bgp_id, Ipv4Addr::from_str("1.2.3.4").unwrap());
        assert!(table.view_name.is_empty());
        assert!(table.peers.is_empty());
    }

    #[test]
    fn test_peers_keep_input_order() {
        let mut raw = vec![
            0x0A, 0x00, 0x00, 0x01, // collector
            0x00, 0x04, // view name length
            b'r', b'r', b'c', b'0', // view name
            0x00, 0x03, // peer count
        ];
        // peer 0: IPv4 address, 16-bit ASN
        raw.extend_from_slice(&[0x00, 0x0A, 0x00, 0x00, 0x02, 10, 0, 0, 3, 0x00, 0x64]);
        // peer 1: IPv4 address, 32-bit ASN
        raw.extend_from_slice(&[
            0x02, 0x0A, 0x00, 0x00, 0x04, 10, 0, 0, 5, 0x00, 0x03, 0x28, 0x78,
        ]);
        // peer 2: IPv6 address, 32-bit ASN
        raw.extend_from_slice(&[0x03, 0x0A, 0x00, 0x00, 0x06]);
        raw.extend_from_slice(&std::net::Ipv6Addr::from_str("2001:db8::1").unwrap().octets());
        raw.extend_from_slice(&[0x00, 0x00, 0xFD, 0xE8]);

        let mut data = Bytes::from(raw);
        let table = parse_peer_index_table(&mut data).unwrap();
        assert_eq!(table.view_name_lossy(), "rrc0");
        assert_eq!(table.peers.len(), 3);

        assert_eq!(table.peers[0].peer_asn, Asn::new_16bit(100));
        assert_eq!(
            table.peers[0].peer_address,
            IpAddr::from_str("10.0.0.3").unwrap()
        );
        assert_eq!(table.peers[1].peer_asn, Asn::new_32bit(207_992));
        assert_eq!(
            table.peers[2].peer_address,
            IpAddr::from_str("2001:db8::1").unwrap()
        );
        assert_eq!(
            table.get_peer_by_id(2).unwrap().peer_bgp_id,
            Ipv4Addr::from_str("10.0.0.6").unwrap()
        );
        assert!(table.get_peer_by_id(3).is_none());
    }

    #[test]
    fn test_truncated_peer_entry() {
        let mut data = Bytes::from_static(&[
            0x0A, 0x00, 0x00, 0x01, //
            0x00, 0x00, //
            0x00, 0x01, // one peer claimed
            0x00, 0x0A, 0x00, // cut mid bgp id
        ]);
        assert!(matches!(
            parse_peer_index_table(&mut data),
            Err(ParserError::TruncatedMsg(_))
        ));
    }

    #[test]
    fn test_truncated_view_name() {
        let mut data = Bytes::from_static(&[
            0x0A, 0x00, 0x00, 0x01, //
            0x00, 0x08, // view name claims 8 bytes
            b'a', b'b', // carries 2
        ]);
        assert!(matches!(
            parse_peer_index_table(&mut data),
            Err(ParserError::TruncatedMsg(_))
        ));
    }
}
