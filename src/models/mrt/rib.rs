//! RIB snapshot records and the peer index table.

use crate::models::*;
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr};

/// TableDump version 2 subtypes.
///
/// <https://www.iana.org/assignments/mrt/mrt.xhtml#subtype-codes>
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TableDumpV2Type {
    PeerIndexTable = 1,
    RibIpv4Unicast = 2,
    RibIpv4Multicast = 3,
    RibIpv6Unicast = 4,
    RibIpv6Multicast = 5,
    RibGeneric = 6,
    GeoPeerTable = 7,
    RibIpv4UnicastAddPath = 8,
    RibIpv4MulticastAddPath = 9,
    RibIpv6UnicastAddPath = 10,
    RibIpv6MulticastAddPath = 11,
    RibGenericAddPath = 12,
}

impl TableDumpV2Type {
    pub const fn is_add_path(&self) -> bool {
        matches!(
            self,
            TableDumpV2Type::RibIpv4UnicastAddPath
                | TableDumpV2Type::RibIpv4MulticastAddPath
                | TableDumpV2Type::RibIpv6UnicastAddPath
                | TableDumpV2Type::RibIpv6MulticastAddPath
                | TableDumpV2Type::RibGenericAddPath
        )
    }
}

bitflags! {
    /// Peer type octet in a PEER_INDEX_TABLE entry, RFC 6396 section 4.3.1.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct PeerType: u8 {
        const ADDRESS_FAMILY_IPV6 = 0x1;
        const AS_SIZE_32BIT = 0x2;
    }
}

/// One peer of the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Peer {
    pub peer_type: PeerType,
    pub peer_bgp_id: BgpIdentifier,
    pub peer_address: IpAddr,
    pub peer_asn: Asn,
}

impl Peer {
    pub fn new(peer_bgp_id: BgpIdentifier, peer_address: IpAddr, peer_asn: Asn) -> Self {
        let mut peer_type = PeerType::empty();
        if peer_asn.is_four_byte() {
            peer_type.insert(PeerType::AS_SIZE_32BIT);
        }
        if peer_address.is_ipv6() {
            peer_type.insert(PeerType::ADDRESS_FAMILY_IPV6);
        }
        Peer {
            peer_type,
            peer_bgp_id,
            peer_address,
            peer_asn,
        }
    }
}

/// Decoded PEER_INDEX_TABLE: collector identity plus the ordered peer list
/// that RIB entries reference by index.
///
/// The view name is kept as raw bytes exactly as received; it is not
/// required to be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIndexTable {
    pub collector_bgp_id: BgpIdentifier,
    pub view_name: Vec<u8>,
    pub peers: Vec<Peer>,
}

impl Default for PeerIndexTable {
    fn default() -> Self {
        PeerIndexTable {
            collector_bgp_id: Ipv4Addr::UNSPECIFIED,
            view_name: Vec::new(),
            peers: Vec::new(),
        }
    }
}

impl PeerIndexTable {
    /// A single-slot table backing the legacy record formats that carry
    /// their peer inline rather than by index.
    pub fn synthetic() -> Self {
        PeerIndexTable {
            collector_bgp_id: Ipv4Addr::UNSPECIFIED,
            view_name: Vec::new(),
            peers: vec![Peer::new(
                Ipv4Addr::UNSPECIFIED,
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                Asn::RESERVED,
            )],
        }
    }

    /// Get peer by its index table id.
    pub fn get_peer_by_id(&self, peer_id: u16) -> Option<&Peer> {
        self.peers.get(peer_id as usize)
    }

    /// The view name as text, replacing invalid UTF-8 sequences.
    pub fn view_name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.view_name)
    }
}

/// A decoded RIB record: one prefix and the per-peer paths known for it.
///
/// Produced from TABLE_DUMP_V2 RIB subtypes as well as from the legacy
/// TABLE_DUMP and BGP4MP_ENTRY formats; the legacy forms always carry
/// exactly one entry and embed their peer in `peer` instead of referencing
/// a peer index table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibSnapshot {
    pub sequence_number: u32,
    pub prefix: NetworkPrefix,
    pub add_path: bool,
    pub entries: Vec<RibEntry>,
    pub peer: Option<Peer>,
}

/// Per-peer decoded path information of a RIB record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibEntry {
    pub peer_index: u16,
    pub originated_time: u32,
    pub path_id: Option<u32>,
    pub attributes: PathAttributes,
}
