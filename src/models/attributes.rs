//! Decoded BGP path attribute block.

use bitflags::bitflags;
use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::net::IpAddr;

/// Path attribute type codes the decoder extracts into typed fields.
///
/// Every other type code is preserved raw in [`PathAttributes::unknown`].
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-2>
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum AttrType {
    ORIGIN = 1,
    AS_PATH = 2,
    NEXT_HOP = 3,
    MULTI_EXIT_DISC = 4,
    LOCAL_PREF = 5,
    MP_REACH_NLRI = 14,
    AS4_PATH = 17,
}

bitflags! {
    /// BGP attribute flags octet, RFC 4271 section 4.3.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct AttrFlags: u8 {
        const OPTIONAL = 0x80;
        const TRANSITIVE = 0x40;
        const PARTIAL = 0x20;
        const EXTENDED = 0x10;
    }
}

/// An attribute kept as raw bytes.
///
/// `bytes` holds the entire TLV as it appeared on the wire, flags, type and
/// length octets included, so a consumer can re-emit or inspect it without
/// loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrRaw {
    pub attr_type: u8,
    pub bytes: Bytes,
}

/// The decoded path attribute block of a single RIB entry.
///
/// Recognized attributes land in the typed fields; everything else is kept
/// in `unknown` in wire order. `as_path` is always in 4-byte-ASN segment
/// encoding: 2-byte paths are inflated during decoding, and an `AS4_PATH`
/// attribute replaces a previously stored `AS_PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathAttributes {
    pub origin: Option<u8>,
    pub as_path: Option<Bytes>,
    pub next_hop: Option<IpAddr>,
    pub med: Option<u32>,
    pub local_pref: Option<u32>,
    pub unknown: Vec<AttrRaw>,
}

impl PathAttributes {
    /// Number of attribute TLVs represented by this block, counting each
    /// recognized field once and each raw attribute once.
    pub fn attr_count(&self) -> usize {
        self.origin.is_some() as usize
            + self.as_path.is_some() as usize
            + self.next_hop.is_some() as usize
            + self.med.is_some() as usize
            + self.local_pref.is_some() as usize
            + self.unknown.len()
    }
}
