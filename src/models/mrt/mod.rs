//! MRT record framing types and the decoded record model.

pub mod bgp4mp;
pub mod rib;

pub use bgp4mp::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
pub use rib::*;

/// A fully decoded MRT record: the common header plus the decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct MrtRecord {
    pub common_header: CommonHeader,
    pub body: MrtBody,
}

/// The decoded body of one MRT record.
#[derive(Debug, Clone, PartialEq)]
pub enum MrtBody {
    PeerIndexTable(PeerIndexTable),
    Rib(RibSnapshot),
    StateChange(StateChange),
    Message(BgpMessageRecord),
}

/// MRT common header.
///
/// A CommonHeader ([RFC6396 section 2][header-link]) is constructed as the
/// following:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             Type              |            Subtype            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             Length                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Record types with the `_ET` suffix carry an extra 4-byte microsecond
/// timestamp as the first field of the payload; the framer consumes it into
/// `microsecond_timestamp` before body decoding. `length` always holds the
/// wire value, microseconds included.
///
/// [header-link]: https://datatracker.ietf.org/doc/html/rfc6396#section-2
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CommonHeader {
    pub timestamp: u32,
    pub microsecond_timestamp: Option<u32>,
    pub entry_type: EntryType,
    pub entry_subtype: u16,
    pub length: u32,
}

/// MRT record type.
///
/// Types 0 to 10 are deprecated and skipped during parsing.
///
/// Excerpt from [RFC6396 section 4](https://datatracker.ietf.org/doc/html/rfc6396#section-4):
/// ```text
///     11   OSPFv2
///     12   TABLE_DUMP
///     13   TABLE_DUMP_V2
///     16   BGP4MP
///     17   BGP4MP_ET
///     32   ISIS
///     33   ISIS_ET
///     48   OSPFv3
///     49   OSPFv3_ET
/// ```
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum EntryType {
    // START DEPRECATED
    NULL = 0,
    START = 1,
    DIE = 2,
    I_AM_DEAD = 3,
    PEER_DOWN = 4,
    BGP = 5,
    RIP = 6,
    IDRP = 7,
    RIPNG = 8,
    BGP4PLUS = 9,
    BGP4PLUS_01 = 10,
    // END DEPRECATED
    OSPFv2 = 11,
    TABLE_DUMP = 12,
    TABLE_DUMP_V2 = 13,
    BGP4MP = 16,
    BGP4MP_ET = 17,
    ISIS = 32,
    ISIS_ET = 33,
    OSPFv3 = 48,
    OSPFv3_ET = 49,
}

impl EntryType {
    /// Deprecated by RFC 6396; such records are skipped, not decoded.
    pub const fn is_deprecated(&self) -> bool {
        (*self as u16) <= 10
    }

    /// Whether the record payload starts with a microsecond timestamp field.
    pub const fn has_microseconds(&self) -> bool {
        matches!(
            self,
            EntryType::BGP4MP_ET | EntryType::ISIS_ET | EntryType::OSPFv3_ET
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_classification() {
        assert!(EntryType::I_AM_DEAD.is_deprecated());
        assert!(EntryType::BGP4PLUS.is_deprecated());
        assert!(!EntryType::TABLE_DUMP.is_deprecated());
        assert!(EntryType::BGP4MP_ET.has_microseconds());
        assert!(!EntryType::BGP4MP.has_microseconds());
    }

    #[test]
    fn test_entry_type_from_wire() {
        assert_eq!(EntryType::try_from(13u16).unwrap(), EntryType::TABLE_DUMP_V2);
        assert_eq!(EntryType::try_from(17u16).unwrap(), EntryType::BGP4MP_ET);
        assert!(EntryType::try_from(14u16).is_err());
    }
}
