use crate::error::ParserError;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// AFI -- Address Family Identifier
///
/// <https://www.iana.org/assignments/address-family-numbers/address-family-numbers.xhtml>
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
}

/// SAFI -- Subsequent Address Family Identifier
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Safi {
    Unicast = 1,
    Multicast = 2,
    UnicastMulticast = 3,
    MplsVpn = 128,
}

/// The address families the decoder understands.
///
/// The VPN families carry an 8-byte route distinguisher (and, on the wire, a
/// label stack) ahead of the plain address. The decoder reads past the RD and
/// keeps only the address portion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddrFamily {
    Ipv4,
    Ipv6,
    Vpnv4,
    Vpnv6,
}

impl AddrFamily {
    /// Map a raw AFI/SAFI pair to a decode family.
    ///
    /// Used for RIB_GENERIC and BGP4MP_ENTRY records where the family is
    /// carried explicitly in the record body.
    pub fn from_afi_safi(afi: u16, safi: u8) -> Result<AddrFamily, ParserError> {
        match (Afi::try_from(afi), Safi::try_from(safi)) {
            (Ok(Afi::Ipv4), Ok(Safi::Unicast | Safi::Multicast | Safi::UnicastMulticast)) => {
                Ok(AddrFamily::Ipv4)
            }
            (Ok(Afi::Ipv6), Ok(Safi::Unicast | Safi::Multicast | Safi::UnicastMulticast)) => {
                Ok(AddrFamily::Ipv6)
            }
            (Ok(Afi::Ipv4), Ok(Safi::MplsVpn)) => Ok(AddrFamily::Vpnv4),
            (Ok(Afi::Ipv6), Ok(Safi::MplsVpn)) => Ok(AddrFamily::Vpnv6),
            _ => Err(ParserError::UnknownFamily(afi, safi)),
        }
    }

    /// Maximum prefix length in bits. VPN widths include the 64-bit route
    /// distinguisher that precedes the address on the wire.
    pub const fn max_prefix_len(&self) -> u16 {
        match self {
            AddrFamily::Ipv4 => 32,
            AddrFamily::Ipv6 => 128,
            AddrFamily::Vpnv4 => 96,
            AddrFamily::Vpnv6 => 192,
        }
    }

    /// Byte width of a plain (non-prefix) address of this family as it
    /// appears in fixed-width record fields, route distinguisher included.
    pub const fn addr_width(&self) -> usize {
        match self {
            AddrFamily::Ipv4 => 4,
            AddrFamily::Ipv6 => 16,
            AddrFamily::Vpnv4 => 12,
            AddrFamily::Vpnv6 => 24,
        }
    }

    pub const fn is_vpn(&self) -> bool {
        matches!(self, AddrFamily::Vpnv4 | AddrFamily::Vpnv6)
    }
}
