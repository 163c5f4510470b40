/*!
NLRI-style prefix decoding for the four supported address families.

A wire prefix is a 1-byte bit length followed by that many bits rounded up
to whole bytes. VPN prefixes carry the 8-byte route distinguisher inside
the counted bits; the RD (and any label stack) is skipped and only the
address portion is kept.
*/
use crate::error::ParserError;
use crate::models::{AddrFamily, NetworkPrefix};
use crate::parser::ReadUtils;
use bytes::Bytes;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Read one prefix of the given family from the cursor.
pub fn parse_nlri_prefix(
    data: &mut Bytes,
    family: AddrFamily,
) -> Result<NetworkPrefix, ParserError> {
    let bit_len = data.read_u8()?;
    if bit_len as u16 > family.max_prefix_len() {
        return Err(ParserError::InvalidPrefixLength(format!(
            "invalid prefix length {bit_len} for {family:?}"
        )));
    }

    let byte_len = (bit_len as usize).div_ceil(8);
    let wire = data.read_n_bytes(byte_len)?;

    // For the VPN families the first 8 counted bytes are the route
    // distinguisher; the address starts after it.
    let (addr_bytes, addr_bit_len) = match family.is_vpn() {
        true => (
            wire.get(8..).unwrap_or(&[]),
            (bit_len as u16).saturating_sub(64) as u8,
        ),
        false => (wire.as_ref(), bit_len),
    };

    let prefix = match family {
        AddrFamily::Ipv4 | AddrFamily::Vpnv4 => {
            let mut buff = [0u8; 4];
            buff[..addr_bytes.len()].copy_from_slice(addr_bytes);
            Ipv4Net::new(Ipv4Addr::from(buff), addr_bit_len)
                .map(IpNet::V4)
                .map_err(|_| {
                    ParserError::InvalidPrefixLength(format!(
                        "invalid IPv4 prefix length {addr_bit_len}"
                    ))
                })?
        }
        AddrFamily::Ipv6 | AddrFamily::Vpnv6 => {
            let mut buff = [0u8; 16];
            buff[..addr_bytes.len()].copy_from_slice(addr_bytes);
            Ipv6Net::new(Ipv6Addr::from(buff), addr_bit_len)
                .map(IpNet::V6)
                .map_err(|_| {
                    ParserError::InvalidPrefixLength(format!(
                        "invalid IPv6 prefix length {addr_bit_len}"
                    ))
                })?
        }
    };

    Ok(NetworkPrefix::new(prefix, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ipv4_prefix() {
        let mut data = Bytes::from_static(&[0x18, 0x0A, 0x00, 0x00]);
        let prefix = parse_nlri_prefix(&mut data, AddrFamily::Ipv4).unwrap();
        assert_eq!(prefix, NetworkPrefix::from_str("10.0.0.0/24").unwrap());
        assert_eq!(data.len(), 0);
    }

    #[test]
    fn test_ipv4_host_route_and_default() {
        let mut data = Bytes::from_static(&[0x20, 0xC0, 0x00, 0x02, 0x01]);
        let prefix = parse_nlri_prefix(&mut data, AddrFamily::Ipv4).unwrap();
        assert_eq!(prefix, NetworkPrefix::from_str("192.0.2.1/32").unwrap());

        let mut data = Bytes::from_static(&[0x00]);
        let prefix = parse_nlri_prefix(&mut data, AddrFamily::Ipv4).unwrap();
        assert_eq!(prefix, NetworkPrefix::from_str("0.0.0.0/0").unwrap());
    }

    #[test]
    fn test_ipv6_prefix() {
        let mut data = Bytes::from_static(&[0x20, 0x20, 0x01, 0x0d, 0xb8]);
        let prefix = parse_nlri_prefix(&mut data, AddrFamily::Ipv6).unwrap();
        assert_eq!(prefix, NetworkPrefix::from_str("2001:db8::/32").unwrap());
    }

    #[test]
    fn test_prefix_length_exceeds_family_width() {
        let mut data = Bytes::from_static(&[0x21, 0x0A, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(
            parse_nlri_prefix(&mut data, AddrFamily::Ipv4),
            Err(ParserError::InvalidPrefixLength(_))
        ));

        let mut data = Bytes::from_static(&[0x81]);
        assert!(matches!(
            parse_nlri_prefix(&mut data, AddrFamily::Ipv6),
            Err(ParserError::InvalidPrefixLength(_))
        ));
    }

    #[test]
    fn test_truncated_prefix_body() {
        let mut data = Bytes::from_static(&[0x18, 0x0A]);
        assert!(matches!(
            parse_nlri_prefix(&mut data, AddrFamily::Ipv4),
            Err(ParserError::TruncatedMsg(_))
        ));
    }

    #[test]
    fn test_vpnv4_prefix_skips_rd() {
        // 88 bits: 8-byte RD then 10.1.0.0/24
        let mut raw = vec![88u8];
        raw.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
        raw.extend_from_slice(&[10, 1, 0]);
        let mut data = Bytes::from(raw);
        let prefix = parse_nlri_prefix(&mut data, AddrFamily::Vpnv4).unwrap();
        assert_eq!(prefix, NetworkPrefix::from_str("10.1.0.0/24").unwrap());
    }
}
