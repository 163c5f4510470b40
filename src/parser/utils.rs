/*!
Bounds-checked sequential reads over an in-memory byte span.

All decoders operate on [`Bytes`] payload buffers through the [`ReadUtils`]
extension trait. Every read checks the remaining length first and fails with
[`ParserError::TruncatedMsg`]; multi-byte integers are big-endian.
*/
use crate::error::ParserError;
use crate::models::{AddrFamily, Asn, AsnLength};
use bytes::{Buf, Bytes};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub trait ReadUtils {
    fn require_n_remaining(&self, n: usize, target: &str) -> Result<(), ParserError>;

    fn read_u8(&mut self) -> Result<u8, ParserError>;
    fn read_u16(&mut self) -> Result<u16, ParserError>;
    fn read_u32(&mut self) -> Result<u32, ParserError>;
    fn read_u64(&mut self) -> Result<u64, ParserError>;

    /// Split off the next `n` bytes as an owned, reference-counted slice.
    fn read_n_bytes(&mut self, n: usize) -> Result<Bytes, ParserError>;

    fn skip_n_bytes(&mut self, n: usize) -> Result<(), ParserError>;

    /// Look at a byte ahead of the cursor without consuming it.
    fn peek_u8(&self, offset: usize) -> Result<u8, ParserError>;

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError>;
    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError>;

    /// Read a fixed-width address of the given family. For the VPN families
    /// the 8-byte route distinguisher is skipped and only the address
    /// portion is returned.
    fn read_address(&mut self, family: AddrFamily) -> Result<IpAddr, ParserError>;

    fn read_asn(&mut self, as_length: AsnLength) -> Result<Asn, ParserError>;
}

impl ReadUtils for Bytes {
    fn require_n_remaining(&self, n: usize, target: &str) -> Result<(), ParserError> {
        if self.remaining() < n {
            return Err(ParserError::TruncatedMsg(format!(
                "truncated {target}: {n} bytes needed, {} remaining",
                self.remaining()
            )));
        }
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8, ParserError> {
        self.require_n_remaining(1, "u8")?;
        Ok(self.get_u8())
    }

    fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.require_n_remaining(2, "u16")?;
        Ok(self.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.require_n_remaining(4, "u32")?;
        Ok(self.get_u32())
    }

    fn read_u64(&mut self) -> Result<u64, ParserError> {
        self.require_n_remaining(8, "u64")?;
        Ok(self.get_u64())
    }

    fn read_n_bytes(&mut self, n: usize) -> Result<Bytes, ParserError> {
        self.require_n_remaining(n, "bytes")?;
        Ok(self.split_to(n))
    }

    fn skip_n_bytes(&mut self, n: usize) -> Result<(), ParserError> {
        self.require_n_remaining(n, "bytes")?;
        self.advance(n);
        Ok(())
    }

    fn peek_u8(&self, offset: usize) -> Result<u8, ParserError> {
        self.require_n_remaining(offset + 1, "peeked byte")?;
        Ok(self[offset])
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        self.require_n_remaining(4, "IPv4 address")?;
        Ok(Ipv4Addr::from(self.get_u32()))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.require_n_remaining(16, "IPv6 address")?;
        Ok(Ipv6Addr::from(self.get_u128()))
    }

    fn read_address(&mut self, family: AddrFamily) -> Result<IpAddr, ParserError> {
        match family {
            AddrFamily::Ipv4 => self.read_ipv4_address().map(IpAddr::V4),
            AddrFamily::Ipv6 => self.read_ipv6_address().map(IpAddr::V6),
            AddrFamily::Vpnv4 => {
                self.require_n_remaining(12, "VPNv4 address")?;
                self.advance(8);
                self.read_ipv4_address().map(IpAddr::V4)
            }
            AddrFamily::Vpnv6 => {
                self.require_n_remaining(24, "VPNv6 address")?;
                self.advance(8);
                self.read_ipv6_address().map(IpAddr::V6)
            }
        }
    }

    fn read_asn(&mut self, as_length: AsnLength) -> Result<Asn, ParserError> {
        match as_length {
            AsnLength::Bits16 => Ok(Asn::new_16bit(self.read_u16()?)),
            AsnLength::Bits32 => Ok(Asn::new_32bit(self.read_u32()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_integer_reads_are_big_endian() {
        let mut data = Bytes::from_static(&[
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
            0x0F,
        ]);
        assert_eq!(data.read_u8().unwrap(), 0x01);
        assert_eq!(data.read_u16().unwrap(), 0x0203);
        assert_eq!(data.read_u32().unwrap(), 0x0405_0607);
        assert_eq!(data.read_u64().unwrap(), 0x0809_0A0B_0C0D_0E0F);
        assert!(data.read_u8().is_err());
    }

    #[test]
    fn test_underflow_is_truncated() {
        let mut data = Bytes::from_static(&[0x01, 0x02]);
        assert!(matches!(
            data.read_u32(),
            Err(ParserError::TruncatedMsg(_))
        ));
        // a failed bounds check consumes nothing
        assert_eq!(data.read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut data = Bytes::from_static(&[0xAA, 0xBB]);
        assert_eq!(data.peek_u8(1).unwrap(), 0xBB);
        assert_eq!(data.read_u8().unwrap(), 0xAA);
        assert!(data.peek_u8(1).is_err());
    }

    #[test]
    fn test_read_n_bytes_splits() {
        let mut data = Bytes::from_static(&[1, 2, 3, 4, 5]);
        let head = data.read_n_bytes(3).unwrap();
        assert_eq!(head.as_ref(), &[1, 2, 3]);
        assert_eq!(data.remaining(), 2);
        assert!(data.read_n_bytes(3).is_err());
    }

    #[test]
    fn test_vpn_addresses_skip_route_distinguisher() {
        let mut raw = vec![0u8; 8];
        raw.extend_from_slice(&[10, 0, 0, 1]);
        let mut data = Bytes::from(raw);
        let addr = data.read_address(AddrFamily::Vpnv4).unwrap();
        assert_eq!(addr, IpAddr::from_str("10.0.0.1").unwrap());
        assert_eq!(data.remaining(), 0);

        let mut raw = vec![0u8; 8];
        raw.extend_from_slice(&Ipv6Addr::from_str("2001:db8::1").unwrap().octets());
        let mut data = Bytes::from(raw);
        let addr = data.read_address(AddrFamily::Vpnv6).unwrap();
        assert_eq!(addr, IpAddr::from_str("2001:db8::1").unwrap());
    }

    #[test]
    fn test_read_asn_widths() {
        let mut data = Bytes::from_static(&[0x00, 0x64, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(data.read_asn(AsnLength::Bits16).unwrap(), Asn::new_16bit(100));
        assert_eq!(
            data.read_asn(AsnLength::Bits32).unwrap(),
            Asn::new_32bit(0x0001_0000)
        );
    }
}
