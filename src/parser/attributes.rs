/*!
BGP path attribute extraction.

Walks the attribute TLVs of one RIB entry, pulls the well-known attributes
into typed fields, normalizes every AS path to 4-byte-ASN encoding, and
keeps everything else as raw bytes. See RFC 4271 section 4.3 for the TLV
layout and RFC 4760 section 3 for MP_REACH_NLRI.
*/
use crate::error::ParserError;
use crate::models::{AddrFamily, AttrFlags, AttrRaw, AttrType, PathAttributes};
use crate::parser::ReadUtils;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::debug;
use std::net::IpAddr;

/// Unrecognized attributes beyond this count fail the whole record.
const MAX_UNKNOWN_ATTRS: usize = 254;

/// Parse the complete attribute span of one RIB entry.
///
/// `as4_path` is true when the surrounding record format already encodes
/// AS_PATH with 4-byte AS numbers (TABLE_DUMP_V2); otherwise AS_PATH
/// payloads are inflated from the 2-byte encoding.
pub fn parse_path_attributes(
    mut data: Bytes,
    family: AddrFamily,
    as4_path: bool,
) -> Result<PathAttributes, ParserError> {
    let mut attrs = PathAttributes::default();

    while data.remaining() > 0 {
        // window over the full TLV so unrecognized attributes keep their
        // header bytes
        let tlv = data.clone();

        data.require_n_remaining(3, "attribute header")?;
        let flags = AttrFlags::from_bits_retain(data.get_u8());
        let type_code = data.get_u8();
        let (attr_length, header_length) = match flags.contains(AttrFlags::EXTENDED) {
            true => (data.read_u16()? as usize, 4),
            false => (data.get_u8() as usize, 3),
        };

        data.require_n_remaining(attr_length, "attribute value")?;
        let mut attr_data = data.split_to(attr_length);

        debug!("reading attribute: type -- {type_code}, length -- {attr_length}");

        match AttrType::try_from(type_code) {
            Ok(AttrType::ORIGIN) => {
                require_attr_len(attr_length, 1, "ORIGIN")?;
                attrs.origin = Some(attr_data.get_u8());
            }
            Ok(AttrType::AS_PATH) => {
                attrs.as_path = Some(match as4_path {
                    true => attr_data,
                    false => inflate_as_path(&attr_data)?,
                });
            }
            Ok(AttrType::NEXT_HOP) => {
                require_attr_len(attr_length, 4, "NEXT_HOP")?;
                // only meaningful for plain IPv4 records; other families
                // get their next hop from MP_REACH_NLRI
                if family == AddrFamily::Ipv4 {
                    attrs.next_hop = Some(IpAddr::V4(attr_data.read_ipv4_address()?));
                }
            }
            Ok(AttrType::MULTI_EXIT_DISC) => {
                require_attr_len(attr_length, 4, "MULTI_EXIT_DISC")?;
                attrs.med = Some(attr_data.get_u32());
            }
            Ok(AttrType::LOCAL_PREF) => {
                require_attr_len(attr_length, 4, "LOCAL_PREF")?;
                attrs.local_pref = Some(attr_data.get_u32());
            }
            Ok(AttrType::MP_REACH_NLRI) => {
                if let Some(addr) = parse_mp_reach_next_hop(attr_data, family)? {
                    attrs.next_hop = Some(addr);
                }
            }
            Ok(AttrType::AS4_PATH) if !as4_path => {
                // already 4-byte encoded; replaces whatever AS_PATH stored
                attrs.as_path = Some(attr_data);
            }
            // AS4_PATH in an as4 record falls through and is preserved raw
            _ => {
                if attrs.unknown.len() >= MAX_UNKNOWN_ATTRS {
                    return Err(ParserError::TooManyAttributes);
                }
                attrs.unknown.push(AttrRaw {
                    attr_type: type_code,
                    bytes: tlv.slice(0..header_length + attr_length),
                });
            }
        }
    }

    Ok(attrs)
}

fn require_attr_len(actual: usize, expected: usize, name: &str) -> Result<(), ParserError> {
    if actual != expected {
        return Err(ParserError::TruncatedMsg(format!(
            "bad {name} attribute length: expected {expected}, got {actual}"
        )));
    }
    Ok(())
}

/// Inflate an AS path from 2-byte to 4-byte AS number encoding.
///
/// The input is a sequence of `{seg_type, seg_len, seg_len x 2-byte ASN}`
/// segments; the output carries the same segments with each ASN
/// zero-extended to 4 bytes. Runs a sizing pass first so the output is
/// allocated exactly once.
pub fn inflate_as_path(data: &[u8]) -> Result<Bytes, ParserError> {
    let mut idx = 0usize;
    let mut out_len = 0usize;
    while idx < data.len() {
        let seg_len = *data.get(idx + 1).ok_or_else(|| {
            ParserError::TruncatedMsg("truncated AS path segment header".to_string())
        })? as usize;
        if data.len() - idx < 2 + seg_len * 2 {
            return Err(ParserError::TruncatedMsg(
                "AS path segment overruns attribute".to_string(),
            ));
        }
        out_len += 2 + seg_len * 4;
        idx += 2 + seg_len * 2;
    }

    let mut out = BytesMut::with_capacity(out_len);
    let mut idx = 0usize;
    while idx < data.len() {
        let seg_len = data[idx + 1] as usize;
        out.put_u8(data[idx]);
        out.put_u8(data[idx + 1]);
        for asn in 0..seg_len {
            let off = idx + 2 + asn * 2;
            out.put_u32(u16::from_be_bytes([data[off], data[off + 1]]) as u32);
        }
        idx += 2 + seg_len * 2;
    }
    Ok(out.freeze())
}

/// Extract the next-hop address from an MP_REACH_NLRI payload.
///
/// Two encodings are in the wild: RFC 6396 section 4.3.4 strips the
/// attribute down to `{nh_len, next_hop}`, while many collectors archive
/// the full RFC 4760 form with a leading AFI/SAFI/reserved prelude. If the
/// first payload byte equals the remaining payload length minus one it can
/// only be the stripped form; otherwise the 3-byte prelude is skipped.
///
/// IPv4 records take their next hop from NEXT_HOP instead and return
/// `None` here.
fn parse_mp_reach_next_hop(
    mut data: Bytes,
    family: AddrFamily,
) -> Result<Option<IpAddr>, ParserError> {
    if family == AddrFamily::Ipv4 {
        return Ok(None);
    }

    if data.peek_u8(0)? as usize != data.remaining() - 1 {
        data.skip_n_bytes(3)?;
    }

    let nh_len = data.read_u8()? as usize;
    let mut next_hop = data.read_n_bytes(nh_len)?;
    // an IPv6 next hop may carry a second, link-local address; only the
    // leading global address is kept
    Ok(Some(next_hop.read_address(family)?))
}
