//! BGP4MP state-change and message records.

use crate::models::*;
use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;

/// BGP FSM states, RFC 4271 section 8.
///
/// State fields on [`StateChange`] are raw `u16` because archives do contain
/// out-of-range values and those pass through undisturbed; this enum names
/// the valid six for display and matching.
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BgpState {
    Idle = 1,
    Connect = 2,
    Active = 3,
    OpenSent = 4,
    OpenConfirm = 5,
    Established = 6,
}

impl Display for BgpState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BgpState::Idle => "Idle",
            BgpState::Connect => "Connect",
            BgpState::Active => "Active",
            BgpState::OpenSent => "OpenSent",
            BgpState::OpenConfirm => "OpenConfirm",
            BgpState::Established => "Established",
        };
        write!(f, "{name}")
    }
}

/// BGP4MP message subtypes.
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Bgp4MpType {
    StateChange = 0,
    Message = 1,
    Entry = 2,
    Snapshot = 3,
    MessageAs4 = 4,
    StateChangeAs4 = 5,
    MessageLocal = 6,
    MessageAs4Local = 7,
    MessageAddpath = 8,
    MessageAs4Addpath = 9,
    MessageLocalAddpath = 10,
    MessageLocalAs4Addpath = 11,
}

impl Bgp4MpType {
    pub const fn is_add_path(&self) -> bool {
        matches!(
            self,
            Bgp4MpType::MessageAddpath
                | Bgp4MpType::MessageAs4Addpath
                | Bgp4MpType::MessageLocalAddpath
                | Bgp4MpType::MessageLocalAs4Addpath
        )
    }

    pub const fn asn_length(&self) -> AsnLength {
        match self {
            Bgp4MpType::StateChangeAs4
            | Bgp4MpType::MessageAs4
            | Bgp4MpType::MessageAs4Local
            | Bgp4MpType::MessageAs4Addpath
            | Bgp4MpType::MessageLocalAs4Addpath => AsnLength::Bits32,
            _ => AsnLength::Bits16,
        }
    }
}

/// Record timestamp: whole seconds from the common header plus the
/// nanoseconds contributed by the `_ET` microsecond extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RecordTime {
    pub seconds: u32,
    pub nanoseconds: u32,
}

impl RecordTime {
    pub fn new(seconds: u32, microseconds: Option<u32>) -> Self {
        RecordTime {
            seconds,
            nanoseconds: microseconds.unwrap_or(0).wrapping_mul(1000),
        }
    }
}

/// A decoded BGP4MP STATE_CHANGE record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub timestamp: RecordTime,
    pub peer_asn: Asn,
    pub local_asn: Asn,
    pub interface_index: u16,
    pub peer_addr: IpAddr,
    pub local_addr: IpAddr,
    pub old_state: u16,
    pub new_state: u16,
}

/// A decoded BGP4MP MESSAGE record.
///
/// The wrapped BGP message is carried verbatim in `raw_message` and is not
/// parsed further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpMessageRecord {
    pub timestamp: RecordTime,
    pub peer_asn: Asn,
    pub local_asn: Asn,
    pub interface_index: u16,
    pub peer_addr: IpAddr,
    pub local_addr: IpAddr,
    pub add_path: bool,
    pub raw_message: Bytes,
}
