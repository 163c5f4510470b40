/*!
Error types used across the decoder.
*/
use crate::models::{Bgp4MpType, EntryType, TableDumpV2Type};
use num_enum::TryFromPrimitiveError;
#[cfg(feature = "oneio")]
use oneio::OneIoError;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::{error::Error, fmt, io};

/// Decoder error.
///
/// The variants split into two classes with different handling in
/// [`MrtParser::parse`](crate::MrtParser::parse):
///
/// - *recoverable*: [`TruncatedMsg`](ParserError::TruncatedMsg),
///   [`UnknownFamily`](ParserError::UnknownFamily),
///   [`InvalidPrefixLength`](ParserError::InvalidPrefixLength),
///   [`ParseError`](ParserError::ParseError) and
///   [`Unsupported`](ParserError::Unsupported) discard the current record
///   and framing continues with the next one.
/// - *fatal*: [`TooManyAttributes`](ParserError::TooManyAttributes) and the
///   I/O variants abort the parse loop and surface to the caller.
#[derive(Debug)]
pub enum ParserError {
    IoError(io::Error),
    EofError(io::Error),
    #[cfg(feature = "oneio")]
    OneIoError(OneIoError),
    /// A bounds check failed while decoding a record.
    TruncatedMsg(String),
    /// An AFI/SAFI pair does not map to any supported address family.
    UnknownFamily(u16, u8),
    /// A prefix bit length exceeds the width of its address family.
    InvalidPrefixLength(String),
    /// A record entry carries more than 254 unrecognized path attributes.
    TooManyAttributes,
    ParseError(String),
    Unsupported(String),
}

impl Error for ParserError {}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::IoError(e) => write!(f, "Error: {e}"),
            ParserError::EofError(e) => write!(f, "Error: {e}"),
            #[cfg(feature = "oneio")]
            ParserError::OneIoError(e) => write!(f, "Error: {e}"),
            ParserError::TruncatedMsg(s) => write!(f, "Error: {s}"),
            ParserError::UnknownFamily(afi, safi) => {
                write!(f, "Error: unknown address family: afi {afi}, safi {safi}")
            }
            ParserError::InvalidPrefixLength(s) => write!(f, "Error: {s}"),
            ParserError::TooManyAttributes => {
                write!(f, "Error: more than 254 unrecognized path attributes")
            }
            ParserError::ParseError(s) => write!(f, "Error: {s}"),
            ParserError::Unsupported(s) => write!(f, "Error: {s}"),
        }
    }
}

impl ParserError {
    /// Whether the parse loop may drop the current record and continue.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ParserError::TruncatedMsg(_)
                | ParserError::UnknownFamily(_, _)
                | ParserError::InvalidPrefixLength(_)
                | ParserError::ParseError(_)
                | ParserError::Unsupported(_)
        )
    }
}

#[cfg(feature = "oneio")]
impl From<OneIoError> for ParserError {
    fn from(error: OneIoError) -> Self {
        ParserError::OneIoError(error)
    }
}

impl From<io::Error> for ParserError {
    fn from(io_error: io::Error) -> Self {
        match io_error.kind() {
            ErrorKind::UnexpectedEof => ParserError::EofError(io_error),
            _ => ParserError::IoError(io_error),
        }
    }
}

impl From<TryFromPrimitiveError<Bgp4MpType>> for ParserError {
    fn from(value: TryFromPrimitiveError<Bgp4MpType>) -> Self {
        ParserError::Unsupported(format!("unknown BGP4MP subtype: {}", value.number))
    }
}

impl From<TryFromPrimitiveError<TableDumpV2Type>> for ParserError {
    fn from(value: TryFromPrimitiveError<TableDumpV2Type>) -> Self {
        ParserError::Unsupported(format!("unknown TABLE_DUMP_V2 subtype: {}", value.number))
    }
}

impl From<TryFromPrimitiveError<EntryType>> for ParserError {
    fn from(value: TryFromPrimitiveError<EntryType>) -> Self {
        ParserError::Unsupported(format!("unknown MRT record type: {}", value.number))
    }
}
