/*!
Owned value types produced by the decoder.

Every decoded record is fully owned and independent of the payload buffer it
was parsed from; byte blobs (AS paths, raw attributes, raw BGP messages) are
reference-counted [`Bytes`](bytes::Bytes) owned by the record.
*/

mod attributes;
mod mrt;
mod network;

pub use attributes::*;
pub use mrt::*;
pub use network::*;
