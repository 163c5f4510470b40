/*!
`mrt-decoder` parses archived BGP routing data in the MRT format
(RFC 6396, with the add-path extensions of RFC 8050): peer index tables,
RIB snapshots, BGP message traces, and FSM state transitions.

The decoder is a pull-based streaming parser. It reads framed records from
any [`Read`](std::io::Read) source, decodes them into fully owned values,
and hands them to per-class callbacks, or returns them one at a time
through [`MrtParser::next_record`].

# Example

Count the RIB entries of a table dump and resolve each entry's peer:

```no_run
use mrt_decoder::{MrtParser, RecordSinks};

let mut total = 0u64;
let mut parser = MrtParser::from_path(
    "http://archive.routeviews.org/route-views2/bgpdata/2024.01/RIBS/rib.20240101.0000.bz2",
).unwrap();
let mut sinks = RecordSinks::new().on_dump(|rib, peers| {
    for entry in &rib.entries {
        if let Some(peer) = peers.get_peer_by_id(entry.peer_index) {
            total += 1;
            let _ = (peer.peer_asn, &entry.attributes);
        }
    }
});
parser.parse(&mut sinks).unwrap();
println!("{total} rib entries");
```

Or trace session state changes from an updates archive:

```no_run
use mrt_decoder::{MrtParser, RecordSinks};

let mut parser = MrtParser::from_path("updates.20240101.0000.gz").unwrap();
let mut sinks = RecordSinks::new().on_state(|state| {
    println!(
        "{}: AS{} {} -> {}",
        state.peer_addr, state.peer_asn, state.old_state, state.new_state
    );
});
parser.parse(&mut sinks).unwrap();
```

# Supported records

| Type | Subtypes |
|------|----------|
| `TABLE_DUMP` (12) | AFI_IPv4, AFI_IPv6 |
| `TABLE_DUMP_V2` (13) | PEER_INDEX_TABLE, the per-AFI RIB subtypes, RIB_GENERIC, and their ADDPATH variants |
| `BGP4MP` / `BGP4MP_ET` (16/17) | STATE_CHANGE, STATE_CHANGE_AS4, the MESSAGE subtypes (AS4 / LOCAL / ADDPATH variants), and the deprecated ENTRY form |

Deprecated record types (0–10) and the unsupported IGP types are skipped.
Records damaged in record-local ways (truncation, unknown address family,
invalid prefix length) are dropped individually and parsing continues;
the stream never desynchronizes because each record's payload length comes
from its header.
*/

pub mod error;
#[cfg(feature = "oneio")]
pub(crate) mod io;
pub mod models;
pub mod parser;

pub use crate::error::ParserError;
pub use crate::models::*;
pub use crate::parser::{MrtParser, RecordSinks};
