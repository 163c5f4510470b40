//! Input helper: open local or remote, possibly compressed MRT files.

use crate::error::ParserError;
use std::io::Read;

/// Create a reader for the given path or URL. Compression is detected from
/// the file extension (`.gz`, `.bz2`) and handled transparently by `oneio`.
pub(crate) fn get_reader(path: &str) -> Result<Box<dyn Read + Send>, ParserError> {
    let reader = oneio::get_reader(path)?;
    Ok(reader)
}
