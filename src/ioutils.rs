use std::path::Path;

use crate::error::{Error, Result};
use crate::host::OutputEncoding;

/// Reads a whole template file as text.
pub fn read_template<P: AsRef<Path>>(path: P) -> Result<String> {
    std::fs::read_to_string(path).map_err(Error::IoError)
}

/// Writes transformed output, honoring the host-selected encoding.
///
/// # Arguments
/// * `dest_path` - Target file, created or overwritten
/// * `content` - Rendered text
/// * `encoding` - Host encoding; None writes plain UTF-8
pub fn write_output<P: AsRef<Path>>(
    dest_path: P,
    content: &str,
    encoding: Option<OutputEncoding>,
) -> Result<()> {
    match encoding {
        Some(encoding) => {
            std::fs::write(dest_path, encoding.encode(content)).map_err(Error::IoError)
        }
        None => std::fs::write(dest_path, content).map_err(Error::IoError),
    }
}
