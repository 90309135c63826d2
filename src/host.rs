use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_OUTPUT_EXTENSION;

/// Text encodings the host can select for output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

impl OutputEncoding {
    /// Parses an encoding name as written in an output directive.
    ///
    /// # Arguments
    /// * `name` - Encoding name, matched case-insensitively
    ///
    /// # Returns
    /// * `Option<Self>` - The encoding, or None for unknown names
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(OutputEncoding::Utf8),
            "utf-8-bom" | "utf8-bom" => Some(OutputEncoding::Utf8Bom),
            "utf-16" | "utf-16le" | "utf16le" => Some(OutputEncoding::Utf16Le),
            "utf-16be" | "utf16be" => Some(OutputEncoding::Utf16Be),
            _ => None,
        }
    }

    /// Encodes the text into the byte representation written to disk.
    ///
    /// Byte-order-marked encodings include their BOM.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            OutputEncoding::Utf8 => text.as_bytes().to_vec(),
            OutputEncoding::Utf8Bom => {
                let mut bytes = vec![0xEF, 0xBB, 0xBF];
                bytes.extend_from_slice(text.as_bytes());
                bytes
            }
            OutputEncoding::Utf16Le => {
                let mut bytes = vec![0xFF, 0xFE];
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                bytes
            }
            OutputEncoding::Utf16Be => {
                let mut bytes = vec![0xFE, 0xFF];
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
                bytes
            }
        }
    }
}

impl std::fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputEncoding::Utf8 => "utf-8",
            OutputEncoding::Utf8Bom => "utf-8-bom",
            OutputEncoding::Utf16Le => "utf-16le",
            OutputEncoding::Utf16Be => "utf-16be",
        };
        write!(f, "{s}")
    }
}

/// Host collaborator supplying per-template output decisions.
///
/// The engine pushes decisions found inside the template back to the host
/// through the setters; the orchestrator reads them after the transform.
pub trait EngineHost {
    /// Path of the template this host was built for.
    fn template_path(&self) -> &Path;

    /// Extension for the output file, with a leading dot.
    fn file_extension(&self) -> String;

    /// Encoding for the output file; None means plain UTF-8.
    fn encoding(&self) -> Option<OutputEncoding>;

    /// Replaces the output extension.
    fn set_file_extension(&self, extension: &str);

    /// Replaces the output encoding.
    fn set_encoding(&self, encoding: OutputEncoding);
}

/// Per-file host used by the command-line orchestrator.
pub struct CommandLineEngineHost {
    template_path: PathBuf,
    file_extension: RefCell<String>,
    encoding: Cell<Option<OutputEncoding>>,
}

impl CommandLineEngineHost {
    /// Creates a host for the given template with default output decisions.
    pub fn new<P: AsRef<Path>>(template_path: P) -> Self {
        Self {
            template_path: template_path.as_ref().to_path_buf(),
            file_extension: RefCell::new(DEFAULT_OUTPUT_EXTENSION.to_string()),
            encoding: Cell::new(None),
        }
    }

    /// Replaces the default extension before the engine runs.
    pub fn with_file_extension(self, extension: &str) -> Self {
        *self.file_extension.borrow_mut() = normalize_extension(extension);
        self
    }
}

/// Extensions are stored with a leading dot regardless of how the template
/// spelled them.
fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

impl EngineHost for CommandLineEngineHost {
    fn template_path(&self) -> &Path {
        &self.template_path
    }

    fn file_extension(&self) -> String {
        self.file_extension.borrow().clone()
    }

    fn encoding(&self) -> Option<OutputEncoding> {
        self.encoding.get()
    }

    fn set_file_extension(&self, extension: &str) {
        *self.file_extension.borrow_mut() = normalize_extension(extension);
    }

    fn set_encoding(&self, encoding: OutputEncoding) {
        self.encoding.set(Some(encoding));
    }
}
