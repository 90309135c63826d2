//! Transient entities carried through the per-file pipeline.

use std::path::{Path, PathBuf};

use crate::constants::{RAZOR_TEMPLATE_GLOB, T4_TEMPLATE_GLOB};
use crate::host::OutputEncoding;

/// The two template kinds the tool discovers and transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Preprocessor-style template (`*.tt`).
    T4,
    /// Markup-style template (`*.cshtml`).
    Razor,
}

impl TemplateKind {
    /// Glob pattern used to discover templates of this kind.
    pub fn glob_pattern(&self) -> &'static str {
        match self {
            TemplateKind::T4 => T4_TEMPLATE_GLOB,
            TemplateKind::Razor => RAZOR_TEMPLATE_GLOB,
        }
    }

    /// Builds the output path for a source template given the host's file
    /// extension.
    ///
    /// Preprocessor-style output replaces the source extension; markup-style
    /// output keeps the full source name, original extension included, and
    /// appends the host extension.
    pub fn output_path(&self, source_path: &Path, extension: &str) -> PathBuf {
        match self {
            TemplateKind::T4 => {
                source_path.with_extension(extension.trim_start_matches('.'))
            }
            TemplateKind::Razor => {
                let mut name = source_path.as_os_str().to_os_string();
                name.push(extension);
                PathBuf::from(name)
            }
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TemplateKind::T4 => "t4",
            TemplateKind::Razor => "razor",
        };
        write!(f, "{s}")
    }
}

/// A discovered template awaiting transformation.
#[derive(Debug)]
pub struct TemplateJob {
    pub source_path: PathBuf,
    /// File name without its final extension.
    pub stem: String,
    pub content: String,
}

/// The outcome of transforming a single template.
#[derive(Debug)]
pub struct TransformResult {
    pub output_path: PathBuf,
    pub output_text: String,
    /// Host-selected encoding; None means plain UTF-8.
    pub encoding: Option<OutputEncoding>,
}
