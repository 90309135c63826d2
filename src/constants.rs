//! Constants used throughout the ttgen application

/// Glob pattern matching preprocessor-style templates
pub const T4_TEMPLATE_GLOB: &str = "**/*.tt";

/// Glob pattern matching markup-style templates
pub const RAZOR_TEMPLATE_GLOB: &str = "**/*.cshtml";

/// Default output extension when a template declares none
pub const DEFAULT_OUTPUT_EXTENSION: &str = ".txt";

/// Output extension for preprocessed template artifacts
pub const PREPROCESSED_OUTPUT_EXTENSION: &str = ".rs";

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}
