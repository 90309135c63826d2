use log::debug;
use std::path::{Path, PathBuf};

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::host::EngineHost;
use crate::ioutils::read_template;

use super::job::{TemplateJob, TemplateKind, TransformResult};

/// Identity of the running application, used for namespace computation and
/// as the default processing root.
#[derive(Debug, Clone)]
pub struct AppEnv {
    pub name: String,
    pub base_path: PathBuf,
}

impl AppEnv {
    pub fn new<P: AsRef<Path>>(name: &str, base_path: P) -> Self {
        Self { name: name.to_string(), base_path: base_path.as_ref().to_path_buf() }
    }

    /// AppEnv of the running binary: crate name plus working directory.
    pub fn current() -> Result<Self> {
        Ok(Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            base_path: std::env::current_dir()?,
        })
    }
}

/// Per-file pipeline: Read → Transform. Writing is left to the caller so the
/// orchestrator controls the console contract around it.
pub struct TemplateProcessor<'a> {
    app_env: &'a AppEnv,
    preprocess: bool,
}

impl<'a> TemplateProcessor<'a> {
    pub fn new(app_env: &'a AppEnv, preprocess: bool) -> Self {
        Self { app_env, preprocess }
    }

    /// Computes the namespace for a preprocessed artifact.
    ///
    /// The file's directory relative to the application base path becomes a
    /// dot-separated suffix of the application name. Files directly under
    /// the base path, or outside it, use the bare application name.
    pub fn namespace_for(&self, source_path: &Path) -> String {
        let parent = source_path.parent().unwrap_or_else(|| Path::new(""));
        let relative =
            parent.strip_prefix(&self.app_env.base_path).unwrap_or_else(|_| Path::new(""));

        let mut namespace = self.app_env.name.clone();
        for component in relative.components() {
            namespace.push('.');
            namespace.push_str(&component.as_os_str().to_string_lossy());
        }
        namespace
    }

    /// Reads a discovered template into a job.
    pub fn load(&self, source_path: &Path) -> Result<TemplateJob> {
        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| Error::ProcessError {
                source_path: source_path.display().to_string(),
                e: "file name is not valid UTF-8".to_string(),
            })?;
        let content = read_template(source_path)?;
        Ok(TemplateJob { source_path: source_path.to_path_buf(), stem, content })
    }

    /// Transforms one preprocessor-style template.
    pub fn process_t4(
        &self,
        engine: &Engine<'_>,
        host: &dyn EngineHost,
        source_path: &Path,
    ) -> Result<TransformResult> {
        let job = self.load(source_path)?;

        let output_text = if self.preprocess {
            let namespace = self.namespace_for(&job.source_path);
            debug!("Preprocessing '{}' into namespace '{}'", job.stem, namespace);
            engine.preprocess_t4(&job.content, &job.stem, &namespace)?.content
        } else {
            engine.process_t4(&job.content)?
        };

        Ok(self.finish(TemplateKind::T4, job, host, output_text))
    }

    /// Transforms one markup-style template. Rendering is awaited to
    /// completion before the result is produced.
    pub async fn process_razor(
        &self,
        engine: &Engine<'_>,
        host: &dyn EngineHost,
        source_path: &Path,
    ) -> Result<TransformResult> {
        let job = self.load(source_path)?;

        let output_text = if self.preprocess {
            let namespace = self.namespace_for(&job.source_path);
            debug!("Preprocessing '{}' into namespace '{}'", job.stem, namespace);
            engine.preprocess_razor(&job.content, &job.stem, &namespace)?.content
        } else {
            engine.process_razor(&job.content).await?
        };

        Ok(self.finish(TemplateKind::Razor, job, host, output_text))
    }

    fn finish(
        &self,
        kind: TemplateKind,
        job: TemplateJob,
        host: &dyn EngineHost,
        output_text: String,
    ) -> TransformResult {
        let output_path = kind.output_path(&job.source_path, &host.file_extension());
        TransformResult { output_path, output_text, encoding: host.encoding() }
    }
}
