use clap::Parser;
use log::{debug, LevelFilter};
use std::path::{Path, PathBuf};
use tokio::runtime;

use crate::{
    constants::PREPROCESSED_OUTPUT_EXTENSION,
    discovery::find_templates,
    engine::Engine,
    error::{Error, Result},
    host::CommandLineEngineHost,
    ioutils::write_output,
    template::{
        job::TemplateKind,
        processor::{AppEnv, TemplateProcessor},
    },
};

/// Command-line arguments structure for ttgen.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Process cshtml markup templates and generate outputs
    #[arg(short = 'r', long)]
    pub razor: bool,

    /// Process tt preprocessor-style templates and generate outputs
    #[arg(short = 't', long = "t4-template", visible_alias = "t4")]
    pub t4_template: bool,

    /// Create only a preprocessed artifact (a struct with a transform_text
    /// method) instead of rendered text
    #[arg(short, long)]
    pub preprocess: bool,

    /// Processing root directory; defaults to the working directory
    #[arg(short, long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
pub fn parse_cli() -> Args {
    Args::parse()
}

/// Maps the verbose flag to a log level filter.
pub fn get_log_level_from_verbose(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Runs the selected template passes.
///
/// Fails before any filesystem access when neither template kind is
/// selected. Preprocessor-style templates are processed first, then markup
/// templates; any per-file failure aborts the whole run.
pub fn run(args: Args) -> Result<()> {
    if !args.razor && !args.t4_template {
        return Err(Error::MissingTemplateKind);
    }

    let app_env = AppEnv::current()?;
    let root = args.dir.clone().unwrap_or_else(|| app_env.base_path.clone());

    if args.t4_template {
        process_t4_templates(&app_env, &root, args.preprocess)?;
    }
    if args.razor {
        process_razor_templates(&app_env, &root, args.preprocess)?;
    }

    Ok(())
}

/// Builds the per-file host; preprocessed artifacts are Rust source, so
/// preprocess mode swaps the default extension before the engine runs.
fn host_for(path: &Path, preprocess: bool) -> CommandLineEngineHost {
    let host = CommandLineEngineHost::new(path);
    if preprocess {
        host.with_file_extension(PREPROCESSED_OUTPUT_EXTENSION)
    } else {
        host
    }
}

fn process_t4_templates(app_env: &AppEnv, root: &Path, preprocess: bool) -> Result<()> {
    let templates = find_templates(root, TemplateKind::T4.glob_pattern())?;
    debug!(
        "Discovered {} {} template(s) under '{}'",
        templates.len(),
        TemplateKind::T4,
        root.display()
    );

    let processor = TemplateProcessor::new(app_env, preprocess);
    for path in templates {
        println!("Processing '{}'...", path.display());

        let host = host_for(&path, preprocess);
        let engine = Engine::new(&host);
        let result = processor.process_t4(&engine, &host, &path)?;

        println!("Writing '{}'...", result.output_path.display());
        write_output(&result.output_path, &result.output_text, result.encoding)?;
    }

    Ok(())
}

fn process_razor_templates(
    app_env: &AppEnv,
    root: &Path,
    preprocess: bool,
) -> Result<()> {
    let templates = find_templates(root, TemplateKind::Razor.glob_pattern())?;
    debug!(
        "Discovered {} {} template(s) under '{}'",
        templates.len(),
        TemplateKind::Razor,
        root.display()
    );

    let processor = TemplateProcessor::new(app_env, preprocess);

    // Markup rendering is awaitable; drive it on a current-thread runtime,
    // one file fully completing before the next starts.
    let runtime = runtime::Builder::new_current_thread().build()?;
    runtime.block_on(async {
        for path in templates {
            println!("Processing '{}'...", path.display());

            let host = host_for(&path, preprocess);
            let engine = Engine::new(&host);
            let result = processor.process_razor(&engine, &host, &path).await?;

            println!("Writing '{}'...", result.output_path.display());
            write_output(&result.output_path, &result.output_text, result.encoding)?;
        }

        Ok(())
    })
}
