//! IR Facade Driver
//!
//! Builds one of the canned sample modules and prints it through a pass
//! pipeline, to a file or to standard output.

mod config;
mod samples;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};

use irf_common::OpenFlags;
use irf_ir::Context;
use irf_pass::{create_print_module_pass, create_verifier_pass, PassManager, RawFdOStream};

use crate::config::{load_config, DriverConfig};
use crate::samples::Sample;

#[derive(Parser)]
#[command(name = "irf")]
#[command(about = "Build and print IR modules")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a sample module and print its IR
    Sample {
        /// Which sample to build
        #[arg(value_enum)]
        name: Sample,

        /// Output file, `-` for standard output
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Module identifier (defaults to the sample name)
        #[arg(long)]
        module_id: Option<String>,

        /// Line printed ahead of the module
        #[arg(long)]
        banner: Option<String>,

        /// Fail if the output file already exists
        #[arg(long)]
        excl: bool,

        /// Append to the output file instead of truncating it
        #[arg(long)]
        append: bool,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the verifier pass
        #[arg(long)]
        no_verify: bool,
    },

    /// List the available samples
    List,
}

/// Settings for one `sample` run after merging file and flags
#[derive(Debug, Clone, PartialEq, Eq)]
struct SampleOptions {
    module_id: String,
    banner: String,
    flags: OpenFlags,
    verify: bool,
}

impl SampleOptions {
    fn merge(
        sample: Sample,
        config: DriverConfig,
        module_id: Option<String>,
        banner: Option<String>,
        excl: bool,
        append: bool,
        no_verify: bool,
    ) -> Self {
        let mut flags = config.open_flags();
        if excl {
            flags |= OpenFlags::EXCL;
        }
        if append {
            flags |= OpenFlags::APPEND;
        }
        Self {
            module_id: module_id
                .or(config.module_id)
                .unwrap_or_else(|| sample.name().to_string()),
            banner: banner.unwrap_or(config.banner),
            flags,
            verify: config.verify && !no_verify,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    match cli.command {
        Commands::Sample {
            name,
            output,
            module_id,
            banner,
            excl,
            append,
            config,
            no_verify,
        } => {
            let file_config = match config {
                Some(path) => load_config(&path)?,
                None => DriverConfig::default(),
            };
            let options = SampleOptions::merge(name, file_config, module_id, banner, excl, append, no_verify);
            let modified = run_sample(name, &output, &options)?;
            info!("sample '{}' written, modified: {modified}", name.name());
        }
        Commands::List => {
            for sample in Sample::value_variants() {
                println!("{}", sample.name());
            }
        }
    }
    Ok(())
}

/// Build `sample` and print it to `output`. Returns whether the pipeline
/// reported a modification.
fn run_sample(sample: Sample, output: &Path, options: &SampleOptions) -> Result<bool> {
    let mut ctx = Context::new();
    let module = samples::build(&mut ctx, sample, &options.module_id)?;

    let mut error_info = None;
    let mut os = RawFdOStream::new(output, &mut error_info, options.flags);
    if let Some(err) = error_info {
        os.close();
        bail!("cannot open output: {err}");
    }

    let mut pm = PassManager::new();
    if options.verify {
        pm.add(create_verifier_pass());
    }
    pm.add(create_print_module_pass(&mut os, &options.banner));
    let modified = pm.run(&mut ctx, module);
    drop(pm);

    os.close();
    if os.has_error() {
        bail!("error writing '{}'", output.display());
    }

    module.erase(&mut ctx);
    Ok(modified)
}
