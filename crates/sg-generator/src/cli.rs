//! Command line entry point of `sg-generate`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::{GeneratorConfig, ShimGenerator};

/// Generate Vert.x shims for a synchronous client class.
#[derive(Parser, Debug)]
#[command(name = "sg-generate", version, about)]
pub struct Args {
    /// Source file of the client class
    pub input: PathBuf,

    /// Root directory of the generated sources
    pub output_dir: PathBuf,

    /// Package of the generated classes
    pub namespace: String,
}

/// Parse `args` and run the generator. The summary goes to stdout.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(args) {
        Ok(args) => args,
        Err(e) => {
            // Help and version output are not failures.
            let code = e.exit_code();
            let _ = e.print();
            return ExitCode::from(u8::try_from(code).unwrap_or(2));
        }
    };

    let generator = ShimGenerator::new(GeneratorConfig::rest_client(args.namespace));
    match generator.run(&args.input, &args.output_dir) {
        Ok(report) => {
            println!("{}", report.format_summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
