//! CLI for regenerating the asynchronous client wrapper.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p sg-generator --bin sg-generate -- \
//!     src/main/java/org/opensearch/client/RestHighLevelClient.java \
//!     build/generated/sources/shim \
//!     io.reactiverse.opensearch.client
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    sg_generator::cli::run(std::env::args_os())
}
