//! Inspect the sample module and print the report.

use irscope::Session;
use irscope::sample::sample_module;
use irscope_ir::IrContext;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = IrContext::new();
    let root = sample_module(&mut ctx);
    let report = Session::new(&mut ctx, root).run();
    print!("{report}");
}
