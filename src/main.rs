use anyhow::Result;
use tracing_subscriber::EnvFilter;

use margin_lens::cli::{self, args::CliArgs};
use margin_lens::io::SourceSpec;
use margin_lens::tui;

fn main() -> Result<()> {
    let args = CliArgs::parse_args();

    if args.is_non_interactive() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
        std::process::exit(cli::run_non_interactive(&args));
    }

    let source = SourceSpec {
        file: args.csv_file.clone(),
        use_sample: args.sample,
    };
    tui::run_dashboard(source, &args.theme)?;
    Ok(())
}
