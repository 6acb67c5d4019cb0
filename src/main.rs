use clap::Parser;
use legal_docs::cli;

fn main() {
    let args = cli::Args::parse();
    // `dispatch` has already logged the failure.
    if cli::dispatch(args).is_err() {
        std::process::exit(1);
    }
}
