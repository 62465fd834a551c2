// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use wrist_ergonomics::cli::args::{Cli, Commands};
use wrist_ergonomics::cli::client::run_client;
use wrist_ergonomics::cli::logging::{init_tracing, set_verbose};
use wrist_ergonomics::cli::serve::run_serve;

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve(args) => {
            set_verbose(args.verbose);
            init_tracing(args.verbose);
            run_serve(args);
        }
        Commands::Client(args) => {
            set_verbose(args.verbose);
            init_tracing(args.verbose);
            run_client(args);
        }
    }
}
