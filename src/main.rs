use clap::Parser;
use colored::*;
use std::process;
use survey_enrichment::cli::{self, Args};

fn main() {
    let args = Args::parse();
    cli::init_logging(args.get_log_level());

    match cli::run(&args) {
        Ok(report) => cli::print_summary(&report),
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
            process::exit(1);
        }
    }
}
