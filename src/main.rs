mod audit;
mod cli;
mod correction;
mod error;
mod extractor;
mod fmt;
mod labor;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod pdftext;
mod settings;
mod storage;

use clap::Parser;

use cli::{Cli, Commands, ExportCommands, UsersCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Extract { files, json } => cli::extract::run(&files, json),
        Commands::Audit { files, correction } => cli::audit::run(&files, &correction),
        Commands::Calc {
            files,
            contract,
            correction,
        } => cli::calc::run(&files, &contract, &correction),
        Commands::Export { command } => match command {
            ExportCommands::Csv { files, output } => cli::export::csv(&files, output),
            #[cfg(feature = "pdf")]
            ExportCommands::Audit {
                files,
                correction,
                output,
            } => cli::export::audit(&files, &correction, output),
            #[cfg(feature = "pdf")]
            ExportCommands::Severance {
                files,
                contract,
                correction,
                output,
            } => cli::export::severance(&files, &contract, &correction, output),
            #[cfg(feature = "pdf")]
            ExportCommands::Fgts {
                files,
                contract,
                correction,
                output,
            } => cli::export::fgts(&files, &contract, &correction, output),
            #[cfg(feature = "pdf")]
            ExportCommands::All {
                files,
                contract,
                correction,
                output_dir,
            } => cli::export::all(&files, &contract, &correction, output_dir),
        },
        Commands::Users { command } => match command {
            UsersCommands::Add { name, email, role } => cli::users::add(&name, &email, &role),
            UsersCommands::List => cli::users::list(),
            UsersCommands::Delete { email } => cli::users::delete(&email),
        },
        Commands::Login { email } => cli::users::login(&email),
        Commands::Logout => cli::users::logout(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
