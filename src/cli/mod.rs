pub mod audit;
pub mod calc;
pub mod export;
pub mod extract;
pub mod init;
pub mod status;
pub mod users;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::correction::{IndexKind, InterestKind};
use crate::error::Result;
use crate::settings::load_settings;

#[derive(Parser)]
#[command(
    name = "verba",
    about = "Auditoria de contracheques e cálculo de verbas trabalhistas."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct CorrectionArgs {
    /// Apply monetary correction and interest
    #[arg(long)]
    pub corrected: bool,
    /// Correction index: SELIC, IPCA-E, INPC
    #[arg(long)]
    pub index: Option<String>,
    /// Interest mode: NONE, 1%_SIMPLE, 0.5%_SIMPLE
    #[arg(long)]
    pub interest: Option<String>,
}

#[derive(Args)]
pub struct ContractArgs {
    /// Admission date: YYYY-MM-DD
    #[arg(long)]
    pub admissao: Option<String>,
    /// Termination date: YYYY-MM-DD
    #[arg(long)]
    pub demissao: Option<String>,
    /// Manual gross salary override, e.g. 3.000,00
    #[arg(long)]
    pub salario: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up verba: choose a data directory and initialize the database.
    Init {
        /// Path for verba data (default: ~/Documents/verba)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Extract structured records from paystub PDFs.
    Extract {
        /// PDF files to process
        files: Vec<String>,
        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Audit supplemental-hours payments across a batch of paystubs.
    Audit {
        /// PDF files to process
        files: Vec<String>,
        #[command(flatten)]
        correction: CorrectionArgs,
    },
    /// Compute severance and FGTS over a batch of paystubs.
    Calc {
        /// PDF files to process
        files: Vec<String>,
        #[command(flatten)]
        contract: ContractArgs,
        #[command(flatten)]
        correction: CorrectionArgs,
    },
    /// Export the audit spreadsheet or the calculation reports.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Manage users.
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Open a session.
    Login {
        /// User e-mail
        #[arg(long)]
        email: String,
    },
    /// Close the current session.
    Logout,
    /// Show settings, database and index-table coverage.
    Status,
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the audit rows as a ;-separated CSV.
    Csv {
        files: Vec<String>,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
    /// Export the audit report to PDF.
    #[cfg(feature = "pdf")]
    Audit {
        files: Vec<String>,
        #[command(flatten)]
        correction: CorrectionArgs,
        #[arg(long)]
        output: Option<String>,
    },
    /// Export the severance calculation term to PDF.
    #[cfg(feature = "pdf")]
    Severance {
        files: Vec<String>,
        #[command(flatten)]
        contract: ContractArgs,
        #[command(flatten)]
        correction: CorrectionArgs,
        #[arg(long)]
        output: Option<String>,
    },
    /// Export the FGTS calculation memorandum to PDF.
    #[cfg(feature = "pdf")]
    Fgts {
        files: Vec<String>,
        #[command(flatten)]
        contract: ContractArgs,
        #[command(flatten)]
        correction: CorrectionArgs,
        #[arg(long)]
        output: Option<String>,
    },
    /// Export CSV and all PDF reports at once.
    #[cfg(feature = "pdf")]
    All {
        files: Vec<String>,
        #[command(flatten)]
        contract: ContractArgs,
        #[command(flatten)]
        correction: CorrectionArgs,
        /// Output directory
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UsersCommands {
    /// Add or update a user (prompts for a password).
    Add {
        /// Display name
        name: String,
        /// E-mail address, unique per user
        #[arg(long)]
        email: String,
        /// Role: admin or user
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// List all users.
    List,
    /// Delete a user by e-mail.
    Delete {
        email: String,
    },
}

pub(crate) fn parse_iso_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

/// Resolve index/interest selectors: CLI flag first, settings default
/// otherwise.
pub(crate) fn resolve_correction(args: &CorrectionArgs) -> Result<(IndexKind, InterestKind)> {
    let settings = load_settings();
    let index = match &args.index {
        Some(raw) => IndexKind::parse(raw)?,
        None => IndexKind::parse(&settings.correction_index).unwrap_or(IndexKind::Selic),
    };
    let interest = match &args.interest {
        Some(raw) => InterestKind::parse(raw)?,
        None => {
            InterestKind::parse(&settings.interest_mode).unwrap_or(InterestKind::OnePctSimple)
        }
    };
    Ok((index, interest))
}

/// Resolve contract dates and salary basis: CLI flags first, settings
/// defaults next, auto-detection from the batch for the salary.
pub(crate) fn resolve_contract(
    records: &[crate::models::PaystubRecord],
    args: &ContractArgs,
) -> (Option<NaiveDate>, Option<NaiveDate>, f64) {
    let settings = load_settings();
    let admissao = parse_iso_date(args.admissao.as_deref())
        .or_else(|| parse_iso_date(Some(&settings.admissao)));
    let demissao = parse_iso_date(args.demissao.as_deref())
        .or_else(|| parse_iso_date(Some(&settings.demissao)));

    let override_raw = args
        .salario
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| Some(settings.salario.clone()).filter(|s| !s.trim().is_empty()));
    let salario = match override_raw {
        Some(raw) => crate::fmt::parse_currency(Some(&raw)),
        None => crate::labor::detect_salary_basis(records),
    };

    (admissao, demissao, salario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date(Some("2023-06-15")),
            NaiveDate::from_ymd_opt(2023, 6, 15)
        );
        assert_eq!(parse_iso_date(Some("15/06/2023")), None);
        assert_eq!(parse_iso_date(None), None);
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
