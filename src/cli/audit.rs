use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::audit::{build_audit, corrected_shortfalls};
use crate::cli::{resolve_correction, CorrectionArgs};
use crate::error::{Result, VerbaError};
use crate::extractor::process_files;
use crate::fmt::money;

pub fn run(files: &[String], correction: &CorrectionArgs) -> Result<()> {
    if files.is_empty() {
        return Err(VerbaError::Other(
            "Informe ao menos um arquivo PDF".to_string(),
        ));
    }

    let today = chrono::Local::now().date_naive();
    let records = process_files(files)?;
    let report = build_audit(&records, today, false);

    let shortfalls = if correction.corrected {
        let (index, interest) = resolve_correction(correction)?;
        println!(
            "Correção: {} | Juros: {}",
            index.as_str(),
            interest.as_str()
        );
        Some(corrected_shortfalls(&records, index, interest, today))
    } else {
        None
    };

    let mut table = Table::new();
    table.set_header(vec![
        "Ref.",
        "Aulas",
        "Pago",
        "Devido",
        "Diferença",
        "Avisos",
    ]);

    let mut corrected_total = 0.0;
    for row in &report.rows {
        let diferenca = shortfalls
            .as_ref()
            .and_then(|all| all.iter().find(|s| s.mes_ano == row.mes_ano))
            .map(|s| s.result.total_value)
            .unwrap_or(row.diferenca);
        corrected_total += diferenca;

        table.add_row(vec![
            Cell::new(&row.mes_ano),
            Cell::new(format!("{:.2}", row.info_aulas)),
            Cell::new(money(row.pago)),
            Cell::new(money(row.devidas)),
            Cell::new(money(diferenca)),
            Cell::new(row.warnings.join("; ")),
        ]);
    }
    println!("{table}");

    let total_diferenca = if shortfalls.is_some() {
        corrected_total
    } else {
        report.total_diferenca
    };
    println!(
        "Total pago: {}   Total devido: {}   Diferença: {}",
        money(report.total_recebido),
        money(report.total_devidas),
        money(total_diferenca).bold()
    );

    if !report.missing.is_empty() {
        println!(
            "{}",
            format!(
                "Competências não localizadas: {}",
                report.missing.join(", ")
            )
            .yellow()
        );
    }
    println!();
    println!("{}", report.summary);

    let failures = records.iter().filter(|r| r.error.is_some()).count();
    if failures > 0 {
        println!(
            "{}",
            format!("{failures} arquivo(s) não puderam ser lidos").red()
        );
    }
    Ok(())
}
