use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{Result, VerbaError};
use crate::extractor::process_files;
use crate::models::PaystubRecord;

pub fn run(files: &[String], json: bool) -> Result<()> {
    if files.is_empty() {
        return Err(VerbaError::Other(
            "Informe ao menos um arquivo PDF".to_string(),
        ));
    }

    let records = process_files(files)?;

    if json {
        let out = serde_json::to_string_pretty(&records)
            .map_err(|e| VerbaError::Other(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    print_table(&records);

    let failures = records.iter().filter(|r| r.error.is_some()).count();
    if failures > 0 {
        println!(
            "{}",
            format!("{failures} arquivo(s) não puderam ser lidos").red()
        );
    }
    Ok(())
}

pub(crate) fn print_table(records: &[PaystubRecord]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Arquivo",
        "Mês/Ano",
        "Tipo",
        "Nome",
        "Vínculo",
        "Venc. Base",
        "Aulas Supl.",
        "Base Previd.",
        "Avisos",
    ]);

    for record in records {
        if let Some(error) = &record.error {
            table.add_row(vec![
                Cell::new(&record.file_name),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(format!("ERRO: {error}").red().to_string()),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
            ]);
            continue;
        }
        table.add_row(vec![
            Cell::new(&record.file_name),
            Cell::new(record.mes_ano.as_deref().unwrap_or("-")),
            Cell::new(record.tipo_folha.map(|t| t.label()).unwrap_or("-")),
            Cell::new(record.nome.as_deref().unwrap_or("-")),
            Cell::new(record.vinculo.map(|v| v.label()).unwrap_or("-")),
            Cell::new(
                record
                    .vencimento_base
                    .as_ref()
                    .map(|p| p.valor.as_str())
                    .unwrap_or("-"),
            ),
            Cell::new(
                record
                    .aulas_suplementares
                    .as_ref()
                    .map(|p| p.valor.as_str())
                    .unwrap_or("-"),
            ),
            Cell::new(record.base_previdencia.as_deref().unwrap_or("-")),
            Cell::new(record.warnings.join("; ")),
        ]);
    }

    println!("{table}");
}
