use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::audit::{apply_correction, split_prescribed};
use crate::cli::{resolve_contract, resolve_correction, ContractArgs, CorrectionArgs};
use crate::error::{Result, VerbaError};
use crate::extractor::process_files;
use crate::fmt::money;
use crate::labor::calculate_labor_rights;

pub fn run(
    files: &[String],
    contract: &ContractArgs,
    correction: &CorrectionArgs,
) -> Result<()> {
    if files.is_empty() {
        return Err(VerbaError::Other(
            "Informe ao menos um arquivo PDF".to_string(),
        ));
    }

    let today = chrono::Local::now().date_naive();
    let records = process_files(files)?;

    let (active, prescribed) = split_prescribed(&records, today);
    if !prescribed.is_empty() {
        println!(
            "{}",
            format!(
                "{} competência(s) fora do período de 5 anos ignorada(s) (prescrição quinquenal)",
                prescribed.len()
            )
            .yellow()
        );
    }

    let (admissao, demissao, salario) = resolve_contract(&active, contract);
    let calc = calculate_labor_rights(&active, admissao, demissao, salario);

    println!("Base de cálculo: {}", money(salario).bold());
    println!();

    let mut verbas = Table::new();
    verbas.set_header(vec!["Verba", "Referência", "Valor"]);
    verbas.add_row(vec![
        Cell::new("Aviso Prévio Indenizado"),
        Cell::new(format!("{} dias", calc.aviso_previo.dias)),
        Cell::new(money(calc.aviso_previo.valor)),
    ]);
    verbas.add_row(vec![
        Cell::new("Férias com 1/3"),
        Cell::new("Base + 30%"),
        Cell::new(money(calc.ferias.valor)),
    ]);
    verbas.add_row(vec![
        Cell::new("Reflexo FGTS s/ Aviso"),
        Cell::new("8,00%"),
        Cell::new(money(calc.aviso_previo.reflexo_fgts)),
    ]);
    println!("Verbas Rescisórias\n{verbas}");

    let mut fgts = Table::new();
    fgts.set_header(vec!["Competência", "Base", "FGTS 8%", "Status"]);
    for month in &calc.fgts.mensal {
        fgts.add_row(vec![
            Cell::new(&month.competencia),
            Cell::new(money(month.base)),
            Cell::new(money(month.valor)),
            Cell::new(&month.status),
        ]);
    }
    fgts.add_row(vec![
        Cell::new("Multa 40%".bold()),
        Cell::new(money(calc.fgts.saldo_rescisorio)),
        Cell::new(money(calc.fgts.multa40)),
        Cell::new("Multa"),
    ]);
    println!("FGTS\n{fgts}");

    println!("Total geral: {}", money(calc.total_geral).bold());

    if correction.corrected {
        let (index, interest) = resolve_correction(correction)?;
        let corrected = apply_correction(&calc, &active, demissao, index, interest, today);

        println!();
        println!(
            "Valores corrigidos ({} + juros {})",
            index.as_str(),
            interest.as_str()
        );

        let mut table = Table::new();
        table.set_header(vec!["Parcela", "Original", "Correção", "Juros", "Total"]);
        for month in &corrected.fgts_mensal {
            let (correcao, juros, total) = match &month.result {
                Some(r) => (r.correction_amount, r.interest_amount, r.total_value),
                None => (0.0, 0.0, month.total),
            };
            table.add_row(vec![
                Cell::new(format!("FGTS {}", month.competencia)),
                Cell::new(money(month.original)),
                Cell::new(money(correcao)),
                Cell::new(money(juros)),
                Cell::new(money(total)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Multa 40% (s/ original)"),
            Cell::new(money(calc.fgts.saldo_rescisorio)),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new(money(corrected.multa)),
        ]);
        table.add_row(vec![
            Cell::new("Verbas Rescisórias"),
            Cell::new(money(corrected.rescisao_original)),
            Cell::new(money(corrected.rescisao.correction_amount)),
            Cell::new(money(corrected.rescisao.interest_amount)),
            Cell::new(money(corrected.rescisao.total_value)),
        ]);
        println!("{table}");

        println!(
            "Rescisão: correção acumulada {:.4}%, juros {:.4}% ({} dias)",
            corrected.rescisao.correction_factor,
            corrected.rescisao.interest_factor,
            corrected.rescisao.details.days_elapsed
        );
        let total_corrigido =
            corrected.fgts_final + corrected.multa + corrected.rescisao.total_value;
        println!("Total geral corrigido: {}", money(total_corrigido).bold());
    }

    let failures = records.iter().filter(|r| r.error.is_some()).count();
    if failures > 0 {
        println!(
            "{}",
            format!("{failures} arquivo(s) não puderam ser lidos").red()
        );
    }
    Ok(())
}
