use std::path::PathBuf;

use crate::audit::row_shortfall;
use crate::error::Result;
use crate::extractor::process_files;
use crate::fmt::money;
use crate::models::PaystubRecord;
use crate::settings::get_data_dir;

#[cfg(feature = "pdf")]
use crate::audit::{apply_correction, build_audit, split_prescribed};
#[cfg(feature = "pdf")]
use crate::cli::{resolve_contract, resolve_correction, ContractArgs, CorrectionArgs};
#[cfg(feature = "pdf")]
use crate::error::VerbaError;
#[cfg(feature = "pdf")]
use crate::labor::{calculate_labor_rights, LaborCalculation};
#[cfg(feature = "pdf")]
use crate::pdf::{render_audit, render_fgts, render_severance, ReportContext, SeveranceCorrection};

pub const CSV_HEADERS: [&str; 13] = [
    "Arquivo",
    "Nome",
    "Matrícula",
    "Mês/Ano",
    "Venc. Base (Info)",
    "Venc. Base (Valor)",
    "Aulas Supl. (Info)",
    "Aulas Supl. (Valor)",
    "Grat. Titularidade",
    "Grat. Magistério",
    "Grat. Escolaridade",
    "Aulas Supl. (Devidas)",
    "Diferença a Receber",
];

fn default_path(name: &str, extension: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir()
        .join("exports")
        .join(format!("{name}-{date}.{extension}"))
}

fn ensure_parent(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

pub fn write_csv(records: &[PaystubRecord], path: &PathBuf) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    writer.write_record(CSV_HEADERS)?;

    for record in records.iter().filter(|r| r.error.is_none()) {
        let shortfall = row_shortfall(record);
        let devidas = money(shortfall.devidas);
        let diferenca = money(shortfall.diferenca);
        writer.write_record([
            record.file_name.as_str(),
            record.nome.as_deref().unwrap_or(""),
            record.id_funcional.as_deref().unwrap_or(""),
            record.mes_ano.as_deref().unwrap_or(""),
            record
                .vencimento_base
                .as_ref()
                .map(|p| p.info.as_str())
                .unwrap_or(""),
            record
                .vencimento_base
                .as_ref()
                .map(|p| p.valor.as_str())
                .unwrap_or(""),
            record
                .aulas_suplementares
                .as_ref()
                .map(|p| p.info.as_str())
                .unwrap_or(""),
            record
                .aulas_suplementares
                .as_ref()
                .map(|p| p.valor.as_str())
                .unwrap_or(""),
            record.grat_titularidade.as_deref().unwrap_or(""),
            record.grat_magisterio.as_deref().unwrap_or(""),
            record.grat_escolaridade.as_deref().unwrap_or(""),
            devidas.as_str(),
            diferenca.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn csv(files: &[String], output: Option<String>) -> Result<()> {
    let records = process_files(files)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path("calculo_auditoria", "csv"));
    write_csv(&records, &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// PDF reports
// ---------------------------------------------------------------------------

#[cfg(feature = "pdf")]
fn write_pdf(bytes: &[u8], path: &PathBuf) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(feature = "pdf")]
fn report_context(
    records: &[PaystubRecord],
    contract: &ContractArgs,
    salario: f64,
) -> ReportContext {
    let settings = crate::settings::load_settings();
    ReportContext {
        nome: records
            .iter()
            .find_map(|r| r.nome.clone())
            .unwrap_or_else(|| "Não Identificado".to_string()),
        id_funcional: records
            .iter()
            .find_map(|r| r.id_funcional.clone())
            .unwrap_or_else(|| "N/A".to_string()),
        vinculo: records
            .iter()
            .find_map(|r| r.vinculo)
            .map(|v| v.label().to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        admissao: contract
            .admissao
            .clone()
            .unwrap_or_else(|| settings.admissao.clone()),
        demissao: contract
            .demissao
            .clone()
            .unwrap_or_else(|| settings.demissao.clone()),
        salario,
    }
}

#[cfg(feature = "pdf")]
fn calc_for(
    records: &[PaystubRecord],
    contract: &ContractArgs,
) -> (LaborCalculation, Option<chrono::NaiveDate>, f64) {
    let (admissao, demissao, salario) = resolve_contract(records, contract);
    let calc = calculate_labor_rights(records, admissao, demissao, salario);
    (calc, demissao, salario)
}

#[cfg(feature = "pdf")]
pub fn audit(
    files: &[String],
    correction: &CorrectionArgs,
    output: Option<String>,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let records = process_files(files)?;
    let report = build_audit(&records, today, true);

    let shortfalls = if correction.corrected {
        let (index, interest) = resolve_correction(correction)?;
        Some(crate::audit::corrected_shortfalls(
            &records, index, interest, today,
        ))
    } else {
        None
    };

    let bytes = render_audit(&report, shortfalls.as_deref())?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path("relatorio_auditoria", "pdf"));
    write_pdf(&bytes, &path)
}

#[cfg(feature = "pdf")]
pub fn severance(
    files: &[String],
    contract: &ContractArgs,
    correction: &CorrectionArgs,
    output: Option<String>,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let records = process_files(files)?;
    let (active, _) = split_prescribed(&records, today);
    let (calc, demissao, salario) = calc_for(&active, contract);

    let severance_correction = if correction.corrected {
        let (index, interest) = resolve_correction(correction)?;
        let corrected = apply_correction(&calc, &active, demissao, index, interest, today);
        let details = &corrected.rescisao.details;
        Some(SeveranceCorrection {
            index_name: details.index.as_str().to_string(),
            interest_name: details.interest.as_str().to_string(),
            original: corrected.rescisao_original,
            correction: corrected.rescisao.correction_amount,
            interest: corrected.rescisao.interest_amount,
            total: corrected.rescisao.total_value,
        })
    } else {
        None
    };

    let ctx = report_context(&active, contract, salario);
    let bytes = render_severance(&calc, &ctx, severance_correction.as_ref())?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path("rescisao", "pdf"));
    write_pdf(&bytes, &path)
}

#[cfg(feature = "pdf")]
pub fn fgts(
    files: &[String],
    contract: &ContractArgs,
    correction: &CorrectionArgs,
    output: Option<String>,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let records = process_files(files)?;
    let (active, _) = split_prescribed(&records, today);
    let (calc, demissao, salario) = calc_for(&active, contract);

    let corrected = if correction.corrected {
        let (index, interest) = resolve_correction(correction)?;
        Some(apply_correction(&calc, &active, demissao, index, interest, today))
    } else {
        None
    };

    let ctx = report_context(&active, contract, salario);
    let bytes = render_fgts(&calc, &ctx, corrected.as_ref())?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path("fgts_memoria", "pdf"));
    write_pdf(&bytes, &path)
}

#[cfg(feature = "pdf")]
pub fn all(
    files: &[String],
    contract: &ContractArgs,
    correction: &CorrectionArgs,
    output_dir: Option<String>,
) -> Result<()> {
    if files.is_empty() {
        return Err(VerbaError::Other(
            "Informe ao menos um arquivo PDF".to_string(),
        ));
    }
    let dir = output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| get_data_dir().join("exports"));
    std::fs::create_dir_all(&dir)?;
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let path = |name: &str, ext: &str| Some(format!("{}/{name}-{date}.{ext}", dir.display()));

    csv(files, path("calculo_auditoria", "csv"))?;
    audit(files, correction, path("relatorio_auditoria", "pdf"))?;
    severance(files, contract, correction, path("rescisao", "pdf"))?;
    fgts(files, contract, correction, path("fgts_memoria", "pdf"))?;

    println!("All reports exported to {}", dir.display());
    Ok(())
}
