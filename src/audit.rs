use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::correction::{self, CorrectionResult, IndexKind, InterestKind};
use crate::fmt::{increment_mes_ano, missing_competencias, money, parse_currency, parse_info, parse_mes_ano};
use crate::labor::LaborCalculation;
use crate::models::{PaystubRecord, Vinculo};

pub const WARN_DUPLICADA: &str = "Competência Duplicada";
pub const WARN_SEM_AULAS: &str = "Sem Aulas Suplementares Lançadas";
pub const WARN_PRESCRICAO: &str = "Prescrição Quinquenal (> 5 Anos)";

/// Overtime-class shortfall for one record.
#[derive(Debug, Clone, Copy)]
pub struct RowShortfall {
    pub devidas: f64,
    pub diferenca: f64,
}

/// What the supplemental hours should have paid: the hourly rate over the
/// component sum, plus the statutory 50% premium, times the hours taught.
/// A zero-hours basis short-circuits to zero rather than failing the row.
pub fn row_shortfall(record: &PaystubRecord) -> RowShortfall {
    let venc_base = parse_currency(record.vencimento_base.as_ref().map(|p| p.valor.as_str()));
    let grat_tit = parse_currency(record.grat_titularidade.as_deref());
    let grat_mag = parse_currency(record.grat_magisterio.as_deref());
    let grat_esc = parse_currency(record.grat_escolaridade.as_deref());

    let info_base = parse_info(record.vencimento_base.as_ref().map(|p| p.info.as_str()));
    let info_aulas = parse_info(record.aulas_suplementares.as_ref().map(|p| p.info.as_str()));
    let pago = parse_currency(record.aulas_suplementares.as_ref().map(|p| p.valor.as_str()));

    let mut devidas = 0.0;
    if info_base > 0.0 {
        let total_basis = venc_base + grat_tit + grat_mag + grat_esc;
        let hourly = total_basis / info_base;
        devidas = hourly * 1.5 * info_aulas;
    }

    RowShortfall {
        devidas,
        diferenca: devidas - pago,
    }
}

/// Earliest competency still actionable: five years before today.
pub fn prescription_cutoff(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year() - 5, today.month(), today.day())
        // Feb 29 lands on Mar 1 in a non-leap target year
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(today.year() - 5, 3, 1).unwrap())
}

/// Split records into (active, prescribed). Records whose competency does
/// not parse stay active; prescription only applies to dated ones.
pub fn split_prescribed(
    records: &[PaystubRecord],
    today: NaiveDate,
) -> (Vec<PaystubRecord>, Vec<PaystubRecord>) {
    let cutoff = prescription_cutoff(today);
    records.iter().cloned().partition(|r| {
        r.mes_ano
            .as_deref()
            .and_then(parse_mes_ano)
            .map_or(true, |d| d >= cutoff)
    })
}

// ---------------------------------------------------------------------------
// Audit report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AuditRow {
    pub mes_ano: String,
    pub venc_base: f64,
    pub grat_tit: f64,
    pub grat_mag: f64,
    pub grat_esc: f64,
    pub info_aulas: f64,
    pub pago: f64,
    pub devidas: f64,
    pub diferenca: f64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuditReport {
    pub nome: String,
    pub id_funcional: String,
    pub vinculo: Option<Vinculo>,
    pub rows: Vec<AuditRow>,
    pub missing: Vec<String>,
    pub total_devidas: f64,
    pub total_recebido: f64,
    pub total_diferenca: f64,
    pub summary: String,
}

/// Cross-reference a record sequence: per-row shortfalls, duplicate and
/// prescription flags, gaps in the competency sequence, and the overall
/// summary sentence. With `vincendas` on, permanent bonds get twelve
/// projected future months repeating the last observed row.
pub fn build_audit(records: &[PaystubRecord], today: NaiveDate, vincendas: bool) -> AuditReport {
    let cutoff = prescription_cutoff(today);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(mes_ano) = record.mes_ano.as_deref() {
            *counts.entry(mes_ano).or_insert(0) += 1;
        }
    }

    let mut rows = Vec::new();
    for record in records.iter().filter(|r| r.error.is_none()) {
        let shortfall = row_shortfall(record);
        let mut warnings = record.warnings.clone();

        if let Some(mes_ano) = record.mes_ano.as_deref() {
            if counts.get(mes_ano).copied().unwrap_or(0) > 1 {
                warnings.push(WARN_DUPLICADA.to_string());
            }
            if let Some(date) = parse_mes_ano(mes_ano) {
                if date < cutoff {
                    warnings.push(WARN_PRESCRICAO.to_string());
                }
            }
        }

        let pago = parse_currency(record.aulas_suplementares.as_ref().map(|p| p.valor.as_str()));
        if pago == 0.0 {
            warnings.push(WARN_SEM_AULAS.to_string());
        }

        rows.push(AuditRow {
            mes_ano: record.mes_ano.clone().unwrap_or_else(|| "-".to_string()),
            venc_base: parse_currency(record.vencimento_base.as_ref().map(|p| p.valor.as_str())),
            grat_tit: parse_currency(record.grat_titularidade.as_deref()),
            grat_mag: parse_currency(record.grat_magisterio.as_deref()),
            grat_esc: parse_currency(record.grat_escolaridade.as_deref()),
            info_aulas: parse_info(record.aulas_suplementares.as_ref().map(|p| p.info.as_str())),
            pago,
            devidas: shortfall.devidas,
            diferenca: shortfall.diferenca,
            warnings,
        });
    }

    let vinculo = records.iter().find_map(|r| r.vinculo);

    // Vincendas: future months owed while the bond stays active.
    if vincendas && vinculo == Some(Vinculo::Efetivo) && !rows.is_empty() {
        let last = rows.last().unwrap().clone();
        let mut mes_ano = last.mes_ano.clone();
        for i in 1..=12 {
            mes_ano = increment_mes_ano(&mes_ano);
            rows.push(AuditRow {
                mes_ano: format!("{mes_ano} (Vincenda {i})"),
                warnings: Vec::new(),
                ..last.clone()
            });
        }
    }

    let mut total_devidas = 0.0;
    let mut total_recebido = 0.0;
    let mut total_diferenca = 0.0;
    for row in &rows {
        total_devidas += row.devidas;
        total_recebido += row.pago;
        total_diferenca += row.diferenca;
    }

    let labels: Vec<String> = records.iter().filter_map(|r| r.mes_ano.clone()).collect();
    let missing = missing_competencias(&labels);

    let nome = records
        .iter()
        .find_map(|r| r.nome.clone())
        .unwrap_or_else(|| "[Nome do Servidor]".to_string());
    let id_funcional = records
        .iter()
        .find_map(|r| r.id_funcional.clone())
        .unwrap_or_else(|| "Não Identificado".to_string());

    let summary = if missing.is_empty() {
        format!(
            "O servidor {} deveria ter recebido do Estado do Pará o valor de R$ {}, \
             no entanto recebeu apenas R$ {}, sendo portanto devida a diferença no \
             valor de R$ {}.",
            nome,
            money(total_devidas),
            money(total_recebido),
            money(total_diferenca)
        )
    } else {
        format!(
            "ATENÇÃO: Foram identificadas interrupções na sequência lógica das \
             competências analisadas. As seguintes competências não foram \
             localizadas: {}.",
            missing.join(", ")
        )
    };

    AuditReport {
        nome,
        id_funcional,
        vinculo,
        rows,
        missing,
        total_devidas,
        total_recebido,
        total_diferenca,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Correction assembly
// ---------------------------------------------------------------------------

/// FGTS is due on the 10th of the month following the competency.
const FGTS_DUE_DAY: u32 = 10;
/// Shortfall wages were due with the payroll, on the 5th.
const AUDIT_DUE_DAY: u32 = 5;
/// Severance is due 10 days after termination.
const RESCISAO_DUE_DAYS: i64 = 10;

#[derive(Debug, Clone)]
pub struct CorrectedFgtsMonth {
    pub competencia: String,
    pub original: f64,
    pub result: Option<CorrectionResult>,
    /// Original value when no due date could be derived.
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct CorrectedShortfall {
    pub mes_ano: String,
    pub result: CorrectionResult,
}

#[derive(Debug, Clone)]
pub struct CorrectedTotals {
    pub fgts_mensal: Vec<CorrectedFgtsMonth>,
    pub fgts_corrigido: f64,
    pub fgts_juros: f64,
    pub fgts_final: f64,
    /// 40% fine, still over the uncorrected deposit sum.
    pub multa: f64,
    pub rescisao_original: f64,
    pub rescisao: CorrectionResult,
    pub audit: Vec<CorrectedShortfall>,
}

/// Correct each positive overtime-class shortfall independently, due the
/// 5th of the month after its competency. Undated rows cannot be corrected
/// and are left out.
pub fn corrected_shortfalls(
    records: &[PaystubRecord],
    index: IndexKind,
    interest: InterestKind,
    reference: NaiveDate,
) -> Vec<CorrectedShortfall> {
    let mut shortfalls = Vec::new();
    for record in records.iter().filter(|r| r.error.is_none()) {
        if record.aulas_suplementares.is_none() {
            continue;
        }
        let shortfall = row_shortfall(record);
        if shortfall.diferenca <= 0.01 {
            continue;
        }
        let Some(mes_ano) = record.mes_ano.as_deref() else {
            continue;
        };
        let Some(period) = parse_mes_ano(mes_ano) else {
            continue;
        };
        let due = correction::due_next_month(period, AUDIT_DUE_DAY);
        let result =
            correction::calculate(shortfall.diferenca, Some(due), index, interest, reference);
        shortfalls.push(CorrectedShortfall {
            mes_ano: mes_ano.to_string(),
            result,
        });
    }
    shortfalls
}

/// Run every payable entry through the correction engine with its own due
/// date: each FGTS monthly deposit, the aggregate severance, and each
/// overtime-class shortfall. Entries are never batched; due dates differ.
pub fn apply_correction(
    calc: &LaborCalculation,
    records: &[PaystubRecord],
    demissao: Option<NaiveDate>,
    index: IndexKind,
    interest: InterestKind,
    reference: NaiveDate,
) -> CorrectedTotals {
    let mut fgts_mensal = Vec::new();
    let mut fgts_corrigido = 0.0;
    let mut fgts_juros = 0.0;
    let mut fgts_final = 0.0;

    for month in &calc.fgts.mensal {
        let due = parse_mes_ano(&month.competencia)
            .map(|d| correction::due_next_month(d, FGTS_DUE_DAY));
        match due {
            Some(due) => {
                let result = correction::calculate(month.valor, Some(due), index, interest, reference);
                fgts_corrigido += result.corrected_value;
                fgts_juros += result.interest_amount;
                fgts_final += result.total_value;
                fgts_mensal.push(CorrectedFgtsMonth {
                    competencia: month.competencia.clone(),
                    original: month.valor,
                    total: result.total_value,
                    result: Some(result),
                });
            }
            None => {
                fgts_corrigido += month.valor;
                fgts_final += month.valor;
                fgts_mensal.push(CorrectedFgtsMonth {
                    competencia: month.competencia.clone(),
                    original: month.valor,
                    total: month.valor,
                    result: None,
                });
            }
        }
    }

    let rescisao_original =
        calc.aviso_previo.valor + calc.ferias.valor + calc.aviso_previo.reflexo_fgts;
    let rescisao_due = demissao.unwrap_or(reference) + chrono::Duration::days(RESCISAO_DUE_DAYS);
    let rescisao = correction::calculate(
        rescisao_original,
        Some(rescisao_due),
        index,
        interest,
        reference,
    );

    let audit = corrected_shortfalls(records, index, interest, reference);

    CorrectedTotals {
        fgts_mensal,
        fgts_corrigido,
        fgts_juros,
        fgts_final,
        multa: calc.fgts.multa40,
        rescisao_original,
        rescisao,
        audit,
    }
}
