use chrono::{Datelike, NaiveDate};

use crate::fmt::{parse_currency, parse_mes_ano};
use crate::models::{PaystubRecord, TipoFolha};

/// Notice period plus its FGTS reflex.
#[derive(Debug, Clone)]
pub struct AvisoPrevio {
    pub dias: u32,
    pub valor: f64,
    pub reflexo_fgts: f64,
}

#[derive(Debug, Clone)]
pub struct Ferias {
    pub valor: f64,
}

#[derive(Debug, Clone)]
pub struct FgtsMonth {
    pub competencia: String,
    pub base: f64,
    pub valor: f64,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct Fgts {
    pub depositos: f64,
    /// Equals `depositos`: the notice reflex is deliberately kept out.
    pub total: f64,
    pub multa40: f64,
    /// Fine base, deposits only.
    pub saldo_rescisorio: f64,
    pub mensal: Vec<FgtsMonth>,
}

#[derive(Debug, Clone)]
pub struct LaborCalculation {
    pub aviso_previo: AvisoPrevio,
    pub ferias: Ferias,
    pub fgts: Fgts,
    pub total_geral: f64,
}

/// Completed full years of service; the final partial year only counts
/// once both month and day of the anniversary have passed.
pub fn completed_years(admissao: NaiveDate, demissao: NaiveDate) -> i32 {
    let mut years = demissao.year() - admissao.year();
    if (demissao.month(), demissao.day()) < (admissao.month(), admissao.day()) {
        years -= 1;
    }
    years
}

/// Monthly gross for FGTS purposes: the reported contribution base when
/// present, else the sum of wage components.
pub fn monthly_gross(record: &PaystubRecord) -> f64 {
    if record.base_previdencia.is_some() {
        return parse_currency(record.base_previdencia.as_deref());
    }
    let base = parse_currency(record.vencimento_base.as_ref().map(|p| p.valor.as_str()));
    let aulas = parse_currency(record.aulas_suplementares.as_ref().map(|p| p.valor.as_str()));
    let tit = parse_currency(record.grat_titularidade.as_deref());
    let mag = parse_currency(record.grat_magisterio.as_deref());
    let esc = parse_currency(record.grat_escolaridade.as_deref());
    base + aulas + tit + mag + esc
}

/// Pick the salary basis automatically: the newest regular-sheet record
/// wins (13th/vacation sheets are skipped when any regular one exists),
/// preferring its reported contribution base over the component sum.
pub fn detect_salary_basis(records: &[PaystubRecord]) -> f64 {
    let usable: Vec<&PaystubRecord> = records.iter().filter(|r| r.error.is_none()).collect();
    if usable.is_empty() {
        return 0.0;
    }

    let normais: Vec<&&PaystubRecord> = usable
        .iter()
        .filter(|r| match r.tipo_folha {
            Some(TipoFolha::Normal) => true,
            Some(_) => false,
            None => {
                let label = r.mes_ano.as_deref().unwrap_or("").to_lowercase();
                !label.contains("13") && !label.contains("fér")
            }
        })
        .collect();

    let pool: Vec<&PaystubRecord> = if normais.is_empty() {
        usable.clone()
    } else {
        normais.into_iter().copied().collect()
    };

    let newest = pool
        .iter()
        .max_by_key(|r| {
            r.mes_ano
                .as_deref()
                .and_then(parse_mes_ano)
                .unwrap_or(NaiveDate::MIN)
        })
        .unwrap();

    monthly_gross(newest)
}

/// Compute severance and FGTS over a record sequence. The caller hands in
/// records already filtered for prescription; failed records are skipped
/// here. Full floating precision throughout; rounding belongs to display.
pub fn calculate_labor_rights(
    records: &[PaystubRecord],
    admissao: Option<NaiveDate>,
    demissao: Option<NaiveDate>,
    salario_bruto: f64,
) -> LaborCalculation {
    // Aviso prévio: 30 days plus 3 per completed year, 20 years cap
    // (90 days total).
    let mut dias_aviso = 30u32;
    if let (Some(adm), Some(dem)) = (admissao, demissao) {
        let anos = completed_years(adm, dem).clamp(0, 20);
        dias_aviso += 3 * anos as u32;
    }
    let valor_aviso = (salario_bruto / 30.0) * dias_aviso as f64;
    let reflexo_fgts = valor_aviso * 0.08;

    // Férias + 1/3, flat multiplier
    let valor_ferias = salario_bruto * 1.3;

    // FGTS: 8% of each month's gross
    let mut depositos = 0.0f64;
    let mut mensal = Vec::new();
    for record in records.iter().filter(|r| r.error.is_none()) {
        let base = monthly_gross(record);
        let valor = base * 0.08;
        depositos += valor;
        mensal.push(FgtsMonth {
            competencia: record.mes_ano.clone().unwrap_or_else(|| "N/D".to_string()),
            base,
            valor,
            status: "Devido".to_string(),
        });
    }

    // The fine base is deposits only; the notice reflex stays out of it
    // but is still owed, so it re-enters the grand total below.
    let total_fgts = depositos;
    let saldo_rescisorio = total_fgts;
    let multa40 = saldo_rescisorio * 0.4;

    let total_geral = valor_aviso + valor_ferias + reflexo_fgts + total_fgts + multa40;

    LaborCalculation {
        aviso_previo: AvisoPrevio {
            dias: dias_aviso,
            valor: valor_aviso,
            reflexo_fgts,
        },
        ferias: Ferias { valor: valor_ferias },
        fgts: Fgts {
            depositos,
            total: total_fgts,
            multa40,
            saldo_rescisorio,
            mensal,
        },
        total_geral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PairField;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(mes_ano: &str, base_previdencia: Option<&str>) -> PaystubRecord {
        PaystubRecord {
            file_name: format!("{mes_ano}.pdf"),
            mes_ano: Some(mes_ano.to_string()),
            base_previdencia: base_previdencia.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_notice_pay_scenario() {
        // 8 completed years: 30 + 24 = 54 days at 3000/30 per day
        let result = calculate_labor_rights(
            &[],
            Some(date(2015, 1, 10)),
            Some(date(2023, 6, 15)),
            3000.0,
        );
        assert_eq!(result.aviso_previo.dias, 54);
        assert!((result.aviso_previo.valor - 5400.0).abs() < 1e-9);
        assert!((result.aviso_previo.reflexo_fgts - 432.0).abs() < 1e-9);
    }

    #[test]
    fn test_completed_years_requires_anniversary() {
        assert_eq!(completed_years(date(2015, 6, 20), date(2023, 6, 15)), 7);
        assert_eq!(completed_years(date(2015, 6, 20), date(2023, 6, 20)), 8);
        assert_eq!(completed_years(date(2015, 6, 20), date(2023, 7, 1)), 8);
    }

    #[test]
    fn test_notice_days_cap_at_20_years() {
        let result = calculate_labor_rights(
            &[],
            Some(date(1990, 1, 10)),
            Some(date(2023, 6, 15)),
            3000.0,
        );
        assert_eq!(result.aviso_previo.dias, 90);
    }

    #[test]
    fn test_notice_without_dates_is_30_days() {
        let result = calculate_labor_rights(&[], None, None, 3000.0);
        assert_eq!(result.aviso_previo.dias, 30);
        assert!((result.aviso_previo.valor - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn test_ferias_flat_multiplier() {
        let result = calculate_labor_rights(&[], None, None, 2000.0);
        assert!((result.ferias.valor - 2600.0).abs() < 1e-9);
    }

    #[test]
    fn test_fine_base_excludes_notice_reflex() {
        // Deposits summing 8000.00: fine must be 3200.00 even though the
        // reflex (240.00 here) is owed elsewhere.
        let records: Vec<PaystubRecord> = (1..=10)
            .map(|m| record(&format!("{m:02}/2022"), Some("10.000,00")))
            .collect();
        let result = calculate_labor_rights(&records, None, None, 1000.0);
        assert!((result.fgts.depositos - 8000.0).abs() < 1e-9);
        assert!((result.fgts.multa40 - 3200.0).abs() < 1e-9);
        assert!((result.fgts.saldo_rescisorio - 8000.0).abs() < 1e-9);
        assert!(result.aviso_previo.reflexo_fgts > 0.0);
    }

    #[test]
    fn test_grand_total_is_the_hybrid_sum() {
        let records = vec![record("01/2022", Some("1.000,00"))];
        let result = calculate_labor_rights(&records, None, None, 1500.0);
        let expected = result.aviso_previo.valor
            + result.ferias.valor
            + result.aviso_previo.reflexo_fgts
            + result.fgts.total
            + result.fgts.multa40;
        assert!((result.total_geral - expected).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_gross_prefers_contribution_base() {
        let mut r = record("01/2022", Some("2.500,00"));
        r.vencimento_base = Some(PairField {
            info: "200.00".into(),
            valor: "9.999,99".into(),
        });
        assert!((monthly_gross(&r) - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_gross_falls_back_to_component_sum() {
        let mut r = record("01/2022", None);
        r.vencimento_base = Some(PairField {
            info: "200.00".into(),
            valor: "2.000,00".into(),
        });
        r.aulas_suplementares = Some(PairField {
            info: "60.00".into(),
            valor: "600,00".into(),
        });
        r.grat_titularidade = Some("100,00".into());
        r.grat_magisterio = Some("50,00".into());
        r.grat_escolaridade = Some("25,00".into());
        assert!((monthly_gross(&r) - 2775.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_records_are_skipped() {
        let records = vec![
            record("01/2022", Some("1.000,00")),
            PaystubRecord::failed("ruim.pdf", "parse failure".into()),
        ];
        let result = calculate_labor_rights(&records, None, None, 1000.0);
        assert_eq!(result.fgts.mensal.len(), 1);
    }

    #[test]
    fn test_detect_salary_basis_prefers_newest_normal_sheet() {
        let mut decimo = record("12/2022", Some("9.000,00"));
        decimo.tipo_folha = Some(crate::models::TipoFolha::Decimo);
        let mut old_normal = record("10/2022", Some("2.000,00"));
        old_normal.tipo_folha = Some(crate::models::TipoFolha::Normal);
        let mut new_normal = record("11/2022", Some("2.100,00"));
        new_normal.tipo_folha = Some(crate::models::TipoFolha::Normal);

        let basis = detect_salary_basis(&[decimo, old_normal, new_normal]);
        assert!((basis - 2100.0).abs() < 1e-9);
    }

    #[test]
    fn test_detect_salary_basis_empty() {
        assert_eq!(detect_salary_basis(&[]), 0.0);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let records = vec![
            record("01/2022", Some("2.000,00")),
            record("02/2022", Some("2.000,00")),
        ];
        let a = calculate_labor_rights(&records, Some(date(2020, 1, 1)), Some(date(2022, 3, 1)), 2000.0);
        let b = calculate_labor_rights(&records, Some(date(2020, 1, 1)), Some(date(2022, 3, 1)), 2000.0);
        assert_eq!(a.total_geral.to_bits(), b.total_geral.to_bits());
        assert_eq!(a.fgts.multa40.to_bits(), b.fgts.multa40.to_bits());
    }
}
