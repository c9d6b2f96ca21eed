use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::fmt::{money, parse_currency, parse_mes_ano};
use crate::models::{PairField, PaystubRecord, TipoFolha, Vinculo};
use crate::pdftext;

// ---------------------------------------------------------------------------
// Line-level helpers
// ---------------------------------------------------------------------------

/// Pattern for a pt-BR currency amount: thousands-dot, comma-decimal,
/// exactly two decimal digits.
fn currency_regex() -> Regex {
    Regex::new(r"\d{1,3}(?:\.\d{3})*,\d{2}").unwrap()
}

/// The first currency-looking substring on a line. The first monetary
/// column is the credit; later columns are deductions and must not win.
fn first_currency<'a>(line: &'a str, re: &Regex) -> Option<&'a str> {
    re.find(line).map(|m| m.as_str())
}

/// Split a labeled amount line into its info annotation and credit value.
///
/// Stub lines glue fields together: "1Vencimento Base200.001/2021***2.069,08"
/// is sequence number, label, hours quantity, competency, filler stars,
/// amount.
fn line_parts(line: &str, keyword: &str, currency_re: &Regex) -> Option<PairField> {
    let valor = first_currency(line, currency_re)?.to_string();
    let temp = line.replacen(&valor, "", 1);
    let key_idx = temp.find(keyword)?;
    let info_raw = temp[key_idx + keyword.len()..].replace('*', "");

    // The quantity carries two decimals; a glued competency ("200.001/2021")
    // must not eat its trailing digits.
    let qty_re = Regex::new(r"^\s*(\d+\.\d{2})").unwrap();
    let info = if let Some(caps) = qty_re.captures(&info_raw) {
        caps[1].to_string()
    } else {
        let date_re = Regex::new(r"\d{1,2}/\d{4}").unwrap();
        date_re.replace(&info_raw, "").trim().to_string()
    };

    Some(PairField { info, valor })
}

// ---------------------------------------------------------------------------
// Record extraction
// ---------------------------------------------------------------------------

struct SummedField {
    sum: f64,
    count: usize,
    info: String,
}

impl SummedField {
    fn new() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            info: String::new(),
        }
    }

    fn add(&mut self, parts: &PairField) {
        self.sum += parse_currency(Some(&parts.valor));
        self.count += 1;
        if self.info.is_empty() && !parts.info.is_empty() {
            self.info = parts.info.clone();
        }
    }

    fn add_value(&mut self, valor: &str) {
        self.sum += parse_currency(Some(valor));
        self.count += 1;
    }
}

/// Scan the reconstructed lines of one document and populate a record.
/// Ambiguities become warnings, never errors; a field that is not found
/// simply stays absent.
pub fn extract_record(file_name: &str, raw_lines: &[String]) -> PaystubRecord {
    let lines: Vec<&str> = raw_lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let currency_re = currency_regex();
    let referencia_re = Regex::new(r"\b((?:0[1-9]|1[0-2])/20\d{2})\b").unwrap();
    let mes_textual_re =
        Regex::new(r"(?i)(?:Jan|Fev|Mar|Abr|Mai|Jun|Jul|Ago|Set|Out|Nov|Dez)/\d{4}").unwrap();
    let id_re = Regex::new(r"(\d+/\d)").unwrap();

    let mut record = PaystubRecord {
        file_name: file_name.to_string(),
        ..PaystubRecord::default()
    };

    let mut venc_base = SummedField::new();
    let mut aulas_supl = SummedField::new();
    let mut grat_tit = SummedField::new();
    let mut grat_mag = SummedField::new();
    let mut grat_esc = SummedField::new();

    for (i, line) in lines.iter().enumerate() {
        // Competency: "Referência" header first, "Folha Normal - Jan/2021"
        // as fallback form.
        if record.mes_ano.is_none() && line.contains("Referência") {
            if let Some(caps) = referencia_re.captures(line) {
                record.mes_ano = Some(caps[1].to_string());
            }
        } else if record.mes_ano.is_none() && line.contains("Folha Normal -") {
            if let Some(m) = mes_textual_re.find(line) {
                record.mes_ano = Some(m.as_str().to_string());
            }
        }

        if record.tipo_folha.is_none() {
            let upper = line.to_uppercase();
            if upper.contains("FOLHA NORMAL") {
                record.tipo_folha = Some(TipoFolha::Normal);
            } else if upper.contains("13º") || upper.contains("DÉCIMO") {
                record.tipo_folha = Some(TipoFolha::Decimo);
            } else if upper.contains("FÉRIAS") {
                record.tipo_folha = Some(TipoFolha::Ferias);
            }
        }

        // "Nome" label line; the value is the following line.
        if record.nome.is_none() && *line == "Nome" {
            if let Some(next) = lines.get(i + 1) {
                record.nome = Some(next.to_string());
            }
        }

        // ID appears as digits/digit on the line after the label.
        if record.id_funcional.is_none() && line.contains("ID Funcional") {
            if let Some(caps) = lines.get(i + 1).and_then(|next| id_re.captures(next)) {
                record.id_funcional = Some(caps[1].to_string());
            }
        }

        // Vínculo: the label line plus the next two lines form the local
        // context window.
        if record.vinculo.is_none()
            && (line.contains("Tipo de Vínculo") || line.contains("Vínculo") || line.contains("Cargo"))
        {
            let mut context = line.to_string();
            for next in lines.iter().skip(i + 1).take(2) {
                context.push(' ');
                context.push_str(next);
            }
            let context = context.to_uppercase();
            if context.contains("EFETIVO") {
                record.vinculo = Some(Vinculo::Efetivo);
            } else if context.contains("CONTRATO TEMPORARIO") || context.contains("TEMPORÁRIO") {
                record.vinculo = Some(Vinculo::ContratoTemporario);
            }
        }

        if line.contains("Vencimento Base") {
            if let Some(parts) = line_parts(line, "Vencimento Base", &currency_re) {
                venc_base.add(&parts);
            }
        }

        if line.contains("Aulas Suplementares") {
            if let Some(parts) = line_parts(line, "Aulas Suplementares", &currency_re) {
                aulas_supl.add(&parts);
            }
        }

        if line.contains("Grat Titularidade") {
            if let Some(valor) = first_currency(line, &currency_re) {
                grat_tit.add_value(valor);
            }
        }

        if line.contains("Grat Magistério") {
            if let Some(valor) = first_currency(line, &currency_re) {
                grat_mag.add_value(valor);
            }
        }

        if line.contains("Grat Escolaridade") {
            if let Some(valor) = first_currency(line, &currency_re) {
                grat_esc.add_value(valor);
            }
        }

        // Footer contribution base: same line first, else the first amount
        // on the following line.
        if record.base_previdencia.is_none()
            && (line.contains("Base Previdência") || line.contains("Base Previd"))
        {
            let mut valor = first_currency(line, &currency_re).map(str::to_string);
            if valor.is_none() {
                valor = lines
                    .get(i + 1)
                    .and_then(|next| first_currency(next, &currency_re))
                    .map(str::to_string);
            }
            record.base_previdencia = valor;
        }
    }

    // Whole-document fallback when no labeled context classified the bond.
    if record.vinculo.is_none() {
        let full = lines.join(" ").to_uppercase();
        if full.contains("TIPO DE VÍNCULO EFETIVO") || full.contains("VÍNCULO: EFETIVO") {
            record.vinculo = Some(Vinculo::Efetivo);
        } else if full.contains("CONTRATO TEMPORARIO") {
            record.vinculo = Some(Vinculo::ContratoTemporario);
        }
    }

    if venc_base.sum > 0.0 || !venc_base.info.is_empty() {
        record.vencimento_base = Some(PairField {
            info: venc_base.info.clone(),
            valor: money(venc_base.sum),
        });
    }
    if aulas_supl.sum > 0.0 || !aulas_supl.info.is_empty() {
        record.aulas_suplementares = Some(PairField {
            info: aulas_supl.info.clone(),
            valor: money(aulas_supl.sum),
        });
    }
    if grat_tit.sum > 0.0 {
        record.grat_titularidade = Some(money(grat_tit.sum));
    }
    if grat_mag.sum > 0.0 {
        record.grat_magisterio = Some(money(grat_mag.sum));
    }
    if grat_esc.sum > 0.0 {
        record.grat_escolaridade = Some(money(grat_esc.sum));
    }

    if venc_base.count > 1 {
        record.warnings.push("Vencimento Base (Soma)".to_string());
    }
    if aulas_supl.count > 1 {
        record.warnings.push("Aulas Supl. (Soma)".to_string());
    }
    if grat_tit.count > 1 {
        record.warnings.push("Grat. Titularidade (Soma)".to_string());
    }
    if grat_mag.count > 1 {
        record.warnings.push("Grat. Magistério (Soma)".to_string());
    }
    if grat_esc.count > 1 {
        record.warnings.push("Grat. Escolaridade (Soma)".to_string());
    }

    record
}

// ---------------------------------------------------------------------------
// Batch processing
// ---------------------------------------------------------------------------

/// Process a batch of PDF files. A file that cannot be read or parsed
/// produces a record carrying its error string; the rest of the batch is
/// unaffected. Records come back sorted by competency, undated ones last
/// in their input order.
pub fn process_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PaystubRecord>> {
    let mut records = Vec::new();
    let mut seen_checksums: HashMap<String, String> = HashMap::new();

    for path in paths {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                records.push(PaystubRecord::failed(&file_name, e.to_string()));
                continue;
            }
        };

        let checksum = hex::encode(Sha256::digest(&bytes));
        let duplicate_of = seen_checksums.get(&checksum).cloned();
        seen_checksums.entry(checksum).or_insert_with(|| file_name.clone());

        let mut record = match pdftext::extract_lines(&bytes) {
            Ok(lines) => extract_record(&file_name, &lines),
            Err(e) => PaystubRecord::failed(&file_name, e.to_string()),
        };

        if let Some(original) = duplicate_of {
            record
                .warnings
                .push(format!("Arquivo duplicado de {original}"));
        }
        records.push(record);
    }

    sort_by_period(&mut records);
    Ok(records)
}

/// Stable sort by parsed competency, oldest first; records whose label
/// does not parse keep their relative input order at the end.
pub fn sort_by_period(records: &mut [PaystubRecord]) {
    records.sort_by_key(|r| {
        r.mes_ano
            .as_deref()
            .and_then(parse_mes_ano)
            .map_or((1u8, chrono::NaiveDate::MAX), |d| (0, d))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_base_line_first_value_is_credit() {
        // Credit column first, discount column later in the same line
        let record = extract_record(
            "stub.pdf",
            &lines(&["1Vencimento Base200.001/2021***********2.069,08"]),
        );
        let base = record.vencimento_base.unwrap();
        assert_eq!(base.info, "200.00");
        assert_eq!(base.valor, "2.069,08");
    }

    #[test]
    fn test_first_currency_ignores_discount_column() {
        let re = currency_regex();
        let line = "1Vencimento Base200.001/2021***2.069,08***150,00";
        assert_eq!(first_currency(line, &re), Some("2.069,08"));
    }

    #[test]
    fn test_repeated_lines_are_summed_with_warning() {
        let record = extract_record(
            "stub.pdf",
            &lines(&[
                "1Vencimento Base200.001/2021***********2.000,00",
                "1Vencimento Base100.001/2021***********1.000,50",
            ]),
        );
        let base = record.vencimento_base.unwrap();
        assert_eq!(base.valor, "3.000,50");
        // Info keeps the first occurrence only
        assert_eq!(base.info, "200.00");
        assert!(record
            .warnings
            .iter()
            .any(|w| w == "Vencimento Base (Soma)"));
    }

    #[test]
    fn test_aulas_suplementares_extraction() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["20Aulas Suplementares60.001/2021*************620,72"]),
        );
        let aulas = record.aulas_suplementares.unwrap();
        assert_eq!(aulas.info, "60.00");
        assert_eq!(aulas.valor, "620,72");
    }

    #[test]
    fn test_nome_from_following_line() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["Nome", "MARIA DAS GRAÇAS SILVA"]),
        );
        assert_eq!(record.nome.as_deref(), Some("MARIA DAS GRAÇAS SILVA"));
    }

    #[test]
    fn test_id_funcional_pattern_on_next_line() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["ID FuncionalMês/Ano", "57213134/1Folha Normal - Jan/2021"]),
        );
        assert_eq!(record.id_funcional.as_deref(), Some("57213134/1"));
        assert_eq!(record.mes_ano.as_deref(), Some("Jan/2021"));
        assert_eq!(record.tipo_folha, Some(TipoFolha::Normal));
    }

    #[test]
    fn test_referencia_period_wins_over_fallback() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["Referência: 03/2021", "Folha Normal - Mar/2021"]),
        );
        assert_eq!(record.mes_ano.as_deref(), Some("03/2021"));
    }

    #[test]
    fn test_vinculo_from_context_window() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["Tipo de Vínculo", "Cargo Professor", "EFETIVO"]),
        );
        assert_eq!(record.vinculo, Some(Vinculo::Efetivo));
    }

    #[test]
    fn test_vinculo_temporario() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["Vínculo CONTRATO TEMPORARIO"]),
        );
        assert_eq!(record.vinculo, Some(Vinculo::ContratoTemporario));
    }

    #[test]
    fn test_vinculo_document_fallback() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["cabecalho qualquer", "TIPO DE VÍNCULO EFETIVO no rodapé"]),
        );
        assert_eq!(record.vinculo, Some(Vinculo::Efetivo));
    }

    #[test]
    fn test_vinculo_unknown_stays_none() {
        let record = extract_record("stub.pdf", &lines(&["nada relevante aqui"]));
        assert_eq!(record.vinculo, None);
    }

    #[test]
    fn test_tipo_folha_first_match_wins() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["13º Salário", "Folha Normal"]),
        );
        assert_eq!(record.tipo_folha, Some(TipoFolha::Decimo));
    }

    #[test]
    fn test_base_previdencia_same_line() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["Base Previd. 2.500,00"]),
        );
        assert_eq!(record.base_previdencia.as_deref(), Some("2.500,00"));
    }

    #[test]
    fn test_base_previdencia_next_line_fallback() {
        let record = extract_record(
            "stub.pdf",
            &lines(&["Base Previdência", "************6.186,54 outros"]),
        );
        assert_eq!(record.base_previdencia.as_deref(), Some("6.186,54"));
    }

    #[test]
    fn test_gratificacoes_summed() {
        let record = extract_record(
            "stub.pdf",
            &lines(&[
                "5Grat Titularidade***100,00",
                "5Grat Titularidade***50,00",
                "6Grat Magistério***200,00",
            ]),
        );
        assert_eq!(record.grat_titularidade.as_deref(), Some("150,00"));
        assert_eq!(record.grat_magisterio.as_deref(), Some("200,00"));
        assert_eq!(record.grat_escolaridade, None);
        assert!(record
            .warnings
            .iter()
            .any(|w| w == "Grat. Titularidade (Soma)"));
        assert!(!record.warnings.iter().any(|w| w.contains("Magistério")));
    }

    #[test]
    fn test_empty_document_yields_default_record() {
        let record = extract_record("vazio.pdf", &[]);
        assert!(record.error.is_none());
        assert!(record.vencimento_base.is_none());
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_sort_by_period_undated_last_stable() {
        let mut records = vec![
            PaystubRecord {
                file_name: "b.pdf".into(),
                mes_ano: Some("03/2021".into()),
                ..Default::default()
            },
            PaystubRecord {
                file_name: "x.pdf".into(),
                mes_ano: Some("???".into()),
                ..Default::default()
            },
            PaystubRecord {
                file_name: "a.pdf".into(),
                mes_ano: Some("01/2021".into()),
                ..Default::default()
            },
            PaystubRecord {
                file_name: "y.pdf".into(),
                mes_ano: None,
                ..Default::default()
            },
        ];
        sort_by_period(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "x.pdf", "y.pdf"]);
    }

    #[test]
    fn test_process_files_records_failures_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("corrupto.pdf");
        std::fs::write(&bad, b"not a pdf at all").unwrap();
        let missing = dir.path().join("inexistente.pdf");

        let records = process_files(&[bad, missing]).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.error.is_some()));
    }

    #[test]
    fn test_process_files_flags_duplicate_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("um.pdf");
        let b = dir.path().join("dois.pdf");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();

        let records = process_files(&[a, b]).unwrap();
        let dup = records
            .iter()
            .find(|r| r.warnings.iter().any(|w| w.contains("duplicado")));
        assert!(dup.is_some());
    }
}
