use serde::Serialize;

/// A paired wage line: hours/quantity annotation plus a formatted amount.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PairField {
    pub info: String,
    pub valor: String,
}

/// Employment-bond classification found in the stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Vinculo {
    Efetivo,
    ContratoTemporario,
}

impl Vinculo {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Efetivo => "EFETIVO",
            Self::ContratoTemporario => "CONTRATO TEMPORÁRIO",
        }
    }
}

/// Payroll sheet type; the first keyword match in document order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TipoFolha {
    Normal,
    Decimo,
    Ferias,
}

impl TipoFolha {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Decimo => "DECIMO",
            Self::Ferias => "FERIAS",
        }
    }
}

/// One extracted paystub. Currency fields stay in their formatted pt-BR
/// form; math goes through `fmt::parse_currency`, which maps absent or
/// malformed values to zero.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaystubRecord {
    pub file_name: String,
    /// Set when extraction of this file failed; the record stays in the
    /// batch but is excluded from calculation.
    pub error: Option<String>,
    pub nome: Option<String>,
    pub id_funcional: Option<String>,
    /// Competency label, `MM/YYYY` or `Mon/YYYY`. Unparseable labels are
    /// kept raw and sort after dated records.
    pub mes_ano: Option<String>,
    pub vencimento_base: Option<PairField>,
    pub aulas_suplementares: Option<PairField>,
    pub grat_titularidade: Option<String>,
    pub grat_magisterio: Option<String>,
    pub grat_escolaridade: Option<String>,
    pub vinculo: Option<Vinculo>,
    pub base_previdencia: Option<String>,
    pub tipo_folha: Option<TipoFolha>,
    pub warnings: Vec<String>,
}

impl PaystubRecord {
    pub fn failed(file_name: &str, error: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            error: Some(error),
            ..Self::default()
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}
