use std::io::BufWriter;

use printpdf::*;

use crate::audit::{AuditReport, CorrectedShortfall, CorrectedTotals};
use crate::error::{Result, VerbaError};
use crate::fmt::{format_date_br, money};
use crate::labor::LaborCalculation;

// A4 dimensions (mm)
const A4_W: f32 = 210.0;
const A4_H: f32 = 297.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 14.0;
const MARGIN_RIGHT: f32 = 14.0;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 11.0;

const FIRM_NAME: &str = "BRITO & SANTOS ADVOCACIA";

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    page_w: f32,
    page_h: f32,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str, landscape: bool) -> Result<Self> {
        let (page_w, page_h) = if landscape { (A4_H, A4_W) } else { (A4_W, A4_H) };
        let (doc, page, layer) = PdfDocument::new(title, Mm(page_w), Mm(page_h), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| VerbaError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| VerbaError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            page_w,
            page_h,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        self.page_h - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(self.page_w), Mm(self.page_h), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > self.page_h - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, subtitle: &str) {
        self.text(FIRM_NAME, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        self.text(subtitle, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 5.0;
        let ts = chrono::Local::now()
            .format("Gerado em: %d/%m/%Y %H:%M")
            .to_string();
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, self.page_w - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < headers.len() {
                match col.align {
                    Align::Left => self.text(headers[i], x, FONT_SIZE, true),
                    Align::Right => {
                        let tw = approx_text_width(headers[i], FONT_SIZE);
                        self.text(headers[i], x + col.width - tw, FONT_SIZE, true);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
        self.hline(MARGIN_LEFT, self.page_w - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < values.len() {
                match col.align {
                    Align::Left => self.text(values[i], x, FONT_SIZE, bold),
                    Align::Right => {
                        let tw = approx_text_width(values[i], FONT_SIZE);
                        self.text(values[i], x + col.width - tw, FONT_SIZE, bold);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn section_label(&mut self, label: &str) {
        self.ensure_space(ROW_H);
        self.text(label, MARGIN_LEFT, FONT_SIZE + 2.0, true);
        self.y += ROW_H;
    }

    fn paragraph(&mut self, text: &str, width_chars: usize) {
        for line in wrap_text(text, width_chars) {
            self.ensure_space(ROW_H);
            self.text(&line, MARGIN_LEFT, FONT_SIZE, false);
            self.y += ROW_H - 0.5;
        }
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.hline(MARGIN_LEFT, self.page_w - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn footnote(&mut self, text: &str) {
        self.blank_row();
        self.ensure_space(ROW_H);
        self.text(text, MARGIN_LEFT, 7.0, false);
        self.y += ROW_H;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| VerbaError::Pdf(format!("{e:?}")))?;
        Ok(buf.into_inner().map_err(|e| VerbaError::Pdf(e.to_string()))?)
    }
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

/// Audit report: monthly shortfall table plus the summary of facts.
/// With corrected shortfalls supplied, the difference column shows the
/// updated values.
pub fn render_audit(
    report: &AuditReport,
    corrected: Option<&[CorrectedShortfall]>,
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Relatório de Auditoria", true)?;
    pdf.header("Relatório de Auditoria - Aulas Suplementares");

    pdf.section_label("Dados do Servidor");
    let nome = format!("Nome: {}", report.nome);
    pdf.paragraph(&nome, 120);
    let id = format!("Matrícula/ID: {}", report.id_funcional);
    pdf.paragraph(&id, 120);
    let vinculo = format!(
        "Vínculo Identificado: {}",
        report
            .vinculo
            .map(|v| v.label())
            .unwrap_or("Não Identificado")
    );
    pdf.paragraph(&vinculo, 120);
    pdf.blank_row();

    pdf.section_label("Resumo dos Fatos");
    pdf.paragraph(&report.summary, 130);
    pdf.blank_row();

    pdf.section_label("Detalhamento Mensal");
    let cols = &[
        Col { width: 45.0, align: Align::Left },
        Col { width: 26.0, align: Align::Right },
        Col { width: 24.0, align: Align::Right },
        Col { width: 24.0, align: Align::Right },
        Col { width: 24.0, align: Align::Right },
        Col { width: 18.0, align: Align::Right },
        Col { width: 26.0, align: Align::Right },
        Col { width: 26.0, align: Align::Right },
        Col { width: 30.0, align: Align::Right },
    ];
    pdf.table_header(
        cols,
        &[
            "Ref.", "V. Base", "G. Tit.", "G. Mag.", "G. Esc.", "Aulas", "Pago", "Devido",
            "Diferença",
        ],
    );

    let mut total_diferenca = 0.0;
    for row in &report.rows {
        let diferenca = corrected
            .and_then(|all| all.iter().find(|s| s.mes_ano == row.mes_ano))
            .map(|s| s.result.total_value)
            .unwrap_or(row.diferenca);
        total_diferenca += diferenca;

        let venc = money(row.venc_base);
        let tit = money(row.grat_tit);
        let mag = money(row.grat_mag);
        let esc = money(row.grat_esc);
        let aulas = format!("{:.2}", row.info_aulas);
        let pago = money(row.pago);
        let devido = money(row.devidas);
        let diff = money(diferenca);
        pdf.table_row(
            cols,
            &[&row.mes_ano, &venc, &tit, &mag, &esc, &aulas, &pago, &devido, &diff],
            false,
        );
    }

    pdf.separator();
    let recebido = money(report.total_recebido);
    let devidas = money(report.total_devidas);
    let diferenca = money(total_diferenca);
    pdf.table_row(
        cols,
        &["TOTAL", "", "", "", "", "", &recebido, &devidas, &diferenca],
        true,
    );

    pdf.to_bytes()
}

/// Employee/contract context shared by the severance and FGTS documents.
pub struct ReportContext {
    pub nome: String,
    pub id_funcional: String,
    pub vinculo: String,
    pub admissao: String,
    pub demissao: String,
    pub salario: f64,
}

/// Correction annotations for the severance term.
pub struct SeveranceCorrection {
    pub index_name: String,
    pub interest_name: String,
    pub original: f64,
    pub correction: f64,
    pub interest: f64,
    pub total: f64,
}

/// Termo de cálculo de verbas rescisórias.
pub fn render_severance(
    calc: &LaborCalculation,
    ctx: &ReportContext,
    correction: Option<&SeveranceCorrection>,
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Termo de Cálculo de Verbas Rescisórias", false)?;
    pdf.header("Termo de Cálculo de Verbas Rescisórias");

    pdf.section_label("Dados Contratuais");
    let funcionario = format!("Funcionário: {}", ctx.nome);
    pdf.paragraph(&funcionario, 90);
    let datas = format!(
        "Data de Admissão: {}    Data de Demissão: {}",
        format_date_br(&ctx.admissao),
        format_date_br(&ctx.demissao)
    );
    pdf.paragraph(&datas, 90);
    let base = format!("Base de Cálculo: {}", money(ctx.salario));
    pdf.paragraph(&base, 90);
    pdf.blank_row();

    let cols = &[
        Col { width: 100.0, align: Align::Left },
        Col { width: 40.0, align: Align::Right },
        Col { width: 42.0, align: Align::Right },
    ];
    pdf.table_header(cols, &["Discriminação das Verbas", "Referência / Dias", "Valor Calculado"]);

    let dias = format!("{} dias", calc.aviso_previo.dias);
    let aviso = money(calc.aviso_previo.valor);
    pdf.table_row(cols, &["Aviso Prévio Indenizado", &dias, &aviso], false);

    let ferias = money(calc.ferias.valor);
    pdf.table_row(cols, &["Férias com 1/3", "Base + 30%", &ferias], false);

    let reflexo = money(calc.aviso_previo.reflexo_fgts);
    pdf.table_row(cols, &["Reflexo FGTS sobre Aviso Prévio", "8,00%", &reflexo], false);

    match correction {
        Some(corr) => {
            let label = format!("Atualização Monetária ({})", corr.index_name);
            let amount = money(corr.correction);
            pdf.table_row(cols, &[&label, "-", &amount], false);

            let label = format!("Juros de Mora ({})", corr.interest_name);
            let amount = money(corr.interest);
            pdf.table_row(cols, &[&label, "-", &amount], false);

            pdf.separator();
            let original = money(corr.original);
            pdf.table_row(cols, &["TOTAL ORIGINAL", "", &original], true);
            let total = money(corr.total);
            pdf.table_row(cols, &["TOTAL FINAL (Corrigido + Juros)", "", &total], true);
        }
        None => {
            pdf.separator();
            let total = money(
                calc.aviso_previo.valor + calc.ferias.valor + calc.aviso_previo.reflexo_fgts,
            );
            pdf.table_row(cols, &["TOTAL BRUTO A PAGAR", "", &total], true);
        }
    }

    pdf.footnote(
        "Este documento é um demonstrativo de cálculo estimado e não possui valor legal de homologação oficial.",
    );

    pdf.to_bytes()
}

/// Memória de cálculo do FGTS, month by month; with corrections the table
/// switches to the per-month correction/interest breakdown.
pub fn render_fgts(
    calc: &LaborCalculation,
    ctx: &ReportContext,
    corrected: Option<&CorrectedTotals>,
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Memória de Cálculo - FGTS", true)?;
    pdf.header("Memória de Cálculo - FGTS");

    let funcionario = format!(
        "Funcionário: {}    ID Funcional: {}    Vínculo: {}",
        ctx.nome, ctx.id_funcional, ctx.vinculo
    );
    pdf.paragraph(&funcionario, 130);
    let datas = format!(
        "Admissão: {}    Desligamento: {}",
        format_date_br(&ctx.admissao),
        format_date_br(&ctx.demissao)
    );
    pdf.paragraph(&datas, 130);
    pdf.blank_row();

    let apurado = match corrected {
        Some(c) => c.fgts_final + calc.fgts.multa40,
        None => calc.fgts.total + calc.fgts.multa40,
    };
    let headline = format!("Total FGTS Apurado: {}", money(apurado));
    pdf.section_label(&headline);
    pdf.blank_row();

    match corrected {
        Some(c) => {
            let cols = &[
                Col { width: 50.0, align: Align::Left },
                Col { width: 40.0, align: Align::Right },
                Col { width: 40.0, align: Align::Right },
                Col { width: 44.0, align: Align::Right },
                Col { width: 40.0, align: Align::Right },
                Col { width: 45.0, align: Align::Right },
            ];
            pdf.table_header(
                cols,
                &["Ref.", "FGTS Original", "Correção", "Valor Atualizado", "Juros", "Total"],
            );

            for month in &c.fgts_mensal {
                let original = money(month.original);
                match &month.result {
                    Some(r) => {
                        let correcao = money(r.correction_amount);
                        let atualizado = money(r.corrected_value);
                        let juros = money(r.interest_amount);
                        let total = money(r.total_value);
                        pdf.table_row(
                            cols,
                            &[&month.competencia, &original, &correcao, &atualizado, &juros, &total],
                            false,
                        );
                    }
                    None => {
                        let total = money(month.total);
                        pdf.table_row(
                            cols,
                            &[&month.competencia, &original, "-", "-", "-", &total],
                            false,
                        );
                    }
                }
            }

            let base_multa = money(calc.fgts.saldo_rescisorio);
            let multa = money(c.multa);
            pdf.table_row(
                cols,
                &["Multa 40% (s/ Original)", &base_multa, "-", "-", "-", &multa],
                false,
            );

            pdf.separator();
            let original = money(calc.fgts.depositos);
            let correcao = money(c.fgts_corrigido - calc.fgts.depositos);
            let atualizado = money(c.fgts_corrigido);
            let juros = money(c.fgts_juros);
            let total = money(c.fgts_final + c.multa);
            pdf.table_row(
                cols,
                &["TOTAL GERAL", &original, &correcao, &atualizado, &juros, &total],
                true,
            );
        }
        None => {
            let cols = &[
                Col { width: 60.0, align: Align::Left },
                Col { width: 50.0, align: Align::Right },
                Col { width: 40.0, align: Align::Right },
                Col { width: 55.0, align: Align::Right },
                Col { width: 40.0, align: Align::Right },
            ];
            pdf.table_header(
                cols,
                &["Competência", "Base de Cálculo", "Alíquota", "Valor Devido", "Status"],
            );

            for month in &calc.fgts.mensal {
                let base = money(month.base);
                let valor = money(month.valor);
                pdf.table_row(
                    cols,
                    &[&month.competencia, &base, "8,00%", &valor, &month.status],
                    false,
                );
            }

            let base_multa = money(calc.fgts.saldo_rescisorio);
            let multa = money(calc.fgts.multa40);
            pdf.table_row(
                cols,
                &["Multa Rescisória (40%)", &base_multa, "40,00%", &multa, "Multa"],
                false,
            );

            pdf.separator();
            let total = money(calc.fgts.total + calc.fgts.multa40);
            pdf.table_row(cols, &["TOTAL A RECEBER", "-", "-", &total, "-"], true);
        }
    }

    pdf.footnote(
        "Este é apenas um demonstrativo simples. Na fase de liquidação de sentença ou acordo, após indicação do juízo dos índices oficiais de correção monetária e juros, os mesmos serão atualizados.",
    );

    pdf.to_bytes()
}
