use lopdf::content::Content;
use lopdf::{Document, Object};

use crate::error::{Result, VerbaError};

/// Vertical distance (in text-space units) under which two tokens are
/// treated as sitting on the same printed line.
const LINE_TOLERANCE: f64 = 5.0;

/// One positioned text run from a page content stream.
#[derive(Debug, Clone)]
pub struct TextToken {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Extract the text of every page as reading-order lines: top of the page
/// first, tokens on a line left to right, pages concatenated in page order.
///
/// Fails as a whole for unreadable or encrypted documents; batch callers
/// catch this per file.
pub fn extract_lines(bytes: &[u8]) -> Result<Vec<String>> {
    let doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(VerbaError::EncryptedPdf(
            "document requires a password".to_string(),
        ));
    }

    let mut lines = Vec::new();
    for (_number, page_id) in doc.get_pages() {
        let tokens = page_tokens(&doc, page_id)?;
        lines.extend(assemble_lines(tokens));
    }
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Content-stream interpretation
// ---------------------------------------------------------------------------

/// Text matrix [a b c d e f]; e,f carry the current text position.
type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m1: Matrix, m2: Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(m: Matrix, tx: f64, ty: f64) -> Matrix {
    multiply([1.0, 0.0, 0.0, 1.0, tx, ty], m)
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Walk one page's content stream and collect positioned text tokens.
///
/// Only the text-positioning subset of the operator set is tracked; glyph
/// advances within a show operation are not modelled. Cells in the stubs
/// this targets are positioned individually with Td/Tm, which is enough to
/// recover reading order.
fn page_tokens(doc: &Document, page_id: (u32, u16)) -> Result<Vec<TextToken>> {
    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;

    let fonts = doc.get_page_fonts(page_id);
    let encodings: std::collections::BTreeMap<Vec<u8>, &str> = fonts
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();

    let mut current_encoding: Option<&str> = None;
    let mut tm = IDENTITY;
    let mut tlm = IDENTITY;
    let mut leading = 0.0f64;
    let mut tokens = Vec::new();

    let mut push = |text: String, m: &Matrix| {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            tokens.push(TextToken {
                text: trimmed.to_string(),
                x: m[4],
                y: m[5],
            });
        }
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                tm = IDENTITY;
                tlm = IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    current_encoding = encodings.get(name).copied();
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    tlm = translate(tlm, tx, ty);
                    tm = tlm;
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    leading = -ty;
                    tlm = translate(tlm, tx, ty);
                    tm = tlm;
                }
            }
            "TL" => {
                if let Some(tl) = op.operands.first().and_then(number) {
                    leading = tl;
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let vals: Vec<f64> = op.operands.iter().filter_map(number).collect();
                    if vals.len() == 6 {
                        tlm = [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]];
                        tm = tlm;
                    }
                }
            }
            "T*" => {
                tlm = translate(tlm, 0.0, -leading);
                tm = tlm;
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push(Document::decode_text(current_encoding, bytes), &tm);
                }
            }
            "'" => {
                tlm = translate(tlm, 0.0, -leading);
                tm = tlm;
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push(Document::decode_text(current_encoding, bytes), &tm);
                }
            }
            "\"" => {
                tlm = translate(tlm, 0.0, -leading);
                tm = tlm;
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    push(Document::decode_text(current_encoding, bytes), &tm);
                }
            }
            "TJ" => {
                if let Some(Object::Array(elements)) = op.operands.first() {
                    let mut text = String::new();
                    for element in elements {
                        if let Object::String(bytes, _) = element {
                            text.push_str(&Document::decode_text(current_encoding, bytes));
                        }
                    }
                    push(text, &tm);
                }
            }
            _ => {}
        }
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Line assembly
// ---------------------------------------------------------------------------

/// Group positioned tokens into visual lines: sort top-down, merge tokens
/// whose vertical positions sit within the tolerance band, then order each
/// line left to right and join with single spaces.
pub fn assemble_lines(mut tokens: Vec<TextToken>) -> Vec<String> {
    if tokens.is_empty() {
        return Vec::new();
    }

    tokens.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal));

    let mut groups: Vec<Vec<TextToken>> = Vec::new();
    let mut current: Vec<TextToken> = Vec::new();
    let mut current_y = f64::NAN;

    for token in tokens {
        if current.is_empty() {
            current_y = token.y;
            current.push(token);
            continue;
        }
        if (token.y - current_y).abs() < LINE_TOLERANCE {
            current.push(token);
        } else {
            groups.push(std::mem::take(&mut current));
            current_y = token.y;
            current.push(token);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    let mut lines = Vec::new();
    for mut group in groups {
        group.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        let line = group
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let line = line.trim().to_string();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}
