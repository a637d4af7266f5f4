//! WordprocessingML 片段。只產生 Word/LibreOffice 需要的最小結構。

use crate::domain::model::{AccountTable, PayeeRecord, Signature};
use crate::utils::error::{OficioError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

pub const NUMBER_PLACEHOLDER: &str = "____/____";
pub const DATE_PLACEHOLDER: &str = "___/___/____";

pub const DOCUMENT_PART: &str = "word/document.xml";

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

pub const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// 欄寬 2.5in / 1.7in / 2.3in / 1.3in（單位 twip）
const COLUMN_WIDTHS: [u32; 4] = [3600, 2448, 3312, 1872];

const TABLE_HEADERS: [&str; 4] = ["FAVORECIDO", "CNPJ/CPF", "CONTA PARA CRÉDITO", "VALOR"];

const TABLE_BORDERS: [&str; 6] = ["top", "left", "bottom", "right", "insideH", "insideV"];

/// 10pt
const FONT_HALF_POINTS: u32 = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunStyle {
    pub bold: bool,
    pub half_points: Option<u32>,
}

/// 以 quick-xml 事件寫出 `<w:body>` 內的片段
pub struct BodyWriter {
    writer: Writer<Vec<u8>>,
}

impl Default for BodyWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.writer.write_event(Event::Empty(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))?;
        Ok(())
    }

    /// 文字中的 `\n` 轉成 `<w:br/>`
    fn run(&mut self, text: &str, style: RunStyle) -> Result<()> {
        self.start("w:r")?;

        if style.bold || style.half_points.is_some() {
            self.start("w:rPr")?;
            if style.bold {
                self.empty("w:b", &[])?;
            }
            if let Some(size) = style.half_points {
                let size = size.to_string();
                self.empty("w:sz", &[("w:val", size.as_str())])?;
                self.empty("w:szCs", &[("w:val", size.as_str())])?;
            }
            self.end("w:rPr")?;
        }

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.empty("w:br", &[])?;
            }
            self.writer.write_event(Event::Start(
                BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
            ))?;
            self.writer.write_event(Event::Text(BytesText::new(line)))?;
            self.end("w:t")?;
        }

        self.end("w:r")
    }

    fn paragraph_start(&mut self, centered: bool) -> Result<()> {
        self.start("w:p")?;
        if centered {
            self.start("w:pPr")?;
            self.empty("w:jc", &[("w:val", "center")])?;
            self.end("w:pPr")?;
        }
        Ok(())
    }

    pub fn paragraph(&mut self, text: &str, centered: bool, style: RunStyle) -> Result<()> {
        self.paragraph_start(centered)?;
        self.run(text, style)?;
        self.end("w:p")
    }

    pub fn empty_paragraph(&mut self) -> Result<()> {
        self.empty("w:p", &[])
    }

    fn cell(&mut self, text: &str, width: u32, span: Option<u32>, centered: bool) -> Result<()> {
        self.start("w:tc")?;
        self.start("w:tcPr")?;
        let width = width.to_string();
        self.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
        if let Some(span) = span {
            let span = span.to_string();
            self.empty("w:gridSpan", &[("w:val", span.as_str())])?;
        }
        self.end("w:tcPr")?;

        let style = RunStyle {
            bold: false,
            half_points: Some(FONT_HALF_POINTS),
        };
        self.paragraph(text, centered, style)?;
        self.end("w:tc")
    }

    fn text_row(&mut self, texts: &[&str]) -> Result<()> {
        self.start("w:tr")?;
        for (text, width) in texts.iter().zip(COLUMN_WIDTHS) {
            self.cell(text, width, None, false)?;
        }
        self.end("w:tr")
    }

    fn payee_row(&mut self, payee: &PayeeRecord) -> Result<()> {
        let account = format!(
            "Banco: {}\nAgência: {}\nConta: {}",
            payee.banco, payee.agencia, payee.conta
        );
        let value = format!("R$ {}", payee.valor_liquido);
        self.text_row(&[
            payee.nome.as_str(),
            payee.cnpj.as_str(),
            account.as_str(),
            value.as_str(),
        ])
    }

    /// 一個借方帳號一張表：合併的標題列、欄位列、每位付款對象一列
    pub fn account_table(&mut self, table: &AccountTable) -> Result<()> {
        self.start("w:tbl")?;

        self.start("w:tblPr")?;
        self.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
        self.start("w:tblBorders")?;
        for side in TABLE_BORDERS {
            self.empty(
                &format!("w:{}", side),
                &[
                    ("w:val", "single"),
                    ("w:sz", "4"),
                    ("w:space", "0"),
                    ("w:color", "000000"),
                ],
            )?;
        }
        self.end("w:tblBorders")?;
        self.empty("w:tblLayout", &[("w:type", "fixed")])?;
        self.end("w:tblPr")?;

        self.start("w:tblGrid")?;
        for width in COLUMN_WIDTHS {
            let width = width.to_string();
            self.empty("w:gridCol", &[("w:w", width.as_str())])?;
        }
        self.end("w:tblGrid")?;

        self.start("w:tr")?;
        self.cell(
            &format!("CONTA DO DÉBITO: {}", table.conta),
            COLUMN_WIDTHS.iter().sum(),
            Some(COLUMN_WIDTHS.len() as u32),
            true,
        )?;
        self.end("w:tr")?;

        self.text_row(&TABLE_HEADERS)?;
        for payee in &table.fornecedores {
            self.payee_row(payee)?;
        }

        self.end("w:tbl")
    }

    pub fn signature_block(&mut self, signature: &Signature) -> Result<()> {
        self.paragraph_start(true)?;
        self.run(
            &format!("{}\n", signature.nome),
            RunStyle {
                bold: true,
                half_points: None,
            },
        )?;
        self.run(&format!("{}\n", signature.cargo), RunStyle::default())?;
        self.run(&signature.decreto, RunStyle::default())?;
        self.end("w:p")?;
        self.empty_paragraph()
    }

    pub fn into_xml(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|_| OficioError::render("generated XML is not UTF-8"))
    }
}

/// 沒有範本時的完整 document.xml（A4，2.5cm 邊界）
pub fn minimal_document(content: &str) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("w:document").with_attributes([("xmlns:w", WORD_NS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;
    writer.get_mut().write_all(content.as_bytes())?;

    writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;
    writer.write_event(Event::Empty(
        BytesStart::new("w:pgSz").with_attributes([("w:w", "11906"), ("w:h", "16838")]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("w:pgMar").with_attributes([
        ("w:top", "1417"),
        ("w:right", "1134"),
        ("w:bottom", "1134"),
        ("w:left", "1134"),
        ("w:header", "708"),
        ("w:footer", "708"),
        ("w:gutter", "0"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|_| OficioError::render("generated XML is not UTF-8"))
}

/// 替換範本中的編號與日期，並把內容插在 body 層的 sectPr（或 </w:body>）之前。
///
/// 佔位符以整段文字比對，Word 把它拆到多個 `<w:r>` 時仍能替換；
/// 替換值寫入佔位符起點所在的 `<w:t>`，其餘被覆蓋的部分移除。
pub fn fill_template(document_xml: &str, numero: &str, date: &str, content: &str) -> Result<String> {
    let replacements = [(NUMBER_PLACEHOLDER, numero), (DATE_PLACEHOLDER, date)];

    let mut reader = Reader::from_str(document_xml);
    let mut writer = Writer::new(Vec::new());
    let mut open_elements: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs: Vec<Vec<Event<'_>>> = Vec::new();
    let mut inserted = false;

    loop {
        let event = reader.read_event()?;

        let insert_here = !inserted
            && match &event {
                Event::Start(e) | Event::Empty(e) => {
                    e.name().as_ref() == b"w:sectPr"
                        && open_elements.last().is_some_and(|parent| parent == b"w:body")
                }
                Event::End(e) => e.name().as_ref() == b"w:body",
                _ => false,
            };
        if insert_here {
            writer.get_mut().write_all(content.as_bytes())?;
            inserted = true;
        }

        let mut closes_paragraph = false;
        match &event {
            Event::Eof => break,
            Event::Start(e) => {
                if e.name().as_ref() == b"w:p" {
                    paragraphs.push(Vec::new());
                }
                open_elements.push(e.name().as_ref().to_vec());
            }
            Event::End(e) => {
                closes_paragraph = e.name().as_ref() == b"w:p";
                open_elements.pop();
            }
            _ => {}
        }

        match paragraphs.last_mut() {
            Some(current) => current.push(event),
            None => writer.write_event(event)?,
        }

        if closes_paragraph {
            if let Some(paragraph) = paragraphs.pop() {
                let paragraph = replace_in_paragraph(paragraph, &replacements)?;
                match paragraphs.last_mut() {
                    Some(parent) => parent.extend(paragraph),
                    None => {
                        for event in paragraph {
                            writer.write_event(event)?;
                        }
                    }
                }
            }
        }
    }

    if !inserted {
        return Err(OficioError::render("template document.xml has no <w:body>"));
    }

    String::from_utf8(writer.into_inner())
        .map_err(|_| OficioError::render("filled document.xml is not UTF-8"))
}

/// 只看本段落自己的 `<w:t>`，巢狀段落（文字方塊）已先處理過
fn replace_in_paragraph<'a>(
    mut events: Vec<Event<'a>>,
    replacements: &[(&str, &str)],
) -> Result<Vec<Event<'a>>> {
    let mut segments: Vec<(usize, String)> = Vec::new();
    let mut depth = 0usize;
    let mut in_text = false;

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:p" => depth += 1,
            Event::End(e) if e.name().as_ref() == b"w:p" => depth = depth.saturating_sub(1),
            Event::Start(e) if depth == 1 && e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::Text(text) if depth == 1 && in_text => {
                segments.push((idx, text.unescape()?.into_owned()));
            }
            _ => {}
        }
    }

    let texts: Vec<&str> = segments.iter().map(|(_, text)| text.as_str()).collect();
    let Some(rewritten) = replace_across_segments(&texts, replacements) else {
        return Ok(events);
    };

    for ((idx, _), text) in segments.iter().zip(rewritten) {
        events[*idx] = Event::Text(BytesText::new(&text).into_owned());
    }
    Ok(events)
}

/// 在串接後的文字上尋找佔位符，再把結果分回原本的片段。沒有任何佔位符時回傳 `None`。
fn replace_across_segments(segments: &[&str], replacements: &[(&str, &str)]) -> Option<Vec<String>> {
    let joined = segments.concat();

    let mut matches: Vec<(usize, usize, &str)> = replacements
        .iter()
        .flat_map(|(placeholder, value)| {
            joined
                .match_indices(*placeholder)
                .map(move |(start, _)| (start, start + placeholder.len(), *value))
        })
        .collect();
    if matches.is_empty() {
        return None;
    }
    matches.sort_by_key(|m| m.0);

    let mut kept: Vec<(usize, usize, &str)> = Vec::with_capacity(matches.len());
    for m in matches {
        if !kept.last().is_some_and(|last| m.0 < last.1) {
            kept.push(m);
        }
    }

    let mut offset = 0;
    let rewritten = segments
        .iter()
        .map(|segment| {
            let (from, to) = (offset, offset + segment.len());
            offset = to;

            let mut out = String::with_capacity(segment.len());
            let mut pos = from;
            for &(start, end, value) in kept.iter().filter(|m| m.0 < to && m.1 > from) {
                if start > pos {
                    out.push_str(&joined[pos..start]);
                }
                if start >= from {
                    out.push_str(value);
                }
                pos = pos.max(end).min(to);
            }
            if pos < to {
                out.push_str(&joined[pos..to]);
            }
            out
        })
        .collect();

    Some(rewritten)
}
