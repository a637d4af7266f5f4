#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// 文字物件的排法
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// 每行一個 BT/ET
    ObjectPerLine,
    /// 整頁一個 BT/ET，行與行之間交替使用 T* 與 Td
    SingleObject,
}

pub fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    build_pdf_with(pages, Layout::ObjectPerLine)
}

pub fn build_pdf_with(pages: &[&[&str]], layout: Layout) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let operations = match layout {
            Layout::ObjectPerLine => object_per_line(lines),
            Layout::SingleObject => single_object(lines),
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn object_per_line(lines: &[&str]) -> Vec<Operation> {
    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 9.into()]));
        operations.push(Operation::new(
            "Td",
            vec![40.into(), (800 - 12 * i as i64).into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    operations
}

fn single_object(lines: &[&str]) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 9.into()]),
        Operation::new("TL", vec![12.into()]),
        Operation::new("Td", vec![40.into(), 800.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i % 2 == 1 {
            operations.push(Operation::new("T*", vec![]));
        } else if i > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-12).into()]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));
    operations
}

pub const PAGE_ONE: &[&str] = &[
    "PREFEITURA MUNICIPAL - AUTORIZACAO DE PAGAMENTO",
    "CONTA DEBITO 0001234567-8",
    "EMPENHO 1021",
    "01 ACME COMERCIO LTDA",
    "12.345.678/0001-90",
    "1.500.000",
    "3.234,56",
    "1.234,56",
    "2.000,00",
    "Banco: 104 AG: 0123-4 CC: 45678-9",
    "EMPENHO 1022",
    "02 BETA SERVICOS",
    "98.765.432/0001-10",
    "0,00",
    "500,00",
    "Banco: 001 AG: 0015 CC: 9999-0",
];

pub const PAGE_TWO: &[&str] = &[
    "EMPENHO 1023",
    "03 GAMA",
    "111.222.333-44",
    "2.100.300",
    "10,00 20,00",
    "Banco: 237 AG: 1",
    "EMPENHO 1024",
    "04 DELTA",
    "22.333.444/0001-55",
    "0,00",
    "750,00",
    "Banco: 341 AG: 2 CC: 5-5",
    "CONTA 9876543210-2",
];

/// 兩頁的付款單：4 筆記錄（含一筆國庫回沖）、1 個被拒區塊、superávit 警示
pub fn sample_order_pdf() -> Vec<u8> {
    build_pdf(&[PAGE_ONE, PAGE_TWO])
}

/// 同一份付款單，但每頁只有一個文字物件
pub fn sample_order_pdf_single_object() -> Vec<u8> {
    build_pdf_with(&[PAGE_ONE, PAGE_TWO], Layout::SingleObject)
}
