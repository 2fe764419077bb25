use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::{dictionary, Document, Object, ObjectId};
use serde_json::{json, Value};
use std::io::Cursor;

/// PDF with one empty page per `(width, height)` entry.
pub fn pdf_with_pages(sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for (width, height) in sizes {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (*width).into(), (*height).into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => sizes.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Pages that carry no MediaBox of their own; the Pages node has one.
pub fn pdf_with_inherited_media_box(page_count: usize, width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

pub fn white_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .expect("failed to encode test PNG");
    buf.into_inner()
}

pub fn extracted_data() -> Value {
    json!({
        "field10": { "value": "10", "confidence": 0.5 },
        "field2": {
            "value": "123 Main St\nSpringfield",
            "confidence": 0.81,
            "boundingBox": { "Left": 0.5, "Top": 0.5, "Width": 0.25, "Height": 0.1 }
        },
        "field1": {
            "value": "Clarus",
            "confidence": 0.99,
            "boundingBox": { "Left": 0.1, "Top": 0.2, "Width": 0.3, "Height": 0.05 }
        }
    })
}

pub fn snapshot_json(document_id: &str, document_key: &str, content: &[u8]) -> Value {
    json!({
        "document_id": document_id,
        "document_key": document_key,
        "status": "complete",
        "base64_encoded_file": BASE64.encode(content),
        "extracted_data": extracted_data(),
    })
}
