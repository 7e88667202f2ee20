use anyhow::{bail, Context, Result};
use lopdf::{Dictionary, Document, Object, Stream};

use super::content::{compress_data, PdfSurface};
use super::fonts::FontPair;
use super::resources::{create_font_resources, create_page_resources};

/// Assemble rendered page surfaces into a complete PDF document. Pages
/// without images share one resources dictionary.
pub fn build_document(
    pages: Vec<PdfSurface>,
    page_width: f64,
    page_height: f64,
    fonts: &FontPair,
) -> Result<Document> {
    if pages.is_empty() {
        bail!("No pages to write");
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let fonts_id = create_font_resources(&mut doc, fonts);
    let shared_resources_id = create_page_resources(&mut doc, fonts_id, None);
    let media_box: Vec<Object> = [0.0, 0.0, page_width, page_height]
        .iter()
        .map(|&v| Object::Real(v as f32))
        .collect();

    let mut kids = Vec::with_capacity(pages.len());
    for (index, page) in pages.into_iter().enumerate() {
        let (content, images) = page.into_parts();
        let compressed = compress_data(&content)
            .with_context(|| format!("Failed to compress content of page {}", index + 1))?;
        let resources_id = if images.is_empty() {
            shared_resources_id
        } else {
            let mut xobjects = Dictionary::new();
            for image in &images {
                let stream = image
                    .to_xobject()
                    .with_context(|| format!("Failed to encode image on page {}", index + 1))?;
                xobjects.set(image.name.as_str(), Object::Reference(doc.add_object(stream)));
            }
            create_page_resources(&mut doc, fonts_id, Some(xobjects))
        };
        let mut stream_dict = Dictionary::new();
        stream_dict.set("Filter", "FlateDecode");
        let content_id = doc.add_object(Stream::new(stream_dict, compressed));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", "Page");
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("MediaBox", media_box.clone());
        page_dict.set("Resources", Object::Reference(resources_id));
        page_dict.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page_dict))));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", "Pages");
    pages_dict.set("Count", kids.len() as i64);
    pages_dict.set("Kids", kids);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", "Catalog");
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    Ok(doc)
}
