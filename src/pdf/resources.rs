use lopdf::{Dictionary, Document, Object, ObjectId};

use super::fonts::FontPair;
use crate::surface::FontRole;

/// Resource name a font role is referenced by in content streams.
pub fn font_resource_name(role: FontRole) -> &'static str {
    match role {
        FontRole::Regular => "F1",
        FontRole::Bold => "F2",
    }
}

/// Embed both faces and add the `/Font` dictionary shared by every page.
pub fn create_font_resources(doc: &mut Document, fonts: &FontPair) -> ObjectId {
    let mut font_resources = Dictionary::new();
    for role in [FontRole::Regular, FontRole::Bold] {
        let font_id = fonts.face(role).embed(doc);
        font_resources.set(font_resource_name(role), Object::Reference(font_id));
    }
    doc.add_object(Object::Dictionary(font_resources))
}

/// Resources dictionary of a page: the shared fonts plus any image XObjects.
pub fn create_page_resources(doc: &mut Document, fonts_id: ObjectId, xobjects: Option<Dictionary>) -> ObjectId {
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Reference(fonts_id));
    if let Some(xobjects) = xobjects {
        resources.set("XObject", Object::Dictionary(xobjects));
    }
    doc.add_object(Object::Dictionary(resources))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_reference_both_fonts() {
        let mut doc = Document::with_version("1.5");
        let fonts_id = create_font_resources(&mut doc, &FontPair::default());
        let id = create_page_resources(&mut doc, fonts_id, None);

        let resources = doc.get_dictionary(id).unwrap();
        assert!(resources.get(b"XObject").is_err());
        let fonts_ref = resources.get(b"Font").unwrap().as_reference().unwrap();
        let fonts = doc.get_dictionary(fonts_ref).unwrap();
        for (name, base) in [("F1", "Helvetica"), ("F2", "Helvetica-Bold")] {
            let font_id = fonts.get(name.as_bytes()).unwrap().as_reference().unwrap();
            let font = doc.get_dictionary(font_id).unwrap();
            assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap().to_vec(), base.as_bytes().to_vec());
        }
    }

    #[test]
    fn test_page_resources_with_images() {
        let mut doc = Document::with_version("1.5");
        let fonts_id = create_font_resources(&mut doc, &FontPair::default());
        let mut xobjects = Dictionary::new();
        xobjects.set("Im1", Object::Reference((99, 0)));
        let id = create_page_resources(&mut doc, fonts_id, Some(xobjects));

        let resources = doc.get_dictionary(id).unwrap();
        let images = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert_eq!(images.get(b"Im1").unwrap().as_reference().unwrap(), (99, 0));
    }
}
