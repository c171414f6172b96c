use crashlens_application::{ApplicationError, DocumentWriter, PageImage};
use crashlens_domain::PageFormat;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// One JPEG per page, drawn at the top-left margin as a DCT image XObject.
#[derive(Debug, Default)]
pub struct LopdfDocumentWriter;

impl DocumentWriter for LopdfDocumentWriter {
    fn write_pdf(
        &self,
        pages: &[PageImage],
        format: PageFormat,
    ) -> Result<Vec<u8>, ApplicationError> {
        if pages.is_empty() {
            return Err(ApplicationError::Export(
                "no hay páginas que escribir".to_string(),
            ));
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_width = format.width_mm * POINTS_PER_MM;
        let page_height = format.height_mm * POINTS_PER_MM;

        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let page_id = add_page(&mut doc, pages_id, page, format, page_width, page_height)?;
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|error| ApplicationError::Export(error.to_string()))?;
        Ok(out)
    }
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    page: &PageImage,
    format: PageFormat,
    page_width: f32,
    page_height: f32,
) -> Result<ObjectId, ApplicationError> {
    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(page.width_px),
            "Height" => i64::from(page.height_px),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        page.jpeg.clone(),
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let draw_width = page.slice.width_mm * POINTS_PER_MM;
    let draw_height = page.slice.height_mm * POINTS_PER_MM;
    let left = format.margin_mm * POINTS_PER_MM;
    let bottom = page_height - format.margin_mm * POINTS_PER_MM - draw_height;

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    draw_width.into(),
                    0.into(),
                    0.into(),
                    draw_height.into(),
                    left.into(),
                    bottom.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|error| ApplicationError::Export(error.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::from(0),
            Object::from(0),
            Object::from(page_width),
            Object::from(page_height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ImageCrateJpegEncoder;
    use crashlens_application::ImageEncoder;
    use crashlens_domain::{plan_pages, RasterFrame};

    fn pages(height: u32) -> Vec<PageImage> {
        let raster = RasterFrame::filled(200, height, 0xFFFFFF);
        plan_pages(raster.width(), raster.height(), PageFormat::A4)
            .into_iter()
            .map(|slice| {
                let band = raster.crop_rows(slice.src_y, slice.src_height);
                PageImage {
                    jpeg: ImageCrateJpegEncoder.encode_jpeg(&band, 80).expect("jpeg"),
                    width_px: band.width(),
                    height_px: band.height(),
                    slice,
                }
            })
            .collect()
    }

    #[test]
    fn one_pdf_page_per_slice() {
        let pages = pages(700);
        assert_eq!(pages.len(), 3);

        let bytes = LopdfDocumentWriter
            .write_pdf(&pages, PageFormat::A4)
            .expect("pdf");
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).expect("parse");
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn images_are_embedded_as_jpeg() {
        let bytes = LopdfDocumentWriter
            .write_pdf(&pages(100), PageFormat::A4)
            .expect("pdf");
        let doc = Document::load_mem(&bytes).expect("parse");
        let dct = doc
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| {
                stream
                    .dict
                    .get(b"Filter")
                    .and_then(Object::as_name)
                    .map(|name| name == b"DCTDecode")
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(dct, 1);
    }

    #[test]
    fn empty_document_is_refused() {
        assert!(matches!(
            LopdfDocumentWriter.write_pdf(&[], PageFormat::A4),
            Err(ApplicationError::Export(_))
        ));
    }
}
