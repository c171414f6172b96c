use std::collections::HashMap;

use crashlens_adapters::decode_thumbnail;
use crashlens_domain::{BlobId, ImageBlob, RasterFrame};
use eframe::egui;
use tracing::warn;

pub const THUMBNAIL_SIDE: u32 = 160;

pub fn color_image(frame: &RasterFrame) -> egui::ColorImage {
    egui::ColorImage::from_rgb(
        [frame.width() as usize, frame.height() as usize],
        frame.pixels(),
    )
}

/// Uploads `frame` into `slot`, reusing the texture when there is one.
pub fn upload_frame(
    ctx: &egui::Context,
    slot: &mut Option<egui::TextureHandle>,
    name: &str,
    frame: &RasterFrame,
) {
    let image = color_image(frame);
    match slot {
        Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
        None => *slot = Some(ctx.load_texture(name, image, egui::TextureOptions::LINEAR)),
    }
}

/// Decoded thumbnails keyed by blob. A photo that fails to decode keeps a
/// `None` entry so it is not retried every frame.
#[derive(Default)]
pub struct ThumbnailCache {
    textures: HashMap<BlobId, Option<egui::TextureHandle>>,
}

impl ThumbnailCache {
    pub fn get(&mut self, ctx: &egui::Context, photo: &ImageBlob) -> Option<&egui::TextureHandle> {
        self.textures
            .entry(photo.id())
            .or_insert_with(|| match decode_thumbnail(photo.bytes(), THUMBNAIL_SIDE) {
                Ok(frame) => Some(ctx.load_texture(
                    format!("thumb-{}", photo.id().get()),
                    color_image(&frame),
                    egui::TextureOptions::LINEAR,
                )),
                Err(error) => {
                    warn!(name = photo.name(), error = %error, "thumbnail unavailable");
                    None
                }
            })
            .as_ref()
    }

    /// Forgets textures of photos that left the collection.
    pub fn retain(&mut self, photos: &[ImageBlob]) {
        self.textures
            .retain(|id, _| photos.iter().any(|photo| photo.id() == *id));
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.textures.len()
    }
}
