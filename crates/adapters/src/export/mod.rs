mod pdf;
mod raster;

pub use pdf::LopdfDocumentWriter;
pub use raster::{Font8x8Rasterizer, LAYOUT_WIDTH};
