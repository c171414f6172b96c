pub const EXPORT_SCALE: u32 = 2;
pub const EXPORT_BACKGROUND: u32 = 0xFFFFFF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageFormat {
    pub const A4: Self = Self {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_mm: 10.0,
    };

    pub fn content_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn content_height_mm(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

/// A horizontal band of the report raster placed on one page at the top
/// left margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    pub src_y: u32,
    pub src_height: u32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Cuts a raster into page-sized bands, scaled so the raster width fills the
/// page content width. Every row of the raster lands on exactly one page.
pub fn plan_pages(raster_width: u32, raster_height: u32, format: PageFormat) -> Vec<PageSlice> {
    if raster_width == 0 || raster_height == 0 {
        return Vec::new();
    }

    let mm_per_px = format.content_width_mm() / raster_width as f32;
    let rows_per_page = ((format.content_height_mm() / mm_per_px).floor() as u32).max(1);

    let mut slices = Vec::new();
    let mut src_y = 0;
    while src_y < raster_height {
        let src_height = rows_per_page.min(raster_height - src_y);
        slices.push(PageSlice {
            src_y,
            src_height,
            width_mm: format.content_width_mm(),
            height_mm: src_height as f32 * mm_per_px,
        });
        src_y += src_height;
    }
    slices
}

pub fn export_file_name(timestamp: &str) -> String {
    format!("informe-accidente-{timestamp}.pdf")
}
