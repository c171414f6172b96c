mod clock;
mod export_sink;
mod loader;

pub use clock::SystemClock;
pub use export_sink::FsExportSink;
pub use loader::{photo_from_bytes, FsPhotoLoader};
