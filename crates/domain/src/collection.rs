use indexmap::IndexMap;

use crate::{BlobId, ImageBlob, PhotoKey};

pub const MAX_PHOTOS: usize = 10;
pub const OVER_LIMIT_WARNING: &str = "No puede cargar más de 10 fotos.";

/// Result of merging one batch of candidates into the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub replaced: usize,
    pub dropped: usize,
}

impl AddOutcome {
    pub fn exceeded_limit(&self) -> bool {
        self.dropped > 0
    }

    pub fn warning(&self) -> Option<&'static str> {
        self.exceeded_limit().then_some(OVER_LIMIT_WARNING)
    }
}

/// Ordered photos queued for analysis. Never holds more than
/// [`MAX_PHOTOS`] entries nor two entries with the same [`PhotoKey`].
#[derive(Debug, Clone, Default)]
pub struct PhotoCollection {
    photos: Vec<ImageBlob>,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `candidates` after the current photos. A repeated key keeps
    /// its first position and takes the last value seen; anything past the
    /// limit is truncated.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = ImageBlob>) -> AddOutcome {
        let before = self.photos.len();
        let mut merged: IndexMap<PhotoKey, ImageBlob> = IndexMap::with_capacity(before);
        let mut replaced = 0;
        for photo in self.photos.drain(..).chain(candidates) {
            if merged.insert(photo.key().clone(), photo).is_some() {
                replaced += 1;
            }
        }

        let dropped = merged.len().saturating_sub(MAX_PHOTOS);
        self.photos = merged.into_values().take(MAX_PHOTOS).collect();

        AddOutcome {
            added: self.photos.len().saturating_sub(before),
            replaced,
            dropped,
        }
    }

    pub fn remove(&mut self, id: BlobId) -> bool {
        let before = self.photos.len();
        self.photos.retain(|photo| photo.id() != id);
        self.photos.len() != before
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= MAX_PHOTOS
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageBlob> {
        self.photos.iter()
    }

    pub fn as_slice(&self) -> &[ImageBlob] {
        &self.photos
    }

    pub fn to_vec(&self) -> Vec<ImageBlob> {
        self.photos.clone()
    }
}

pub fn valid_photo_count(count: usize) -> bool {
    (1..=MAX_PHOTOS).contains(&count)
}

/// Drop-zone filter: anything whose MIME type is not `image/*` is discarded.
pub fn retain_images(candidates: Vec<ImageBlob>) -> Vec<ImageBlob> {
    candidates
        .into_iter()
        .filter(ImageBlob::is_image)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn photo(name: &str, modified_ms: i64) -> ImageBlob {
        ImageBlob::new(PhotoKey::new(name, modified_ms), "image/jpeg", vec![1_u8, 2, 3])
            .expect("photo")
    }

    fn names(collection: &PhotoCollection) -> Vec<String> {
        collection.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn appends_in_order() {
        let mut collection = PhotoCollection::new();
        collection.add(vec![photo("a", 1), photo("b", 1)]);
        let outcome = collection.add(vec![photo("c", 1)]);
        assert_eq!(names(&collection), vec!["a", "b", "c"]);
        assert_eq!(outcome.added, 1);
        assert!(outcome.warning().is_none());
    }

    #[test]
    fn duplicate_key_keeps_position_and_takes_last_value() {
        let mut collection = PhotoCollection::new();
        collection.add(vec![photo("a", 1), photo("b", 1)]);
        let newer = photo("a", 1);
        let newer_id = newer.id();
        let outcome = collection.add(vec![photo("c", 1), newer]);

        assert_eq!(names(&collection), vec!["a", "b", "c"]);
        assert_eq!(collection.as_slice()[0].id(), newer_id);
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.added, 1);
    }

    #[test]
    fn same_name_with_different_mtime_is_distinct() {
        let mut collection = PhotoCollection::new();
        collection.add(vec![photo("a", 1), photo("a", 2)]);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn eleventh_photo_truncates_and_warns_once() {
        let mut collection = PhotoCollection::new();
        let first: Vec<_> = (0..10).map(|i| photo(&format!("p{i}"), 0)).collect();
        assert!(collection.add(first).warning().is_none());

        let outcome = collection.add(vec![photo("p10", 0), photo("p11", 0)]);
        assert_eq!(collection.len(), MAX_PHOTOS);
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.warning(), Some(OVER_LIMIT_WARNING));
        assert!(!names(&collection).contains(&"p10".to_string()));
    }

    #[test]
    fn remove_matches_identity_not_key() {
        let mut collection = PhotoCollection::new();
        let kept = photo("a", 1);
        collection.add(vec![kept.clone()]);
        let twin = photo("a", 1);

        assert!(!collection.remove(twin.id()));
        assert!(collection.remove(kept.id()));
        assert!(collection.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut collection = PhotoCollection::new();
        collection.add(vec![photo("a", 1), photo("b", 2)]);
        collection.clear();
        assert!(collection.is_empty());
    }

    #[test]
    fn drop_filter_discards_non_images() {
        let pdf = ImageBlob::new(PhotoKey::new("doc.pdf", 0), "application/pdf", vec![1_u8])
            .expect("blob");
        let kept = retain_images(vec![photo("a", 0), pdf]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name(), "a");
    }

    #[test]
    fn photo_count_bounds() {
        assert!(!valid_photo_count(0));
        assert!(valid_photo_count(1));
        assert!(valid_photo_count(10));
        assert!(!valid_photo_count(11));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(Vec<(u8, u8)>),
        RemoveAt(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::collection::vec((0_u8..16, 0_u8..3), 0..14).prop_map(Op::Add),
            (0_usize..12).prop_map(Op::RemoveAt),
        ]
    }

    proptest! {
        #[test]
        fn bounded_and_unique_under_any_sequence(
            ops in prop::collection::vec(op_strategy(), 0..24)
        ) {
            let mut collection = PhotoCollection::new();
            for op in ops {
                match op {
                    Op::Add(batch) => {
                        let candidates = batch
                            .into_iter()
                            .map(|(name, mtime)| photo(&format!("n{name}"), i64::from(mtime)))
                            .collect::<Vec<_>>();
                        let outcome = collection.add(candidates);
                        prop_assert_eq!(outcome.exceeded_limit(), outcome.warning().is_some());
                    }
                    Op::RemoveAt(index) => {
                        if let Some(id) = collection.as_slice().get(index).map(ImageBlob::id) {
                            prop_assert!(collection.remove(id));
                        }
                    }
                }

                prop_assert!(collection.len() <= MAX_PHOTOS);
                let mut keys: Vec<_> = collection.iter().map(|p| p.key().clone()).collect();
                let total = keys.len();
                keys.sort_by(|a, b| (&a.name, a.modified_ms).cmp(&(&b.name, b.modified_ms)));
                keys.dedup();
                prop_assert_eq!(keys.len(), total);
            }
        }
    }
}
