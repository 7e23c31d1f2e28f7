use super::*;
use crate::{
    common::*,
    processor::{BoxTransform, SegmentationLoader, Transform, VolumeLoader},
};

/// Pairs of anatomical volumes with their label maps for registration inference.
///
/// Label maps live in a separate directory shared by all subjects, named
/// `<subject_id>_synthseg.nii.gz`. Records do not carry subject ids.
#[derive(Debug)]
pub struct PairedVolumeWithSegDataset {
    sampler: PairSampler,
    loader: VolumeLoader,
    seg_loader: SegmentationLoader,
}

impl PairedVolumeWithSegDataset {
    /// List the subjects in `data_dir`.
    ///
    /// * `data_dir` - The directory of per-subject directories.
    /// * `transform` - Preprocessing applied to every decoded volume.
    /// * `max_dataset_size` - The cap on the number of exposed records.
    /// * `seg_dir` - The directory of label maps.
    /// * `seg_transform` - Optional preprocessing applied to label maps.
    pub fn new(
        data_dir: impl AsRef<Path>,
        transform: impl Transform<f32> + 'static,
        max_dataset_size: usize,
        seg_dir: impl AsRef<Path>,
        seg_transform: Option<BoxTransform<i16>>,
    ) -> Result<Self> {
        let pool = SubjectPool::open(data_dir, max_dataset_size)?;
        Ok(Self::from_pool(pool, transform, seg_dir, seg_transform))
    }

    pub fn from_pool(
        pool: SubjectPool,
        transform: impl Transform<f32> + 'static,
        seg_dir: impl AsRef<Path>,
        seg_transform: Option<BoxTransform<i16>>,
    ) -> Self {
        Self {
            sampler: PairSampler::new(pool),
            loader: VolumeLoader::new(transform),
            seg_loader: SegmentationLoader::new(seg_dir, seg_transform),
        }
    }

    /// Make companion selection reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.sampler.set_rng(rng);
        self
    }

    pub fn seg_dir(&self) -> &Path {
        self.seg_loader.seg_dir()
    }

    /// Get the nth record, drawing the companion from `rng`.
    pub fn nth_with_rng<R>(&self, index: usize, rng: &mut R) -> Result<SegPairRecord>
    where
        R: Rng,
    {
        let pair = self.sampler.sample_with_rng(index, rng)?;
        self.load_pair(pair)
    }

    fn load_pair(&self, pair: SubjectPair) -> Result<SegPairRecord> {
        let SubjectPair { anchor, companion } = pair;
        let source = self.loader.load(&anchor.path)?;
        let target = self.loader.load(&companion.path)?;
        let source_seg = self.seg_loader.load(&anchor.id)?;
        let target_seg = self.seg_loader.load(&companion.id)?;

        Ok(SegPairRecord {
            source,
            target,
            source_seg,
            target_seg,
        })
    }
}

impl SubjectDataset for PairedVolumeWithSegDataset {
    fn pool(&self) -> &SubjectPool {
        self.sampler.pool()
    }
}

impl RandomAccessDataset for PairedVolumeWithSegDataset {
    type Record = SegPairRecord;

    fn num_records(&self) -> usize {
        self.sampler.pool().len()
    }

    fn nth(&self, index: usize) -> Result<SegPairRecord> {
        let pair = self.sampler.sample(index)?;
        self.load_pair(pair)
    }
}
