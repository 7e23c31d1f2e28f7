use super::*;
use crate::{
    common::*,
    processor::{Transform, VolumeLoader},
};

/// Pairs of anatomical volumes for registration training.
///
/// Each record holds the volume of the nth subject, the volume of a random
/// other subject and both subject ids.
#[derive(Debug)]
pub struct PairedVolumeDataset {
    sampler: PairSampler,
    loader: VolumeLoader,
}

impl PairedVolumeDataset {
    /// List the subjects in `data_dir`.
    ///
    /// * `data_dir` - The directory of per-subject directories.
    /// * `transform` - Preprocessing applied to every decoded volume.
    /// * `max_dataset_size` - The cap on the number of exposed records.
    pub fn new(
        data_dir: impl AsRef<Path>,
        transform: impl Transform<f32> + 'static,
        max_dataset_size: usize,
    ) -> Result<Self> {
        let pool = SubjectPool::open(data_dir, max_dataset_size)?;
        Ok(Self::from_pool(pool, transform))
    }

    pub fn from_pool(pool: SubjectPool, transform: impl Transform<f32> + 'static) -> Self {
        Self {
            sampler: PairSampler::new(pool),
            loader: VolumeLoader::new(transform),
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

    /// Get the nth record, drawing the companion from `rng`.
    pub fn nth_with_rng<R>(&self, index: usize, rng: &mut R) -> Result<PairRecord>
    where
        R: Rng,
    {
        let pair = self.sampler.sample_with_rng(index, rng)?;
        self.load_pair(pair)
    }

    fn load_pair(&self, pair: SubjectPair) -> Result<PairRecord> {
        let SubjectPair { anchor, companion } = pair;
        let source = self.loader.load(&anchor.path)?;
        let target = self.loader.load(&companion.path)?;

        Ok(PairRecord {
            source,
            target,
            source_id: anchor.id.clone(),
            target_id: companion.id.clone(),
        })
    }
}

impl SubjectDataset for PairedVolumeDataset {
    fn pool(&self) -> &SubjectPool {
        self.sampler.pool()
    }
}

impl RandomAccessDataset for PairedVolumeDataset {
    type Record = PairRecord;

    fn num_records(&self) -> usize {
        self.sampler.pool().len()
    }

    fn nth(&self, index: usize) -> Result<PairRecord> {
        let pair = self.sampler.sample(index)?;
        self.load_pair(pair)
    }
}
