use crate::common::*;

/// A subject directory and its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectRecord {
    /// The final path segment of the subject directory.
    pub id: String,
    pub path: PathBuf,
}

impl SubjectRecord {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let id = path
            .file_name()
            .ok_or_else(|| format_err!("'{}' does not name a subject directory", path.display()))?
            .to_string_lossy()
            .into_owned();

        Ok(Self {
            id,
            path: path.to_owned(),
        })
    }
}

/// The fixed list of subjects a dataset draws from.
#[derive(Debug, Clone)]
pub struct SubjectPool {
    subjects: Vec<Arc<SubjectRecord>>,
    max_dataset_size: usize,
}

impl SubjectPool {
    /// List the immediate children of `data_dir`, each one a subject.
    ///
    /// Entries are ordered by file name.
    pub fn open(data_dir: impl AsRef<Path>, max_dataset_size: usize) -> Result<Self> {
        let data_dir = data_dir.as_ref();

        let paths: Vec<PathBuf> = fs::read_dir(data_dir)
            .with_context(|| format!("failed to list subjects in '{}'", data_dir.display()))?
            .map(|entry| -> Result<_> {
                let entry = entry.with_context(|| {
                    format!("failed to list subjects in '{}'", data_dir.display())
                })?;
                Ok(entry.path())
            })
            .try_collect()?;
        let paths: Vec<_> = paths
            .into_iter()
            .sorted_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()))
            .collect();

        let pool = Self::from_paths(paths, max_dataset_size)?;

        info!(
            "found {} subjects in '{}', using {} of them",
            pool.num_subjects(),
            data_dir.display(),
            pool.len()
        );
        if pool.num_subjects() < 2 {
            warn!(
                "'{}' has fewer than two subjects, no pair can be formed",
                data_dir.display()
            );
        }

        Ok(pool)
    }

    /// Build a pool from subject directory paths in the given order.
    pub fn from_paths(
        paths: impl IntoIterator<Item = impl AsRef<Path>>,
        max_dataset_size: usize,
    ) -> Result<Self> {
        let subjects: Vec<_> = paths
            .into_iter()
            .map(|path| -> Result<_> { Ok(Arc::new(SubjectRecord::new(path)?)) })
            .try_collect()?;

        Ok(Self {
            subjects,
            max_dataset_size,
        })
    }

    /// The number of exposed records, capped by `max_dataset_size`.
    pub fn len(&self) -> usize {
        cmp::min(self.subjects.len(), self.max_dataset_size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of listed subjects, regardless of the cap.
    pub fn num_subjects(&self) -> usize {
        self.subjects.len()
    }

    pub fn max_dataset_size(&self) -> usize {
        self.max_dataset_size
    }

    pub fn subjects(&self) -> &[Arc<SubjectRecord>] {
        &self.subjects
    }

    /// Get the anchor subject of the nth record.
    pub fn anchor(&self, index: usize) -> Result<&Arc<SubjectRecord>> {
        ensure!(
            index < self.len(),
            "invalid index {}, the dataset has {} records",
            index,
            self.len()
        );
        Ok(&self.subjects[index])
    }

    /// Pair the nth subject with a companion drawn uniformly from all other subjects.
    ///
    /// Subjects beyond the cap are still eligible as companions.
    pub fn pair<R>(&self, index: usize, rng: &mut R) -> Result<SubjectPair>
    where
        R: Rng,
    {
        let anchor = self.anchor(index)?;
        let num_candidates = self.subjects.len() - 1;
        ensure!(
            num_candidates > 0,
            "no companion subject for '{}', the pool has a single subject",
            anchor.id
        );

        // skip over the anchor slot
        let pick = rng.gen_range(0..num_candidates);
        let pick = if pick >= index { pick + 1 } else { pick };

        Ok(SubjectPair {
            anchor: anchor.clone(),
            companion: self.subjects[pick].clone(),
        })
    }
}

/// The anchor and companion subjects of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPair {
    pub anchor: Arc<SubjectRecord>,
    pub companion: Arc<SubjectRecord>,
}

/// Draws subject pairs from a pool with an owned random source.
#[derive(Debug)]
pub struct PairSampler {
    pool: SubjectPool,
    rng: Mutex<StdRng>,
}

impl PairSampler {
    /// Create a sampler seeded from system entropy.
    pub fn new(pool: SubjectPool) -> Self {
        Self::with_rng(pool, StdRng::from_entropy())
    }

    pub fn with_rng(pool: SubjectPool, rng: StdRng) -> Self {
        Self {
            pool,
            rng: Mutex::new(rng),
        }
    }

    pub fn pool(&self) -> &SubjectPool {
        &self.pool
    }

    /// Replace the random source.
    pub fn set_rng(&mut self, rng: StdRng) {
        self.rng = Mutex::new(rng);
    }

    /// Pair the nth subject using the owned random source.
    pub fn sample(&self, index: usize) -> Result<SubjectPair> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| format_err!("the random source lock is poisoned"))?;
        self.sample_with_rng(index, &mut *rng)
    }

    /// Pair the nth subject using a caller-provided random source.
    pub fn sample_with_rng<R>(&self, index: usize, rng: &mut R) -> Result<SubjectPair>
    where
        R: Rng,
    {
        let pair = self.pool.pair(index, rng)?;
        debug!(
            "paired subject '{}' with '{}'",
            pair.anchor.id, pair.companion.id
        );
        Ok(pair)
    }
}
