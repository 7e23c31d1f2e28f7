//! Dataset configuration format.

use crate::{
    common::*,
    dataset::{PairedVolumeDataset, PairedVolumeWithSegDataset, SubjectPool},
    processor::{BoxTransform, CenterCropOrPad, Compose, Identity, MinMaxNormalize},
};

/// The dataset configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// The directory of per-subject directories.
    pub data_dir: PathBuf,
    /// The cap on the number of exposed records.
    #[serde(default = "unbounded")]
    pub max_dataset_size: usize,
    /// If set, companion selection is seeded with this value.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Preprocessing applied to every volume, in order.
    #[serde(default)]
    pub transforms: Vec<TransformConfig>,
    pub kind: DatasetKind,
}

/// Variants of dataset and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DatasetKind {
    /// Volume pairs with subject ids.
    Paired,
    /// Volume pairs with label maps.
    PairedWithSeg {
        seg_dir: PathBuf,
        #[serde(default)]
        seg_transforms: Option<Vec<TransformConfig>>,
    },
}

/// Preprocessing step options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransformConfig {
    Identity,
    CenterCropOrPad { shape: [usize; 3] },
    MinMaxNormalize,
}

fn unbounded() -> usize {
    usize::MAX
}

impl DatasetConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    /// List the subjects and build the configured dataset variant.
    pub fn build(&self) -> Result<PairDataset> {
        let Self {
            ref data_dir,
            max_dataset_size,
            seed,
            ref transforms,
            ref kind,
        } = *self;

        let pool = SubjectPool::open(data_dir, max_dataset_size)?;
        let transform = TransformConfig::compose_volume(transforms)?;

        let dataset = match kind {
            DatasetKind::Paired => {
                let dataset = PairedVolumeDataset::from_pool(pool, transform);
                let dataset = match seed {
                    Some(seed) => dataset.with_seed(seed),
                    None => dataset,
                };
                PairDataset::Paired(dataset)
            }
            DatasetKind::PairedWithSeg {
                seg_dir,
                seg_transforms,
            } => {
                let seg_transform: Option<BoxTransform<i16>> = match seg_transforms {
                    Some(configs) => Some(Box::new(TransformConfig::compose_label(configs)?)),
                    None => None,
                };
                let dataset =
                    PairedVolumeWithSegDataset::from_pool(pool, transform, seg_dir, seg_transform);
                let dataset = match seed {
                    Some(seed) => dataset.with_seed(seed),
                    None => dataset,
                };
                PairDataset::PairedWithSeg(dataset)
            }
        };

        Ok(dataset)
    }
}

impl TransformConfig {
    /// Build the step for anatomical volumes.
    pub fn build_volume(&self) -> Result<BoxTransform<f32>> {
        let transform: BoxTransform<f32> = match *self {
            Self::Identity => Box::new(Identity),
            Self::CenterCropOrPad { shape } => Box::new(CenterCropOrPad::new(shape)?),
            Self::MinMaxNormalize => Box::new(MinMaxNormalize),
        };
        Ok(transform)
    }

    /// Build the step for label maps. Intensity normalization is rejected.
    pub fn build_label(&self) -> Result<BoxTransform<i16>> {
        let transform: BoxTransform<i16> = match *self {
            Self::Identity => Box::new(Identity),
            Self::CenterCropOrPad { shape } => Box::new(CenterCropOrPad::new(shape)?),
            Self::MinMaxNormalize => bail!("MinMaxNormalize cannot be applied to label maps"),
        };
        Ok(transform)
    }

    pub fn compose_volume(configs: &[TransformConfig]) -> Result<Compose<f32>> {
        let transforms: Vec<_> = configs.iter().map(Self::build_volume).try_collect()?;
        Ok(Compose::new(transforms))
    }

    pub fn compose_label(configs: &[TransformConfig]) -> Result<Compose<i16>> {
        let transforms: Vec<_> = configs.iter().map(Self::build_label).try_collect()?;
        Ok(Compose::new(transforms))
    }
}

/// A dataset built from [DatasetConfig].
#[derive(Debug)]
pub enum PairDataset {
    Paired(PairedVolumeDataset),
    PairedWithSeg(PairedVolumeWithSegDataset),
}
