//! NIfTI loading shared by the dataset variants.

use super::{BoxTransform, Transform};
use crate::{common::*, profiling::Timing, utils::array_to_channel_tensor};
use nifti::{IntoNdArray as _, NiftiObject as _, ReaderOptions};

/// The anatomical scan path relative to a subject directory.
pub const VOLUME_RELATIVE_PATH: &str = "T1w/orig_nu_noskull.nii.gz";

/// The file name suffix appended to a subject id to name its label map.
pub const SEGMENTATION_SUFFIX: &str = "_synthseg.nii.gz";

fn read_nifti_object(path: &Path) -> Result<nifti::InMemNiftiObject> {
    ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("failed to read NIfTI file '{}'", path.display()))
}

/// Decode a scan into `f32` intensities, applying the header intensity scaling.
pub fn read_volume(path: impl AsRef<Path>) -> Result<ArrayD<f32>> {
    let path = path.as_ref();
    let volume = read_nifti_object(path)?
        .into_volume()
        .into_ndarray::<f32>()
        .with_context(|| format!("failed to decode NIfTI volume '{}'", path.display()))?;
    Ok(volume)
}

/// Decode a label map and truncate the labels towards zero into `i16`.
pub fn read_labels(path: impl AsRef<Path>) -> Result<ArrayD<i16>> {
    let path = path.as_ref();
    let labels = read_nifti_object(path)?
        .into_volume()
        .into_ndarray::<f64>()
        .with_context(|| format!("failed to decode NIfTI label map '{}'", path.display()))?;
    Ok(labels.mapv(|value| value as i16))
}

/// Loads anatomical volumes of subjects and converts them into channel tensors.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct VolumeLoader {
    #[derivative(Debug = "ignore")]
    transform: BoxTransform<f32>,
}

impl VolumeLoader {
    pub fn new(transform: impl Transform<f32> + 'static) -> Self {
        Self {
            transform: Box::new(transform),
        }
    }

    /// The scan file path of a subject directory.
    pub fn volume_path(subject_dir: impl AsRef<Path>) -> PathBuf {
        subject_dir.as_ref().join(VOLUME_RELATIVE_PATH)
    }

    /// Load, transform and convert the scan of a subject.
    ///
    /// The outcome tensor has kind `Float` and shape `[1, ...]` where the
    /// trailing dimensions are the transform output shape.
    pub fn load(&self, subject_dir: impl AsRef<Path>) -> Result<Tensor> {
        let path = Self::volume_path(subject_dir);
        let mut timing = Timing::new("volume_loader");

        let volume = read_volume(&path)?;
        timing.add_event("decode");

        let volume = self
            .transform
            .forward(vec![volume])
            .with_context(|| format!("failed to transform volume '{}'", path.display()))?;
        timing.add_event("transform");

        let tensor = array_to_channel_tensor(volume)?;
        timing.add_event("to tensor");
        timing.report();

        Ok(tensor)
    }
}

/// Loads precomputed label maps from a shared directory.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SegmentationLoader {
    seg_dir: PathBuf,
    #[derivative(Debug = "ignore")]
    transform: Option<BoxTransform<i16>>,
}

impl SegmentationLoader {
    pub fn new(seg_dir: impl AsRef<Path>, transform: Option<BoxTransform<i16>>) -> Self {
        Self {
            seg_dir: seg_dir.as_ref().to_owned(),
            transform,
        }
    }

    pub fn seg_dir(&self) -> &Path {
        &self.seg_dir
    }

    /// The label map path of a subject.
    pub fn segmentation_path(&self, subject_id: &str) -> PathBuf {
        self.seg_dir.join(format!("{}{}", subject_id, SEGMENTATION_SUFFIX))
    }

    /// Load the label map of a subject as an `Int16` tensor of shape `[1, ...]`.
    pub fn load(&self, subject_id: &str) -> Result<Tensor> {
        let path = self.segmentation_path(subject_id);
        let mut timing = Timing::new("segmentation_loader");

        let labels = read_labels(&path)?;
        timing.add_event("decode");

        let labels = match &self.transform {
            Some(transform) => transform
                .forward(vec![labels])
                .with_context(|| format!("failed to transform label map '{}'", path.display()))?,
            None => labels,
        };
        timing.add_event("transform");

        let tensor = array_to_channel_tensor(labels)?;
        timing.add_event("to tensor");
        timing.report();

        Ok(tensor)
    }
}
