#![allow(dead_code)]

use anyhow::Result;
use ndarray::{ArrayD, IxDyn};
use nifti::writer::WriterOptions;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

pub const VOLUME_SHAPE: [usize; 3] = [4, 5, 6];

/// Intensity stored at a voxel of the nth subject (1-based).
pub fn voxel_value(subject_no: usize, idx: [usize; 3]) -> f64 {
    (subject_no * 1000 + idx[0] * 100 + idx[1] * 10 + idx[2]) as f64
}

/// Label stored at a voxel of the nth subject, before truncation.
pub fn raw_label(subject_no: usize, idx: [usize; 3]) -> f32 {
    (subject_no * 10 + idx[0]) as f32 + 0.5
}

pub fn subject_id(subject_no: usize) -> String {
    format!("sub-{:02}", subject_no)
}

/// Recover the 1-based subject number from a volume tensor.
pub fn subject_no_of_volume(tensor: &tch::Tensor) -> usize {
    (tensor.double_value(&[0, 0, 0, 0]) / 1000.0) as usize
}

/// A throwaway dataset tree:
///
/// ```text
/// <root>/subjects/sub-NN/T1w/orig_nu_noskull.nii.gz
/// <root>/segs/sub-NN_synthseg.nii.gz
/// ```
pub struct Fixture {
    pub root: TempDir,
}

impl Fixture {
    pub fn new(num_subjects: usize) -> Result<Self> {
        let root = tempfile::tempdir()?;
        let fixture = Self { root };
        fs::create_dir_all(fixture.data_dir())?;
        fs::create_dir_all(fixture.seg_dir())?;

        for subject_no in 1..=num_subjects {
            fixture.add_subject(subject_no, true, true)?;
        }

        Ok(fixture)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("subjects")
    }

    pub fn seg_dir(&self) -> PathBuf {
        self.root.path().join("segs")
    }

    pub fn add_subject(&self, subject_no: usize, with_volume: bool, with_seg: bool) -> Result<()> {
        let id = subject_id(subject_no);
        let anat_dir = self.data_dir().join(&id).join("T1w");
        fs::create_dir_all(&anat_dir)?;

        if with_volume {
            let volume = ArrayD::from_shape_fn(IxDyn(&VOLUME_SHAPE), |idx| {
                voxel_value(subject_no, [idx[0], idx[1], idx[2]]) as f32
            });
            write_nifti(anat_dir.join("orig_nu_noskull.nii.gz"), &volume)?;
        }

        if with_seg {
            let labels = ArrayD::from_shape_fn(IxDyn(&VOLUME_SHAPE), |idx| {
                raw_label(subject_no, [idx[0], idx[1], idx[2]])
            });
            write_nifti(
                self.seg_dir().join(format!("{}_synthseg.nii.gz", id)),
                &labels,
            )?;
        }

        Ok(())
    }
}

pub fn write_nifti(path: impl AsRef<Path>, array: &ArrayD<f32>) -> Result<()> {
    WriterOptions::new(path.as_ref()).write_nifti(array)?;
    Ok(())
}
