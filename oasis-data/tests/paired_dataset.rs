mod common;

use anyhow::Result;
use common::*;
use futures::stream::TryStreamExt as _;
use ndarray::{ArrayD, IxDyn};
use oasis_data::{
    dataset::{
        PairedVolumeDataset, PairedVolumeWithSegDataset, RandomAccessDataset,
        RandomAccessStream, StreamingDataset, SubjectDataset,
    },
    processor::{read_labels, BoxTransform, CenterCropOrPad, Identity},
};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;
use tch::Kind;

#[test]
fn three_subject_scenario() -> Result<()> {
    let fixture = Fixture::new(3)?;
    let dataset = PairedVolumeDataset::new(fixture.data_dir(), Identity, 10)?;

    assert_eq!(dataset.num_records(), 3);
    assert_eq!(dataset.pool().num_subjects(), 3);

    let record = dataset.nth(0)?;
    assert_eq!(record.source_id, "sub-01");
    assert!(["sub-02", "sub-03"].contains(&record.target_id.as_str()));

    assert_eq!(record.source.size(), vec![1, 4, 5, 6]);
    assert_eq!(record.target.size(), vec![1, 4, 5, 6]);
    assert_eq!(record.source.kind(), Kind::Float);
    assert_eq!(record.source.double_value(&[0, 2, 3, 4]), voxel_value(1, [2, 3, 4]));

    let target_no = subject_no_of_volume(&record.target);
    assert_eq!(record.target_id, subject_id(target_no));
    assert_eq!(
        record.target.double_value(&[0, 3, 4, 5]),
        voxel_value(target_no, [3, 4, 5])
    );
    Ok(())
}

#[test]
fn length_is_capped() -> Result<()> {
    let fixture = Fixture::new(4)?;
    let dataset = PairedVolumeDataset::new(fixture.data_dir(), Identity, 2)?;
    assert_eq!(dataset.num_records(), 2);
    assert!(dataset.nth(2).is_err());

    let dataset = PairedVolumeDataset::new(fixture.data_dir(), Identity, 0)?;
    assert_eq!(dataset.num_records(), 0);
    Ok(())
}

#[test]
fn companion_is_never_the_anchor() -> Result<()> {
    let fixture = Fixture::new(3)?;
    let dataset = PairedVolumeDataset::new(fixture.data_dir(), Identity, 10)?;

    for index in 0..dataset.num_records() {
        let mut companions = HashSet::new();
        for _ in 0..12 {
            let record = dataset.nth(index)?;
            assert_eq!(record.source_id, subject_id(index + 1));
            assert_ne!(record.source_id, record.target_id);
            companions.insert(record.target_id);
        }
        assert!(companions.len() <= 2);
    }
    Ok(())
}

#[test]
fn transform_output_gets_channel_axis() -> Result<()> {
    let fixture = Fixture::new(2)?;
    let transform = CenterCropOrPad::new([2, 3, 8])?;
    let dataset = PairedVolumeDataset::new(fixture.data_dir(), transform, 10)?;

    let record = dataset.nth(1)?;
    assert_eq!(record.source.size(), vec![1, 2, 3, 8]);
    assert_eq!(record.target.size(), vec![1, 2, 3, 8]);
    // cropped by one along the first two axes, padded by one along the last
    assert_eq!(record.source.double_value(&[0, 0, 0, 0]), 0.0);
    assert_eq!(
        record.source.double_value(&[0, 0, 0, 1]),
        voxel_value(2, [1, 1, 0])
    );
    Ok(())
}

#[test]
fn closure_transform() -> Result<()> {
    let fixture = Fixture::new(2)?;
    let dataset = PairedVolumeDataset::new(
        fixture.data_dir(),
        |inputs: Vec<ArrayD<f32>>| -> Result<ArrayD<f32>> {
            anyhow::ensure!(inputs.len() == 1, "expect one volume");
            Ok(inputs[0].mapv(|value| value * 2.0))
        },
        10,
    )?;

    let record = dataset.nth(0)?;
    assert_eq!(
        record.source.double_value(&[0, 1, 1, 1]),
        voxel_value(1, [1, 1, 1]) * 2.0
    );
    Ok(())
}

#[test]
fn single_subject_cannot_pair() -> Result<()> {
    let fixture = Fixture::new(1)?;
    let dataset = PairedVolumeDataset::new(fixture.data_dir(), Identity, 10)?;

    assert_eq!(dataset.num_records(), 1);
    assert!(dataset.nth(0).is_err());
    Ok(())
}

#[test]
fn missing_data_dir() {
    let root = tempfile::tempdir().unwrap();
    let result = PairedVolumeDataset::new(root.path().join("nowhere"), Identity, 10);
    assert!(result.is_err());
}

#[test]
fn missing_volume_file() -> Result<()> {
    let fixture = Fixture::new(1)?;
    fixture.add_subject(2, false, false)?;
    let dataset = PairedVolumeDataset::new(fixture.data_dir(), Identity, 10)?;

    let err = dataset.nth(1).unwrap_err();
    assert!(format!("{:#}", err).contains("orig_nu_noskull.nii.gz"));
    Ok(())
}

#[test]
fn seeded_pairing_is_reproducible() -> Result<()> {
    let fixture = Fixture::new(5)?;
    let lhs = PairedVolumeDataset::new(fixture.data_dir(), Identity, 10)?.with_seed(11);
    let rhs = PairedVolumeDataset::new(fixture.data_dir(), Identity, 10)?.with_seed(11);

    for index in 0..lhs.num_records() {
        assert_eq!(lhs.nth(index)?.target_id, rhs.nth(index)?.target_id);
    }

    let mut lhs_rng = StdRng::seed_from_u64(5);
    let mut rhs_rng = StdRng::seed_from_u64(5);
    for index in 0..lhs.num_records() {
        let lhs_record = lhs.nth_with_rng(index, &mut lhs_rng)?;
        let rhs_record = lhs.nth_with_rng(index, &mut rhs_rng)?;
        assert_eq!(lhs_record.target_id, rhs_record.target_id);
    }
    Ok(())
}

#[test]
fn seg_dataset_loads_label_maps() -> Result<()> {
    let fixture = Fixture::new(3)?;
    let dataset =
        PairedVolumeWithSegDataset::new(fixture.data_dir(), Identity, 10, fixture.seg_dir(), None)?;
    assert_eq!(dataset.num_records(), 3);
    assert_eq!(dataset.seg_dir(), fixture.seg_dir().as_path());

    let record = dataset.nth(0)?;
    assert_eq!(record.source.size(), vec![1, 4, 5, 6]);
    assert_eq!(record.source_seg.size(), vec![1, 4, 5, 6]);
    assert_eq!(record.target_seg.size(), vec![1, 4, 5, 6]);
    assert_eq!(record.source_seg.kind(), Kind::Int16);
    assert_eq!(record.target_seg.kind(), Kind::Int16);

    // labels are truncated and belong to the same subjects as the volumes
    assert_eq!(subject_no_of_volume(&record.source), 1);
    for i in 0..4 {
        assert_eq!(
            record.source_seg.int64_value(&[0, i as i64, 2, 3]),
            raw_label(1, [i, 2, 3]).trunc() as i64
        );
    }

    let target_no = subject_no_of_volume(&record.target);
    assert_ne!(target_no, 1);
    assert_eq!(
        record.target_seg.int64_value(&[0, 3, 0, 0]),
        raw_label(target_no, [3, 0, 0]).trunc() as i64
    );
    Ok(())
}

#[test]
fn seg_transform_is_applied() -> Result<()> {
    let fixture = Fixture::new(2)?;
    let seg_transform: BoxTransform<i16> = Box::new(CenterCropOrPad::new([2, 2, 2])?);
    let dataset = PairedVolumeWithSegDataset::new(
        fixture.data_dir(),
        Identity,
        10,
        fixture.seg_dir(),
        Some(seg_transform),
    )?;

    let record = dataset.nth(0)?;
    assert_eq!(record.source.size(), vec![1, 4, 5, 6]);
    assert_eq!(record.source_seg.size(), vec![1, 2, 2, 2]);
    assert_eq!(record.source_seg.kind(), Kind::Int16);
    assert_eq!(
        record.source_seg.int64_value(&[0, 0, 0, 0]),
        raw_label(1, [1, 1, 2]).trunc() as i64
    );
    Ok(())
}

#[test]
fn missing_seg_file() -> Result<()> {
    let fixture = Fixture::new(2)?;
    fixture.add_subject(3, true, false)?;
    let dataset =
        PairedVolumeWithSegDataset::new(fixture.data_dir(), Identity, 10, fixture.seg_dir(), None)?;

    let err = dataset.nth(2).unwrap_err();
    assert!(format!("{:#}", err).contains("sub-03_synthseg.nii.gz"));
    Ok(())
}

#[test]
fn labels_truncate_towards_zero() -> Result<()> {
    let root = tempfile::tempdir()?;
    let path = root.path().join("labels.nii.gz");
    let raw = ArrayD::from_shape_vec(
        IxDyn(&[2, 2, 2]),
        vec![-2.5_f32, -0.5, 0.5, 41.9, 3.0, -7.99, 0.0, 12.5],
    )?;
    write_nifti(&path, &raw)?;

    let labels = read_labels(&path)?;
    assert_eq!(labels.shape(), &[2, 2, 2]);
    assert_eq!(labels[[0, 0, 0]], -2);
    assert_eq!(labels[[0, 0, 1]], 0);
    assert_eq!(labels[[0, 1, 0]], 0);
    assert_eq!(labels[[0, 1, 1]], 41);
    assert_eq!(labels[[1, 0, 0]], 3);
    assert_eq!(labels[[1, 0, 1]], -7);
    assert_eq!(labels[[1, 1, 1]], 12);
    Ok(())
}

#[tokio::test]
async fn stream_in_index_order() -> Result<()> {
    let fixture = Fixture::new(3)?;
    let dataset = PairedVolumeDataset::new(fixture.data_dir(), Identity, 10)?.with_seed(3);
    let stream = RandomAccessStream::new(dataset);

    let records: Vec<_> = stream.stream()?.try_collect().await?;
    let source_ids: Vec<_> = records
        .iter()
        .map(|record| record.source_id.as_str())
        .collect();
    assert_eq!(source_ids, vec!["sub-01", "sub-02", "sub-03"]);
    assert!(records
        .iter()
        .all(|record| record.source_id != record.target_id));
    Ok(())
}
