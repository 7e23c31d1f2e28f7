//! Volume preprocessing transforms.

use crate::common::*;
use num_traits::Zero;

/// A preprocessing step applied to decoded volumes.
///
/// The input is a sequence holding the volume to process, the output the
/// processed volume. Shape changes are up to the transform.
pub trait Transform<T>
where
    Self: Send + Sync,
{
    fn forward(&self, inputs: Vec<ArrayD<T>>) -> Result<ArrayD<T>>;
}

impl<T, F> Transform<T> for F
where
    F: Fn(Vec<ArrayD<T>>) -> Result<ArrayD<T>> + Send + Sync,
{
    fn forward(&self, inputs: Vec<ArrayD<T>>) -> Result<ArrayD<T>> {
        self(inputs)
    }
}

/// Boxed transform stored by the datasets.
pub type BoxTransform<T> = Box<dyn Transform<T>>;

fn single_volume<T>(mut inputs: Vec<ArrayD<T>>) -> Result<ArrayD<T>> {
    ensure!(
        inputs.len() == 1,
        "expect exactly one input volume, but get {}",
        inputs.len()
    );
    let volume = inputs.remove(0);
    ensure!(
        volume.ndim() == 3,
        "expect a 3D volume, but get shape {:?}",
        volume.shape()
    );
    Ok(volume)
}

/// Passes the volume through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> Transform<T> for Identity
where
    T: Send + Sync,
{
    fn forward(&self, inputs: Vec<ArrayD<T>>) -> Result<ArrayD<T>> {
        single_volume(inputs)
    }
}

/// Center-crops or zero-pads each axis to a fixed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterCropOrPad {
    pub shape: [usize; 3],
}

impl CenterCropOrPad {
    pub fn new(shape: [usize; 3]) -> Result<Self> {
        ensure!(
            shape.iter().all(|&size| size > 0),
            "crop shape must be positive, but get {:?}",
            shape
        );
        Ok(Self { shape })
    }
}

impl<T> Transform<T> for CenterCropOrPad
where
    T: Clone + Zero + Send + Sync,
{
    fn forward(&self, inputs: Vec<ArrayD<T>>) -> Result<ArrayD<T>> {
        let volume = single_volume(inputs)?;
        let in_shape = volume.shape().to_vec();

        // (source range, destination offset, copied length) per axis
        let spans: Vec<_> = in_shape
            .iter()
            .zip(self.shape.iter())
            .map(|(&in_size, &out_size)| {
                if in_size >= out_size {
                    let start = (in_size - out_size) / 2;
                    (start, 0, out_size)
                } else {
                    let offset = (out_size - in_size) / 2;
                    (0, offset, in_size)
                }
            })
            .collect();

        let mut output = ArrayD::<T>::zeros(IxDyn(&self.shape));
        {
            let mut dst = output.view_mut();
            let mut src = volume.view();
            for (axis, &(src_start, dst_start, len)) in spans.iter().enumerate() {
                src.slice_axis_inplace(Axis(axis), Slice::from(src_start..src_start + len));
                dst.slice_axis_inplace(Axis(axis), Slice::from(dst_start..dst_start + len));
            }
            dst.assign(&src);
        }

        Ok(output)
    }
}

/// Rescales intensities into `[0, 1]`. A constant volume maps to zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxNormalize;

impl Transform<f32> for MinMaxNormalize {
    fn forward(&self, inputs: Vec<ArrayD<f32>>) -> Result<ArrayD<f32>> {
        let mut volume = single_volume(inputs)?;
        let (min, max) = volume
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
                (min.min(value), max.max(value))
            });
        let range = max - min;

        if range > 0.0 && range.is_finite() {
            volume.mapv_inplace(|value| (value - min) / range);
        } else {
            volume.fill(0.0);
        }

        Ok(volume)
    }
}

/// Chains transforms, feeding each output to the next one.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Compose<T> {
    #[derivative(Debug = "ignore")]
    transforms: Vec<BoxTransform<T>>,
}

impl<T> Compose<T> {
    pub fn new(transforms: Vec<BoxTransform<T>>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl<T> Transform<T> for Compose<T>
where
    T: Send + Sync,
{
    fn forward(&self, inputs: Vec<ArrayD<T>>) -> Result<ArrayD<T>> {
        let mut transforms = self.transforms.iter();
        let first = match transforms.next() {
            Some(first) => first,
            None => return single_volume(inputs),
        };
        let mut volume = first.forward(inputs)?;
        for transform in transforms {
            volume = transform.forward(vec![volume])?;
        }
        Ok(volume)
    }
}
