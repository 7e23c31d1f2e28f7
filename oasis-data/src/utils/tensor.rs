use crate::common::*;

/// Convert an array into a tensor with a leading singleton channel axis.
///
/// The array is coerced to standard (C-contiguous) layout first, so a
/// `[d0, d1, d2]` array becomes a `[1, d0, d1, d2]` tensor of the matching kind.
pub fn array_to_channel_tensor<T>(array: ArrayD<T>) -> Result<Tensor>
where
    T: tch::kind::Element + Clone,
{
    let array = if array.is_standard_layout() {
        array
    } else {
        array.as_standard_layout().into_owned()
    };
    let array = array.insert_axis(Axis(0));
    let shape: Vec<i64> = array.shape().iter().map(|&size| size as i64).collect();
    let data = array
        .as_slice()
        .ok_or_else(|| format_err!("array is not contiguous after layout coercion"))?;
    let tensor = Tensor::of_slice(data).f_reshape(&shape)?;
    Ok(tensor)
}
