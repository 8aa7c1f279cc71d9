use anyhow::Result;
use candle_core::Tensor;
use ndarray::{ArrayD, IxDyn};

/// Copy a candle tensor into an owned ndarray of the same shape.
pub fn tensor_to_ndarray_f32(tensor: &Tensor) -> Result<ArrayD<f32>> {
    let shape = tensor.dims().to_vec();
    let data = tensor.flatten_all()?.to_vec1::<f32>()?;
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_tensor_to_ndarray() -> Result<()> {
        let tensor = Tensor::arange(0f32, 6f32, &Device::Cpu)?.reshape((1, 2, 3))?;
        let array = tensor_to_ndarray_f32(&tensor)?;
        assert_eq!(array.shape(), &[1, 2, 3]);
        assert_eq!(array[[0, 1, 2]], 5.0);
        Ok(())
    }
}
