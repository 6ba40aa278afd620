//! Dense-layer building blocks for the autoencoders.
//!
//! Provides linear projections, batch normalization with running statistics,
//! the activation functions used by the networks, and a sequential container
//! that folds an input tensor through an ordered list of transforms.
//!
//! Tensors are `ndarray::Array2<f32>` of shape `(batch, features)`, one sample
//! per row.

use ndarray::{Array1, Array2, Axis};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{AutoencoderError, Result};

/// Negative slope applied by [`Transform::LeakyRelu`] by default.
pub const DEFAULT_NEGATIVE_SLOPE: f32 = 0.01;

/// Linear transformation layer (weight matrix multiplication plus bias)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Linear {
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl Linear {
    /// Create a new linear layer with Xavier/Glorot initialization
    ///
    /// Weights are sampled from N(0, sqrt(2 / (input_dim + output_dim))),
    /// the bias starts at zero.
    ///
    /// # Errors
    /// Returns `AutoencoderError::InvalidParameter` if either dimension is zero
    pub fn new(input_dim: usize, output_dim: usize) -> Result<Self> {
        if input_dim == 0 || output_dim == 0 {
            return Err(AutoencoderError::invalid_parameter(format!(
                "Linear dimensions must be positive, got {} -> {}",
                input_dim, output_dim
            )));
        }

        let mut rng = rand::thread_rng();
        let scale = (2.0 / (input_dim + output_dim) as f32).sqrt();
        let normal =
            Normal::new(0.0, scale as f64).expect("Invalid normal distribution parameters");

        let weights =
            Array2::from_shape_fn((output_dim, input_dim), |_| normal.sample(&mut rng) as f32);
        let bias = Array1::zeros(output_dim);

        Ok(Self { weights, bias })
    }

    /// Forward pass: y = x W^T + b, applied row-wise over the batch
    ///
    /// # Errors
    /// Returns `AutoencoderError::DimensionMismatch` if the input's last
    /// dimension differs from the layer's input dimension
    pub fn forward(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.input_dim() {
            return Err(AutoencoderError::dimension_mismatch(
                format!("(batch, {})", self.input_dim()),
                format!("({}, {})", x.nrows(), x.ncols()),
            ));
        }
        Ok(x.dot(&self.weights.t()) + &self.bias)
    }

    /// Get input dimension
    pub fn input_dim(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Get output dimension
    pub fn output_dim(&self) -> usize {
        self.weights.shape()[0]
    }
}

/// Per-feature batch normalization with learnable affine parameters and
/// running statistics
///
/// In training mode the batch is normalized with its own per-feature mean and
/// (biased) variance, and the running statistics are nudged toward the batch
/// statistics. In evaluation mode the running statistics are used and the
/// layer is a pure function of its input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNorm1d {
    gamma: Array1<f32>,
    beta: Array1<f32>,
    running_mean: Array1<f32>,
    running_var: Array1<f32>,
    momentum: f32,
    eps: f32,
}

impl BatchNorm1d {
    /// Create a new batch normalization layer
    ///
    /// Scale starts at one, shift at zero, running mean at zero, running
    /// variance at one. Momentum is 0.1 and epsilon 1e-5.
    ///
    /// # Errors
    /// Returns `AutoencoderError::InvalidParameter` if `num_features` is zero
    pub fn new(num_features: usize) -> Result<Self> {
        if num_features == 0 {
            return Err(AutoencoderError::invalid_parameter(
                "BatchNorm1d feature count must be positive",
            ));
        }
        Ok(Self {
            gamma: Array1::ones(num_features),
            beta: Array1::zeros(num_features),
            running_mean: Array1::zeros(num_features),
            running_var: Array1::ones(num_features),
            momentum: 0.1,
            eps: 1e-5,
        })
    }

    /// Training-mode forward pass
    ///
    /// Normalizes with the batch statistics and updates the running
    /// statistics as `running = (1 - momentum) * running + momentum * batch`.
    /// The running variance update uses the unbiased batch variance.
    ///
    /// # Errors
    /// Returns `AutoencoderError::BatchTooSmall` for batches of fewer than two
    /// samples (the batch variance is meaningless for a single sample), or
    /// `AutoencoderError::DimensionMismatch` on a feature-count mismatch
    pub fn forward_train(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_features(x)?;
        let n = x.nrows();
        if n < 2 {
            return Err(AutoencoderError::BatchTooSmall {
                required: 2,
                actual: n,
            });
        }

        let mean = x.sum_axis(Axis(0)) / n as f32;
        let var_biased = x.var_axis(Axis(0), 0.0);
        let var_unbiased = x.var_axis(Axis(0), 1.0);

        self.running_mean = &self.running_mean * (1.0 - self.momentum) + &mean * self.momentum;
        self.running_var =
            &self.running_var * (1.0 - self.momentum) + &var_unbiased * self.momentum;

        Ok(self.affine(x, &mean, &var_biased))
    }

    /// Evaluation-mode forward pass: normalize with the running statistics
    ///
    /// # Errors
    /// Returns `AutoencoderError::DimensionMismatch` on a feature-count
    /// mismatch
    pub fn forward_eval(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_features(x)?;
        Ok(self.affine(x, &self.running_mean, &self.running_var))
    }

    /// Get the number of normalized features
    pub fn num_features(&self) -> usize {
        self.gamma.len()
    }

    fn check_features(&self, x: &Array2<f32>) -> Result<()> {
        if x.ncols() != self.num_features() {
            return Err(AutoencoderError::dimension_mismatch(
                format!("(batch, {})", self.num_features()),
                format!("({}, {})", x.nrows(), x.ncols()),
            ));
        }
        Ok(())
    }

    fn affine(&self, x: &Array2<f32>, mean: &Array1<f32>, var: &Array1<f32>) -> Array2<f32> {
        let denom = var.mapv(|v| (v + self.eps).sqrt());
        ((x - mean) / &denom) * &self.gamma + &self.beta
    }
}

/// The closed set of transforms the autoencoders are composed of
///
/// The networks only ever use these four kinds, so they are a tagged union
/// rather than an open trait hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Transform {
    /// Dense projection
    Linear(Linear),
    /// Batch normalization
    BatchNorm(BatchNorm1d),
    /// Leaky rectifier: positives pass unchanged, negatives are scaled down
    LeakyRelu {
        /// Multiplier applied to negative inputs
        negative_slope: f32,
    },
    /// Rectifier: negatives are clamped to zero
    Relu,
}

impl Transform {
    /// Leaky rectifier with the default negative slope
    pub fn leaky_relu() -> Self {
        Transform::LeakyRelu {
            negative_slope: DEFAULT_NEGATIVE_SLOPE,
        }
    }

    /// Apply the transform in evaluation mode (no mutation)
    ///
    /// # Errors
    /// Propagates shape errors from the underlying layer
    pub fn apply(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        match self {
            Transform::Linear(linear) => linear.forward(x),
            Transform::BatchNorm(norm) => norm.forward_eval(x),
            Transform::LeakyRelu { negative_slope } => {
                let slope = *negative_slope;
                Ok(x.mapv(|v| if v >= 0.0 { v } else { slope * v }))
            }
            Transform::Relu => Ok(x.mapv(|v| v.max(0.0))),
        }
    }

    /// Apply the transform in training mode
    ///
    /// Batch normalization uses the batch statistics and updates its running
    /// statistics; all other transforms behave exactly as [`Transform::apply`].
    ///
    /// # Errors
    /// Propagates shape and batch-size errors from the underlying layer
    pub fn apply_train(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        match self {
            Transform::BatchNorm(norm) => norm.forward_train(x),
            other => other.apply(x),
        }
    }
}

/// Fixed, explicitly ordered pipeline of transforms
///
/// The forward pass is a strict left-to-right fold over the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequential {
    transforms: Vec<Transform>,
}

impl Sequential {
    /// Create a pipeline from an ordered list of transforms
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    /// Fold the input through every transform in order
    ///
    /// # Errors
    /// Propagates the first error raised by any transform in the chain
    pub fn forward(&mut self, x: &Array2<f32>, training: bool) -> Result<Array2<f32>> {
        if !training {
            return self.infer(x);
        }
        let mut h = x.clone();
        for transform in &mut self.transforms {
            h = transform.apply_train(&h)?;
        }
        Ok(h)
    }

    /// Evaluation-mode fold; pure function of input and current parameters
    ///
    /// # Errors
    /// Propagates the first error raised by any transform in the chain
    pub fn infer(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let mut h = x.clone();
        for transform in &self.transforms {
            h = transform.apply(&h)?;
        }
        Ok(h)
    }

    /// The ordered transforms of this pipeline
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_linear_forward_shape() {
        let linear = Linear::new(4, 2).unwrap();
        let x = Array2::zeros((3, 4));
        let y = linear.forward(&x).unwrap();
        assert_eq!(y.dim(), (3, 2));
    }

    #[test]
    fn test_linear_bias_applied() {
        let linear = Linear::new(3, 2).unwrap();
        // Zero input isolates the bias, which starts at zero.
        let x = Array2::zeros((2, 3));
        let y = linear.forward(&x).unwrap();
        assert!(y.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_linear_dimension_mismatch() {
        let linear = Linear::new(4, 2).unwrap();
        let x = Array2::zeros((3, 5));
        let err = linear.forward(&x).unwrap_err();
        assert!(matches!(err, AutoencoderError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_linear_zero_dim_rejected() {
        assert!(Linear::new(0, 2).is_err());
        assert!(Linear::new(2, 0).is_err());
    }

    #[test]
    fn test_batchnorm_train_normalizes_columns() {
        let mut norm = BatchNorm1d::new(2).unwrap();
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let y = norm.forward_train(&x).unwrap();

        for col in y.axis_iter(Axis(1)) {
            let mean: f32 = col.sum() / col.len() as f32;
            let var: f32 =
                col.iter().map(|&v| (v - mean).powi(2)).sum::<f32>() / col.len() as f32;
            assert!(mean.abs() < EPSILON);
            assert_relative_eq!(var, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_batchnorm_updates_running_stats() {
        let mut norm = BatchNorm1d::new(1).unwrap();
        let x = array![[2.0], [4.0]];
        norm.forward_train(&x).unwrap();

        // running_mean: 0.9 * 0 + 0.1 * 3 = 0.3
        assert_relative_eq!(norm.running_mean[0], 0.3, epsilon = EPSILON);
        // running_var uses the unbiased batch variance (= 2 here):
        // 0.9 * 1 + 0.1 * 2 = 1.1
        assert_relative_eq!(norm.running_var[0], 1.1, epsilon = EPSILON);
    }

    #[test]
    fn test_batchnorm_single_sample_training_fails() {
        let mut norm = BatchNorm1d::new(3).unwrap();
        let x = Array2::zeros((1, 3));
        let err = norm.forward_train(&x).unwrap_err();
        assert_eq!(
            err,
            AutoencoderError::BatchTooSmall {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_batchnorm_eval_uses_running_stats() {
        let norm = BatchNorm1d::new(2).unwrap();
        // Fresh layer: mean 0, var 1, so eval is x / sqrt(1 + eps).
        let x = array![[1.0, -2.0]];
        let y = norm.forward_eval(&x).unwrap();
        assert_relative_eq!(y[[0, 0]], 1.0 / (1.0f32 + 1e-5).sqrt(), epsilon = EPSILON);
        assert_relative_eq!(y[[0, 1]], -2.0 / (1.0f32 + 1e-5).sqrt(), epsilon = EPSILON);
    }

    #[test]
    fn test_batchnorm_feature_mismatch() {
        let norm = BatchNorm1d::new(2).unwrap();
        let x = Array2::zeros((4, 3));
        assert!(norm.forward_eval(&x).is_err());
    }

    #[test]
    fn test_leaky_relu_values() {
        let t = Transform::leaky_relu();
        let x = array![[-1.0, 0.0, 2.0]];
        let y = t.apply(&x).unwrap();
        assert_relative_eq!(y[[0, 0]], -0.01, epsilon = EPSILON);
        assert_eq!(y[[0, 1]], 0.0);
        assert_eq!(y[[0, 2]], 2.0);
    }

    #[test]
    fn test_relu_values() {
        let t = Transform::Relu;
        let x = array![[-1.0, 0.0, 2.0]];
        let y = t.apply(&x).unwrap();
        assert_eq!(y, array![[0.0, 0.0, 2.0]]);
    }

    #[test]
    fn test_relu_clamps_leaky_output() {
        // The deep decoder stacks LeakyRelu then Relu; the pair must leave
        // nothing negative behind.
        let leaky = Transform::leaky_relu();
        let relu = Transform::Relu;
        let x = array![[-5.0, -0.5, 0.0, 0.5]];
        let y = relu.apply(&leaky.apply(&x).unwrap()).unwrap();
        assert!(y.iter().all(|&v| v >= 0.0));
        assert_eq!(y[[0, 3]], 0.5);
    }

    #[test]
    fn test_sequential_folds_in_order() {
        let mut pipeline = Sequential::new(vec![
            Transform::Linear(Linear::new(3, 5).unwrap()),
            Transform::Relu,
        ]);
        let x = Array2::from_shape_fn((2, 3), |(i, j)| (i + j) as f32 - 2.0);
        let y = pipeline.forward(&x, false).unwrap();
        assert_eq!(y.dim(), (2, 5));
        assert!(y.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_sequential_infer_is_pure() {
        let pipeline = Sequential::new(vec![
            Transform::BatchNorm(BatchNorm1d::new(3).unwrap()),
            Transform::leaky_relu(),
        ]);
        let x = array![[1.0, -2.0, 3.0], [0.5, 0.0, -1.0]];
        let y1 = pipeline.infer(&x).unwrap();
        let y2 = pipeline.infer(&x).unwrap();
        assert_eq!(y1, y2);
    }
}
