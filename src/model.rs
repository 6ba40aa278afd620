//! The two autoencoder networks.
//!
//! Both networks compress `(batch, dim_input)` feature batches into a
//! `(batch, latent_size)` representation and reconstruct the original width.
//! They are alternative configurations selected by the caller; nothing here
//! trains them — parameters are mutated by an external training procedure.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AutoencoderError, Result};
use crate::layer::{BatchNorm1d, Linear, Sequential, Transform};

fn check_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(AutoencoderError::invalid_parameter(format!(
            "{} must be positive",
            name
        )));
    }
    Ok(())
}

/// Two-stage autoencoder with an intermediate hidden width
///
/// Encoder: `Linear -> BatchNorm -> LeakyReLU -> Linear -> BatchNorm ->
/// LeakyReLU`, mapping `dim_input` to `latent_size` through `intermediate`.
///
/// Decoder: `Linear -> BatchNorm -> LeakyReLU -> ReLU -> Linear`, back to
/// `dim_input` with no final activation. The ReLU directly after the LeakyReLU
/// clamps the leaky negative slope's output to zero, so the tensor entering
/// the final projection is non-negative. That stacking is deliberate and must
/// not be collapsed into a single activation.
///
/// Networks start in training mode; call [`DeepAutoencoder::eval`] before
/// inference so batch normalization uses its running statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepAutoencoder {
    encoder: Sequential,
    decoder: Sequential,
    dim_input: usize,
    intermediate: usize,
    latent_size: usize,
    training: bool,
}

impl DeepAutoencoder {
    /// Build the network with freshly initialized parameters
    ///
    /// # Errors
    /// Returns `AutoencoderError::InvalidParameter` if any dimension is zero
    pub fn new(dim_input: usize, intermediate: usize, latent_size: usize) -> Result<Self> {
        check_positive("dim_input", dim_input)?;
        check_positive("intermediate", intermediate)?;
        check_positive("latent_size", latent_size)?;

        let encoder = Sequential::new(vec![
            Transform::Linear(Linear::new(dim_input, intermediate)?),
            Transform::BatchNorm(BatchNorm1d::new(intermediate)?),
            Transform::leaky_relu(),
            Transform::Linear(Linear::new(intermediate, latent_size)?),
            Transform::BatchNorm(BatchNorm1d::new(latent_size)?),
            Transform::leaky_relu(),
        ]);

        let decoder = Sequential::new(vec![
            Transform::Linear(Linear::new(latent_size, intermediate)?),
            Transform::BatchNorm(BatchNorm1d::new(intermediate)?),
            Transform::leaky_relu(),
            Transform::Relu,
            Transform::Linear(Linear::new(intermediate, dim_input)?),
        ]);

        debug!(dim_input, intermediate, latent_size, "built DeepAutoencoder");

        Ok(Self {
            encoder,
            decoder,
            dim_input,
            intermediate,
            latent_size,
            training: true,
        })
    }

    /// Encode and reconstruct a batch
    ///
    /// Input shape `(batch, dim_input)`, output shape `(batch, dim_input)`.
    /// In training mode the batch normalization layers update their running
    /// statistics; that is the only side effect.
    ///
    /// # Errors
    /// Returns `AutoencoderError::DimensionMismatch` if the input width is not
    /// `dim_input`, or `AutoencoderError::BatchTooSmall` for single-sample
    /// batches in training mode
    pub fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let latent = self.encoder.forward(x, self.training)?;
        self.decoder.forward(&latent, self.training)
    }

    /// Encode a batch without reconstructing it
    ///
    /// Returns the `(batch, latent_size)` compressed representation. Pure
    /// function of the input and current parameters: the encoder runs with the
    /// running statistics and nothing is mutated.
    ///
    /// # Errors
    /// Returns `AutoencoderError::DimensionMismatch` if the input width is not
    /// `dim_input`
    pub fn feature_extraction(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.encoder.infer(x)
    }

    /// Switch to training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Switch to evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Whether the network is in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Width of the raw feature vector
    pub fn dim_input(&self) -> usize {
        self.dim_input
    }

    /// Width of the hidden layer between input and latent space
    pub fn intermediate(&self) -> usize {
        self.intermediate
    }

    /// Width of the compressed representation
    pub fn latent_size(&self) -> usize {
        self.latent_size
    }

    /// Read-only view of the encoder pipeline
    pub fn encoder(&self) -> &Sequential {
        &self.encoder
    }

    /// Read-only view of the decoder pipeline
    pub fn decoder(&self) -> &Sequential {
        &self.decoder
    }
}

/// Single-stage autoencoder
///
/// Encoder: `Linear -> BatchNorm -> LeakyReLU`, mapping `dim_input` straight
/// to `latent_size`. Decoder: a bare `Linear` back to `dim_input`, with no
/// normalization and no activation.
///
/// Networks start in training mode; call [`SimpleAutoencoder::eval`] before
/// inference so batch normalization uses its running statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleAutoencoder {
    encoder: Sequential,
    decoder: Sequential,
    dim_input: usize,
    latent_size: usize,
    training: bool,
}

impl SimpleAutoencoder {
    /// Build the network with freshly initialized parameters
    ///
    /// # Errors
    /// Returns `AutoencoderError::InvalidParameter` if any dimension is zero
    pub fn new(dim_input: usize, latent_size: usize) -> Result<Self> {
        check_positive("dim_input", dim_input)?;
        check_positive("latent_size", latent_size)?;

        let encoder = Sequential::new(vec![
            Transform::Linear(Linear::new(dim_input, latent_size)?),
            Transform::BatchNorm(BatchNorm1d::new(latent_size)?),
            Transform::leaky_relu(),
        ]);

        let decoder = Sequential::new(vec![Transform::Linear(Linear::new(
            latent_size,
            dim_input,
        )?)]);

        debug!(dim_input, latent_size, "built SimpleAutoencoder");

        Ok(Self {
            encoder,
            decoder,
            dim_input,
            latent_size,
            training: true,
        })
    }

    /// Encode and reconstruct a batch
    ///
    /// Shape contract identical to [`DeepAutoencoder::forward`].
    ///
    /// # Errors
    /// Returns `AutoencoderError::DimensionMismatch` if the input width is not
    /// `dim_input`, or `AutoencoderError::BatchTooSmall` for single-sample
    /// batches in training mode
    pub fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let latent = self.encoder.forward(x, self.training)?;
        self.decoder.forward(&latent, self.training)
    }

    /// Encode a batch without reconstructing it
    ///
    /// Contract identical to [`DeepAutoencoder::feature_extraction`].
    ///
    /// # Errors
    /// Returns `AutoencoderError::DimensionMismatch` if the input width is not
    /// `dim_input`
    pub fn feature_extraction(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.encoder.infer(x)
    }

    /// Switch to training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Switch to evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Whether the network is in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Width of the raw feature vector
    pub fn dim_input(&self) -> usize {
        self.dim_input
    }

    /// Width of the compressed representation
    pub fn latent_size(&self) -> usize {
        self.latent_size
    }

    /// Read-only view of the encoder pipeline
    pub fn encoder(&self) -> &Sequential {
        &self.encoder
    }

    /// Read-only view of the decoder pipeline
    pub fn decoder(&self) -> &Sequential {
        &self.decoder
    }
}
