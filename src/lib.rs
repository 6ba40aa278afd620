//! # Dense Autoencoder
//!
//! Feed-forward autoencoders that compress fixed-length `f32` feature vectors
//! into a lower-dimensional latent representation and reconstruct them.
//!
//! Two alternative architectures are provided:
//!
//! - [`DeepAutoencoder`]: two dense projections per direction with batch
//!   normalization and leaky rectifiers, plus an intermediate hidden width.
//! - [`SimpleAutoencoder`]: one normalized, activated projection down to the
//!   latent width and a bare linear projection back.
//!
//! The crate defines the layer topology only. Training, loss computation,
//! optimizers, data pipelines, and checkpoint formats live with the caller;
//! parameters are plain serde-serializable containers owned by each network.
//!
//! ## Usage Example
//!
//! ```rust
//! use dense_autoencoder::DeepAutoencoder;
//! use ndarray::Array2;
//!
//! # fn main() -> dense_autoencoder::Result<()> {
//! let mut net = DeepAutoencoder::new(10, 6, 3)?;
//! net.eval();
//!
//! let x = Array2::<f32>::zeros((4, 10));
//! let reconstruction = net.forward(&x)?;
//! assert_eq!(reconstruction.dim(), (4, 10));
//!
//! let features = net.feature_extraction(&x)?;
//! assert_eq!(features.dim(), (4, 3));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod layer;
pub mod model;

pub use error::{AutoencoderError, Result};
pub use layer::{BatchNorm1d, Linear, Sequential, Transform};
pub use model::{DeepAutoencoder, SimpleAutoencoder};
