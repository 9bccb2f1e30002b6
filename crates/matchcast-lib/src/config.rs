//! Training configuration for the default classifier

use serde::{Deserialize, Serialize};

/// Default feature-embedding width
pub const DEFAULT_EMBED_DIM: usize = 64;

/// Default number of attentive refinement steps
pub const DEFAULT_REFINEMENT_STEPS: usize = 3;

/// Default learning rate for full-batch gradient descent
pub const DEFAULT_LEARNING_RATE: f64 = 2e-2;

/// Default training epoch cap
pub const DEFAULT_MAX_EPOCHS: usize = 200;

/// Compute device, resolved once at model construction
///
/// Kept as an explicit configuration value rather than process-global state.
/// The built-in classifier is CPU-only; accelerator backends would extend
/// this enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
}

/// Hyperparameters for the attentive tabular classifier
///
/// Defaults mirror the transformer baseline this model replaces:
/// 64-wide embedding, 3 refinement steps, 2 independent + 2 shared transform
/// blocks, sparsity coefficient 1.3, lr 2e-2, 200 epochs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Width of the per-step feature embedding
    pub embed_dim: usize,
    /// Number of sequential attentive refinement steps
    pub refinement_steps: usize,
    /// Transform blocks owned by each step
    pub independent_blocks: usize,
    /// Transform blocks shared across all steps
    pub shared_blocks: usize,
    /// Attention sparsity coefficient applied to feature masks
    pub sparsity: f64,
    /// Gradient descent learning rate
    pub learning_rate: f64,
    /// Maximum number of training epochs
    pub max_epochs: usize,
    /// Seed for deterministic weight initialization
    pub seed: u64,
    /// Compute device for training and inference
    pub device: Device,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            embed_dim: DEFAULT_EMBED_DIM,
            refinement_steps: DEFAULT_REFINEMENT_STEPS,
            independent_blocks: 2,
            shared_blocks: 2,
            sparsity: 1.3,
            learning_rate: DEFAULT_LEARNING_RATE,
            max_epochs: DEFAULT_MAX_EPOCHS,
            seed: 0,
            device: Device::Cpu,
        }
    }
}
