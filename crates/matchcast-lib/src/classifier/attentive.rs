//! Attentive tabular network, the built-in classifier
//!
//! A compact TabNet-flavored estimator trained from scratch: each refinement
//! step applies a learned softmax feature mask (scaled by the sparsity
//! coefficient), pushes the masked input through shared and step-owned ReLU
//! transform blocks, and accumulates the result into a decision vector that a
//! linear head maps to three class logits. Training is full-batch gradient
//! descent on softmax cross-entropy, deterministic for a given seed.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Classifier, NUM_CLASSES};
use crate::config::TrainConfig;
use crate::error::ModelError;

/// Trainable network parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NetParams {
    /// Feature embedding, `(arity, embed_dim)`
    embed_w: Array2<f64>,
    embed_b: Array1<f64>,
    /// Per-step attention logits over features, each `(arity,)`
    attention: Vec<Array1<f64>>,
    /// Transform blocks shared across steps, each `(embed_dim, embed_dim)`
    shared_w: Vec<Array2<f64>>,
    shared_b: Vec<Array1<f64>>,
    /// Step-owned transform blocks, `[step][block]`
    step_w: Vec<Vec<Array2<f64>>>,
    step_b: Vec<Vec<Array1<f64>>>,
    /// Decision head, `(embed_dim, 3)`
    head_w: Array2<f64>,
    head_b: Array1<f64>,
}

/// Complete trained state, self-contained for exact reconstruction
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NetState {
    config: TrainConfig,
    arity: usize,
    params: NetParams,
}

/// Gradient accumulator shaped like [`NetParams`]
struct NetGrads {
    embed_w: Array2<f64>,
    embed_b: Array1<f64>,
    attention: Vec<Array1<f64>>,
    shared_w: Vec<Array2<f64>>,
    shared_b: Vec<Array1<f64>>,
    step_w: Vec<Vec<Array2<f64>>>,
    step_b: Vec<Vec<Array1<f64>>>,
    head_w: Array2<f64>,
    head_b: Array1<f64>,
}

/// Forward-pass cache for one transform layer
struct LayerCache {
    input: Array2<f64>,
    pre: Array2<f64>,
}

/// Forward-pass cache for one refinement step
struct StepCache {
    mask: Array1<f64>,
    embed: LayerCache,
    shared: Vec<LayerCache>,
    owned: Vec<LayerCache>,
}

/// The built-in attentive three-class classifier
pub struct AttentiveNet {
    config: TrainConfig,
    state: Option<NetState>,
}

impl AttentiveNet {
    pub fn new(config: TrainConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    fn init_params(config: &TrainConfig, arity: usize, rng: &mut StdRng) -> NetParams {
        let k = config.embed_dim;
        let embed_w = xavier(arity, k, rng);
        let embed_b = Array1::zeros(k);

        let mut attention = Vec::with_capacity(config.refinement_steps);
        for _ in 0..config.refinement_steps {
            let mut logits = Array1::zeros(arity);
            for value in logits.iter_mut() {
                *value = rng.gen_range(-0.1..0.1);
            }
            attention.push(logits);
        }

        let mut shared_w = Vec::with_capacity(config.shared_blocks);
        let mut shared_b = Vec::with_capacity(config.shared_blocks);
        for _ in 0..config.shared_blocks {
            shared_w.push(xavier(k, k, rng));
            shared_b.push(Array1::zeros(k));
        }

        let mut step_w = Vec::with_capacity(config.refinement_steps);
        let mut step_b = Vec::with_capacity(config.refinement_steps);
        for _ in 0..config.refinement_steps {
            let mut blocks_w = Vec::with_capacity(config.independent_blocks);
            let mut blocks_b = Vec::with_capacity(config.independent_blocks);
            for _ in 0..config.independent_blocks {
                blocks_w.push(xavier(k, k, rng));
                blocks_b.push(Array1::zeros(k));
            }
            step_w.push(blocks_w);
            step_b.push(blocks_b);
        }

        let head_w = xavier(k, NUM_CLASSES, rng);
        let head_b = Array1::zeros(NUM_CLASSES);

        NetParams {
            embed_w,
            embed_b,
            attention,
            shared_w,
            shared_b,
            step_w,
            step_b,
            head_w,
            head_b,
        }
    }

    /// Forward pass without caches, for inference
    fn forward(params: &NetParams, sparsity: f64, x: &Array2<f64>) -> Array2<f64> {
        let k = params.embed_b.len();
        let mut decision = Array2::<f64>::zeros((x.nrows(), k));

        for (step, attn) in params.attention.iter().enumerate() {
            let mask = softmax_vec(&(attn * sparsity));
            let masked = x * &mask;
            let mut h = relu(&(masked.dot(&params.embed_w) + &params.embed_b));
            for (w, b) in params.shared_w.iter().zip(&params.shared_b) {
                h = relu(&(h.dot(w) + b));
            }
            for (w, b) in params.step_w[step].iter().zip(&params.step_b[step]) {
                h = relu(&(h.dot(w) + b));
            }
            decision += &h;
        }

        let logits = decision.dot(&params.head_w) + &params.head_b;
        softmax_rows(&logits)
    }

    /// Forward pass with caches, for training
    fn forward_cached(
        params: &NetParams,
        sparsity: f64,
        x: &Array2<f64>,
    ) -> (Array2<f64>, Array2<f64>, Vec<StepCache>) {
        let k = params.embed_b.len();
        let mut decision = Array2::<f64>::zeros((x.nrows(), k));
        let mut steps = Vec::with_capacity(params.attention.len());

        for (step, attn) in params.attention.iter().enumerate() {
            let mask = softmax_vec(&(attn * sparsity));
            let masked = x * &mask;

            let pre = masked.dot(&params.embed_w) + &params.embed_b;
            let mut h = relu(&pre);
            let embed = LayerCache { input: masked, pre };

            let mut shared = Vec::with_capacity(params.shared_w.len());
            for (w, b) in params.shared_w.iter().zip(&params.shared_b) {
                let pre = h.dot(w) + b;
                shared.push(LayerCache {
                    input: h,
                    pre: pre.clone(),
                });
                h = relu(&pre);
            }

            let mut owned = Vec::with_capacity(params.step_w[step].len());
            for (w, b) in params.step_w[step].iter().zip(&params.step_b[step]) {
                let pre = h.dot(w) + b;
                owned.push(LayerCache {
                    input: h,
                    pre: pre.clone(),
                });
                h = relu(&pre);
            }

            decision += &h;
            steps.push(StepCache {
                mask,
                embed,
                shared,
                owned,
            });
        }

        let logits = decision.dot(&params.head_w) + &params.head_b;
        (softmax_rows(&logits), decision, steps)
    }

    /// One full-batch gradient step; returns the epoch's cross-entropy loss
    fn train_epoch(
        params: &mut NetParams,
        config: &TrainConfig,
        x: &Array2<f64>,
        onehot: &Array2<f64>,
        labels: &[usize],
    ) -> f64 {
        let n = x.nrows() as f64;
        let (probs, decision, steps) = Self::forward_cached(params, config.sparsity, x);

        let loss = cross_entropy(&probs, labels);

        let mut grads = NetGrads::zeros_like(params);

        // d(loss)/d(logits) for mean softmax cross-entropy
        let g_logits = (&probs - onehot) / n;
        grads.head_w += &decision.t().dot(&g_logits);
        grads.head_b += &g_logits.sum_axis(Axis(0));

        // decision is a plain sum over steps, so every step sees this gradient
        let g_decision = g_logits.dot(&params.head_w.t());

        for (step, cache) in steps.iter().enumerate() {
            let mut g_h = g_decision.clone();

            for (block, layer) in cache.owned.iter().enumerate().rev() {
                let g_pre = &g_h * &relu_mask(&layer.pre);
                grads.step_w[step][block] += &layer.input.t().dot(&g_pre);
                grads.step_b[step][block] += &g_pre.sum_axis(Axis(0));
                g_h = g_pre.dot(&params.step_w[step][block].t());
            }

            for (block, layer) in cache.shared.iter().enumerate().rev() {
                let g_pre = &g_h * &relu_mask(&layer.pre);
                grads.shared_w[block] += &layer.input.t().dot(&g_pre);
                grads.shared_b[block] += &g_pre.sum_axis(Axis(0));
                g_h = g_pre.dot(&params.shared_w[block].t());
            }

            let g_pre0 = &g_h * &relu_mask(&cache.embed.pre);
            grads.embed_w += &cache.embed.input.t().dot(&g_pre0);
            grads.embed_b += &g_pre0.sum_axis(Axis(0));

            // through the mask: masked = x * mask (broadcast over rows)
            let g_masked = g_pre0.dot(&params.embed_w.t());
            let g_mask = (&g_masked * x).sum_axis(Axis(0));

            // softmax jacobian: dz = m * (dm - <dm, m>), z = sparsity * attention
            let inner = g_mask.dot(&cache.mask);
            grads.attention[step] += &(&cache.mask * &(&g_mask - inner) * config.sparsity);
        }

        params.apply(&grads, config.learning_rate);
        loss
    }
}

impl Classifier for AttentiveNet {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<(), ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyInput);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::LengthMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }
        // Labels arrive as Outcome::class_id() values, so this cannot fire
        // through the public model API
        debug_assert!(
            y.iter().all(|&label| label < NUM_CLASSES),
            "class id out of range"
        );

        let arity = x.ncols();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut params = Self::init_params(&self.config, arity, &mut rng);

        let mut onehot = Array2::<f64>::zeros((x.nrows(), NUM_CLASSES));
        for (row, &label) in y.iter().enumerate() {
            onehot[[row, label]] = 1.0;
        }

        for epoch in 0..self.config.max_epochs {
            let loss = Self::train_epoch(&mut params, &self.config, x, &onehot, y);
            if epoch % 50 == 0 || epoch + 1 == self.config.max_epochs {
                debug!(epoch, loss, "training epoch");
            }
        }

        self.state = Some(NetState {
            config: self.config.clone(),
            arity,
            params,
        });
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let state = self.state.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != state.arity {
            return Err(ModelError::DimensionMismatch {
                expected: state.arity,
                actual: x.ncols(),
            });
        }
        Ok(Self::forward(&state.params, state.config.sparsity, x))
    }

    fn export_state(&self) -> Result<Vec<u8>, ModelError> {
        let state = self.state.as_ref().ok_or(ModelError::NotFitted)?;
        Ok(serde_json::to_vec(state)?)
    }

    fn import_state(&mut self, blob: &[u8]) -> Result<(), ModelError> {
        let state: NetState = serde_json::from_slice(blob)?;
        self.config = state.config.clone();
        self.state = Some(state);
        Ok(())
    }

    fn clone_unfit(&self) -> Box<dyn Classifier> {
        Box::new(AttentiveNet::new(self.config.clone()))
    }

    fn name(&self) -> &str {
        "attentive_net"
    }
}

impl NetGrads {
    fn zeros_like(params: &NetParams) -> Self {
        Self {
            embed_w: Array2::zeros(params.embed_w.raw_dim()),
            embed_b: Array1::zeros(params.embed_b.raw_dim()),
            attention: params
                .attention
                .iter()
                .map(|a| Array1::zeros(a.raw_dim()))
                .collect(),
            shared_w: params
                .shared_w
                .iter()
                .map(|w| Array2::zeros(w.raw_dim()))
                .collect(),
            shared_b: params
                .shared_b
                .iter()
                .map(|b| Array1::zeros(b.raw_dim()))
                .collect(),
            step_w: params
                .step_w
                .iter()
                .map(|step| step.iter().map(|w| Array2::zeros(w.raw_dim())).collect())
                .collect(),
            step_b: params
                .step_b
                .iter()
                .map(|step| step.iter().map(|b| Array1::zeros(b.raw_dim())).collect())
                .collect(),
            head_w: Array2::zeros(params.head_w.raw_dim()),
            head_b: Array1::zeros(params.head_b.raw_dim()),
        }
    }
}

impl NetParams {
    fn apply(&mut self, grads: &NetGrads, lr: f64) {
        self.embed_w.scaled_add(-lr, &grads.embed_w);
        self.embed_b.scaled_add(-lr, &grads.embed_b);
        for (attn, grad) in self.attention.iter_mut().zip(&grads.attention) {
            attn.scaled_add(-lr, grad);
        }
        for (w, grad) in self.shared_w.iter_mut().zip(&grads.shared_w) {
            w.scaled_add(-lr, grad);
        }
        for (b, grad) in self.shared_b.iter_mut().zip(&grads.shared_b) {
            b.scaled_add(-lr, grad);
        }
        for (step, grad_step) in self.step_w.iter_mut().zip(&grads.step_w) {
            for (w, grad) in step.iter_mut().zip(grad_step) {
                w.scaled_add(-lr, grad);
            }
        }
        for (step, grad_step) in self.step_b.iter_mut().zip(&grads.step_b) {
            for (b, grad) in step.iter_mut().zip(grad_step) {
                b.scaled_add(-lr, grad);
            }
        }
        self.head_w.scaled_add(-lr, &grads.head_w);
        self.head_b.scaled_add(-lr, &grads.head_b);
    }
}

fn xavier(fan_in: usize, fan_out: usize, rng: &mut StdRng) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((fan_in, fan_out), |_| rng.gen_range(-limit..limit))
}

fn relu(a: &Array2<f64>) -> Array2<f64> {
    a.mapv(|v| v.max(0.0))
}

fn relu_mask(pre: &Array2<f64>) -> Array2<f64> {
    pre.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

fn softmax_vec(z: &Array1<f64>) -> Array1<f64> {
    let max = z.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let exp = z.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

fn softmax_rows(logits: &Array2<f64>) -> Array2<f64> {
    let mut probs = logits.clone();
    for mut row in probs.axis_iter_mut(Axis(0)) {
        let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    probs
}

fn cross_entropy(probs: &Array2<f64>, labels: &[usize]) -> f64 {
    let mut total = 0.0;
    for (row, &label) in labels.iter().enumerate() {
        total -= probs[[row, label]].max(1e-12).ln();
    }
    total / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_config() -> TrainConfig {
        TrainConfig {
            embed_dim: 8,
            refinement_steps: 2,
            independent_blocks: 1,
            shared_blocks: 1,
            learning_rate: 0.05,
            max_epochs: 400,
            seed: 7,
            ..TrainConfig::default()
        }
    }

    /// Three well separated clusters, one per class
    fn clustered_data() -> (Array2<f64>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let centers = [(-4.0, -4.0), (0.0, 4.0), (4.0, -4.0)];
        for (class, &(cx, cy)) in centers.iter().enumerate() {
            for offset in [-0.2, 0.0, 0.2, 0.4] {
                rows.push(vec![cx + offset, cy - offset]);
                labels.push(class);
            }
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = Array2::from_shape_vec((rows.len(), 2), flat).unwrap();
        (x, labels)
    }

    #[test]
    fn test_predict_before_fit() {
        let net = AttentiveNet::new(small_config());
        let x = array![[0.0, 0.0]];
        assert!(matches!(net.predict_proba(&x), Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_fit_validation() {
        let mut net = AttentiveNet::new(small_config());
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(net.fit(&empty, &[]), Err(ModelError::EmptyInput)));

        let x = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(matches!(
            net.fit(&x, &[0]),
            Err(ModelError::LengthMismatch { rows: 2, labels: 1 })
        ));
    }

    #[test]
    #[should_panic(expected = "class id out of range")]
    fn test_fit_panics_on_out_of_range_class_id() {
        let mut net = AttentiveNet::new(small_config());
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let _ = net.fit(&x, &[0, 5]);
    }

    #[test]
    fn test_probabilities_are_distributions() {
        let (x, labels) = clustered_data();
        let mut net = AttentiveNet::new(small_config());
        net.fit(&x, &labels).unwrap();

        let probs = net.predict_proba(&x).unwrap();
        assert_eq!(probs.shape(), &[x.nrows(), 3]);
        for row in probs.axis_iter(Axis(0)) {
            let sum: f64 = row.sum();
            assert!((sum - 1.0).abs() < 1e-6, "row sums to {}", sum);
            for &p in row {
                assert!(p >= 0.0);
            }
        }
    }

    #[test]
    fn test_learns_separable_clusters() {
        let (x, labels) = clustered_data();
        let mut net = AttentiveNet::new(small_config());
        net.fit(&x, &labels).unwrap();

        let probs = net.predict_proba(&x).unwrap();
        let mean_true_class: f64 = labels
            .iter()
            .enumerate()
            .map(|(row, &label)| probs[[row, label]])
            .sum::<f64>()
            / labels.len() as f64;
        assert!(
            mean_true_class > 0.5,
            "mean true-class probability was {}",
            mean_true_class
        );
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, labels) = clustered_data();
        let mut a = AttentiveNet::new(small_config());
        let mut b = AttentiveNet::new(small_config());
        a.fit(&x, &labels).unwrap();
        b.fit(&x, &labels).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_state_round_trip_is_exact() {
        let (x, labels) = clustered_data();
        let mut net = AttentiveNet::new(small_config());
        net.fit(&x, &labels).unwrap();
        let expected = net.predict_proba(&x).unwrap();

        let blob = net.export_state().unwrap();
        let mut restored = AttentiveNet::new(TrainConfig::default());
        restored.import_state(&blob).unwrap();
        assert_eq!(restored.predict_proba(&x).unwrap(), expected);
    }

    #[test]
    fn test_export_before_fit() {
        let net = AttentiveNet::new(small_config());
        assert!(matches!(net.export_state(), Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_dimension_mismatch_at_predict() {
        let (x, labels) = clustered_data();
        let mut net = AttentiveNet::new(small_config());
        net.fit(&x, &labels).unwrap();
        let wrong = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            net.predict_proba(&wrong),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
