//! Supervised next-symbol training with cross-entropy loss.
//!
//! Teacher forcing over sliding corpus windows: the input is a window of
//! one-hot symbols, the target the same window shifted by one. Training
//! is in-memory only; weights live for the process and are never written
//! to disk.

use burn::grad_clipping::GradientClippingConfig;
use burn::optim::{AdamWConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::activation;

use crate::data::corpus::Corpus;
use crate::model::rnn::CharRnn;
use crate::model::vocab::Vocabulary;

/// Training configuration.
pub struct TrainConfig {
    /// Initial learning rate.
    pub lr: f64,
    /// Minimum learning rate (cosine decay target).
    pub lr_min: f64,
    /// Weight decay.
    pub weight_decay: f64,
    /// Gradient clipping norm.
    pub grad_clip: f32,
    /// Number of epochs.
    pub epochs: usize,
    /// Window length (symbols of context per training example).
    pub window: usize,
    /// Step between window starts.
    pub stride: usize,
    /// Windows per optimizer step.
    pub batch_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            lr: 3e-3,
            lr_min: 1e-4,
            weight_decay: 0.01,
            grad_clip: 1.0,
            epochs: 20,
            window: 32,
            stride: 3,
            batch_size: 64,
        }
    }
}

/// Cosine annealing learning rate: `lr_min + 0.5*(lr - lr_min)*(1 + cos(pi*t/T))`.
pub fn cosine_lr(config: &TrainConfig, epoch: usize, total_epochs: usize) -> f64 {
    if total_epochs <= 1 {
        return config.lr;
    }
    let t = epoch as f64 / total_epochs as f64;
    config.lr_min + 0.5 * (config.lr - config.lr_min) * (1.0 + (std::f64::consts::PI * t).cos())
}

/// Result of one training epoch.
pub struct EpochResult {
    /// Average cross-entropy loss over all batches.
    pub avg_loss: f32,
    /// Number of windows processed.
    pub num_windows: usize,
}

/// Train one epoch over the given windows.
///
/// Each window holds `w + 1` symbol indices; the first `w` form the
/// input, the last `w` the shifted targets. Windows are grouped into
/// batches of `batch_size` for one optimizer step each.
///
/// Returns the model with updated weights and the epoch result.
pub fn train_epoch<B: burn::tensor::backend::AutodiffBackend>(
    model: CharRnn<B>,
    windows: &[Vec<usize>],
    vocab_size: usize,
    batch_size: usize,
    optimizer: &mut impl Optimizer<CharRnn<B>, B>,
    lr: f64,
    device: &B::Device,
) -> (CharRnn<B>, EpochResult) {
    let mut total_loss = 0.0f32;
    let mut num_batches = 0usize;
    let mut model = model;

    for chunk in windows.chunks(batch_size.max(1)) {
        let b = chunk.len();
        let w = chunk[0].len() - 1;
        let v = vocab_size;

        // One-hot inputs [b, w, V] and shifted integer targets [b, w].
        let mut input_data = vec![0.0f32; b * w * v];
        let mut target_data = Vec::with_capacity(b * w);
        for (row, window) in chunk.iter().enumerate() {
            for t in 0..w {
                input_data[(row * w + t) * v + window[t]] = 1.0;
            }
            for t in 0..w {
                target_data.push(window[t + 1] as i32);
            }
        }
        let inputs =
            Tensor::<B, 3>::from_data(TensorData::new(input_data, [b, w, v]), device);
        let targets =
            Tensor::<B, 2, Int>::from_data(TensorData::new(target_data, [b, w]), device);

        let logits = model.forward(inputs);
        let loss = cross_entropy_loss(logits, targets);
        let loss_val: f32 = loss.clone().into_data().to_vec::<f32>().unwrap()[0];
        total_loss += loss_val;
        num_batches += 1;

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optimizer.step(lr, model, grads);
    }

    let avg_loss = if num_batches == 0 {
        0.0
    } else {
        total_loss / num_batches as f32
    };

    (
        model,
        EpochResult {
            avg_loss,
            num_windows: windows.len(),
        },
    )
}

/// Train for `config.epochs` epochs on a corpus.
///
/// Builds windows once, anneals the learning rate per epoch, and returns
/// the trained model with one result per epoch. Fails if the corpus is
/// too short to produce a single window.
pub fn train<B: burn::tensor::backend::AutodiffBackend>(
    model: CharRnn<B>,
    corpus: &Corpus,
    vocab: &Vocabulary,
    config: &TrainConfig,
    device: &B::Device,
) -> Result<(CharRnn<B>, Vec<EpochResult>), String> {
    let windows = corpus.index_windows(vocab, config.window, config.stride);
    if windows.is_empty() {
        return Err(format!(
            "corpus of {} symbols is too short for window length {}",
            corpus.len(),
            config.window
        ));
    }

    let mut optimizer = create_optimizer::<B>(config);
    let mut model = model;
    let mut results = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        let lr = cosine_lr(config, epoch, config.epochs);
        let (next, result) = train_epoch(
            model,
            &windows,
            vocab.size(),
            config.batch_size,
            &mut optimizer,
            lr,
            device,
        );
        model = next;
        results.push(result);
    }

    Ok((model, results))
}

/// Cross-entropy loss between logits and targets.
/// logits: `[batch, seq, vocab]`, targets: `[batch, seq]`.
fn cross_entropy_loss<B: Backend>(
    logits: Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
) -> Tensor<B, 1> {
    let [batch, seq, vocab] = logits.dims();

    let logits_flat = logits.reshape([batch * seq, vocab]);
    let targets_flat = targets.reshape([batch * seq]);

    let log_probs = activation::log_softmax(logits_flat, 1);

    // Gather the log-prob of the target class.
    let targets_2d: Tensor<B, 2, Int> = targets_flat.unsqueeze_dim::<2>(1);
    let selected = log_probs.gather(1, targets_2d); // [batch*seq, 1]

    selected.mean().neg().unsqueeze()
}

/// Create an AdamW optimizer with gradient clipping.
pub fn create_optimizer<B: burn::tensor::backend::AutodiffBackend>(
    config: &TrainConfig,
) -> impl Optimizer<CharRnn<B>, B> {
    AdamWConfig::new()
        .with_weight_decay(config.weight_decay as f32)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(config.grad_clip)))
        .init()
}

// ─── Tests ────────────────────────────────────────────────────────
