//! Recurrent next-symbol model.
//!
//! Single-layer GRU over one-hot symbol rows, assembled from `Linear`
//! gates, with a linear projection back to vocabulary logits. The decoder
//! never sees this type directly: it reaches it through the oracle
//! contract, so any other architecture can stand in.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation;

// ─── Configuration ────────────────────────────────────────────────

/// Model configuration.
#[derive(Config, Debug)]
pub struct CharRnnConfig {
    /// Alphabet size: input row width and output logit width.
    pub vocab_size: usize,
    /// Hidden state dimension.
    #[config(default = 128)]
    pub d_hidden: usize,
}

// ─── Model ────────────────────────────────────────────────────────

/// GRU with a logit head.
///
/// Gates follow the standard formulation: update and reset from the
/// current input plus the previous hidden state, candidate from the
/// reset-scaled hidden state.
#[derive(Module, Debug)]
pub struct CharRnn<B: Backend> {
    /// Update gate, input half: V → d_hidden.
    update_x: Linear<B>,
    /// Update gate, recurrent half: d_hidden → d_hidden.
    update_h: Linear<B>,
    /// Reset gate, input half.
    reset_x: Linear<B>,
    /// Reset gate, recurrent half.
    reset_h: Linear<B>,
    /// Candidate state, input half.
    candidate_x: Linear<B>,
    /// Candidate state, recurrent half.
    candidate_h: Linear<B>,
    /// Logit head: d_hidden → V.
    output_proj: Linear<B>,
    d_hidden: usize,
}

impl CharRnnConfig {
    /// Initialize the model on a device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> CharRnn<B> {
        CharRnn {
            update_x: LinearConfig::new(self.vocab_size, self.d_hidden).init(device),
            update_h: LinearConfig::new(self.d_hidden, self.d_hidden).init(device),
            reset_x: LinearConfig::new(self.vocab_size, self.d_hidden).init(device),
            reset_h: LinearConfig::new(self.d_hidden, self.d_hidden).init(device),
            candidate_x: LinearConfig::new(self.vocab_size, self.d_hidden).init(device),
            candidate_h: LinearConfig::new(self.d_hidden, self.d_hidden).init(device),
            output_proj: LinearConfig::new(self.d_hidden, self.vocab_size).init(device),
            d_hidden: self.d_hidden,
        }
    }
}

impl<B: Backend> CharRnn<B> {
    /// Forward pass over a one-hot batch.
    ///
    /// - `input`: `[batch, seq, V]` one-hot rows
    ///
    /// Returns `[batch, seq, V]` logits: at each step, the logits for the
    /// symbol FOLLOWING that step.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, seq_len, width] = input.dims();
        let device = input.device();

        let mut hidden = Tensor::<B, 2>::zeros([batch, self.d_hidden], &device);
        let mut step_logits = Vec::with_capacity(seq_len);

        for t in 0..seq_len {
            let x = input
                .clone()
                .slice([0..batch, t..t + 1, 0..width])
                .squeeze_dim::<2>(1); // [batch, V]

            let update = activation::sigmoid(
                self.update_x.forward(x.clone()) + self.update_h.forward(hidden.clone()),
            );
            let reset = activation::sigmoid(
                self.reset_x.forward(x.clone()) + self.reset_h.forward(hidden.clone()),
            );
            let candidate = activation::tanh(
                self.candidate_x.forward(x)
                    + self.candidate_h.forward(reset * hidden.clone()),
            );
            hidden = hidden.clone() + update * (candidate - hidden);

            let logits_t = self.output_proj.forward(hidden.clone());
            step_logits.push(logits_t.unsqueeze_dim::<3>(1)); // [batch, 1, V]
        }

        Tensor::cat(step_logits, 1) // [batch, seq, V]
    }
}

// ─── Tests ────────────────────────────────────────────────────────
