//! Small feedforward network: 3 inputs → 6 hidden (tanh) → 1 output (sigmoid).
//!
//! Inputs:  bird height, distance to gap top, distance to gap bottom
//! Output:  jump probability, compared against [`crate::policy::JUMP_THRESHOLD`]

use rand::Rng;

use crate::error::PolicyError;
use crate::policy::{Policy, INPUT_SIZE};

const HIDDEN_SIZE: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct FeedForward {
    // input→hidden (3×6) + hidden bias (6) + hidden→output (6) + output bias (1) = 31
    pub w_ih: [[f32; HIDDEN_SIZE]; INPUT_SIZE],
    pub b_h: [f32; HIDDEN_SIZE],
    pub w_ho: [f32; HIDDEN_SIZE],
    pub b_o: f32,
}

impl FeedForward {
    pub const WEIGHT_COUNT: usize = INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE + HIDDEN_SIZE + 1;

    /// Build a network from a flat weight sequence, or `None` if it runs short.
    pub fn from_weights(weights: impl IntoIterator<Item = f32>) -> Option<Self> {
        let mut weights = weights.into_iter();

        let mut w_ih = [[0.0f32; HIDDEN_SIZE]; INPUT_SIZE];
        for row in &mut w_ih {
            for w in row.iter_mut() {
                *w = weights.next()?;
            }
        }

        let mut b_h = [0.0f32; HIDDEN_SIZE];
        for b in &mut b_h {
            *b = weights.next()?;
        }

        let mut w_ho = [0.0f32; HIDDEN_SIZE];
        for w in &mut w_ho {
            *w = weights.next()?;
        }

        let b_o = weights.next()?;

        Some(Self {
            w_ih,
            b_h,
            w_ho,
            b_o,
        })
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let weights: Vec<f32> = (0..Self::WEIGHT_COUNT)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();
        Self::from_weights(weights).unwrap_or_else(Self::zeroed)
    }

    pub fn zeroed() -> Self {
        Self {
            w_ih: [[0.0; HIDDEN_SIZE]; INPUT_SIZE],
            b_h: [0.0; HIDDEN_SIZE],
            w_ho: [0.0; HIDDEN_SIZE],
            b_o: 0.0,
        }
    }

    /// Flatten parameters in the order `from_weights` expects.
    pub fn to_weight_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(Self::WEIGHT_COUNT);
        for row in &self.w_ih {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.b_h);
        out.extend_from_slice(&self.w_ho);
        out.push(self.b_o);
        out
    }

    pub fn forward(&self, input: &[f32; INPUT_SIZE]) -> f32 {
        let mut hidden = self.b_h;
        for (i, &x) in input.iter().enumerate() {
            for (j, h) in hidden.iter_mut().enumerate() {
                *h += x * self.w_ih[i][j];
            }
        }
        for h in &mut hidden {
            *h = h.tanh();
        }

        let output = hidden
            .iter()
            .zip(self.w_ho.iter())
            .fold(self.b_o, |acc, (h, w)| acc + h * w);
        sigmoid(output)
    }

    /// Copy with each weight perturbed with probability `rate` by N(0, sigma).
    pub fn mutate<R: Rng + ?Sized>(&self, rng: &mut R, rate: f64, sigma: f32) -> Self {
        let weights = self.to_weight_vec().into_iter().map(|w| {
            if rng.gen_bool(rate.clamp(0.0, 1.0)) {
                w + gaussian(rng) * sigma
            } else {
                w
            }
        });
        // the iterator yields exactly WEIGHT_COUNT values
        Self::from_weights(weights.collect::<Vec<_>>()).unwrap_or_else(|| self.clone())
    }
}

impl Policy for FeedForward {
    fn decide(&self, inputs: &[f32; INPUT_SIZE]) -> Result<f32, PolicyError> {
        Ok(self.forward(inputs))
    }
}

fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

/// Standard normal sample via Box-Muller
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u1 = rng.gen::<f32>().clamp(f32::MIN_POSITIVE, 1.0);
    let u2 = rng.gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}
