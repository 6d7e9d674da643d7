//! The decision capability birds are controlled through.

use std::cell::Cell;
use std::rc::Rc;

use crate::bird::Bird;
use crate::error::PolicyError;
use crate::pillar::Pillar;

pub const INPUT_SIZE: usize = 3;

/// Outputs above this trigger a jump
pub const JUMP_THRESHOLD: f32 = 0.5;

/// Anything that maps an observation to a scalar in `[0, 1]`.
///
/// Evaluation must be total and return in bounded time: the simulation has no
/// per-tick timeout.
pub trait Policy {
    fn decide(&self, inputs: &[f32; INPUT_SIZE]) -> Result<f32, PolicyError>;
}

/// Adapter turning an infallible closure into a [`Policy`]
#[derive(Debug, Clone, Copy)]
pub struct FnPolicy<F>(F);

pub fn from_fn<F>(f: F) -> FnPolicy<F>
where
    F: Fn(&[f32; INPUT_SIZE]) -> f32,
{
    FnPolicy(f)
}

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&[f32; INPUT_SIZE]) -> f32,
{
    fn decide(&self, inputs: &[f32; INPUT_SIZE]) -> Result<f32, PolicyError> {
        Ok((self.0)(inputs))
    }
}

impl<P: Policy + ?Sized> Policy for &P {
    fn decide(&self, inputs: &[f32; INPUT_SIZE]) -> Result<f32, PolicyError> {
        (**self).decide(inputs)
    }
}

impl Policy for Box<dyn Policy> {
    fn decide(&self, inputs: &[f32; INPUT_SIZE]) -> Result<f32, PolicyError> {
        (**self).decide(inputs)
    }
}

/// What a bird sees of the active pillar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub bird_y: f32,
    pub to_gap_top: f32,
    pub to_gap_bottom: f32,
}

impl Observation {
    pub fn new(bird: &Bird, pillar: &Pillar) -> Self {
        Self {
            bird_y: bird.y,
            to_gap_top: (pillar.gap_top() - bird.y).abs(),
            to_gap_bottom: (pillar.gap_bottom() - bird.y).abs(),
        }
    }

    pub fn inputs(&self) -> [f32; INPUT_SIZE] {
        [self.bird_y, self.to_gap_top, self.to_gap_bottom]
    }
}

/// Ask `policy` whether to jump, rejecting outputs that are not a usable probability.
pub fn decide_jump<P: Policy + ?Sized>(
    policy: &P,
    observation: &Observation,
) -> Result<bool, PolicyError> {
    let output = policy.decide(&observation.inputs())?;
    if !output.is_finite() {
        return Err(PolicyError::NonFinite(output));
    }
    if !(0.0..=1.0).contains(&output) {
        return Err(PolicyError::OutOfRange(output));
    }
    Ok(output > JUMP_THRESHOLD)
}

/// Debug control: jumps once each time [`ManualTrigger::press`] is called.
#[derive(Debug, Clone)]
pub struct ManualPolicy {
    pending: Rc<Cell<bool>>,
}

/// Handle kept by whoever drives a [`ManualPolicy`]
#[derive(Debug, Clone)]
pub struct ManualTrigger {
    pending: Rc<Cell<bool>>,
}

impl ManualPolicy {
    pub fn new() -> (Self, ManualTrigger) {
        let pending = Rc::new(Cell::new(false));
        (
            Self {
                pending: Rc::clone(&pending),
            },
            ManualTrigger { pending },
        )
    }
}

impl ManualTrigger {
    pub fn press(&self) {
        self.pending.set(true);
    }
}

impl Policy for ManualPolicy {
    fn decide(&self, _inputs: &[f32; INPUT_SIZE]) -> Result<f32, PolicyError> {
        Ok(if self.pending.replace(false) { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BirdConfig;

    fn observation() -> Observation {
        let bird = Bird::new(BirdConfig::default()).with_y(0.5);
        let pillar = Pillar::new(1.0, 0.2, 0.18).with_gap_center(0.6);
        Observation::new(&bird, &pillar)
    }

    #[test]
    fn test_observation_layout() {
        let inputs = observation().inputs();
        assert_eq!(inputs[0], 0.5);
        assert!((inputs[1] - 0.2).abs() < 1e-6);
        assert!((inputs[2] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_observation_distances_are_absolute() {
        let bird = Bird::new(BirdConfig::default()).with_y(0.9);
        let pillar = Pillar::new(1.0, 0.2, 0.18).with_gap_center(0.3);
        let inputs = Observation::new(&bird, &pillar).inputs();
        assert!(inputs.iter().all(|v| *v >= 0.0));
        assert!((inputs[2] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_is_strict() {
        let at_threshold = from_fn(|_| 0.5);
        let above = from_fn(|_| 0.51);
        assert_eq!(decide_jump(&at_threshold, &observation()), Ok(false));
        assert_eq!(decide_jump(&above, &observation()), Ok(true));
    }

    #[test]
    fn test_rejects_nan_and_out_of_range() {
        let nan = from_fn(|_| f32::NAN);
        let large = from_fn(|_| 3.0);
        assert!(matches!(
            decide_jump(&nan, &observation()),
            Err(PolicyError::NonFinite(_))
        ));
        assert_eq!(
            decide_jump(&large, &observation()),
            Err(PolicyError::OutOfRange(3.0))
        );
    }

    #[test]
    fn test_boxed_policy_delegates() {
        let policy: Box<dyn Policy> = Box::new(from_fn(|inputs| inputs[0]));
        assert_eq!(policy.decide(&[0.25, 0.0, 0.0]), Ok(0.25));
    }

    #[test]
    fn test_borrowed_policy_delegates() {
        let owned = from_fn(|inputs| inputs[1]);
        let borrowed: &dyn Policy = &owned;
        assert_eq!(Policy::decide(&borrowed, &[0.0, 0.75, 0.0]), Ok(0.75));
        assert_eq!(decide_jump(&&owned, &observation()), Ok(false));
    }

    #[test]
    fn test_manual_policy_jumps_once_per_press() {
        let (policy, trigger) = ManualPolicy::new();
        assert_eq!(decide_jump(&policy, &observation()), Ok(false));
        trigger.press();
        assert_eq!(decide_jump(&policy, &observation()), Ok(true));
        assert_eq!(decide_jump(&policy, &observation()), Ok(false));
    }
}
