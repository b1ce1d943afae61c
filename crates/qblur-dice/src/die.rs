//! Die collaborator interface
//!
//! The sampler never simulates motion itself. It asks each die whether it is
//! still rolling, commands a face, and reads back what the die shows. A
//! physics engine implements [`Die`] for its rigid bodies; [`VirtualDie`] is
//! a deterministic stand-in for tests and headless runs.

use rand::Rng;

use crate::error::{Error, Result};

/// Number of faces on a die
pub const FACES: u8 = 6;

/// Check that `face` is in `1..=6`.
pub fn check_face(face: u8) -> Result<u8> {
    if (1..=FACES).contains(&face) {
        Ok(face)
    } else {
        Err(Error::InvalidFace(face))
    }
}

/// A die the sampler can steer.
pub trait Die {
    /// Still in motion
    fn is_rolling(&self) -> bool;

    /// Command `face` to point up. Returns whether the die accepted it.
    fn set_face(&mut self, face: u8) -> bool;

    /// Face currently showing, if the die has one
    fn face(&self) -> Option<u8>;
}

impl<D: Die + ?Sized> Die for Box<D> {
    fn is_rolling(&self) -> bool {
        (**self).is_rolling()
    }

    fn set_face(&mut self, face: u8) -> bool {
        (**self).set_face(face)
    }

    fn face(&self) -> Option<u8> {
        (**self).face()
    }
}

/// In-memory die that comes to rest after a fixed number of steps.
///
/// Commanded faces can be shown with a delay of a few steps, which is how a
/// physics engine behaves when the body has to be re-oriented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDie {
    face: Option<u8>,
    settle_steps: u32,
    remaining_steps: u32,
    display_lag: u32,
    pending: Option<(u8, u32)>,
}

impl VirtualDie {
    /// Die at rest with no face yet, settling `settle_steps` steps after each
    /// throw.
    pub fn new(settle_steps: u32) -> Self {
        Self {
            face: None,
            settle_steps,
            remaining_steps: 0,
            display_lag: 0,
            pending: None,
        }
    }

    /// Die at rest showing `face`
    pub fn showing(face: u8) -> Result<Self> {
        let mut die = Self::new(0);
        die.face = Some(check_face(face)?);
        Ok(die)
    }

    /// Delay commanded faces by `steps` steps.
    pub fn with_display_lag(mut self, steps: u32) -> Self {
        self.display_lag = steps;
        self
    }

    /// Throw the die. It tumbles for `settle_steps` steps and shows a random
    /// face unless a face is commanded.
    pub fn throw<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.face = Some(rng.gen_range(1..=FACES));
        self.remaining_steps = self.settle_steps;
        self.pending = None;
    }

    /// Advance the simulation by one step.
    pub fn step(&mut self) {
        self.remaining_steps = self.remaining_steps.saturating_sub(1);
        if let Some((face, lag)) = self.pending {
            if lag <= 1 {
                self.face = Some(face);
                self.pending = None;
            } else {
                self.pending = Some((face, lag - 1));
            }
        }
    }

    /// Run until at rest with every commanded face shown.
    pub fn settle(&mut self) {
        while self.remaining_steps > 0 || self.pending.is_some() {
            self.step();
        }
    }
}

impl Die for VirtualDie {
    fn is_rolling(&self) -> bool {
        self.remaining_steps > 0
    }

    fn set_face(&mut self, face: u8) -> bool {
        if check_face(face).is_err() {
            return false;
        }
        if self.display_lag == 0 {
            self.face = Some(face);
        } else {
            self.pending = Some((face, self.display_lag));
        }
        true
    }

    fn face(&self) -> Option<u8> {
        self.face
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_throw_rolls_then_settles() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut die = VirtualDie::new(3);
        assert!(!die.is_rolling());

        die.throw(&mut rng);
        assert!(die.is_rolling());
        assert!(die.face().is_some_and(|f| (1..=6).contains(&f)));
        die.step();
        die.step();
        assert!(die.is_rolling());
        die.step();
        assert!(!die.is_rolling());
    }

    #[test]
    fn test_set_face_validates() {
        let mut die = VirtualDie::showing(2).unwrap();
        assert!(!die.set_face(0));
        assert!(!die.set_face(7));
        assert_eq!(die.face(), Some(2));
        assert!(die.set_face(5));
        assert_eq!(die.face(), Some(5));
        assert!(matches!(VirtualDie::showing(9), Err(Error::InvalidFace(9))));
    }

    #[test]
    fn test_display_lag_delays_commanded_face() {
        let mut die = VirtualDie::showing(1).unwrap().with_display_lag(2);
        assert!(die.set_face(4));
        assert_eq!(die.face(), Some(1));
        die.step();
        assert_eq!(die.face(), Some(1));
        die.step();
        assert_eq!(die.face(), Some(4));
    }

    #[test]
    fn test_boxed_dice_forward() {
        let mut dice: Vec<Box<dyn Die>> = vec![Box::new(VirtualDie::showing(3).unwrap())];
        assert!(dice[0].set_face(6));
        assert_eq!(dice[0].face(), Some(6));
        assert!(!dice[0].is_rolling());
    }
}
