//! Craps scoring for finished rolls

use std::fmt;

use crate::die::{check_face, Die};
use crate::error::Result;

/// What a roll means for the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrapsOutcome {
    Win,
    Lose,
    /// Come-out roll established this point
    PointSet(u32),
    /// A point is on and the roll neither hit it nor sevened out
    NoDecision,
}

/// Faces, their total and the outcome of one scored roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollReport {
    pub faces: Vec<u8>,
    pub total: u32,
    pub outcome: CrapsOutcome,
}

impl fmt::Display for RollReport {
    /// `3 + 4 = 7 You win!`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, face) in self.faces.iter().enumerate() {
            if n > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}", face)?;
        }
        write!(f, " = {}", self.total)?;
        match self.outcome {
            CrapsOutcome::Win => f.write_str(" You win!"),
            CrapsOutcome::Lose => f.write_str(" You lose!"),
            CrapsOutcome::PointSet(_) | CrapsOutcome::NoDecision => Ok(()),
        }
    }
}

/// Craps table state: the point, if one is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrapsTable {
    point: Option<u32>,
}

impl CrapsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point(&self) -> Option<u32> {
        self.point
    }

    /// Score a roll given as face values. Zero faces (dice that never
    /// reported) are ignored; any other value outside `1..=6` is rejected
    /// and leaves the point unchanged.
    pub fn score(&mut self, faces: &[u8]) -> Result<RollReport> {
        let faces = faces
            .iter()
            .filter(|&&f| f != 0)
            .map(|&f| check_face(f))
            .collect::<Result<Vec<u8>>>()?;
        let total = faces.iter().map(|&f| u32::from(f)).sum();
        let outcome = self.decide(total);

        tracing::debug!(total, point = ?self.point, outcome = ?outcome, "craps roll scored");
        Ok(RollReport { faces, total, outcome })
    }

    /// Score whatever the dice currently show.
    pub fn score_dice<D: Die>(&mut self, dice: &[D]) -> Result<RollReport> {
        let faces: Vec<u8> = dice.iter().filter_map(Die::face).collect();
        self.score(&faces)
    }

    fn decide(&mut self, total: u32) -> CrapsOutcome {
        match self.point {
            Some(point) if total == point => {
                self.point = None;
                CrapsOutcome::Win
            }
            Some(_) if total == 7 => {
                self.point = None;
                CrapsOutcome::Lose
            }
            Some(_) => CrapsOutcome::NoDecision,
            None => match total {
                7 | 11 => CrapsOutcome::Win,
                2 | 3 | 12 => CrapsOutcome::Lose,
                point => {
                    self.point = Some(point);
                    CrapsOutcome::PointSet(point)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::VirtualDie;
    use crate::error::Error;

    #[test]
    fn test_come_out_rolls() {
        let mut table = CrapsTable::new();
        assert_eq!(table.score(&[3, 4]).unwrap().outcome, CrapsOutcome::Win);
        assert_eq!(table.score(&[5, 6]).unwrap().outcome, CrapsOutcome::Win);
        assert_eq!(table.score(&[1, 1]).unwrap().outcome, CrapsOutcome::Lose);
        assert_eq!(table.score(&[1, 2]).unwrap().outcome, CrapsOutcome::Lose);
        assert_eq!(table.score(&[6, 6]).unwrap().outcome, CrapsOutcome::Lose);
        assert_eq!(table.point(), None);
    }

    #[test]
    fn test_point_then_hit() {
        let mut table = CrapsTable::new();
        assert_eq!(table.score(&[2, 4]).unwrap().outcome, CrapsOutcome::PointSet(6));
        assert_eq!(table.score(&[4, 4]).unwrap().outcome, CrapsOutcome::NoDecision);
        assert_eq!(table.score(&[5, 6]).unwrap().outcome, CrapsOutcome::NoDecision);
        assert_eq!(table.score(&[1, 5]).unwrap().outcome, CrapsOutcome::Win);
        assert_eq!(table.point(), None);
    }

    #[test]
    fn test_point_then_seven_out() {
        let mut table = CrapsTable::new();
        table.score(&[4, 5]).unwrap();
        assert_eq!(table.point(), Some(9));
        assert_eq!(table.score(&[2, 5]).unwrap().outcome, CrapsOutcome::Lose);
        assert_eq!(table.point(), None);
    }

    #[test]
    fn test_report_text() {
        let mut table = CrapsTable::new();
        assert_eq!(table.score(&[3, 4]).unwrap().to_string(), "3 + 4 = 7 You win!");
        assert_eq!(table.score(&[0, 5, 5]).unwrap().to_string(), "5 + 5 = 10");
        assert_eq!(table.score(&[6, 1]).unwrap().to_string(), "6 + 1 = 7 You lose!");
    }

    #[test]
    fn test_rejects_faces_off_the_die() {
        let mut table = CrapsTable::new();
        table.score(&[2, 2]).unwrap();
        assert!(matches!(table.score(&[3, 7]), Err(Error::InvalidFace(7))));
        assert!(matches!(table.score(&[255, 1]), Err(Error::InvalidFace(255))));
        assert_eq!(table.point(), Some(4));
    }

    #[test]
    fn test_many_dice_do_not_overflow_the_total() {
        let report = CrapsTable::new().score(&vec![6u8; 43]).unwrap();
        assert_eq!(report.total, 258);
        assert_eq!(report.outcome, CrapsOutcome::PointSet(258));

        let report = CrapsTable::new().score(&vec![6u8; 1_000]).unwrap();
        assert_eq!(report.total, 6_000);
    }

    #[test]
    fn test_score_dice_reads_faces() {
        let dice = vec![VirtualDie::showing(6).unwrap(), VirtualDie::new(0), VirtualDie::showing(5).unwrap()];
        let report = CrapsTable::new().score_dice(&dice).unwrap();
        assert_eq!(report.faces, vec![6, 5]);
        assert_eq!(report.outcome, CrapsOutcome::Win);
    }
}
