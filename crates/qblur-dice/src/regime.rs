//! Correlation regimes and their joint-outcome tables
//!
//! Each regime is a fixed list of `(first, second)` face pairs. Drawing a row
//! uniformly from the list gives the joint distribution of the regime:
//!
//! | regime                  | code | rows | rule            |
//! |-------------------------|------|------|-----------------|
//! | Independent             | 0    | 36   | any `(i, j)`    |
//! | Symmetric               | 1    | 21   | `i <= j`        |
//! | Antisymmetric           | 2    | 15   | `i < j`         |
//! | SymmetricEntangled      | 3    | 6    | `i == j`        |
//! | AntisymmetricEntangled  | 4    | 3    | `i + j == 7`    |
//!
//! Forbidden pairs are simply absent from a table; nothing filters at draw
//! time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Face pair `(first die, second die)`
pub type FacePair = (u8, u8);

#[rustfmt::skip]
const INDEPENDENT: [FacePair; 36] = [
    (1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 6),
    (2, 1), (2, 2), (2, 3), (2, 4), (2, 5), (2, 6),
    (3, 1), (3, 2), (3, 3), (3, 4), (3, 5), (3, 6),
    (4, 1), (4, 2), (4, 3), (4, 4), (4, 5), (4, 6),
    (5, 1), (5, 2), (5, 3), (5, 4), (5, 5), (5, 6),
    (6, 1), (6, 2), (6, 3), (6, 4), (6, 5), (6, 6),
];

#[rustfmt::skip]
const SYMMETRIC: [FacePair; 21] = [
    (1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 6),
            (2, 2), (2, 3), (2, 4), (2, 5), (2, 6),
                    (3, 3), (3, 4), (3, 5), (3, 6),
                            (4, 4), (4, 5), (4, 6),
                                    (5, 5), (5, 6),
                                            (6, 6),
];

#[rustfmt::skip]
const ANTISYMMETRIC: [FacePair; 15] = [
    (1, 2), (1, 3), (1, 4), (1, 5), (1, 6),
            (2, 3), (2, 4), (2, 5), (2, 6),
                    (3, 4), (3, 5), (3, 6),
                            (4, 5), (4, 6),
                                    (5, 6),
];

const SYMMETRIC_ENTANGLED: [FacePair; 6] = [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)];

const ANTISYMMETRIC_ENTANGLED: [FacePair; 3] = [(1, 6), (2, 5), (3, 4)];

/// How the two dice of a roll are correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CorrelationRegime {
    /// Two independent dice ("classical")
    #[default]
    Independent = 0,
    /// Unordered pairs with repetition ("bosonic")
    Symmetric = 1,
    /// Unordered pairs without repetition ("fermionic")
    Antisymmetric = 2,
    /// Both dice always equal
    SymmetricEntangled = 3,
    /// Faces always sum to seven
    AntisymmetricEntangled = 4,
}

impl CorrelationRegime {
    pub const ALL: [CorrelationRegime; 5] = [
        CorrelationRegime::Independent,
        CorrelationRegime::Symmetric,
        CorrelationRegime::Antisymmetric,
        CorrelationRegime::SymmetricEntangled,
        CorrelationRegime::AntisymmetricEntangled,
    ];

    /// Stable numeric code
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|regime| regime.code() == code)
            .ok_or_else(|| Error::InvalidRegime(format!("unknown regime code {}", code)))
    }

    /// Joint-outcome table of this regime
    pub fn table(self) -> &'static [FacePair] {
        match self {
            CorrelationRegime::Independent => &INDEPENDENT,
            CorrelationRegime::Symmetric => &SYMMETRIC,
            CorrelationRegime::Antisymmetric => &ANTISYMMETRIC,
            CorrelationRegime::SymmetricEntangled => &SYMMETRIC_ENTANGLED,
            CorrelationRegime::AntisymmetricEntangled => &ANTISYMMETRIC_ENTANGLED,
        }
    }

    /// True when the dice are forced onto a drawn pair
    pub fn is_correlated(self) -> bool {
        self != CorrelationRegime::Independent
    }

    pub fn name(self) -> &'static str {
        match self {
            CorrelationRegime::Independent => "independent",
            CorrelationRegime::Symmetric => "symmetric",
            CorrelationRegime::Antisymmetric => "antisymmetric",
            CorrelationRegime::SymmetricEntangled => "symmetric-entangled",
            CorrelationRegime::AntisymmetricEntangled => "antisymmetric-entangled",
        }
    }
}

impl fmt::Display for CorrelationRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorrelationRegime {
    type Err = Error;

    /// Accepts the regime names, the particle names (`classical`, `bosonic`,
    /// `fermionic`, `bosonic-entangled`, `fermionic-entangled`) and numeric
    /// codes. Case, `-` and `_` are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "independent" | "classical" => Ok(CorrelationRegime::Independent),
            "symmetric" | "bosonic" => Ok(CorrelationRegime::Symmetric),
            "antisymmetric" | "fermionic" => Ok(CorrelationRegime::Antisymmetric),
            "symmetricentangled" | "bosonicentangled" => Ok(CorrelationRegime::SymmetricEntangled),
            "antisymmetricentangled" | "fermionicentangled" => Ok(CorrelationRegime::AntisymmetricEntangled),
            other => match other.parse::<u8>() {
                Ok(code) => Self::from_code(code),
                Err(_) => Err(Error::InvalidRegime(s.to_string())),
            },
        }
    }
}
