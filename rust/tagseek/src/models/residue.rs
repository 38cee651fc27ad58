use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::ConfigError;

/// Rescaling applied before rounding a mass to its nominal (integer) value.
///
/// Shrinks the accumulated mass defect so residue masses land on the
/// integer they are commonly known by.
pub const NOMINAL_MASS_RESCALING: f64 = 0.9995;

/// Rounds a mass gap to its single byte nominal mass.
///
/// This is the only rounding rule used for edges and tag signatures.
///
/// ```
/// use tagseek::models::residue::nominal_mass;
///
/// assert_eq!(nominal_mass(57.021464), 57);
/// assert_eq!(nominal_mass(186.079313), 186);
/// ```
pub fn nominal_mass(mass: f64) -> u8 {
    (mass * NOMINAL_MASS_RESCALING).round().clamp(0.0, u8::MAX as f64) as u8
}

fn fits_nominal(mass: f64) -> bool {
    (mass * NOMINAL_MASS_RESCALING).round() <= u8::MAX as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Residue {
    pub symbol: char,
    /// Monoisotopic residue mass in daltons.
    pub mass: f64,
}

const STANDARD_RESIDUES: [(char, f64); 20] = [
    ('G', 57.021464),
    ('A', 71.037114),
    ('S', 87.032028),
    ('P', 97.052764),
    ('V', 99.068414),
    ('T', 101.047679),
    ('C', 103.009185),
    ('L', 113.084064),
    ('I', 113.084064),
    ('N', 114.042927),
    ('D', 115.026943),
    ('Q', 128.058578),
    ('K', 128.094963),
    ('E', 129.042593),
    ('M', 131.040485),
    ('H', 137.058912),
    ('F', 147.068414),
    ('R', 156.101111),
    ('Y', 163.063329),
    ('W', 186.079313),
];

/// Residue masses that mass gaps are matched against.
///
/// Residues are kept sorted by mass so lookups only scan the residues that
/// can possibly fall within tolerance.
///
/// ```
/// use tagseek::ResidueTable;
///
/// let table = ResidueTable::standard();
/// assert_eq!(table.len(), 20);
/// assert_eq!(table.min_mass(), 57.021464);
/// assert_eq!(table.max_mass(), 186.079313);
///
/// let hits: Vec<char> = table.matching(128.06, 0.01).map(|r| r.symbol).collect();
/// assert_eq!(hits, vec!['Q']);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueTable {
    residues: Vec<Residue>,
    min_mass: f64,
    max_mass: f64,
}

impl ResidueTable {
    /// The 20 canonical amino acids. Leucine and isoleucine are both present.
    pub fn standard() -> Self {
        let residues = STANDARD_RESIDUES
            .iter()
            .map(|&(symbol, mass)| Residue { symbol, mass })
            .collect();
        Self::from_sorted_unchecked(residues)
    }

    /// Builds a table from arbitrary residues, validating them.
    pub fn try_new(mut residues: Vec<Residue>) -> Result<Self, ConfigError> {
        if residues.is_empty() {
            return Err(ConfigError::EmptyResidueTable);
        }
        for (i, r) in residues.iter().enumerate() {
            if !r.mass.is_finite() || r.mass <= 0.0 {
                return Err(ConfigError::InvalidResidueMass {
                    symbol: r.symbol,
                    mass: r.mass,
                });
            }
            if !fits_nominal(r.mass) {
                return Err(ConfigError::NominalMassOverflow {
                    symbol: r.symbol,
                    mass: r.mass,
                });
            }
            if residues[..i].iter().any(|other| other.symbol == r.symbol) {
                return Err(ConfigError::DuplicateResidue(r.symbol));
            }
        }
        residues.sort_by(|a, b| a.mass.total_cmp(&b.mass));
        Ok(Self::from_sorted_unchecked(residues))
    }

    /// Standard table extended with custom (e.g. modified) residues.
    pub fn with_custom_residues(
        self,
        custom: impl IntoIterator<Item = Residue>,
    ) -> Result<Self, ConfigError> {
        let mut residues = self.residues;
        residues.extend(custom);
        Self::try_new(residues)
    }

    fn from_sorted_unchecked(residues: Vec<Residue>) -> Self {
        let min_mass = residues.first().map_or(0.0, |r| r.mass);
        let max_mass = residues.last().map_or(0.0, |r| r.mass);
        Self {
            residues,
            min_mass,
            max_mass,
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn min_mass(&self) -> f64 {
        self.min_mass
    }

    pub fn max_mass(&self) -> f64 {
        self.max_mass
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Residue> {
        self.residues.iter()
    }

    pub fn get(&self, symbol: char) -> Option<&Residue> {
        self.residues.iter().find(|r| r.symbol == symbol)
    }

    /// Residues whose mass lies within `tolerance` of `mass`.
    pub fn matching(&self, mass: f64, tolerance: f64) -> impl Iterator<Item = &Residue> + '_ {
        let start = self
            .residues
            .partition_point(|r| r.mass < mass - tolerance);
        self.residues[start..]
            .iter()
            .take_while(move |r| r.mass <= mass + tolerance)
    }
}

impl Default for ResidueTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_sorted() {
        let table = ResidueTable::standard();
        let masses: Vec<f64> = table.iter().map(|r| r.mass).collect();
        let mut sorted = masses.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(masses, sorted);
    }

    #[test]
    fn test_isobaric_matches() {
        let table = ResidueTable::standard();
        let mut hits: Vec<char> = table.matching(113.084, 0.01).map(|r| r.symbol).collect();
        hits.sort();
        assert_eq!(hits, vec!['I', 'L']);
    }

    #[test]
    fn test_custom_residue() {
        let table = ResidueTable::standard()
            .with_custom_residues([Residue {
                symbol: 'm',
                mass: 147.035400,
            }])
            .unwrap();
        assert_eq!(table.len(), 21);
        let hits: Vec<char> = table.matching(147.0354, 0.005).map(|r| r.symbol).collect();
        assert_eq!(hits, vec!['m']);
    }

    #[test]
    fn test_invalid_tables() {
        assert_eq!(
            ResidueTable::try_new(vec![]),
            Err(ConfigError::EmptyResidueTable)
        );
        let dup = ResidueTable::standard().with_custom_residues([Residue {
            symbol: 'A',
            mass: 80.0,
        }]);
        assert_eq!(dup, Err(ConfigError::DuplicateResidue('A')));
        let big = ResidueTable::try_new(vec![Residue {
            symbol: 'X',
            mass: 400.0,
        }]);
        assert!(matches!(big, Err(ConfigError::NominalMassOverflow { .. })));
        let neg = ResidueTable::try_new(vec![Residue {
            symbol: 'X',
            mass: -1.0,
        }]);
        assert!(matches!(neg, Err(ConfigError::InvalidResidueMass { .. })));
    }

    #[test]
    fn test_nominal_mass() {
        for r in ResidueTable::standard().iter() {
            let nominal = nominal_mass(r.mass);
            assert!((nominal as f64 - r.mass).abs() < 1.0, "{:?}", r);
        }
        assert_eq!(nominal_mass(1000.0), 255);
    }
}
