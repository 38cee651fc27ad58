use serde::{
    Deserialize,
    Serialize,
};
use tracing::warn;

use crate::errors::DataProcessingError;

/// A single deconvoluted peak.
///
/// `mass` is the neutral monoisotopic mass and `index` is the position of the
/// peak in the mass-sorted list, which doubles as its vertex id in the
/// mass-gap graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mass: f64,
    pub intensity: f64,
    pub index: usize,
}

/// Peaks of one spectrum, sorted ascending by mass.
///
/// Example:
/// ```
/// use tagseek::PeakList;
///
/// let peaks = PeakList::try_new(vec![(100.0, 10.0), (171.037, 5.0)]).unwrap();
/// assert_eq!(peaks.len(), 2);
/// assert_eq!(peaks[1].index, 1);
///
/// let peaks = PeakList::from_unsorted(vec![(171.037, 5.0), (100.0, 10.0), (f64::NAN, 1.0)]);
/// assert_eq!(peaks.len(), 2);
/// assert_eq!(peaks[0].mass, 100.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakList {
    peaks: Vec<Peak>,
}

fn is_valid_peak(mass: f64, intensity: f64) -> bool {
    mass.is_finite() && intensity.is_finite() && mass > 0.0 && intensity >= 0.0
}

impl PeakList {
    /// Builds a peak list from `(mass, intensity)` pairs that are already
    /// sorted by mass.
    ///
    /// Non-finite values, non-positive masses, negative intensities and
    /// out-of-order masses are rejected.
    pub fn try_new(pairs: Vec<(f64, f64)>) -> Result<Self, DataProcessingError> {
        let mut peaks = Vec::with_capacity(pairs.len());
        let mut last_mass = f64::NEG_INFINITY;
        for (index, (mass, intensity)) in pairs.into_iter().enumerate() {
            if !is_valid_peak(mass, intensity) {
                return Err(DataProcessingError::ExpectedFiniteNonNanData {
                    context: format!(
                        "peak {} has mass={} intensity={}",
                        index, mass, intensity
                    ),
                });
            }
            if mass < last_mass {
                return Err(DataProcessingError::ExpectedSortedData {
                    context: format!(
                        "peak {} with mass {} comes after mass {}",
                        index, mass, last_mass
                    ),
                });
            }
            last_mass = mass;
            peaks.push(Peak {
                mass,
                intensity,
                index,
            });
        }
        Ok(Self { peaks })
    }

    /// Builds a peak list from arbitrary `(mass, intensity)` pairs.
    ///
    /// Invalid entries are dropped (with a warning) and the rest sorted by
    /// mass before indices are assigned.
    pub fn from_unsorted(pairs: Vec<(f64, f64)>) -> Self {
        let total = pairs.len();
        let mut valid: Vec<(f64, f64)> = pairs
            .into_iter()
            .filter(|(m, i)| is_valid_peak(*m, *i))
            .collect();
        if valid.len() != total {
            warn!(
                "Dropped {} of {} peaks with invalid mass or intensity",
                total - valid.len(),
                total
            );
        }
        valid.sort_by(|a, b| a.0.total_cmp(&b.0));

        let peaks = valid
            .into_iter()
            .enumerate()
            .map(|(index, (mass, intensity))| Peak {
                mass,
                intensity,
                index,
            })
            .collect();
        Self { peaks }
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn as_slice(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Peak> {
        self.peaks.iter()
    }

    /// Index range `[start, end)` of the peaks with `min_mass <= mass <= max_mass`.
    pub fn index_range(&self, min_mass: f64, max_mass: f64) -> std::ops::Range<usize> {
        let start = self.peaks.partition_point(|p| p.mass < min_mass);
        let end = self.peaks.partition_point(|p| p.mass <= max_mass);
        start..end.max(start)
    }
}

impl std::ops::Index<usize> for PeakList {
    type Output = Peak;

    fn index(&self, index: usize) -> &Self::Output {
        &self.peaks[index]
    }
}

impl<'a> IntoIterator for &'a PeakList {
    type Item = &'a Peak;
    type IntoIter = std::slice::Iter<'a, Peak>;

    fn into_iter(self) -> Self::IntoIter {
        self.peaks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_unsorted() {
        let out = PeakList::try_new(vec![(200.0, 1.0), (100.0, 1.0)]);
        assert!(matches!(
            out,
            Err(DataProcessingError::ExpectedSortedData { .. })
        ));
    }

    #[test]
    fn test_try_new_rejects_non_finite() {
        let out = PeakList::try_new(vec![(100.0, f64::INFINITY)]);
        assert!(matches!(
            out,
            Err(DataProcessingError::ExpectedFiniteNonNanData { .. })
        ));
        let out = PeakList::try_new(vec![(-1.0, 1.0)]);
        assert!(out.is_err());
    }

    #[test]
    fn test_empty_is_valid() {
        let peaks = PeakList::try_new(vec![]).unwrap();
        assert!(peaks.is_empty());
        assert_eq!(peaks.index_range(0.0, 1000.0), 0..0);
    }

    #[test]
    fn test_from_unsorted_reindexes() {
        let peaks = PeakList::from_unsorted(vec![(300.0, 1.0), (100.0, 2.0), (200.0, 3.0)]);
        let masses: Vec<f64> = peaks.iter().map(|p| p.mass).collect();
        assert_eq!(masses, vec![100.0, 200.0, 300.0]);
        for (i, p) in peaks.iter().enumerate() {
            assert_eq!(p.index, i);
        }
        assert_eq!(peaks[2].intensity, 1.0);
    }

    #[test]
    fn test_index_range() {
        let peaks =
            PeakList::try_new(vec![(100.0, 1.0), (150.0, 1.0), (200.0, 1.0), (250.0, 1.0)])
                .unwrap();
        assert_eq!(peaks.index_range(150.0, 200.0), 1..3);
        assert_eq!(peaks.index_range(120.0, 130.0), 1..1);
        assert_eq!(peaks.index_range(0.0, 1000.0), 0..4);
    }
}
