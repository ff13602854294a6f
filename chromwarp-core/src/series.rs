use crate::error::{WarpError, WarpResult};

/// Half-open m/z interval `[min, max)` used to bin centroided scans.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassRange {
    pub min: f64,
    pub max: f64,
}

impl MassRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn bins(&self, bin_width: f64) -> WarpResult<usize> {
        let valid = self.min.is_finite()
            && self.max.is_finite()
            && self.max > self.min
            && bin_width.is_finite()
            && bin_width > 0.0;
        if !valid {
            return Err(WarpError::InvalidMassRange {
                min: self.min,
                max: self.max,
                bin_width,
            });
        }
        Ok(((self.max - self.min) / bin_width).ceil() as usize)
    }
}

/// Ordered scan profiles with their acquisition times, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSeries {
    times: Vec<f64>,
    data: Vec<f64>,
    dim: usize,
}

impl FeatureSeries {
    pub fn new(times: Vec<f64>, features: Vec<Vec<f64>>) -> WarpResult<Self> {
        if times.len() != features.len() {
            return Err(WarpError::SeriesLengthMismatch {
                times: times.len(),
                features: features.len(),
            });
        }
        let dim = features.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(dim * features.len());
        for (index, f) in features.iter().enumerate() {
            if f.len() != dim {
                return Err(WarpError::FeatureDimension {
                    index,
                    dim: f.len(),
                    expected: dim,
                });
            }
            data.extend_from_slice(f);
        }
        Ok(Self { times, data, dim })
    }

    pub fn from_flat(times: Vec<f64>, data: Vec<f64>, dim: usize) -> WarpResult<Self> {
        let expected = times.len() * dim;
        if data.len() != expected {
            return Err(WarpError::SeriesLengthMismatch {
                times: times.len(),
                features: if dim == 0 { data.len() } else { data.len() / dim },
            });
        }
        Ok(Self { times, data, dim })
    }

    /// Bins each scan's `(mz, intensity)` peaks into `range.bins(bin_width)`
    /// intensity sums. Peaks outside the range are ignored.
    pub fn from_scans(
        times: Vec<f64>,
        scans: &[Vec<(f64, f64)>],
        range: MassRange,
        bin_width: f64,
    ) -> WarpResult<Self> {
        if times.len() != scans.len() {
            return Err(WarpError::SeriesLengthMismatch {
                times: times.len(),
                features: scans.len(),
            });
        }
        let dim = range.bins(bin_width)?;
        let binned: Vec<Vec<f64>> =
            par_map!(scans, |scan: &Vec<(f64, f64)>| bin_scan(scan, range, bin_width, dim));
        let mut data = Vec::with_capacity(dim * scans.len());
        for row in &binned {
            data.extend_from_slice(row);
        }
        Ok(Self { times, data, dim })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[inline]
    pub fn time(&self, i: usize) -> f64 {
        self.times[i]
    }

    #[inline]
    pub fn feature(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }
}

fn bin_scan(scan: &[(f64, f64)], range: MassRange, bin_width: f64, dim: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; dim];
    for &(mz, intensity) in scan {
        if mz < range.min || mz >= range.max {
            continue;
        }
        let bin = (((mz - range.min) / bin_width).floor() as usize).min(dim - 1);
        out[bin] += intensity;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_flattens_features() {
        let s = FeatureSeries::new(vec![0.0, 1.5], vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.dim(), 2);
        assert_eq!(s.feature(1), &[3.0, 4.0]);
        assert_eq!(s.time(1), 1.5);
    }

    #[test]
    fn new_rejects_ragged_features() {
        let err = FeatureSeries::new(vec![0.0, 1.0], vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            WarpError::FeatureDimension {
                index: 1,
                dim: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn new_rejects_time_length_mismatch() {
        assert!(FeatureSeries::new(vec![0.0], vec![vec![1.0], vec![2.0]]).is_err());
        assert!(FeatureSeries::from_flat(vec![0.0, 1.0], vec![1.0, 2.0, 3.0], 2).is_err());
    }

    #[test]
    fn from_scans_bins_by_mass() {
        let scans = vec![
            vec![(50.2, 1.0), (50.7, 2.0), (52.1, 4.0)],
            vec![(49.0, 8.0), (53.0, 16.0)],
        ];
        let s =
            FeatureSeries::from_scans(vec![0.0, 1.0], &scans, MassRange::new(50.0, 53.0), 1.0)
                .unwrap();
        assert_eq!(s.dim(), 3);
        assert_eq!(s.feature(0), &[3.0, 0.0, 4.0]);
        // 49.0 and 53.0 are outside [50, 53)
        assert_eq!(s.feature(1), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn mass_range_rejects_bad_width() {
        assert!(MassRange::new(50.0, 60.0).bins(0.0).is_err());
        assert!(MassRange::new(60.0, 50.0).bins(1.0).is_err());
    }
}
