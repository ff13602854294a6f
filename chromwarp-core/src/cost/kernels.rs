#[cfg(feature = "simd")]
use wide::f64x4;

#[cfg(feature = "simd")]
const LANES: usize = 4;

#[cfg(feature = "simd")]
#[inline]
fn load(chunk: &[f64]) -> f64x4 {
    f64x4::from([chunk[0], chunk[1], chunk[2], chunk[3]])
}

#[cfg(feature = "simd")]
#[inline]
fn horizontal_sum(v: f64x4) -> f64 {
    let arr = v.to_array();
    (arr[0] + arr[1]) + (arr[2] + arr[3])
}

#[cfg(feature = "simd")]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = f64x4::splat(0.0);
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let tail: f64 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();
    for (ca, cb) in a_chunks.zip(b_chunks) {
        acc = acc + load(ca) * load(cb);
    }
    horizontal_sum(acc) + tail
}

#[cfg(feature = "simd")]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = f64x4::splat(0.0);
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let tail: f64 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    for (ca, cb) in a_chunks.zip(b_chunks) {
        let d = load(ca) - load(cb);
        acc = acc + d * d;
    }
    horizontal_sum(acc) + tail
}

#[cfg(not(feature = "simd"))]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(not(feature = "simd"))]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub fn mean(a: &[f64]) -> f64 {
    if a.is_empty() {
        0.0
    } else {
        a.iter().sum::<f64>() / a.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn dot_matches_scalar_with_tail() {
        let a: Vec<f64> = (0..11).map(|k| k as f64 * 0.5).collect();
        let b: Vec<f64> = (0..11).map(|k| 3.0 - k as f64).collect();
        assert!((dot(&a, &b) - scalar_dot(&a, &b)).abs() < 1e-9);
    }

    #[test]
    fn squared_distance_known() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [1.0, 0.0, 3.0, 0.0, 7.0];
        assert_eq!(squared_distance(&a, &b), 4.0 + 16.0 + 4.0);
        assert_eq!(squared_distance(&a, &a), 0.0);
    }

    #[test]
    fn empty_vectors() {
        assert_eq!(dot(&[], &[]), 0.0);
        assert_eq!(squared_distance(&[], &[]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }
}
