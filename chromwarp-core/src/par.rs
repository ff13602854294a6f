/// Parallel map: apply `$f` to each element of `$slice`, collecting into a Vec.
macro_rules! par_map {
    ($slice:expr, $f:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
            $slice.par_iter().map($f).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter().map($f).collect()
        }
    }};
}

/// Parallel fallible mutable map: apply `$f` returning Result to each element
/// in place, collecting into Result<Vec>. Short-circuits on the first error.
macro_rules! par_try_map_mut {
    ($slice:expr, $f:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
            $slice.par_iter_mut().map($f).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter_mut().map($f).collect()
        }
    }};
}
