//! Weighted categorical sampling.
//!
//! Both of the generator's fixed distributions, message kinds and object
//! types, are expressed as ordered `(label, weight)` tables and drawn from by
//! the one function in this module.

use rand::Rng;

/// Select one entry from an ordered table of `(label, weight)` pairs.
///
/// Selection is inverse-CDF: a uniform `r` is drawn from `[0, 1)`, weights
/// are accumulated in table order and the first entry whose cumulative weight
/// reaches `r` wins. The final entry is the fallback when rounding keeps the
/// accumulated sum below `r`. Tables are expected to have weights summing to
/// 1.0; a table that sums short simply shifts probability mass onto its last
/// entry.
///
/// # Panics
///
/// Panics if `table` is empty.
pub fn choose<'a, T, R>(rng: &mut R, table: &'a [(T, f64)]) -> &'a T
where
    R: Rng + ?Sized,
{
    let r: f64 = rng.random();
    let mut cumulative = 0.0;
    for (label, weight) in table {
        cumulative += *weight;
        if r <= cumulative {
            return label;
        }
    }
    let (label, _weight) = table.last().expect("table must not be empty");
    label
}
