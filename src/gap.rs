//! Splits a sorted list of numbers at its largest jump.
//!
//! Handy when the vertices have been laid out on a line by some other tool
//! (a spectral embedding, say): the two clusters sit on either side of the
//! widest gap.

use itertools::Itertools;

use crate::error::{Error, Result};

/// Index of the first element after the largest increase, or 0 if the
/// values never increase.
pub fn largest_gap(values: &[i64]) -> usize {
    let mut max_delta = 0;
    let mut split = 0;
    for (i, (&prev, &next)) in values.iter().tuple_windows().enumerate() {
        // a jump across the whole i64 range does not fit in an i64
        let delta = i128::from(next) - i128::from(prev);
        if delta > max_delta {
            max_delta = delta;
            split = i + 1;
        }
    }
    split
}

/// One integer per line; returns the product of the group sizes on both
/// sides of the largest gap.
pub fn split_product(input: &str) -> Result<usize> {
    let values = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.trim().parse::<i64>().map_err(|_| Error::Parse {
                line_number: i + 1,
                line: line.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if values.len() < 2 {
        return Err(Error::TooFewValues(values.len()));
    }

    let split = largest_gap(&values);
    Ok(split * (values.len() - split))
}
