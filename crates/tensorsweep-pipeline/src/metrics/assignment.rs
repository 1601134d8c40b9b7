//! Maximum-weight bipartite matching (Hungarian algorithm).

use ndarray::Array2;

/// Match rows to columns maximizing the summed weight.
///
/// Rectangular inputs are allowed; `min(rows, cols)` pairs are returned as
/// `(row, col)`, sorted by row. Non-finite weights rank below every finite
/// weight.
pub fn max_weight_matching(weights: &Array2<f64>) -> Vec<(usize, usize)> {
    let (rows, cols) = weights.dim();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    if rows > cols {
        let mut pairs: Vec<(usize, usize)> = max_weight_matching(&weights.t().to_owned())
            .into_iter()
            .map(|(c, r)| (r, c))
            .collect();
        pairs.sort_unstable();
        return pairs;
    }

    let weights = finite_weights(weights);

    // Shortest augmenting path with potentials, minimizing negated weights.
    // Indices are 1-based; column 0 is the virtual source.
    let cost = |i: usize, j: usize| -weights[[i - 1, j - 1]];
    let mut u = vec![0.0; rows + 1];
    let mut v = vec![0.0; cols + 1];
    let mut owner = vec![0usize; cols + 1];
    let mut way = vec![0usize; cols + 1];

    for i in 1..=rows {
        owner[0] = i;
        let mut j0 = 0;
        let mut min_to = vec![f64::INFINITY; cols + 1];
        let mut used = vec![false; cols + 1];
        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=cols {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0, j) - u[i0] - v[j];
                if reduced < min_to[j] {
                    min_to[j] = reduced;
                    way[j] = j0;
                }
                if min_to[j] < delta {
                    delta = min_to[j];
                    j1 = j;
                }
            }
            for j in 0..=cols {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_to[j] -= delta;
                }
            }
            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=cols)
        .filter(|&j| owner[j] != 0)
        .map(|j| (owner[j] - 1, j - 1))
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Replaces NaN and infinite weights with one less than the smallest finite
/// weight (0 when none is finite).
fn finite_weights(weights: &Array2<f64>) -> Array2<f64> {
    let floor = weights
        .iter()
        .copied()
        .filter(|w| w.is_finite())
        .fold(None, |min: Option<f64>, w| Some(min.map_or(w, |m| m.min(w))))
        .map_or(0.0, |m| m - 1.0);
    weights.mapv(|w| if w.is_finite() { w } else { floor })
}
