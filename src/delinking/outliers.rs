/// Collapse flagged positions that lie within `radius` of each other.
///
/// Positions are visited by descending score (the lower position first on
/// ties) and a position is kept only if no kept position lies within
/// `radius` of it. Afterwards no two kept positions are within `radius`, and
/// every dropped position is within `radius` of a kept one scoring at least
/// as high. The result is sorted and does not depend on input order.
///
/// Positions without a score are treated as scoring 0.
#[must_use]
pub fn filter_neighbors(positions: &[usize], scores: &[f64], radius: usize) -> Vec<usize> {
    let score = |p: usize| scores.get(p).copied().unwrap_or(0.0);

    let mut candidates = positions.to_vec();
    candidates.sort_unstable();
    candidates.dedup();
    candidates.sort_by(|&a, &b| score(b).total_cmp(&score(a)).then(a.cmp(&b)));

    let mut kept: Vec<usize> = Vec::new();
    for p in candidates {
        if kept.iter().all(|&k| k.abs_diff(p) > radius) {
            kept.push(p);
        }
    }
    kept.sort_unstable();
    kept
}
