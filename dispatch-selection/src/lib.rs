pub mod criteria;
pub mod geo;
pub mod num;

use std::cmp::Reverse;

pub use crate::num::{Score, Weight};
pub use arrayvec::ArrayVec;
use ordered_float::NotNan;

pub trait Candidate {
    type Id: Eq + Ord;
    fn id(&self) -> Self::Id;
    fn score(&self) -> Score;
    /// Secondary sort key for candidates with equal scores. Lower values rank first.
    fn tie_break(&self) -> NotNan<f64>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ranked<T> {
    pub candidate: T,
    pub score: Score,
    /// Position in the ranking, starting at 1.
    pub rank: usize,
}

/// Rank the provided candidates by descending score. Candidates with equal scores are ordered by
/// ascending `tie_break`, then by ascending id, so the output never depends on input order.
///
/// Ranks are dense: the first candidate has rank 1 and each following candidate has the next
/// integer rank, including candidates with equal scores.
pub fn rank<'c, Candidate, Candidates>(candidates: Candidates) -> Vec<Ranked<&'c Candidate>>
where
    Candidate: crate::Candidate,
    Candidates: IntoIterator<Item = &'c Candidate>,
{
    let candidates: Vec<&'c Candidate> = candidates.into_iter().collect();
    let scores: Vec<Score> = candidates.iter().map(|c| c.score()).collect();
    let keys: Vec<(Reverse<Score>, NotNan<f64>, Candidate::Id)> = candidates
        .iter()
        .zip(&scores)
        .map(|(c, score)| (Reverse(*score), c.tie_break(), c.id()))
        .collect();

    let sort = permutation::sort(&keys[..]);
    let candidates = sort.apply_slice(&candidates[..]);
    let scores = sort.apply_slice(&scores[..]);

    candidates
        .into_iter()
        .zip(scores)
        .enumerate()
        .map(|(index, (candidate, score))| Ranked {
            candidate,
            score,
            rank: index + 1,
        })
        .collect()
}

/// Select up to `LIMIT` of the best ranked candidates, in rank order.
pub fn select_top<'c, Candidate, Candidates, const LIMIT: usize>(
    candidates: Candidates,
) -> ArrayVec<Ranked<&'c Candidate>, LIMIT>
where
    Candidate: crate::Candidate,
    Candidates: IntoIterator<Item = &'c Candidate>,
{
    rank(candidates).into_iter().take(LIMIT).collect()
}
