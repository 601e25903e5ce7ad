pub mod device;
pub mod distance;
pub mod network;
pub mod response;
pub mod trust;

use serde::Serialize;

use crate::{Score, Weight};

#[derive(Clone, Copy, Debug)]
pub struct Alternative {
    pub score: Score,
    pub weight: Weight,
}

/// We use the [weighted sum model (WSM)](https://en.wikipedia.org/wiki/Weighted_sum_model) to
/// combine criteria. With weights summing to 1 the result stays in [0, 100], and a weak criterion
/// only costs a candidate its weighted share rather than zeroing the whole score.
pub fn weighted_sum_model<Alternatives>(alternatives: Alternatives) -> Score
where
    Alternatives: IntoIterator<Item = Alternative>,
{
    let score = alternatives
        .into_iter()
        .map(|Alternative { score, weight }| score.as_f64() * weight.as_f64())
        .sum::<f64>();
    Score::saturating(score)
}

/// Static description of a normalization curve, for display alongside the weights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Curve {
    pub name: &'static str,
    pub unit: &'static str,
    pub formula: &'static str,
}
