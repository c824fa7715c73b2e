//! Weighted random selection.
//!
//! Two schemes live here and they pull in opposite directions:
//!
//! | Scheme          | Weight          | Used for                         |
//! |-----------------|-----------------|----------------------------------|
//! | rarity          | `rarity`        | game elements of one type        |
//! | inverse cost    | `1 / cost`      | cost bands (`max_cost`) and fish |
//!
//! Higher rarity is picked more often; higher cost is picked less often.

use rand::Rng;

use crate::shared::GameElement;

/// Selection weight of an element. Negative and non-finite rarities count as 0.
fn rarity_weight(element: &GameElement) -> f64 {
    if element.rarity.is_finite() {
        element.rarity.max(0.0)
    } else {
        0.0
    }
}

/// Rarity-weighted pick. `None` for an empty list or a non-positive total.
pub fn pick_by_rarity<'a, R: Rng + ?Sized>(
    candidates: &[&'a GameElement],
    rng: &mut R,
) -> Option<&'a GameElement> {
    let total: f64 = candidates.iter().map(|e| rarity_weight(e)).sum();
    if candidates.is_empty() || !total.is_finite() || total <= 0.0 {
        return None;
    }

    let mut roll = rng.gen_range(0.0..total);
    for element in candidates {
        let weight = rarity_weight(element);
        if roll < weight {
            return Some(*element);
        }
        roll -= weight;
    }

    // Float drift: last element that carries any weight.
    candidates.iter().rev().find(|e| rarity_weight(e) > 0.0).copied()
}

/// Inverse-cost-weighted pick. A cost of 0 is weighted as 1.
pub fn pick_by_inverse_cost<'a, T, R, F>(candidates: &'a [T], cost: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> u32,
{
    if candidates.is_empty() {
        return None;
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|c| 1.0 / f64::from(cost(c).max(1)))
        .collect();
    let total: f64 = weights.iter().sum();

    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (candidate, weight) in candidates.iter().zip(&weights) {
        cumulative += weight / total;
        if roll < cumulative {
            return Some(candidate);
        }
    }

    candidates.last()
}
