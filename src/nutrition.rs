use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Macronutrient profile. Used both for per-serving catalog values and for
/// computed totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

impl Nutrients {
    pub const ZERO: Nutrients = Nutrients {
        calories: 0.0,
        carbs: 0.0,
        protein: 0.0,
        fat: 0.0,
    };

    /// Scale a per-serving profile to an absolute amount.
    ///
    /// `quantity` is the logged amount in the entry's serving unit and the
    /// profile describes `serving_size` of that unit, so the contribution is
    /// `per_serving * quantity / serving_size`. A zero, negative or
    /// non-finite serving size yields a zero profile instead of a fault.
    pub fn scale(&self, quantity: f64, serving_size: f64) -> Nutrients {
        if !serving_size.is_finite() || serving_size <= 0.0 {
            return Nutrients::ZERO;
        }
        let ratio = quantity / serving_size;
        Nutrients {
            calories: self.calories * ratio,
            carbs: self.carbs * ratio,
            protein: self.protein * ratio,
            fat: self.fat * ratio,
        }
    }
}

impl Default for Nutrients {
    fn default() -> Self {
        Nutrients::ZERO
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + rhs.calories,
            carbs: self.carbs + rhs.carbs,
            protein: self.protein + rhs.protein,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Nutrients) {
        *self = *self + rhs;
    }
}

impl Sum for Nutrients {
    fn sum<I: Iterator<Item = Nutrients>>(iter: I) -> Nutrients {
        iter.fold(Nutrients::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PER_SERVING: Nutrients = Nutrients {
        calories: 200.0,
        carbs: 20.0,
        protein: 5.0,
        fat: 8.0,
    };

    #[test]
    fn scales_by_amount_over_serving_size() {
        let half = PER_SERVING.scale(50.0, 100.0);
        assert_eq!(half.calories, 100.0);
        assert_eq!(half.carbs, 10.0);
        assert_eq!(half.protein, 2.5);
        assert_eq!(half.fat, 4.0);
    }

    #[test]
    fn full_serving_is_identity() {
        assert_eq!(PER_SERVING.scale(100.0, 100.0), PER_SERVING);
    }

    #[test]
    fn zero_serving_size_yields_zero_not_a_fault() {
        assert_eq!(PER_SERVING.scale(50.0, 0.0), Nutrients::ZERO);
        assert_eq!(PER_SERVING.scale(50.0, -1.0), Nutrients::ZERO);
        assert_eq!(PER_SERVING.scale(50.0, f64::NAN), Nutrients::ZERO);
    }

    #[test]
    fn sum_of_empty_iterator_is_zero() {
        let totals: Nutrients = std::iter::empty().sum();
        assert_eq!(totals, Nutrients::ZERO);
    }

    #[test]
    fn addition_is_elementwise() {
        let a = PER_SERVING.scale(50.0, 100.0);
        let b = PER_SERVING.scale(150.0, 100.0);
        let both: Nutrients = [a, b].into_iter().sum();
        assert_eq!(both, PER_SERVING.scale(200.0, 100.0));
    }

    #[test]
    fn serializes_with_flat_field_names() {
        let json = serde_json::to_value(PER_SERVING).unwrap();
        assert_eq!(json["calories"], 200.0);
        assert_eq!(json["carbs"], 20.0);
        assert_eq!(json["protein"], 5.0);
        assert_eq!(json["fat"], 8.0);
    }
}
