//! Macro split allocation
//!
//! Keeps a protein/carbs/fat percentage split summing to exactly 100 while
//! one field is being edited. The other two fields absorb the difference in
//! a fixed priority order that depends on which field was edited:
//!
//! | edited  | first    | second |
//! |---------|----------|--------|
//! | protein | carbs    | fat    |
//! | carbs   | protein  | fat    |
//! | fat     | protein  | carbs  |

use crate::config::MacroConfig;
use crate::types::{Macro, MacroGrams, MacroSplit};

const TOTAL: i32 = 100;

/// Stateless allocator for interactive macro edits
pub struct MacroAllocator;

impl MacroAllocator {
    /// Fields that absorb an edit to `edited`, in priority order
    pub fn priority(edited: Macro) -> [Macro; 2] {
        match edited {
            Macro::Protein => [Macro::Carbs, Macro::Fat],
            Macro::Carbs => [Macro::Protein, Macro::Fat],
            Macro::Fat => [Macro::Protein, Macro::Carbs],
        }
    }

    /// Set `edited` to `value` and redistribute the difference.
    ///
    /// Never fails: the value is rounded and clamped to [0, 100], the
    /// current split is clamped likewise, and the result always sums to 100.
    pub fn apply_edit(current: MacroSplit, edited: Macro, value: f64) -> MacroSplit {
        let [first, second] = Self::priority(edited);
        let mut values = current.as_array().map(clamp_percent);
        values[edited.index()] = round_percent(value);

        let delta = TOTAL - values.iter().sum::<i32>();

        if delta > 0 {
            let added = (TOTAL - values[first.index()]).min(delta);
            values[first.index()] += added;
            values[second.index()] += delta - added;
        } else if delta < 0 {
            let excess = -delta;
            let removed = values[first.index()].min(excess);
            values[first.index()] -= removed;
            values[second.index()] -= excess - removed;
        }

        MacroSplit::from_array(values.map(clamp_percent))
    }

    /// Repair an arbitrary split into a valid one.
    ///
    /// Protein is kept (clamped) and carbs then fat absorb the remainder,
    /// which is the same as re-applying the current protein value.
    pub fn normalize(split: MacroSplit) -> MacroSplit {
        Self::apply_edit(split, Macro::Protein, f64::from(split.protein))
    }

    /// Convert a split into daily grams for a calorie target
    pub fn grams(split: MacroSplit, target_calories: f64, config: &MacroConfig) -> MacroGrams {
        let share = |percent: i32| target_calories * f64::from(percent) / 100.0;
        MacroGrams {
            protein_g: share(split.protein) / config.protein_kcal_per_g,
            carbs_g: share(split.carbs) / config.carbs_kcal_per_g,
            fat_g: share(split.fat) / config.fat_kcal_per_g,
        }
    }
}

fn clamp_percent(value: i32) -> i32 {
    value.clamp(0, TOTAL)
}

fn round_percent(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    // Saturating float-to-int cast; the clamp covers infinities
    clamp_percent(value.round() as i32)
}
