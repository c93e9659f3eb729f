//! Effective service radius of a facility.
//!
//! The radius of a facility is its category's base range scaled by
//! `sqrt(reference_density / density)` and `capacity / reference_capacity`,
//! rounded to two decimals. A facility at the reference capacity in an area
//! at the reference density covers exactly its base range.

use crate::facility::{Capacity, DEFAULT_CAPACITY};
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Tunables of the range model. Deserializes from the `[range]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Base range in kilometers per category. Configured entries are
    /// merged over the built-in table.
    #[serde(default = "default_base_ranges", deserialize_with = "merge_base_ranges")]
    pub base_ranges: BTreeMap<String, f64>,

    /// Base range for categories missing from `base_ranges`
    #[serde(default = "default_base_km")]
    pub default_base_km: f64,

    /// Density (people/km²) at which the base range applies unchanged
    #[serde(default = "default_reference_density")]
    pub reference_density: f64,

    /// Capacity at which the base range applies unchanged
    #[serde(default = "default_reference_capacity")]
    pub reference_capacity: f64,

    /// Lower bound applied to density before scaling
    #[serde(default = "default_min_density")]
    pub min_density: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            base_ranges: default_base_ranges(),
            default_base_km: default_base_km(),
            reference_density: default_reference_density(),
            reference_capacity: default_reference_capacity(),
            min_density: default_min_density(),
        }
    }
}

fn default_base_ranges() -> BTreeMap<String, f64> {
    [("hospital", 5.0), ("atm", 1.0), ("bank", 2.0), ("petrol_pump", 3.0)]
        .into_iter()
        .map(|(category, km)| (category.to_string(), km))
        .collect()
}

fn merge_base_ranges<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, f64>::deserialize(deserializer)?;
    let mut ranges = default_base_ranges();
    ranges.extend(overrides.into_iter().map(|(category, km)| (category_key(&category), km)));
    Ok(ranges)
}

fn default_base_km() -> f64 {
    2.0
}

fn default_reference_density() -> f64 {
    1000.0
}

fn default_reference_capacity() -> f64 {
    f64::from(DEFAULT_CAPACITY)
}

fn default_min_density() -> f64 {
    100.0
}

/// Normalized category key: trimmed and lowercased.
pub fn category_key(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Maps (category, capacity, density) to a service radius in kilometers.
///
/// Owns an immutable [`RangeConfig`]; build several models to compare
/// alternative tables side by side.
#[derive(Debug, Clone)]
pub struct RangeModel {
    config: RangeConfig,
    base_ranges: BTreeMap<String, f64>,
}

impl Default for RangeModel {
    fn default() -> Self {
        Self::new(RangeConfig::default())
    }
}

impl RangeModel {
    /// Creates a model. Category keys are normalized with [`category_key`].
    pub fn new(config: RangeConfig) -> Self {
        let base_ranges = config
            .base_ranges
            .iter()
            .map(|(category, km)| (category_key(category), *km))
            .collect();
        Self { config, base_ranges }
    }

    /// The configuration this model was built from.
    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    /// Base range of a category; unknown categories get the default.
    pub fn base_range(&self, category: &str) -> f64 {
        self.base_ranges
            .get(&category_key(category))
            .copied()
            .unwrap_or(self.config.default_base_km)
    }

    /// True if the category has its own entry in the table.
    pub fn is_known_category(&self, category: &str) -> bool {
        self.base_ranges.contains_key(&category_key(category))
    }

    /// Density after flooring. NaN and non-positive values floor too.
    pub fn effective_density(&self, density: f64) -> f64 {
        density.max(self.config.min_density)
    }

    /// Effective service radius in kilometers, rounded to 2 decimals.
    ///
    /// # Example
    /// ```
    /// use urbancover_coverage::{Capacity, RangeModel};
    ///
    /// let model = RangeModel::default();
    /// assert_eq!(model.effective_range("hospital", Capacity::DEFAULT, 1000.0), 5.0);
    /// assert_eq!(model.effective_range("hospital", Capacity::new(25).unwrap(), 1000.0), 2.5);
    /// ```
    pub fn effective_range(&self, category: &str, capacity: Capacity, density: f64) -> f64 {
        let base = self.base_range(category);
        let density_factor = (self.config.reference_density / self.effective_density(density)).sqrt();
        let capacity_factor = f64::from(capacity.get()) / self.config.reference_capacity;
        round_to(base * density_factor * capacity_factor, 2)
    }

    /// Like [`effective_range`](Self::effective_range) for unchecked
    /// integer capacities; non-positive values are rejected.
    pub fn effective_range_checked(&self, category: &str, capacity: i64, density: f64) -> Result<f64> {
        let capacity = Capacity::new(capacity)?;
        Ok(self.effective_range(category, capacity, density))
    }
}

/// Rounds half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoverageError;
    use proptest::prelude::*;

    fn cap(raw: i64) -> Capacity {
        Capacity::new(raw).unwrap()
    }

    #[test]
    fn test_reference_point_reproduces_base() {
        let model = RangeModel::default();
        for (category, base) in &model.config().base_ranges {
            assert_eq!(model.effective_range(category, Capacity::DEFAULT, 1000.0), *base);
        }
    }

    #[test]
    fn test_unknown_category_uses_default() {
        let model = RangeModel::default();
        assert_eq!(model.base_range("library"), 2.0);
        assert!(!model.is_known_category("library"));
        assert_eq!(model.effective_range("library", Capacity::DEFAULT, 1000.0), 2.0);
    }

    #[test]
    fn test_category_lookup_is_normalized() {
        let model = RangeModel::default();
        assert_eq!(model.base_range("  Hospital "), 5.0);
        assert_eq!(model.base_range("ATM"), 1.0);
    }

    #[test]
    fn test_half_capacity_halves_range() {
        let model = RangeModel::default();
        assert_eq!(model.effective_range("hospital", cap(25), 1000.0), 2.5);
        assert_eq!(model.effective_range("hospital", cap(100), 1000.0), 10.0);
    }

    #[test]
    fn test_double_density_shrinks_range_by_sqrt2() {
        let model = RangeModel::default();
        // 5.0 / sqrt(2) = 3.5355...
        assert_eq!(model.effective_range("hospital", Capacity::DEFAULT, 2000.0), 3.54);
    }

    #[test]
    fn test_density_floor() {
        let model = RangeModel::default();
        let floor = model.effective_range("atm", Capacity::DEFAULT, 100.0);
        assert_eq!(floor, 3.16);
        assert_eq!(model.effective_range("atm", Capacity::DEFAULT, 0.0), floor);
        assert_eq!(model.effective_range("atm", Capacity::DEFAULT, -50.0), floor);
        assert_eq!(model.effective_range("atm", Capacity::DEFAULT, f64::NAN), floor);
        assert_eq!(model.effective_range("atm", Capacity::DEFAULT, 40.0), floor);
    }

    #[test]
    fn test_checked_rejects_non_positive_capacity() {
        let model = RangeModel::default();
        assert!(matches!(
            model.effective_range_checked("hospital", 0, 1000.0),
            Err(CoverageError::InvalidCapacity(0))
        ));
        assert_eq!(model.effective_range_checked("hospital", 50, 1000.0).unwrap(), 5.0);
    }

    #[test]
    fn test_custom_table() {
        let mut config = RangeConfig::default();
        config.base_ranges.insert("Pharmacy".into(), 1.5);
        config.default_base_km = 0.5;
        let model = RangeModel::new(config);
        assert_eq!(model.base_range("pharmacy"), 1.5);
        assert_eq!(model.base_range("kiosk"), 0.5);
    }

    #[test]
    fn test_config_partial_deserialize() {
        let config: RangeConfig = serde_json::from_str(r#"{"default_base_km": 4.0}"#).unwrap();
        assert_eq!(config.default_base_km, 4.0);
        assert_eq!(config.reference_density, 1000.0);
        assert_eq!(config.base_ranges.get("hospital"), Some(&5.0));
    }

    #[test]
    fn test_configured_base_ranges_merge_over_defaults() {
        let config: RangeConfig =
            serde_json::from_str(r#"{"base_ranges": {"Hospital": 8.0, "pharmacy": 1.5}}"#).unwrap();
        let model = RangeModel::new(config);
        assert_eq!(model.base_range("hospital"), 8.0);
        assert_eq!(model.base_range("pharmacy"), 1.5);
        assert_eq!(model.base_range("atm"), 1.0);
        assert_eq!(model.base_range("bank"), 2.0);
        assert_eq!(model.base_range("petrol_pump"), 3.0);
    }

    proptest! {
        #[test]
        fn prop_monotonic_in_capacity(a in 1i64..10_000, b in 1i64..10_000, density in 100.0f64..50_000.0) {
            let model = RangeModel::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(model.effective_range("bank", cap(lo), density) <= model.effective_range("bank", cap(hi), density));
        }

        #[test]
        fn prop_monotonic_in_density(a in 100.0f64..100_000.0, b in 100.0f64..100_000.0, capacity in 1i64..1_000) {
            let model = RangeModel::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(model.effective_range("hospital", cap(capacity), lo) >= model.effective_range("hospital", cap(capacity), hi));
        }

        #[test]
        fn prop_below_floor_equals_floor(density in -1.0e6f64..100.0) {
            let model = RangeModel::default();
            prop_assert_eq!(
                model.effective_range("petrol_pump", Capacity::DEFAULT, density),
                model.effective_range("petrol_pump", Capacity::DEFAULT, 100.0)
            );
        }
    }
}
