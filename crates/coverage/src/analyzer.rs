//! Coverage queries over a snapshot of facilities.
//!
//! Every query is a pure single pass over the candidates handed in by the
//! caller: distances are computed with the haversine formula against each
//! facility's effective point, candidates without a usable point are
//! skipped, and results are ordered by ascending distance with ties broken
//! by ascending facility id.

use crate::facility::Facility;
use crate::range::{category_key, round_to, RangeModel};
use crate::{CoverageError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use urbancover_geo::{haversine_distance, Coordinate};

/// How loudly a missing category is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

fn default_severity() -> Severity {
    Severity::Warning
}

/// A category whose availability is scored for every query point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOfInterest {
    pub category: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

impl CategoryOfInterest {
    pub fn new(category: impl Into<String>, severity: Severity) -> Self {
        Self { category: category.into(), severity }
    }
}

/// Analyzer tunables. Deserializes from the `[analysis]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Categories scored and checked for deserts
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryOfInterest>,

    /// Distance at which a category's score reaches 0
    #[serde(default = "default_score_cutoff_km")]
    pub score_cutoff_km: f64,

    /// Length of the nearby diagnostics list
    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: usize,

    /// Density assumed when the query does not supply one
    #[serde(default = "default_density")]
    pub default_density: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            score_cutoff_km: default_score_cutoff_km(),
            nearby_limit: default_nearby_limit(),
            default_density: default_density(),
        }
    }
}

fn default_categories() -> Vec<CategoryOfInterest> {
    vec![
        CategoryOfInterest::new("hospital", Severity::Critical),
        CategoryOfInterest::new("pharmacy", Severity::Warning),
    ]
}

fn default_score_cutoff_km() -> f64 {
    5.0
}

fn default_nearby_limit() -> usize {
    5
}

fn default_density() -> f64 {
    1000.0
}

/// A facility and its distance from the query point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FacilityMatch<'a> {
    pub facility: &'a Facility,
    pub distance_km: f64,
}

/// A facility with its computed range and coverage flag.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoredFacility<'a> {
    pub facility: &'a Facility,
    pub distance_km: f64,
    pub max_range_km: f64,
    pub in_coverage: bool,
}

/// Coverage of one category of interest.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCoverage<'a> {
    pub category: String,
    pub severity: Severity,
    /// 0-100, linear in the distance to the nearest facility of the category
    pub score: f64,
    /// Number of facilities of the category whose range reaches the query
    pub in_coverage: usize,
    pub desert: bool,
    pub nearest: Option<ScoredFacility<'a>>,
}

/// Verdict for a query point.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport<'a> {
    pub query: Coordinate,
    /// Density after defaulting and flooring
    pub density: f64,
    /// Mean of the category scores
    pub overall_score: f64,
    /// Every category of interest is a desert
    pub desert: bool,
    pub categories: Vec<CategoryCoverage<'a>>,
    /// Closest facilities of any category
    pub nearby: Vec<ScoredFacility<'a>>,
    pub missing_amenities: Vec<String>,
    /// Candidates skipped for an invalid or missing geometry
    pub excluded: usize,
}

/// Single-category desert check against a fixed distance threshold.
#[derive(Debug, Clone, Serialize)]
pub struct DesertCheck<'a> {
    pub category: String,
    pub threshold_km: f64,
    pub nearest: Option<FacilityMatch<'a>>,
    pub is_desert: bool,
}

/// Answers radius and coverage queries using a [`RangeModel`].
#[derive(Debug, Clone, Default)]
pub struct CoverageAnalyzer {
    model: RangeModel,
    settings: AnalysisSettings,
}

impl CoverageAnalyzer {
    pub fn new(model: RangeModel, settings: AnalysisSettings) -> Self {
        Self { model, settings }
    }

    pub fn model(&self) -> &RangeModel {
        &self.model
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Facilities within `radius_km` of `query`, closest first.
    ///
    /// # Example
    /// ```
    /// use urbancover_coverage::{CoverageAnalyzer, Facility, FacilityId, NewFacility};
    /// use urbancover_geo::Coordinate;
    ///
    /// let hospital = Facility::from_new(FacilityId(1), NewFacility::point("General", "hospital", 0.0, 0.0));
    /// let candidates = vec![hospital];
    ///
    /// let analyzer = CoverageAnalyzer::default();
    /// let hits = analyzer.find_within(Coordinate::new(0.01, 0.0), 2.0, &candidates).unwrap();
    /// assert_eq!(hits.len(), 1);
    /// assert!((hits[0].distance_km - 1.11).abs() < 0.01);
    /// ```
    pub fn find_within<'a>(
        &self,
        query: Coordinate,
        radius_km: f64,
        candidates: &'a [Facility],
    ) -> Result<Vec<FacilityMatch<'a>>> {
        let query = validate_query(query)?;
        let radius_km = validate_distance(radius_km)?;

        let mut matches = locate(query, candidates).matches;
        matches.retain(|m| m.distance_km <= radius_km);

        tracing::debug!(%query, radius_km, found = matches.len(), "Radius query");
        Ok(matches)
    }

    /// The `limit` closest usable facilities of any category.
    pub fn nearest<'a>(
        &self,
        query: Coordinate,
        candidates: &'a [Facility],
        limit: usize,
    ) -> Result<Vec<FacilityMatch<'a>>> {
        let query = validate_query(query)?;
        let mut matches = locate(query, candidates).matches;
        matches.truncate(limit);
        Ok(matches)
    }

    /// Full coverage verdict for `query`.
    ///
    /// `density` defaults to the configured value when `None`; the range
    /// model floors it. An empty candidate set yields an all-zero desert
    /// report.
    pub fn analyze<'a>(
        &self,
        query: Coordinate,
        density: Option<f64>,
        candidates: &'a [Facility],
    ) -> Result<CoverageReport<'a>> {
        let query = validate_query(query)?;
        let density = self
            .model
            .effective_density(density.unwrap_or(self.settings.default_density));

        let located = locate(query, candidates);
        let scored: Vec<ScoredFacility<'a>> = located
            .matches
            .iter()
            .map(|m| {
                let max_range_km =
                    self.model
                        .effective_range(&m.facility.category, m.facility.capacity, density);
                ScoredFacility {
                    facility: m.facility,
                    distance_km: m.distance_km,
                    max_range_km,
                    in_coverage: m.distance_km <= max_range_km,
                }
            })
            .collect();

        let categories: Vec<CategoryCoverage<'a>> = self
            .settings
            .categories
            .iter()
            .map(|interest| self.category_coverage(interest, &scored))
            .collect();

        let overall_score = if categories.is_empty() {
            0.0
        } else {
            let total: f64 = categories.iter().map(|c| c.score).sum();
            total / categories.len() as f64
        };

        let missing_amenities = categories
            .iter()
            .filter(|c| c.desert)
            .map(|c| format!("{}: No {} nearby", c.severity, category_label(&c.category)))
            .collect();

        // Without categories of interest, any covering facility counts.
        let desert = if categories.is_empty() {
            !scored.iter().any(|s| s.in_coverage)
        } else {
            categories.iter().all(|c| c.desert)
        };
        let nearby = scored.into_iter().take(self.settings.nearby_limit).collect();

        tracing::debug!(
            %query,
            density,
            candidates = candidates.len(),
            excluded = located.excluded,
            overall_score,
            desert,
            "Coverage analyzed"
        );

        Ok(CoverageReport {
            query,
            density,
            overall_score,
            desert,
            categories,
            nearby,
            missing_amenities,
            excluded: located.excluded,
        })
    }

    /// Is `query` farther than `threshold_km` from every facility of `category`?
    pub fn desert_check<'a>(
        &self,
        query: Coordinate,
        category: &str,
        threshold_km: f64,
        candidates: &'a [Facility],
    ) -> Result<DesertCheck<'a>> {
        let query = validate_query(query)?;
        let threshold_km = validate_distance(threshold_km)?;
        let key = category_key(category);

        let nearest = locate(query, candidates)
            .matches
            .into_iter()
            .find(|m| category_key(&m.facility.category) == key);

        let is_desert = nearest.is_none_or(|m| m.distance_km > threshold_km);

        Ok(DesertCheck {
            category: key,
            threshold_km,
            nearest,
            is_desert,
        })
    }

    fn category_coverage<'a>(
        &self,
        interest: &CategoryOfInterest,
        scored: &[ScoredFacility<'a>],
    ) -> CategoryCoverage<'a> {
        let key = category_key(&interest.category);
        let mut members = scored
            .iter()
            .filter(|s| category_key(&s.facility.category) == key)
            .peekable();

        let nearest = members.peek().copied().copied();
        let in_coverage = members.filter(|s| s.in_coverage).count();
        let score = nearest
            .map(|n| coverage_score(n.distance_km, self.settings.score_cutoff_km))
            .unwrap_or(0.0);

        CategoryCoverage {
            category: key,
            severity: interest.severity,
            score,
            in_coverage,
            desert: in_coverage == 0,
            nearest,
        }
    }
}

/// Linear score: 100 at distance 0, 0 at or beyond `cutoff_km`, rounded to
/// one decimal.
///
/// ```
/// use urbancover_coverage::coverage_score;
///
/// assert_eq!(coverage_score(2.5, 5.0), 50.0);
/// assert_eq!(coverage_score(5.0, 5.0), 0.0);
/// ```
pub fn coverage_score(distance_km: f64, cutoff_km: f64) -> f64 {
    if !(cutoff_km > 0.0) || !(distance_km < cutoff_km) {
        return 0.0;
    }
    round_to((100.0 * (1.0 - distance_km / cutoff_km)).max(0.0), 1)
}

/// Human label for a category key: `petrol_pump` becomes `Petrol pump`.
pub fn category_label(category: &str) -> String {
    let spaced = category.trim().replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct Located<'a> {
    matches: Vec<FacilityMatch<'a>>,
    excluded: usize,
}

fn validate_query(query: Coordinate) -> Result<Coordinate> {
    if query.is_valid() {
        Ok(query)
    } else {
        Err(CoverageError::InvalidCoordinate {
            latitude: query.latitude,
            longitude: query.longitude,
        })
    }
}

fn validate_distance(km: f64) -> Result<f64> {
    if km.is_finite() && km >= 0.0 {
        Ok(km)
    } else {
        Err(CoverageError::InvalidRadius(km))
    }
}

/// Distances to every usable candidate, sorted. Unusable candidates are
/// counted in `excluded`.
fn locate(query: Coordinate, candidates: &[Facility]) -> Located<'_> {
    #[cfg(feature = "parallel")]
    let measured: Vec<Option<FacilityMatch<'_>>> = {
        use rayon::prelude::*;
        candidates
            .par_iter()
            .map(|facility| measure(&query, facility))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let measured: Vec<Option<FacilityMatch<'_>>> = candidates
        .iter()
        .map(|facility| measure(&query, facility))
        .collect();

    let total = measured.len();
    let mut matches: Vec<FacilityMatch<'_>> = measured.into_iter().flatten().collect();
    let excluded = total - matches.len();

    matches.sort_by(by_distance_then_id);

    Located { matches, excluded }
}

#[inline]
fn measure<'a>(query: &Coordinate, facility: &'a Facility) -> Option<FacilityMatch<'a>> {
    let usable = facility.geometry.validate().is_ok();
    match facility.effective_point() {
        Some(point) if usable && point.is_valid() => Some(FacilityMatch {
            facility,
            distance_km: haversine_distance(query, &point),
        }),
        _ => {
            tracing::debug!(facility = %facility.id, kind = %facility.kind(), "Skipping facility without usable location");
            None
        }
    }
}

fn by_distance_then_id(a: &FacilityMatch<'_>, b: &FacilityMatch<'_>) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.facility.id.cmp(&b.facility.id))
}
