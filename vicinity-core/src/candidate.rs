//! Search suggestions and points of interest eligible for ranking.

use std::cmp::Ordering;

use crate::Coordinate;

/// Distance attached to a candidate by a ranking pass.
///
/// `Unranked` marks candidates whose coordinate was missing or malformed and
/// orders after every measured distance.
///
/// # Examples
/// ```
/// use vicinity_core::Distance;
///
/// assert!(Distance::Meters(10.0) < Distance::Unranked);
/// assert_eq!(Distance::Unranked.meters(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Distance {
    /// A finite, non-negative distance in metres.
    Meters(f64),
    /// No distance could be computed.
    Unranked,
}

impl Distance {
    /// The measured distance, if any.
    #[must_use]
    pub fn meters(&self) -> Option<f64> {
        match self {
            Self::Meters(m) => Some(*m),
            Self::Unranked => None,
        }
    }

    /// Build from a raw figure, treating negative or non-finite input as
    /// unranked.
    #[must_use]
    pub fn from_meters(meters: f64) -> Self {
        if meters.is_finite() && meters >= 0.0 {
            Self::Meters(meters)
        } else {
            Self::Unranked
        }
    }
}

impl Eq for Distance {}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Meters(a), Self::Meters(b)) => a.total_cmp(b),
            (Self::Meters(_), Self::Unranked) => Ordering::Less,
            (Self::Unranked, Self::Meters(_)) => Ordering::Greater,
            (Self::Unranked, Self::Unranked) => Ordering::Equal,
        }
    }
}

/// A search suggestion or point of interest.
///
/// Metadata is opaque to the engine; only `coordinate` drives ranking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    /// Text shown to the user.
    pub label: String,
    /// Provider category such as `cafe` or `pharmacy`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: Option<String>,
    /// Provider identifier (place or OSM id).
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_id: Option<String>,
    /// Position; `None` when the provider omitted or mangled it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub coordinate: Option<Coordinate>,
    /// Set by [`crate::rank`] when a reference location is known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub distance: Option<Distance>,
}

impl Candidate {
    /// Construct a candidate with no metadata beyond its label.
    ///
    /// # Examples
    /// ```
    /// use vicinity_core::{Candidate, Coordinate};
    ///
    /// let cafe = Candidate::new("Café Tortoni", Some(Coordinate { latitude: -34.6, longitude: -58.37 }))
    ///     .with_category("cafe");
    /// assert_eq!(cafe.category.as_deref(), Some("cafe"));
    /// assert!(cafe.distance.is_none());
    /// ```
    pub fn new(label: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self {
            label: label.into(),
            category: None,
            source_id: None,
            coordinate,
            distance: None,
        }
    }

    /// Attach a category tag.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a provider identifier.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Coordinate usable for distance maths: present, finite and within the
    /// latitude and longitude ranges.
    #[must_use]
    pub fn usable_coordinate(&self) -> Option<Coordinate> {
        self.coordinate
            .filter(|coordinate| coordinate.validate().is_ok())
    }
}
