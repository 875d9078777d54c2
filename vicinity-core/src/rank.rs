//! Nearest-first ordering of candidates around a reference location.

use log::debug;

use crate::{Candidate, Coordinate, Distance, haversine_distance};

/// Order `candidates` by ascending distance from `reference`.
///
/// Without a reference the candidates are returned in their original order
/// and no distance is attached. With a reference every returned candidate
/// carries a [`Distance`]; those with a missing or malformed coordinate get
/// [`Distance::Unranked`] and sort after all measured ones. The sort is
/// stable, so equidistant candidates keep their relative order. The input
/// slice is left untouched.
///
/// # Examples
/// ```
/// use vicinity_core::{Candidate, Coordinate, Distance, rank};
///
/// let here = Coordinate { latitude: 0.0, longitude: 0.0 };
/// let far = Candidate::new("far", Some(Coordinate { latitude: 0.01, longitude: 0.0 }));
/// let near = Candidate::new("near", Some(Coordinate { latitude: 0.001, longitude: 0.0 }));
/// let lost = Candidate::new("lost", None);
///
/// let ranked = rank(Some(here), &[far, lost, near]);
/// let labels: Vec<_> = ranked.iter().map(|c| c.label.as_str()).collect();
/// assert_eq!(labels, ["near", "far", "lost"]);
/// assert_eq!(ranked[2].distance, Some(Distance::Unranked));
/// ```
#[must_use]
pub fn rank(reference: Option<Coordinate>, candidates: &[Candidate]) -> Vec<Candidate> {
    let Some(origin) = reference else {
        return candidates.to_vec();
    };

    let mut ranked: Vec<Candidate> = candidates
        .iter()
        .map(|candidate| {
            let distance = measure(origin, candidate);
            Candidate {
                distance: Some(distance),
                ..candidate.clone()
            }
        })
        .collect();
    ranked.sort_by_key(|candidate| candidate.distance.unwrap_or(Distance::Unranked));
    ranked
}

/// Rank, then drop measured candidates farther than `radius_m`.
///
/// Unranked candidates are kept at the tail; the engine never silently
/// discards a candidate it could not measure.
#[must_use]
pub fn rank_within(
    reference: Option<Coordinate>,
    candidates: &[Candidate],
    radius_m: f64,
) -> Vec<Candidate> {
    let mut ranked = rank(reference, candidates);
    ranked.retain(|candidate| match candidate.distance {
        Some(Distance::Meters(m)) => m <= radius_m,
        _ => true,
    });
    ranked
}

fn measure(origin: Coordinate, candidate: &Candidate) -> Distance {
    let Some(target) = candidate.usable_coordinate() else {
        debug!(
            "candidate {:?} has no usable coordinate; ranking last",
            candidate.label
        );
        return Distance::Unranked;
    };
    match haversine_distance(origin, target) {
        Ok(metres) => Distance::from_meters(metres),
        Err(err) => {
            debug!("candidate {:?} unranked: {err}", candidate.label);
            Distance::Unranked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn at(label: &str, latitude: f64, longitude: f64) -> Candidate {
        Candidate::new(
            label,
            Some(Coordinate {
                latitude,
                longitude,
            }),
        )
    }

    fn labels(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.label.as_str()).collect()
    }

    #[fixture]
    fn origin() -> Coordinate {
        Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[rstest]
    fn empty_input_ranks_to_empty(origin: Coordinate) {
        assert!(rank(Some(origin), &[]).is_empty());
    }

    #[rstest]
    fn missing_reference_preserves_order() {
        let input = vec![at("b", 1.0, 1.0), at("a", 0.0, 0.0), Candidate::new("c", None)];
        let ranked = rank(None, &input);
        assert_eq!(ranked, input);
        assert!(ranked.iter().all(|c| c.distance.is_none()));
    }

    #[rstest]
    fn malformed_candidates_sort_last(origin: Coordinate) {
        // ~500 m and ~100 m north of the origin.
        let input = vec![
            at("500m", 0.004_497, 0.0),
            at("100m", 0.000_899, 0.0),
            Candidate::new(
                "no-longitude",
                Some(Coordinate {
                    latitude: 0.001,
                    longitude: f64::NAN,
                }),
            ),
        ];
        let ranked = rank(Some(origin), &input);
        assert_eq!(labels(&ranked), ["100m", "500m", "no-longitude"]);
        assert_eq!(ranked[2].distance, Some(Distance::Unranked));
        let near = ranked[0].distance.and_then(|d| d.meters()).expect("measured");
        assert!((near - 100.0).abs() < 1.0, "got {near}");
    }

    #[rstest]
    fn out_of_range_coordinates_are_unranked(origin: Coordinate) {
        let input = vec![at("bogus", 120.0, 0.0), at("near", 1.0, 0.0)];
        let ranked = rank(Some(origin), &input);
        assert_eq!(labels(&ranked), ["near", "bogus"]);
        assert_eq!(ranked[1].distance, Some(Distance::Unranked));
    }

    #[rstest]
    fn equal_distances_keep_input_order(origin: Coordinate) {
        let input = vec![at("first", 0.5, 0.5), at("closer", 0.1, 0.1), at("second", 0.5, 0.5)];
        let ranked = rank(Some(origin), &input);
        assert_eq!(labels(&ranked), ["closer", "first", "second"]);
    }

    #[rstest]
    fn input_is_not_mutated(origin: Coordinate) {
        let input = vec![at("far", 1.0, 1.0), at("near", 0.1, 0.1)];
        let snapshot = input.clone();
        let _ranked = rank(Some(origin), &input);
        assert_eq!(input, snapshot);
    }

    #[rstest]
    fn rank_within_drops_distant_but_keeps_unranked(origin: Coordinate) {
        let input = vec![
            at("inside", 0.001, 0.0),
            at("outside", 0.1, 0.0),
            Candidate::new("unknown", None),
        ];
        let ranked = rank_within(Some(origin), &input, 800.0);
        assert_eq!(labels(&ranked), ["inside", "unknown"]);
    }

    #[rstest]
    fn rank_within_without_reference_keeps_everything() {
        let input = vec![at("x", 10.0, 10.0), at("y", 20.0, 20.0)];
        assert_eq!(rank_within(None, &input, 1.0), input);
    }
}
