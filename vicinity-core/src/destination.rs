//! The single active destination and its routed distance.
//!
//! Selecting a destination of either kind replaces whatever was active, so a
//! free-text address and a point of interest can never be active together.
//! Any route attached to the previous destination is dropped with it.

use log::debug;
use thiserror::Error;

use crate::{Coordinate, Generation, Route, haversine_distance};

/// How the active destination was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DestinationKind {
    /// An address picked from autocomplete suggestions.
    FreeText,
    /// A point of interest picked from the nearby list.
    PointOfInterest,
}

/// A chosen destination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Destination {
    /// Selection source.
    pub kind: DestinationKind,
    /// Where the destination is.
    pub coordinate: Coordinate,
    /// Display title, when the selection had one.
    pub label: Option<String>,
}

/// Destination state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DestinationState {
    /// Nothing selected. Initial state.
    #[default]
    NoDestination,
    /// A destination is active, optionally with a route to it.
    HasDestination {
        /// The active destination.
        destination: Destination,
        /// Route for the current reference and destination, once known.
        route: Option<Route>,
    },
}

/// Errors returned by [`ActiveDestination::attach_route`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttachRouteError {
    /// No destination is active.
    #[error("no destination is active")]
    NoDestination,
    /// The route was computed for a destination that has since been replaced.
    #[error("route targets {received} but the active destination is {expected}")]
    StaleResult {
        /// Coordinate of the active destination.
        expected: Coordinate,
        /// Target the route was requested for.
        received: Coordinate,
    },
}

/// Prefer the routed distance, fall back to the straight-line one.
///
/// # Examples
/// ```
/// use vicinity_core::active_distance;
///
/// assert_eq!(active_distance(Some(5_000.0), Some(4_200.0)), Some(4_200.0));
/// assert_eq!(active_distance(Some(3_000.0), None), Some(3_000.0));
/// assert_eq!(active_distance(None, None), None);
/// ```
#[must_use]
pub fn active_distance(straight_line: Option<f64>, routed: Option<f64>) -> Option<f64> {
    routed.or(straight_line)
}

/// Owner of the [`DestinationState`] and its generation counter.
///
/// The generation advances on every transition that changes the destination,
/// letting callers tag route requests and detect superseded responses.
///
/// # Examples
/// ```
/// use vicinity_core::{ActiveDestination, Coordinate, DestinationKind, Route};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let here = Coordinate::new(-34.60, -58.38)?;
/// let shop = Coordinate::new(-34.59, -58.40)?;
/// let mut active = ActiveDestination::default();
/// active.select_poi(shop, Some("Farmacia".into()));
/// active.attach_route(Route::new(here, shop, vec![here, shop], 2_450.0)?)?;
/// assert_eq!(active.kind(), Some(DestinationKind::PointOfInterest));
/// assert_eq!(active.routed_distance(), Some(2_450.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveDestination {
    state: DestinationState,
    generation: Generation,
}

impl ActiveDestination {
    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &DestinationState {
        &self.state
    }

    /// Generation of the current destination.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// The active destination, if any.
    #[must_use]
    pub fn destination(&self) -> Option<&Destination> {
        match &self.state {
            DestinationState::NoDestination => None,
            DestinationState::HasDestination { destination, .. } => Some(destination),
        }
    }

    /// Kind of the active destination, if any.
    #[must_use]
    pub fn kind(&self) -> Option<DestinationKind> {
        self.destination().map(|d| d.kind)
    }

    /// The attached route, if any.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        match &self.state {
            DestinationState::NoDestination => None,
            DestinationState::HasDestination { route, .. } => route.as_ref(),
        }
    }

    /// Select an address picked from autocomplete.
    pub fn select_free_text(&mut self, coordinate: Coordinate, label: Option<String>) -> Generation {
        self.select(DestinationKind::FreeText, coordinate, label)
    }

    /// Select a point of interest.
    pub fn select_poi(&mut self, coordinate: Coordinate, label: Option<String>) -> Generation {
        self.select(DestinationKind::PointOfInterest, coordinate, label)
    }

    fn select(
        &mut self,
        kind: DestinationKind,
        coordinate: Coordinate,
        label: Option<String>,
    ) -> Generation {
        self.state = DestinationState::HasDestination {
            destination: Destination {
                kind,
                coordinate,
                label,
            },
            route: None,
        };
        let generation = self.generation.advance();
        debug!("destination {generation}: {kind:?} at {coordinate}");
        generation
    }

    /// Attach a route to the active destination.
    ///
    /// # Errors
    ///
    /// [`AttachRouteError::NoDestination`] when nothing is selected and
    /// [`AttachRouteError::StaleResult`] when the route targets a coordinate
    /// other than the active destination's. The state is unchanged on error.
    pub fn attach_route(&mut self, new_route: Route) -> Result<(), AttachRouteError> {
        match &mut self.state {
            DestinationState::NoDestination => Err(AttachRouteError::NoDestination),
            DestinationState::HasDestination { destination, route } => {
                if new_route.target != destination.coordinate {
                    return Err(AttachRouteError::StaleResult {
                        expected: destination.coordinate,
                        received: new_route.target,
                    });
                }
                *route = Some(new_route);
                Ok(())
            }
        }
    }

    /// Forget the route but keep the destination.
    ///
    /// Called when the reference location moves and the route no longer
    /// starts where the user is.
    pub fn drop_route(&mut self) {
        if let DestinationState::HasDestination { route, .. } = &mut self.state {
            *route = None;
        }
    }

    /// Return to [`DestinationState::NoDestination`].
    pub fn clear(&mut self) -> Generation {
        self.state = DestinationState::NoDestination;
        self.generation.advance()
    }

    /// Straight-line distance from `reference` to the destination.
    #[must_use]
    pub fn straight_line_distance(&self, reference: Option<Coordinate>) -> Option<f64> {
        let target = self.destination()?.coordinate;
        haversine_distance(reference?, target).ok()
    }

    /// Length of the attached route.
    #[must_use]
    pub fn routed_distance(&self) -> Option<f64> {
        self.route().map(|r| r.length_m)
    }

    /// Distance to show for the destination; see [`active_distance`].
    #[must_use]
    pub fn reconciled_distance(&self, reference: Option<Coordinate>) -> Option<f64> {
        active_distance(
            self.straight_line_distance(reference),
            self.routed_distance(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    #[fixture]
    fn here() -> Coordinate {
        coord(0.0, 0.0)
    }

    fn route_to(origin: Coordinate, target: Coordinate, length_m: f64) -> Route {
        Route::new(origin, target, vec![origin, target], length_m).expect("valid route")
    }

    #[rstest]
    #[case(Some(5_000.0), Some(4_200.0), Some(4_200.0))]
    #[case(None, None, None)]
    #[case(Some(3_000.0), None, Some(3_000.0))]
    #[case(None, Some(10.0), Some(10.0))]
    fn active_distance_prefers_route(
        #[case] straight: Option<f64>,
        #[case] routed: Option<f64>,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(active_distance(straight, routed), expected);
    }

    #[rstest]
    fn starts_without_destination() {
        let active = ActiveDestination::default();
        assert_eq!(active.state(), &DestinationState::NoDestination);
        assert_eq!(active.generation(), Generation::INITIAL);
    }

    #[rstest]
    fn selecting_poi_drops_free_text_route(here: Coordinate) {
        let address = coord(0.01, 0.01);
        let mut active = ActiveDestination::default();
        active.select_free_text(address, Some("Av. Corrientes 1234".into()));
        active
            .attach_route(route_to(here, address, 2_000.0))
            .expect("route matches");

        let poi = coord(0.02, 0.0);
        active.select_poi(poi, None);

        assert_eq!(active.kind(), Some(DestinationKind::PointOfInterest));
        assert!(active.route().is_none());
        assert_eq!(active.destination().map(|d| d.coordinate), Some(poi));
    }

    #[rstest]
    fn rejects_route_for_superseded_destination(here: Coordinate) {
        let old = coord(0.01, 0.01);
        let new = coord(0.05, 0.05);
        let mut active = ActiveDestination::default();
        active.select_free_text(old, None);
        active.select_poi(new, None);

        let err = active
            .attach_route(route_to(here, old, 1_000.0))
            .expect_err("stale route");
        assert_eq!(
            err,
            AttachRouteError::StaleResult {
                expected: new,
                received: old,
            }
        );
        assert!(active.route().is_none());
    }

    #[rstest]
    fn rejects_route_without_destination(here: Coordinate) {
        let mut active = ActiveDestination::default();
        let err = active
            .attach_route(route_to(here, coord(1.0, 1.0), 1.0))
            .expect_err("nothing selected");
        assert_eq!(err, AttachRouteError::NoDestination);
    }

    #[rstest]
    fn each_transition_advances_generation() {
        let mut active = ActiveDestination::default();
        let first = active.select_free_text(coord(1.0, 1.0), None);
        let second = active.select_poi(coord(1.0, 1.0), None);
        let third = active.clear();
        assert!(first < second && second < third);
    }

    #[rstest]
    fn reconciled_distance_uses_route_when_present(here: Coordinate) {
        let target = coord(0.0, 0.01);
        let mut active = ActiveDestination::default();
        active.select_free_text(target, None);

        let straight = active
            .reconciled_distance(Some(here))
            .expect("reference and destination known");
        assert!((straight - 1_111.95).abs() < 1.0, "got {straight}");

        active
            .attach_route(route_to(here, target, 1_500.0))
            .expect("route matches");
        assert_eq!(active.reconciled_distance(Some(here)), Some(1_500.0));
    }

    #[rstest]
    fn reconciled_distance_absent_without_reference() {
        let mut active = ActiveDestination::default();
        active.select_free_text(coord(1.0, 1.0), None);
        assert_eq!(active.reconciled_distance(None), None);
    }

    #[rstest]
    fn drop_route_keeps_destination(here: Coordinate) {
        let target = coord(0.0, 0.01);
        let mut active = ActiveDestination::default();
        active.select_poi(target, None);
        active
            .attach_route(route_to(here, target, 1_500.0))
            .expect("route matches");
        active.drop_route();
        assert!(active.route().is_none());
        assert_eq!(active.kind(), Some(DestinationKind::PointOfInterest));
    }
}
