//! Focused unit tests covering lookup configuration and session wiring.

use super::helpers::{OBELISCO, StubBuilder, StubServices, north_of_obelisco};
use super::*;
use crate::lookup::{
    NearbyArgs, NearbyConfig, RouteArgs, RouteConfig, SearchArgs, SearchConfig, ServiceConfig,
    execute_nearby, execute_route, execute_search, nearby_config_from_layers_for_test,
};
use rstest::{fixture, rstest};
use std::time::Duration;
use vicinity_core::{Candidate, DEFAULT_POI_RADIUS_M, DestinationKind};

#[fixture]
fn service() -> ServiceConfig {
    ServiceConfig {
        api_key: "pk.test".to_owned(),
        base_url: None,
        timeout: None,
    }
}

#[rstest]
fn converting_search_without_query_errors() {
    let args = SearchArgs {
        api_key: Some("pk.test".to_owned()),
        ..SearchArgs::default()
    };

    let err = SearchConfig::try_from(args).expect_err("missing query should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_QUERY);
            assert_eq!(env, ENV_SEARCH_QUERY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None)]
#[case(Some("   "))]
fn converting_without_api_key_errors(#[case] api_key: Option<&str>) {
    let args = SearchArgs {
        query: Some("corrientes".to_owned()),
        api_key: api_key.map(str::to_owned),
        ..SearchArgs::default()
    };

    let err = SearchConfig::try_from(args).expect_err("missing key should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_API_KEY);
            assert_eq!(env, ENV_SEARCH_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn route_without_api_key_names_its_variable() {
    let args = RouteArgs {
        reference: Some("-34.6037,-58.3816".to_owned()),
        destination: Some("-34.5875,-58.3974".to_owned()),
        ..RouteArgs::default()
    };

    let err = RouteConfig::try_from(args).expect_err("missing key should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_API_KEY);
            assert_eq!(env, ENV_ROUTE_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn nearby_defaults_radius() {
    let args = NearbyArgs {
        reference: Some("-34.6037,-58.3816".to_owned()),
        api_key: Some("pk.test".to_owned()),
        timeout_secs: Some(4),
        ..NearbyArgs::default()
    };

    let config = NearbyConfig::try_from(args).expect("config should build");

    assert_eq!(config.reference, OBELISCO);
    assert_eq!(config.radius_m, DEFAULT_POI_RADIUS_M);
    assert_eq!(config.service.timeout, Some(Duration::from_secs(4)));
}

#[rstest]
fn nearby_requires_reference() {
    let args = NearbyArgs {
        api_key: Some("pk.test".to_owned()),
        ..NearbyArgs::default()
    };

    let err = NearbyConfig::try_from(args).expect_err("missing reference");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REFERENCE);
            assert_eq!(env, ENV_NEARBY_REFERENCE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn route_labels_unnamed_destinations() {
    let args = RouteArgs {
        reference: Some("-34.6037,-58.3816".to_owned()),
        destination: Some("-34.5875,-58.3974".to_owned()),
        api_key: Some("pk.test".to_owned()),
        ..RouteArgs::default()
    };

    let config = RouteConfig::try_from(args).expect("config should build");

    assert_eq!(config.destination.label, "Destination");
    assert!(config.destination.coordinate.is_some());
}

#[rstest]
fn base_url_overrides_both_hosts(service: ServiceConfig) {
    let config = ServiceConfig {
        base_url: Some("http://127.0.0.1:9000/v1".to_owned()),
        ..service
    }
    .locationiq();

    assert_eq!(config.base_url, "http://127.0.0.1:9000/v1");
    assert_eq!(config.autocomplete_base_url, "http://127.0.0.1:9000/v1");
}

#[rstest]
fn service_debug_hides_the_key(service: ServiceConfig) {
    assert!(!format!("{service:?}").contains("pk.test"));
}

#[rstest]
fn short_queries_skip_the_service(service: ServiceConfig) {
    let builder = StubBuilder::new(StubServices {
        suggestions: vec![north_of_obelisco("never", 0.01)],
        ..StubServices::default()
    });
    let config = SearchConfig {
        query: "co".to_owned(),
        reference: None,
        service,
    };

    let suggestions = execute_search(&config, &builder).expect("search should succeed");

    assert!(suggestions.is_empty());
    assert_eq!(builder.builds.get(), 0);
}

#[rstest]
fn search_ranks_around_the_reference(service: ServiceConfig) {
    let builder = StubBuilder::new(StubServices {
        suggestions: vec![
            north_of_obelisco("far", 0.02),
            Candidate::new("lost", None),
            north_of_obelisco("near", 0.002),
        ],
        ..StubServices::default()
    });
    let config = SearchConfig {
        query: "corrientes".to_owned(),
        reference: Some(OBELISCO),
        service,
    };

    let suggestions = execute_search(&config, &builder).expect("search should succeed");

    let labels: Vec<&str> = suggestions.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["near", "far", "lost"]);
}

#[rstest]
fn offline_search_prints_no_suggestions(service: ServiceConfig) {
    let builder = StubBuilder::new(StubServices {
        suggestions: vec![north_of_obelisco("never", 0.01)],
        offline: true,
        ..StubServices::default()
    });
    let config = SearchConfig {
        query: "corrientes".to_owned(),
        reference: Some(OBELISCO),
        service,
    };

    let suggestions = execute_search(&config, &builder).expect("failure should degrade");

    assert!(suggestions.is_empty());
    assert_eq!(builder.builds.get(), 1);
}

#[rstest]
fn offline_nearby_prints_no_places(service: ServiceConfig) {
    let builder = StubBuilder::new(StubServices {
        pois: vec![north_of_obelisco("cafe", 0.002)],
        offline: true,
        ..StubServices::default()
    });
    let config = NearbyConfig {
        reference: OBELISCO,
        radius_m: DEFAULT_POI_RADIUS_M,
        service,
    };

    let pois = execute_nearby(&config, &builder).expect("failure should degrade");

    assert!(pois.is_empty());
}

#[rstest]
fn nearby_drops_places_beyond_the_radius(service: ServiceConfig) {
    let builder = StubBuilder::new(StubServices {
        pois: vec![
            north_of_obelisco("cafe", 0.002),
            north_of_obelisco("stadium", 0.05),
        ],
        ..StubServices::default()
    });
    let config = NearbyConfig {
        reference: OBELISCO,
        radius_m: 500.0,
        service,
    };

    let pois = execute_nearby(&config, &builder).expect("nearby should succeed");

    let labels: Vec<&str> = pois.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["cafe"]);
}

#[rstest]
#[case(Some(2_900.0), Some(2_900.0))]
#[case(None, None)]
fn route_reconciles_distances(
    service: ServiceConfig,
    #[case] route_length_m: Option<f64>,
    #[case] expected_routed: Option<f64>,
) {
    let builder = StubBuilder::new(StubServices {
        route_length_m,
        ..StubServices::default()
    });
    let config = RouteConfig {
        reference: OBELISCO,
        destination: north_of_obelisco("Plaza", 0.02).with_category("square"),
        service,
    };

    let session = execute_route(&config, &builder).expect("route should not fail");
    let view = session.view();

    assert_eq!(view.routed_m, expected_routed);
    assert_eq!(
        view.destination.as_ref().map(|d| d.kind),
        Some(DestinationKind::FreeText)
    );
    let straight = view.straight_line_m.expect("straight-line distance");
    assert_eq!(view.active_distance_m, Some(expected_routed.unwrap_or(straight)));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "radius": "far" }));

    let err = nearby_config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "radius": 1500.0,
            "api_key": "pk.from-file",
            "timeout_secs": 9,
        }),
        None,
    );
    composer.push_environment(json!({
        "reference": "-34.6037,-58.3816",
        "radius": 1200.0,
    }));
    composer.push_cli(json!({ "radius": 300.0 }));

    let config =
        nearby_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.reference, OBELISCO);
    assert_eq!(config.radius_m, 300.0);
    assert_eq!(config.service.api_key, "pk.from-file");
    assert_eq!(config.service.timeout, Some(Duration::from_secs(9)));
}

#[rstest]
fn merge_layers_read_the_key_from_the_environment() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_environment(json!({
        "reference": "-34.6037,-58.3816",
        "api_key": "pk.from-env",
    }));

    let config =
        nearby_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.service.api_key, "pk.from-env");
}

#[rstest]
fn merge_layers_without_a_key_name_the_nearby_variable() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "reference": "-34.6037,-58.3816" }));

    let err = nearby_config_from_layers_for_test(composer.layers())
        .expect_err("missing key should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_API_KEY);
            assert_eq!(env, ENV_NEARBY_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}
