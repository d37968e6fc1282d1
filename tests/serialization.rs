/// JSON surfaces behind the `config` and `graph-export` features
#[allow(unused_imports)]
use ferrous_wire::{Component, Constructor, ResolverOptions, ServiceCollection, SingletonSharing};

#[cfg(feature = "config")]
#[test]
fn test_options_round_trip_through_json() {
    let options = ResolverOptions::new()
        .singleton_sharing(SingletonSharing::PerImplementation)
        .max_depth(32);

    let value = serde_json::to_value(&options).unwrap();
    assert_eq!(value["singleton_sharing"], "per-implementation");
    assert_eq!(value["max_depth"], 32);

    let parsed = ResolverOptions::from_json(&value.to_string()).unwrap();
    assert_eq!(parsed, options);
}

#[cfg(feature = "config")]
#[test]
fn test_options_json_defaults_and_clamping() {
    let parsed = ResolverOptions::from_json(&serde_json::json!({ "max_depth": 0 }).to_string()).unwrap();
    assert_eq!(parsed.sharing(), SingletonSharing::PerContract);
    assert_eq!(parsed.depth_limit(), 1);

    let bad = serde_json::json!({ "singleton_sharing": "per-thread" }).to_string();
    assert!(matches!(
        ResolverOptions::from_json(&bad),
        Err(ferrous_wire::DiError::InvalidOptions(_))
    ));
}

#[cfg(feature = "graph-export")]
mod graph {
    use super::*;
    use ferrous_wire::DependencyGraph;

    struct Source;
    impl Component for Source {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|_| Ok(Source))]
        }
    }

    struct Sink;
    impl Component for Sink {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|args| {
                args.next_all::<Source>()?;
                Ok(Sink)
            })
            .all::<Source>()]
        }
    }

    #[test]
    fn test_graph_json_round_trip() {
        let mut sc = ServiceCollection::new();
        sc.add_singleton::<Source, Source>().unwrap();
        sc.add_per_request::<Source, Source>().unwrap();
        sc.add_per_request::<Sink, Sink>().unwrap();
        let graph = DependencyGraph::from_descriptors(&sc.descriptors());

        let json = graph.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["edges"].as_array().unwrap().len(), 2);
        assert_eq!(value["nodes"][0]["lifecycle"], "singleton");
        assert_eq!(value["edges"][0]["kind"], "collection");
        assert_eq!(value["metadata"]["has_cycles"], false);

        let parsed: DependencyGraph = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, graph);
    }
}
