use ferrous_wire::{
    Component, Constructor, DependencyKey, DiError, Resolver, ResolverOptions, ServiceCollection,
    implements,
};
use std::sync::Arc;

trait Alpha: Send + Sync {}
trait Beta: Send + Sync {}

struct AlphaImpl;
impl Alpha for AlphaImpl {}
impl Component for AlphaImpl {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| {
            args.next::<dyn Beta>()?;
            Ok(AlphaImpl)
        })
        .param::<dyn Beta>()]
    }
}
implements!(AlphaImpl: dyn Alpha);

struct BetaImpl;
impl Beta for BetaImpl {}
impl Component for BetaImpl {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| {
            args.next::<dyn Alpha>()?;
            Ok(BetaImpl)
        })
        .param::<dyn Alpha>()]
    }
}
implements!(BetaImpl: dyn Beta);

fn cycle_path(result: Result<impl Sized, DiError>) -> Vec<String> {
    match result {
        Err(DiError::CyclicDependency(path)) => path,
        Err(other) => panic!("expected CyclicDependency, got {other:?}"),
        Ok(_) => panic!("expected CyclicDependency, got a value"),
    }
}

#[test]
fn test_two_node_cycle_reports_path() {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<dyn Alpha, AlphaImpl>().unwrap();
    sc.add_per_request::<dyn Beta, BetaImpl>().unwrap();
    let sp = sc.build();

    let path = cycle_path(sp.resolve::<dyn Alpha>());
    assert_eq!(path.len(), 3);
    assert!(path[0].contains("Alpha") && path[0].ends_with("[0]"));
    assert!(path[1].contains("Beta"));
    assert_eq!(path[0], path[2]);
}

#[test]
fn test_cycle_through_singletons_is_detected() {
    let mut sc = ServiceCollection::new();
    sc.add_singleton::<dyn Alpha, AlphaImpl>().unwrap();
    sc.add_singleton::<dyn Beta, BetaImpl>().unwrap();
    let sp = sc.build();

    cycle_path(sp.resolve::<dyn Beta>());
    assert_eq!(sp.singleton_stats().cached, 0);
}

struct Narcissus;
impl Component for Narcissus {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| {
            args.next::<Narcissus>()?;
            Ok(Narcissus)
        })
        .param::<Narcissus>()]
    }
}

#[test]
fn test_self_dependency() {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<Narcissus, Narcissus>().unwrap();
    let sp = sc.build();

    let path = cycle_path(sp.resolve::<Narcissus>());
    assert_eq!(path.len(), 2);
    assert_eq!(path[0], path[1]);
}

// Position 1 depends on position 0 of the same contract: not a cycle.
trait Layer: Send + Sync {
    fn depth(&self) -> usize;
}

struct Base;
impl Layer for Base {
    fn depth(&self) -> usize {
        0
    }
}
impl Component for Base {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Base))]
    }
}
implements!(Base: dyn Layer);

struct Decorator {
    inner: Arc<dyn Layer>,
}
impl Layer for Decorator {
    fn depth(&self) -> usize {
        self.inner.depth() + 1
    }
}
impl Component for Decorator {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Decorator { inner: args.next()? })).param::<dyn Layer>()]
    }
}
implements!(Decorator: dyn Layer);

#[test]
fn test_same_contract_different_key_is_not_a_cycle() {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<dyn Layer, Base>().unwrap();
    sc.add_per_request::<dyn Layer, Decorator>().unwrap();
    let sp = sc.build();

    let layer = sp.resolve_keyed::<dyn Layer>(DependencyKey::new(1)).unwrap();
    assert_eq!(layer.depth(), 1);
}

#[test]
fn test_decorator_at_default_position_is_a_cycle() {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<dyn Layer, Decorator>().unwrap();
    let sp = sc.build();

    cycle_path(sp.resolve::<dyn Layer>());
}

#[test]
fn test_collection_element_cycle() {
    struct Aggregate;
    impl Layer for Aggregate {
        fn depth(&self) -> usize {
            0
        }
    }
    impl Component for Aggregate {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|args| {
                args.next_all::<dyn Layer>()?;
                Ok(Aggregate)
            })
            .all::<dyn Layer>()]
        }
    }
    implements!(Aggregate: dyn Layer);

    let mut sc = ServiceCollection::new();
    sc.add_per_request::<dyn Layer, Base>().unwrap();
    sc.add_per_request::<dyn Layer, Aggregate>().unwrap();
    let sp = sc.build();

    let path = cycle_path(sp.resolve_keyed::<dyn Layer>(DependencyKey::new(1)));
    assert!(path.last().unwrap().ends_with("[1]"));
}

#[test]
fn test_stack_is_released_after_failure() {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<dyn Alpha, AlphaImpl>().unwrap();
    sc.add_per_request::<dyn Beta, BetaImpl>().unwrap();
    sc.add_per_request::<dyn Layer, Base>().unwrap();
    let sp = sc.build();

    assert!(sp.resolve::<dyn Alpha>().is_err());
    assert!(sp.resolve::<dyn Layer>().is_ok());
    assert!(matches!(sp.resolve::<dyn Beta>(), Err(DiError::CyclicDependency(_))));
}

// A chain of distinct contracts deeper than the configured limit.
struct Chain<const N: usize>;

macro_rules! chain {
    ($($n:literal => $next:literal),+) => {
        $(
            impl Component for Chain<$n> {
                fn constructors() -> Vec<Constructor<Self>> {
                    vec![Constructor::new(|args| {
                        args.next::<Chain<$next>>()?;
                        Ok(Chain)
                    })
                    .param::<Chain<$next>>()]
                }
            }
        )+
    };
}

chain!(0 => 1, 1 => 2, 2 => 3, 3 => 4);

impl Component for Chain<4> {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Chain))]
    }
}

fn chain_collection() -> ServiceCollection {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<Chain<0>, Chain<0>>().unwrap();
    sc.add_per_request::<Chain<1>, Chain<1>>().unwrap();
    sc.add_per_request::<Chain<2>, Chain<2>>().unwrap();
    sc.add_per_request::<Chain<3>, Chain<3>>().unwrap();
    sc.add_per_request::<Chain<4>, Chain<4>>().unwrap();
    sc
}

#[test]
fn test_depth_limit() {
    let shallow = chain_collection().build_with(ResolverOptions::new().max_depth(3));
    assert_eq!(shallow.resolve::<Chain<0>>().err(), Some(DiError::DepthExceeded(3)));

    let deep_enough = chain_collection().build_with(ResolverOptions::new().max_depth(5));
    assert!(deep_enough.resolve::<Chain<0>>().is_ok());
}
