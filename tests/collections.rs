use ferrous_wire::{Component, Constructor, DiError, Resolver, ServiceCollection, implements};
use std::sync::Arc;

trait Plugin: Send + Sync {
    fn id(&self) -> char;
}

macro_rules! plugin {
    ($name:ident, $id:literal) => {
        struct $name;
        impl Plugin for $name {
            fn id(&self) -> char {
                $id
            }
        }
        impl Component for $name {
            fn constructors() -> Vec<Constructor<Self>> {
                vec![Constructor::new(|_| Ok($name))]
            }
        }
        implements!($name: dyn Plugin);
    };
}

plugin!(X, 'x');
plugin!(Y, 'y');
plugin!(Z, 'z');

fn xyz() -> ServiceCollection {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<dyn Plugin, X>().unwrap();
    sc.add_singleton::<dyn Plugin, Y>().unwrap();
    sc.add_per_request::<dyn Plugin, Z>().unwrap();
    sc
}

fn ids(plugins: &[Arc<dyn Plugin>]) -> String {
    plugins.iter().map(|p| p.id()).collect()
}

#[test]
fn test_collection_preserves_registration_order() {
    let sp = xyz().build();
    for _ in 0..10 {
        assert_eq!(ids(&sp.resolve_all::<dyn Plugin>().unwrap()), "xyz");
    }
}

#[test]
fn test_collection_respects_lifecycles() {
    let sp = xyz().build();
    let first = sp.resolve_all::<dyn Plugin>().unwrap();
    let second = sp.resolve_all::<dyn Plugin>().unwrap();

    assert!(!Arc::ptr_eq(&first[0], &second[0]));
    assert!(Arc::ptr_eq(&first[1], &second[1]));
    assert!(!Arc::ptr_eq(&first[2], &second[2]));

    // the singleton at position 1 is the same one keyed lookup returns
    let keyed = sp.resolve_keyed::<dyn Plugin>(1usize).unwrap();
    assert!(Arc::ptr_eq(&first[1], &keyed));
}

#[test]
fn test_empty_collection_is_not_registered() {
    let sp = ServiceCollection::new().build();
    assert!(matches!(sp.resolve_all::<dyn Plugin>(), Err(DiError::NotRegistered(_))));
}

struct Host {
    plugins: Vec<Arc<dyn Plugin>>,
}
impl Component for Host {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Host { plugins: args.next_all()? })).all::<dyn Plugin>()]
    }
}

#[test]
fn test_collection_constructor_parameter() {
    let mut sc = xyz();
    sc.add_per_request::<Host, Host>().unwrap();
    let host = sc.build().resolve::<Host>().unwrap();
    assert_eq!(ids(&host.plugins), "xyz");
}

#[test]
fn test_collection_parameter_without_registrations_fails() {
    let mut sc = ServiceCollection::new();
    sc.add_per_request::<Host, Host>().unwrap();
    match sc.build().resolve::<Host>() {
        Err(DiError::NotRegistered(name)) => assert!(name.contains("Plugin")),
        other => panic!("expected NotRegistered, got {:?}", other.err()),
    }
}

struct Broken;
impl Plugin for Broken {
    fn id(&self) -> char {
        '!'
    }
}
impl Component for Broken {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| {
            args.next::<Host>()?;
            Ok(Broken)
        })
        .param::<Host>()]
    }
}
implements!(Broken: dyn Plugin);

#[test]
fn test_one_failing_element_fails_the_collection() {
    let mut sc = xyz();
    sc.add_per_request::<dyn Plugin, Broken>().unwrap();
    let sp = sc.build();

    // Broken needs Host, which is not registered
    assert!(matches!(sp.resolve_all::<dyn Plugin>(), Err(DiError::NotRegistered(_))));
    // the other positions are still resolvable on their own
    assert_eq!(sp.resolve::<dyn Plugin>().unwrap().id(), 'x');
}
