#![no_main]

use ferrous_wire::{
    implements, Component, Constructor, DependencyKey, DiError, Lifecycle, Resolver,
    ServiceCollection,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

trait Node: Send + Sync {}

struct Leaf;
impl Node for Leaf {}
impl Component for Leaf {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Leaf))]
    }
}
implements!(Leaf: dyn Node);

// Depends on the default Node, so it cycles when registered first.
struct Wrapper;
impl Node for Wrapper {}
impl Component for Wrapper {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| {
            args.next::<dyn Node>()?;
            Ok(Wrapper)
        })
        .param::<dyn Node>()]
    }
}
implements!(Wrapper: dyn Node);

struct Group;
impl Node for Group {}
impl Component for Group {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| {
            args.next_all::<dyn Node>()?;
            Ok(Group)
        })
        .all::<dyn Node>()]
    }
}
implements!(Group: dyn Node);

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte: number of lookups; the rest drive registrations and keys
    let (head, body) = data.split_at(1);
    let lookups = (head[0] % 8) as usize;
    let (plan, keys) = body.split_at(body.len().saturating_sub(lookups));

    let mut services = ServiceCollection::new();
    for byte in plan.iter().take(16) {
        let lifecycle = if byte & 0x80 != 0 { Lifecycle::Singleton } else { Lifecycle::PerRequest };
        let result = match byte % 3 {
            0 => services.register::<dyn Node, Leaf>(lifecycle),
            1 => services.register::<dyn Node, Wrapper>(lifecycle),
            _ => services.register::<dyn Node, Group>(lifecycle),
        };
        assert!(result.is_ok());
    }
    let registered = services.len();
    let provider = services.build();

    for &key in keys {
        let key = DependencyKey::new(key as usize % 20);
        match provider.resolve_keyed::<dyn Node>(key) {
            Ok(first) => {
                let second = provider.resolve_keyed::<dyn Node>(key).unwrap();
                let singleton = provider.lookup::<dyn Node>().unwrap()[key.ordinal()].lifecycle.is_singleton();
                assert_eq!(Arc::ptr_eq(&first, &second), singleton);
            }
            Err(DiError::NotRegistered(_)) => assert_eq!(registered, 0),
            Err(DiError::KeyOutOfRange { registered: count, .. }) => {
                assert_eq!(count, registered);
                assert!(key.ordinal() >= registered);
            }
            Err(DiError::CyclicDependency(path)) => assert!(path.len() >= 2),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
});
