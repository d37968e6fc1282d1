use ferrous_wire::{
    Component, Constructor, ContractId, DependencyKey, DiError, DiObserver, LoggingObserver, Resolver,
    ServiceCollection, implements,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

fn short(contract: &ContractId) -> &'static str {
    contract.name().rsplit("::").next().unwrap_or(contract.name())
}

impl DiObserver for Recorder {
    fn resolving(&self, contract: &ContractId, key: DependencyKey) {
        self.events.lock().unwrap().push(format!("resolving {}[{key}]", short(contract)));
    }

    fn resolved(&self, contract: &ContractId, key: DependencyKey, _elapsed: Duration) {
        self.events.lock().unwrap().push(format!("resolved {}[{key}]", short(contract)));
    }

    fn failed(&self, contract: &ContractId, key: DependencyKey, _error: &DiError) {
        self.events.lock().unwrap().push(format!("failed {}[{key}]", short(contract)));
    }
}

trait Source: Send + Sync {}

struct Feed;
impl Source for Feed {}
impl Component for Feed {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Feed))]
    }
}
implements!(Feed: dyn Source);

struct Reader;
impl Component for Reader {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| {
            args.next::<dyn Source>()?;
            Ok(Reader)
        })
        .param::<dyn Source>()]
    }
}

#[test]
fn test_nested_resolutions_are_observed() {
    let recorder = Arc::new(Recorder::default());
    let mut sc = ServiceCollection::new();
    sc.add_observer(recorder.clone());
    sc.add_per_request::<dyn Source, Feed>().unwrap();
    sc.add_per_request::<Reader, Reader>().unwrap();
    let sp = sc.build();

    sp.resolve::<Reader>().unwrap();
    assert_eq!(
        recorder.take(),
        vec!["resolving Reader[0]", "resolving Source[0]", "resolved Source[0]", "resolved Reader[0]"]
    );
}

#[test]
fn test_failures_are_reported_at_every_level() {
    let recorder = Arc::new(Recorder::default());
    let mut sc = ServiceCollection::new();
    sc.add_observer(recorder.clone());
    sc.add_per_request::<Reader, Reader>().unwrap();
    let sp = sc.build();

    assert!(sp.resolve::<Reader>().is_err());
    assert_eq!(
        recorder.take(),
        vec!["resolving Reader[0]", "resolving Source[0]", "failed Source[0]", "failed Reader[0]"]
    );
}

#[test]
fn test_collection_elements_are_observed_by_position() {
    let recorder = Arc::new(Recorder::default());
    let mut sc = ServiceCollection::new();
    sc.add_observer(recorder.clone());
    sc.add_per_request::<dyn Source, Feed>().unwrap();
    sc.add_singleton::<dyn Source, Feed>().unwrap();
    let sp = sc.build();

    assert_eq!(sp.resolve_all::<dyn Source>().unwrap().len(), 2);
    assert_eq!(
        recorder.take(),
        vec!["resolving Source[0]", "resolved Source[0]", "resolving Source[1]", "resolved Source[1]"]
    );
}

#[test]
fn test_logging_observer_emits_through_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut sc = ServiceCollection::new();
        sc.add_observer(Arc::new(LoggingObserver::new().slow_threshold(Duration::ZERO)));
        sc.add_per_request::<dyn Source, Feed>().unwrap();
        sc.add_per_request::<Reader, Reader>().unwrap();
        let sp = sc.build();

        assert!(sp.resolve::<Reader>().is_ok());
        assert!(sp.resolve::<dyn Source>().is_ok());
    });
}
