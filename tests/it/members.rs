use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use polymock::*;

#[fake]
trait Store {
    fn get(&self, key: &str) -> Option<String>;

    #[fake(member = hits)]
    fn hits(&self) -> &u64;

    #[fake(member = hits)]
    fn hits_mut(&mut self) -> &mut u64;

    #[fake(member = cache)]
    fn cache(&self) -> &Cache;

    #[fake(member = cache)]
    fn cache_mut(&mut self) -> &mut Cache;
}

#[derive(Default)]
struct Cache {
    entries: Vec<String>,
    drops: Option<Arc<AtomicUsize>>,
}

impl Drop for Cache {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn accessors_are_not_dispatched() {
    assert_eq!(&["get"], <dyn Store as Interface>::METHODS);
    assert_eq!(&["hits", "cache"], <dyn Store as Interface>::MEMBERS);
}

#[test]
fn stubbed_member_starts_at_default_and_round_trips() {
    let mut store = Proxy::<dyn Store>::new();

    assert_eq!(0, *store.stub_data_member::<StoreFake::hits>().unwrap());
    assert_eq!(0, *store.get().hits());

    *store.get_mut().hits_mut() += 3;
    assert_eq!(3, *store.get().hits());
    assert_eq!(3, *store.member::<StoreFake::hits>().unwrap());

    store
        .stub_data_member::<StoreFake::cache>()
        .unwrap()
        .entries
        .push("a".to_string());
    store.get_mut().cache_mut().entries.push("b".to_string());
    assert_eq!(vec!["a", "b"], store.get().cache().entries);
}

#[test]
fn members_are_dropped_exactly_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    {
        let mut store = Proxy::<dyn Store>::new();
        store.stub_data_member::<StoreFake::cache>().unwrap().drops = Some(drops.clone());

        store.stub_data_member::<StoreFake::cache>().unwrap().drops = Some(drops.clone());
        assert_eq!(1, drops.load(Ordering::SeqCst));
    }

    assert_eq!(2, drops.load(Ordering::SeqCst));
}

#[test]
fn unstubbed_member_is_an_error() {
    let store = Proxy::<dyn Store>::new();

    assert!(matches!(
        store.member::<StoreFake::hits>(),
        Err(FakeError::MemberNotStubbed {
            interface: "Store",
            member: "hits"
        })
    ));
}

#[test]
#[should_panic(expected = "Store::hits: Data member accessed before it was stubbed.")]
fn reading_an_unstubbed_member_through_the_object_panics() {
    let store = Proxy::<dyn Store>::new();

    let _ = store.get().hits();
}

#[test]
fn members_and_methods_coexist() {
    let mut store = Proxy::<dyn Store>::new();
    store.stub_data_member::<StoreFake::hits>().unwrap();
    store
        .stub::<StoreFake::get>(
            ArgMatcher::using(("k".to_string(),)),
            Behavior::returns(Some("v".to_string())).into(),
        )
        .unwrap();

    assert_eq!(Some("v".to_string()), store.get().get("k"));
    assert_eq!(0, *store.get().hits());
}
