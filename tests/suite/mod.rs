//! Backend-generic compliance suite for the storage contract.
//!
//! Each backend's integration tests declare a [`TestHarness`] and call
//! [`run_suite`], so every backend is held to the same semantics.

use lodestore::{Database, DbIterator, StoreError, StoreResult};

/// A test harness for exercising one backend.
pub trait TestHarness {
    /// Create a fresh, empty store.
    fn create_store() -> StoreResult<Box<dyn Database>>;
}

/// Run the full contract suite against a backend.
pub fn run_suite<H: TestHarness>() {
    set_get_delete::<H>();
    empty_keys_and_values::<H>();
    batch_semantics::<H>();
    batch_close::<H>();
    concurrent_batch_staging::<H>();
    forward_iterator_domain::<H>();
    reverse_iterator_domain::<H>();
    unbounded_iteration::<H>();
    empty_domain_yields_nothing::<H>();
    sticky_invalidity::<H>();
    domain_is_reported_unmodified::<H>();
    end_to_end_scenario::<H>();
}

fn create<H: TestHarness>() -> Box<dyn Database> {
    H::create_store().expect("failed to create store")
}

fn seed(store: &dyn Database, pairs: &[(&[u8], &[u8])]) {
    for (key, value) in pairs {
        store.set(key, value).expect("failed to seed");
    }
}

/// Walk an iterator to exhaustion, collecting every visited pair.
fn drain(iter: &mut Box<dyn DbIterator>) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut visited = Vec::new();
    while iter.valid() {
        visited.push((
            iter.key().expect("key on valid iterator").to_vec(),
            iter.value().expect("value on valid iterator").to_vec(),
        ));
        iter.next().expect("next on valid iterator");
    }
    visited
}

fn keys(visited: &[(Vec<u8>, Vec<u8>)]) -> Vec<Vec<u8>> {
    visited.iter().map(|(k, _)| k.clone()).collect()
}

fn set_get_delete<H: TestHarness>() {
    let store = create::<H>();

    assert_eq!(store.get(b"k").unwrap(), None);
    assert!(!store.has(b"k").unwrap());

    store.set(b"k", b"v").unwrap();
    assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    assert!(store.has(b"k").unwrap());

    store.set(b"k", b"v2").unwrap();
    assert_eq!(store.get(b"k").unwrap(), Some(b"v2".to_vec()));

    store.delete(b"k").unwrap();
    assert_eq!(store.get(b"k").unwrap(), None);
    assert!(!store.has(b"k").unwrap());

    // deleting a missing key is not an error
    store.delete(b"k").unwrap();

    // sync variants behave identically
    store.set_sync(b"s", b"v").unwrap();
    assert_eq!(store.get(b"s").unwrap(), Some(b"v".to_vec()));
    store.delete_sync(b"s").unwrap();
    assert_eq!(store.get(b"s").unwrap(), None);
}

fn empty_keys_and_values<H: TestHarness>() {
    let store = create::<H>();

    // the empty key is a real key
    store.set(b"", b"empty-key").unwrap();
    assert_eq!(store.get(b"").unwrap(), Some(b"empty-key".to_vec()));
    assert!(store.has(b"").unwrap());

    // an empty value is present, distinct from absent
    store.set(b"k", b"").unwrap();
    assert_eq!(store.get(b"k").unwrap(), Some(Vec::new()));
    assert!(store.has(b"k").unwrap());

    store.delete(b"").unwrap();
    assert!(!store.has(b"").unwrap());
}

fn batch_semantics<H: TestHarness>() {
    let store = create::<H>();
    store.set(b"pre", b"existing").unwrap();

    let batch = store.batch().unwrap();
    batch.set(b"k", b"v1").unwrap();
    batch.set(b"k", b"v2").unwrap();
    batch.set(b"gone", b"staged").unwrap();
    batch.delete(b"gone").unwrap();
    batch.delete(b"pre").unwrap();

    // nothing is visible before the flush
    assert_eq!(store.get(b"k").unwrap(), None);
    assert_eq!(store.get(b"pre").unwrap(), Some(b"existing".to_vec()));

    batch.write().unwrap();

    // last write wins
    assert_eq!(store.get(b"k").unwrap(), Some(b"v2".to_vec()));
    // the delete marker survived the earlier set
    assert_eq!(store.get(b"gone").unwrap(), None);
    assert_eq!(store.get(b"pre").unwrap(), None);

    // the drained batch can be reused
    batch.set(b"again", b"v").unwrap();
    batch.write_sync().unwrap();
    assert_eq!(store.get(b"again").unwrap(), Some(b"v".to_vec()));
}

fn batch_close<H: TestHarness>() {
    let store = create::<H>();

    let batch = store.batch().unwrap();
    batch.set(b"k", b"v").unwrap();
    batch.close();

    assert!(matches!(batch.set(b"k", b"v"), Err(StoreError::Closed)));
    assert!(matches!(batch.write(), Err(StoreError::Closed)));
    assert_eq!(store.get(b"k").unwrap(), None);
}

fn concurrent_batch_staging<H: TestHarness>() {
    let store = create::<H>();
    let batch = store.batch().unwrap();

    std::thread::scope(|s| {
        for t in 0..4u8 {
            let batch = &batch;
            s.spawn(move || {
                for i in 0..25u8 {
                    batch.set(&[t, i], &[i]).unwrap();
                }
            });
        }
    });
    batch.write().unwrap();

    for t in 0..4u8 {
        for i in 0..25u8 {
            assert_eq!(store.get(&[t, i]).unwrap(), Some(vec![i]));
        }
    }
}

fn forward_iterator_domain<H: TestHarness>() {
    let store = create::<H>();
    seed(&*store, &[(b"a", b"1"), (b"b", b"2"), (b"c", b"3"), (b"d", b"4"), (b"e", b"5")]);

    let mut iter = store.iterator(Some(b"b"), Some(b"d")).unwrap();
    let visited = drain(&mut iter);
    assert_eq!(keys(&visited), vec![b"b".to_vec(), b"c".to_vec()]);

    // start bound lands on the next entry when the key is missing
    let mut iter = store.iterator(Some(b"bb"), Some(b"e")).unwrap();
    assert_eq!(keys(&drain(&mut iter)), vec![b"c".to_vec(), b"d".to_vec()]);

    // unset start begins at the first entry
    let mut iter = store.iterator(None, Some(b"c")).unwrap();
    assert_eq!(keys(&drain(&mut iter)), vec![b"a".to_vec(), b"b".to_vec()]);

    // unset end runs to exhaustion
    let mut iter = store.iterator(Some(b"d"), None).unwrap();
    assert_eq!(keys(&drain(&mut iter)), vec![b"d".to_vec(), b"e".to_vec()]);
}

fn reverse_iterator_domain<H: TestHarness>() {
    let store = create::<H>();
    seed(&*store, &[(b"a", b"1"), (b"b", b"2"), (b"c", b"3"), (b"d", b"4"), (b"e", b"5")]);

    // end is exclusive: the scan starts below it
    let mut iter = store.reverse_iterator(Some(b"b"), Some(b"d")).unwrap();
    assert_eq!(keys(&drain(&mut iter)), vec![b"c".to_vec(), b"b".to_vec()]);

    // end between entries anchors on the last entry under it
    let mut iter = store.reverse_iterator(None, Some(b"bb")).unwrap();
    assert_eq!(keys(&drain(&mut iter)), vec![b"b".to_vec(), b"a".to_vec()]);

    // end past the last entry starts at the last entry
    let mut iter = store.reverse_iterator(Some(b"c"), Some(b"zz")).unwrap();
    assert_eq!(
        keys(&drain(&mut iter)),
        vec![b"e".to_vec(), b"d".to_vec(), b"c".to_vec()]
    );

    // unset end starts at the last entry; start stays inclusive
    let mut iter = store.reverse_iterator(Some(b"d"), None).unwrap();
    assert_eq!(keys(&drain(&mut iter)), vec![b"e".to_vec(), b"d".to_vec()]);
}

fn unbounded_iteration<H: TestHarness>() {
    let store = create::<H>();
    seed(&*store, &[(b"a", b"1"), (b"b", b"2"), (b"c", b"3")]);

    let mut iter = store.iterator(None, None).unwrap();
    let visited = drain(&mut iter);
    assert_eq!(
        visited,
        vec![
            (b"a".to_vec(), b"1".to_vec()),
            (b"b".to_vec(), b"2".to_vec()),
            (b"c".to_vec(), b"3".to_vec()),
        ]
    );

    let mut iter = store.reverse_iterator(None, None).unwrap();
    assert_eq!(keys(&drain(&mut iter)), vec![b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]);
}

fn empty_domain_yields_nothing<H: TestHarness>() {
    let store = create::<H>();
    seed(&*store, &[(b"a", b"1"), (b"m", b"2"), (b"z", b"3")]);

    let mut iter = store.iterator(Some(b"m"), Some(b"m")).unwrap();
    assert!(!iter.valid());
    assert!(drain(&mut iter).is_empty());

    let mut iter = store.reverse_iterator(Some(b"m"), Some(b"m")).unwrap();
    assert!(!iter.valid());
    assert!(drain(&mut iter).is_empty());

    // an empty store behaves the same with no bounds at all
    let empty = create::<H>();
    let iter = empty.iterator(None, None).unwrap();
    assert!(!iter.valid());
}

fn sticky_invalidity<H: TestHarness>() {
    let store = create::<H>();
    seed(&*store, &[(b"a", b"1"), (b"b", b"2")]);

    let mut iter = store.iterator(None, None).unwrap();
    drain(&mut iter);
    assert!(!iter.valid());

    // contract violations fail on every call, not just the first
    for _ in 0..3 {
        assert!(matches!(iter.key(), Err(StoreError::InvalidIterator)));
        assert!(matches!(iter.value(), Err(StoreError::InvalidIterator)));
        assert!(matches!(iter.next(), Err(StoreError::InvalidIterator)));
        assert!(!iter.valid());
    }

    // closing an iterator mid-scan also invalidates it for good
    let mut iter = store.iterator(None, None).unwrap();
    assert!(iter.valid());
    iter.close();
    assert!(!iter.valid());
    assert!(matches!(iter.key(), Err(StoreError::InvalidIterator)));
    assert!(matches!(iter.next(), Err(StoreError::InvalidIterator)));
}

fn domain_is_reported_unmodified<H: TestHarness>() {
    let store = create::<H>();
    seed(&*store, &[(b"a", b"1")]);

    let iter = store.iterator(Some(b"b"), Some(b"d")).unwrap();
    assert_eq!(iter.domain(), (Some(b"b".as_slice()), Some(b"d".as_slice())));

    let iter = store.reverse_iterator(None, Some(b"d")).unwrap();
    assert_eq!(iter.domain(), (None, Some(b"d".as_slice())));

    let iter = store.iterator(None, None).unwrap();
    assert_eq!(iter.domain(), (None, None));
}

fn end_to_end_scenario<H: TestHarness>() {
    let store = create::<H>();
    seed(&*store, &[(b"a", b"1"), (b"b", b"2"), (b"c", b"3"), (b"d", b"4")]);

    let mut iter = store.iterator(Some(b"b"), Some(b"d")).unwrap();
    assert_eq!(
        drain(&mut iter),
        vec![(b"b".to_vec(), b"2".to_vec()), (b"c".to_vec(), b"3".to_vec())]
    );

    let mut iter = store.reverse_iterator(Some(b"b"), Some(b"d")).unwrap();
    assert_eq!(
        drain(&mut iter),
        vec![(b"c".to_vec(), b"3".to_vec()), (b"b".to_vec(), b"2".to_vec())]
    );
}
