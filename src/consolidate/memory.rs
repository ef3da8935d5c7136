use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// Per-host memory of version strings that have already been reported.
///
/// Strings are kept as the exact bytes matched, so equality is byte
/// equality. Entries are only ever added. Implementations must be shareable across the
/// worker threads that consolidate responses.
pub trait HostMemory: Send + Sync {
    /// Strings recorded for `host` so far (empty for an unknown host)
    fn seen_strings(&self, host: &str) -> HashSet<Vec<u8>>;

    /// Add every string to the host's set
    fn record_all(&self, host: &str, strings: &[&[u8]]);

    /// Record `strings` and report whether any of them was new for `host`.
    ///
    /// The default is a plain query followed by a record, so two callers
    /// racing on the same host may both see a string as new. Stores that can
    /// do better override this with an atomic version.
    fn record_novel(&self, host: &str, strings: &[&[u8]]) -> bool {
        let seen = self.seen_strings(host);
        let novel = strings.iter().any(|s| !seen.contains(*s));
        self.record_all(host, strings);
        novel
    }

    /// Number of hosts with at least one recorded string
    fn host_count(&self) -> usize;
}

type SeenSet = Arc<Mutex<HashSet<Vec<u8>>>>;

/// Unbounded in-process store, one lock per host.
///
/// The outer map lock is held only long enough to find or create a host's
/// set, so work on different hosts never waits on each other's sets.
#[derive(Debug, Default)]
pub struct InMemoryHostStore {
    hosts: RwLock<HashMap<String, SeenSet>>,
}

impl InMemoryHostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn host_set(&self, host: &str) -> SeenSet {
        if let Some(set) = self.hosts.read().get(host) {
            return Arc::clone(set);
        }
        let mut hosts = self.hosts.write();
        Arc::clone(hosts.entry(host.to_string()).or_default())
    }
}

impl HostMemory for InMemoryHostStore {
    fn seen_strings(&self, host: &str) -> HashSet<Vec<u8>> {
        let set = match self.hosts.read().get(host) {
            Some(set) => Arc::clone(set),
            None => return HashSet::new(),
        };
        let guard = set.lock();
        guard.clone()
    }

    fn record_all(&self, host: &str, strings: &[&[u8]]) {
        if strings.is_empty() {
            return;
        }
        let set = self.host_set(host);
        let mut guard = set.lock();
        guard.extend(strings.iter().map(|s| s.to_vec()));
    }

    fn record_novel(&self, host: &str, strings: &[&[u8]]) -> bool {
        if strings.is_empty() {
            return false;
        }
        let set = self.host_set(host);
        let mut guard = set.lock();
        let mut novel = false;
        for s in strings {
            if !guard.contains(*s) {
                guard.insert(s.to_vec());
                novel = true;
            }
        }
        novel
    }

    fn host_count(&self) -> usize {
        self.hosts.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<'a>(texts: &[&'a str]) -> Vec<&'a [u8]> {
        texts.iter().map(|t| t.as_bytes()).collect()
    }

    #[test]
    fn test_unknown_host_is_empty_and_not_created() {
        let store = InMemoryHostStore::new();
        assert!(store.seen_strings("example.com").is_empty());
        assert_eq!(store.host_count(), 0);
    }

    #[test]
    fn test_record_all_is_idempotent() {
        let store = InMemoryHostStore::new();
        store.record_all("example.com", &keys(&["Apache/2.2.4", "PHP/5.6"]));
        let first = store.seen_strings("example.com");
        store.record_all("example.com", &keys(&["Apache/2.2.4", "PHP/5.6"]));
        assert_eq!(store.seen_strings("example.com"), first);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_hosts_are_independent() {
        let store = InMemoryHostStore::new();
        store.record_all("a.example", &keys(&["nginx/1.18.0"]));
        assert!(store.seen_strings("b.example").is_empty());
        assert!(store.record_novel("b.example", &keys(&["nginx/1.18.0"])));
        assert_eq!(store.host_count(), 2);
    }

    #[test]
    fn test_record_novel() {
        let store = InMemoryHostStore::new();
        assert!(store.record_novel("example.com", &keys(&["Apache/2.2.4"])));
        assert!(!store.record_novel("example.com", &keys(&["Apache/2.2.4"])));
        assert!(store.record_novel("example.com", &keys(&["Apache/2.2.4", "PHP/5.6"])));
        assert!(!store.record_novel("example.com", &keys(&["PHP/5.6", "PHP/5.6"])));
        // exact equality only
        assert!(store.record_novel("example.com", &keys(&["php/5.6"])));
    }

    #[test]
    fn test_record_novel_compares_raw_bytes() {
        let store = InMemoryHostStore::new();
        assert!(store.record_novel("example.com", &[b"Foo/1.0\xe9".as_slice()]));
        assert!(store.record_novel("example.com", &[b"Foo/1.0\xe8".as_slice()]));
        assert!(!store.record_novel("example.com", &[b"Foo/1.0\xe9".as_slice()]));
    }

    #[test]
    fn test_record_novel_empty_does_not_create_host() {
        let store = InMemoryHostStore::new();
        assert!(!store.record_novel("example.com", &[]));
        assert_eq!(store.host_count(), 0);
    }

    /// A store that only has the default, non-atomic `record_novel`
    #[derive(Default)]
    struct PlainStore(InMemoryHostStore);

    impl HostMemory for PlainStore {
        fn seen_strings(&self, host: &str) -> HashSet<Vec<u8>> {
            self.0.seen_strings(host)
        }
        fn record_all(&self, host: &str, strings: &[&[u8]]) {
            self.0.record_all(host, strings)
        }
        fn host_count(&self) -> usize {
            self.0.host_count()
        }
    }

    #[test]
    fn test_default_record_novel() {
        let store = PlainStore::default();
        assert!(store.record_novel("example.com", &keys(&["Jetty(9.4.z)"])));
        assert!(!store.record_novel("example.com", &keys(&["Jetty(9.4.z)"])));
        assert_eq!(store.seen_strings("example.com").len(), 1);
    }

    #[test]
    fn test_concurrent_record_novel_reports_once() {
        let store = Arc::new(InMemoryHostStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.record_novel("example.com", &[b"IIS/10.0".as_slice()]))
            })
            .collect();
        let novel = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&n| n)
            .count();
        assert_eq!(novel, 1);
    }
}
