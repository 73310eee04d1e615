/// Integration tests for counter names and event accounting

#[cfg(feature = "stats")]
#[cfg(test)]
mod tests {
    use deferval::{ttl_cache, CounterRegistry, Counters, ManualClock, TtlCache};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct EventLog(Mutex<Vec<String>>);

    impl Counters for EventLog {
        fn increment(&self, name: &str) {
            self.0.lock().push(name.to_string());
        }
    }

    #[test]
    fn test_default_names() {
        let registry = Arc::new(CounterRegistry::new());
        let cache = ttl_cache(
            "users",
            || Ok::<_, String>(3),
            Duration::from_secs(60),
            registry.clone(),
        );

        cache.get().unwrap();

        let mut names = registry.list();
        names.sort();
        assert_eq!(
            names,
            vec![
                "ttl_cache.cacheFetch.users".to_string(),
                "ttl_cache.cacheGet.users".to_string()
            ]
        );
    }

    #[test]
    fn test_component_override() {
        let log = Arc::new(EventLog::default());
        let cache = TtlCache::builder("feed", || Ok::<_, ()>("items"))
            .component("rss")
            .counters(log.clone())
            .build();

        cache.get().unwrap();
        cache.get().unwrap();

        assert_eq!(
            *log.0.lock(),
            vec!["rss.cacheFetch.feed", "rss.cacheGet.feed", "rss.cacheGet.feed"]
        );
    }

    #[test]
    fn test_failed_get_counts_fetch_but_not_get() {
        let registry = Arc::new(CounterRegistry::new());
        let clock = Arc::new(ManualClock::new(0));
        let cache = TtlCache::builder("broken", || Err::<u8, _>("no route"))
            .lifetime(Duration::from_nanos(10))
            .counters(registry.clone())
            .clock(clock.clone())
            .build();

        assert!(cache.get().is_err());
        assert!(cache.get().is_err());
        clock.advance(Duration::from_nanos(10));
        assert!(cache.get().is_err());

        assert_eq!(registry.get("ttl_cache.cacheFetch.broken"), 2);
        assert_eq!(registry.get("ttl_cache.cacheGet.broken"), 0);
    }

    #[test]
    fn test_caches_share_one_registry() {
        let registry = Arc::new(CounterRegistry::new());
        let a = ttl_cache("a", || Ok::<_, ()>(1), Duration::from_secs(60), registry.clone());
        let b = ttl_cache("b", || Ok::<_, ()>(2), Duration::from_secs(60), registry.clone());

        a.get().unwrap();
        b.get().unwrap();
        b.get().unwrap();

        let totals = registry.snapshot();
        assert_eq!(totals["ttl_cache.cacheGet.a"], 1);
        assert_eq!(totals["ttl_cache.cacheGet.b"], 2);
        assert_eq!(totals["ttl_cache.cacheFetch.b"], 1);
    }
}
