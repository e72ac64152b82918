//! End-to-end client behaviour against an instrumented in-memory backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::cache::{
    BackendStore, CacheClient, CacheClientBuilder, CacheError, CacheStats, CacheValue, ErrorMode,
    ExpiryConvention, LocalCacheConfig, ManualClock, MemoryStore, Timeout,
};

const START: f64 = 1_700_000_000.0;

/// Counts backend traffic and can be switched into failing mode.
struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
    reads: AtomicUsize,
    down: AtomicBool,
}

impl CountingStore {
    fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            inner: MemoryStore::with_clock(clock),
            calls: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            down: AtomicBool::new(false),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn track(&self, read: bool) -> Result<(), CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if read {
            self.reads.fetch_add(1, Ordering::SeqCst);
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("backend unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendStore for CountingStore {
    fn expiry_convention(&self) -> ExpiryConvention {
        self.inner.expiry_convention()
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.track(true)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<(), CacheError> {
        self.track(false)?;
        self.inner.set(key, value, expiry).await
    }

    async fn add(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<bool, CacheError> {
        self.track(false)?;
        self.inner.add(key, value, expiry).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.track(false)?;
        self.inner.delete(key).await
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.track(false)?;
        self.inner.flush().await
    }

    async fn get_multi(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, CacheError> {
        self.track(true)?;
        self.inner.get_multi(keys).await
    }
}

struct Fixture {
    client: CacheClient,
    store: Arc<CountingStore>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    fixture_with(|builder| builder)
}

fn fixture_with(configure: impl FnOnce(CacheClientBuilder) -> CacheClientBuilder) -> Fixture {
    let clock = Arc::new(ManualClock::starting_at(START));
    let store = Arc::new(CountingStore::new(clock.clone()));
    let builder = CacheClient::builder(store.clone())
        .domain("example.com")
        .clock(clock.clone());
    Fixture {
        client: configure(builder).build(),
        store,
        clock,
    }
}

fn strict() -> Fixture {
    fixture_with(|builder| builder.mode(ErrorMode::Strict))
}

fn seconds(s: f64) -> Timeout {
    Timeout::Seconds(s)
}

// ============================================================================
// Plain operations
// ============================================================================

#[tokio::test]
async fn test_values_keep_their_type() {
    let Fixture { mut client, .. } = fixture();
    let object = json!({"title": "front", "tags": ["a", "b"]});

    client.set("flag", true, Timeout::Default).await.unwrap();
    client.set("count", 42, Timeout::Default).await.unwrap();
    client.set("ratio", 0.25, Timeout::Default).await.unwrap();
    client.set("label", "hello", Timeout::Default).await.unwrap();
    client.set("page", object.clone(), Timeout::Default).await.unwrap();

    assert_eq!(client.get("flag").await.unwrap(), Some(CacheValue::Bool(true)));
    assert_eq!(client.get("count").await.unwrap(), Some(CacheValue::Int(42)));
    assert_eq!(client.get("ratio").await.unwrap(), Some(CacheValue::Float(0.25)));
    assert_eq!(client.get("label").await.unwrap(), Some(CacheValue::from("hello")));
    assert_eq!(client.get("page").await.unwrap(), Some(CacheValue::from(object)));
}

#[tokio::test]
async fn test_entry_expires_after_timeout() {
    let Fixture { mut client, clock, .. } = fixture();

    client.set("k", 42, seconds(5.0)).await.unwrap();
    clock.advance(Duration::from_secs(4));
    assert!(client.have("k").await.unwrap());

    let Fixture { mut client, clock, .. } = fixture();
    client.set("k", 42, seconds(5.0)).await.unwrap();
    clock.advance(Duration::from_secs(6));
    assert_eq!(client.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_envelope_expiry_wins_over_backend_retention() {
    let Fixture { mut client, clock, store } = fixture();

    // The backend rounds up to a whole second; the envelope keeps 0.5 s.
    client.set("short", "x", seconds(0.5)).await.unwrap();
    clock.advance(Duration::from_millis(700));

    assert!(store.inner.len() > 0);
    assert_eq!(client.get("short").await.unwrap(), None);
    assert_eq!(client.stats().loose_hits, 1);
}

#[tokio::test]
async fn test_default_timeout_applies() {
    let Fixture { mut client, clock, .. } = fixture_with(|b| b.default_timeout(10.0));

    client.set("k", 1, Timeout::Default).await.unwrap();
    clock.advance(Duration::from_secs(9));
    assert!(client.have("k").await.unwrap());
    clock.advance(Duration::from_secs(2));
    assert!(!client.have("k").await.unwrap());
}

#[tokio::test]
async fn test_domains_share_only_normalized_namespace() {
    let clock = Arc::new(ManualClock::starting_at(START));
    let store: Arc<dyn BackendStore> = Arc::new(MemoryStore::with_clock(clock.clone()));
    let client_for = |domain: &str| {
        CacheClient::builder(store.clone())
            .domain(domain)
            .clock(clock.clone())
            .build()
    };

    let mut plain = client_for("Example.com");
    let mut www = client_for("www.example.com");
    let mut other = client_for("other.org");

    plain.set("k", "shared", Timeout::Default).await.unwrap();
    assert_eq!(www.get("k").await.unwrap(), Some(CacheValue::from("shared")));
    assert_eq!(other.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_disabled_namespacing_uses_raw_names() {
    let Fixture { mut client, store, .. } = fixture_with(|b| b.namespacing(false));

    client.set("raw-name", 1, Timeout::Default).await.unwrap();
    assert!(store.inner.get("raw-name").await.unwrap().is_some());
}

#[tokio::test]
async fn test_add_refuses_existing_entry() {
    let Fixture { mut client, .. } = fixture();

    client.add("k", 1, Timeout::Default).await.unwrap();
    client.add("k", 2, Timeout::Default).await.unwrap();

    assert_eq!(client.get("k").await.unwrap(), Some(CacheValue::Int(1)));
    assert!(matches!(client.errors(), [CacheError::WriteFailure { name, .. }] if name == "k"));

    let Fixture { mut client, .. } = strict();
    client.add("k", 1, Timeout::Default).await.unwrap();
    let result = client.add("k", 2, Timeout::Default).await;
    assert!(matches!(result, Err(CacheError::WriteFailure { .. })));
}

#[tokio::test]
async fn test_add_succeeds_over_expired_entry() {
    let Fixture { mut client, clock, .. } = fixture();

    client.set("k", 1, seconds(1.0)).await.unwrap();
    clock.advance(Duration::from_secs(2));
    client.add("k", 2, Timeout::Default).await.unwrap();

    assert!(client.errors().is_empty());
    assert_eq!(client.get("k").await.unwrap(), Some(CacheValue::Int(2)));
}

#[tokio::test]
async fn test_add_claims_entry_stale_within_backend_second() {
    let Fixture { mut client, clock, store } = fixture();

    client.set("k", 1, seconds(0.5)).await.unwrap();
    clock.advance(Duration::from_millis(700));
    assert!(store.inner.len() > 0);
    assert!(!client.have("k").await.unwrap());

    client.add("k", 2, Timeout::Default).await.unwrap();
    assert!(client.errors().is_empty());
    assert_eq!(client.get("k").await.unwrap(), Some(CacheValue::Int(2)));
}

#[tokio::test]
async fn test_add_claims_unreadable_entry() {
    let Fixture { mut client, store, .. } = strict();

    let key = client.namespace().key("k");
    store.inner.set(&key, b"not an envelope".to_vec(), START as u64 + 600).await.unwrap();

    client.add("k", 5, Timeout::Default).await.unwrap();
    assert_eq!(client.get("k").await.unwrap(), Some(CacheValue::Int(5)));
}

#[tokio::test]
async fn test_non_finite_timeout_is_rejected() {
    let Fixture { mut client, store, .. } = fixture();

    client.set("inf", 1, seconds(f64::INFINITY)).await.unwrap();
    client.set_many(vec![("nan", 1)], seconds(f64::NAN)).await.unwrap();

    assert_eq!(store.calls(), 0);
    assert_eq!(client.stats().sets, 0);
    assert!(matches!(client.errors(), [CacheError::Operation(_), CacheError::Operation(_)]));

    let Fixture { mut client, .. } = strict();
    let result = client.add("inf", 1, seconds(f64::NEG_INFINITY)).await;
    assert!(matches!(result, Err(CacheError::Operation(_))));
}

#[tokio::test]
async fn test_batch_reads_are_keyed_by_logical_name() {
    let Fixture { mut client, store, .. } = fixture();

    client
        .set_many([("a", 1), ("b", 2)], Timeout::Default)
        .await
        .unwrap();
    let reads_before = store.reads();
    let fetched = client.get_many(&["a", "b", "missing"]).await.unwrap();

    assert_eq!(store.reads() - reads_before, 1);
    assert_eq!(fetched.len(), 3);
    assert_eq!(fetched["a"], Some(CacheValue::Int(1)));
    assert_eq!(fetched["b"], Some(CacheValue::Int(2)));
    assert_eq!(fetched["missing"], None);
}

#[tokio::test]
async fn test_have_many_requires_every_name() {
    let Fixture { mut client, .. } = fixture();

    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 2, Timeout::Default).await.unwrap();

    assert!(client.have_many(&["a", "b"]).await.unwrap());
    assert!(!client.have_many(&["a", "c"]).await.unwrap());
}

#[tokio::test]
async fn test_delete_and_delete_checked() {
    let Fixture { mut client, .. } = fixture();

    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 2, Timeout::Default).await.unwrap();
    client.delete("a").await.unwrap();
    assert_eq!(client.get("a").await.unwrap(), None);

    assert!(client.delete_checked("b").await.unwrap());
    assert!(!client.delete_checked("b").await.unwrap());
    assert!(!client.delete_many_checked(&["a", "b"]).await.unwrap());
}

#[tokio::test]
async fn test_flush_empties_backend_and_local_cache() {
    let Fixture { mut client, store, .. } = fixture();

    client.set("a", 1, Timeout::Default).await.unwrap();
    assert!(client.have("a").await.unwrap());
    client.flush().await.unwrap();

    let reads_before = store.reads();
    assert_eq!(client.get("a").await.unwrap(), None);
    assert_eq!(store.reads() - reads_before, 1);
}

#[tokio::test]
async fn test_stats_count_lookups_writes_and_misses() {
    let Fixture { mut client, .. } = fixture();

    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 2, Timeout::Default).await.unwrap();
    client.get("a").await.unwrap();
    client.get_many(&["b", "c"]).await.unwrap();
    client.have("d").await.unwrap();

    assert_eq!(
        client.stats(),
        CacheStats {
            hits: 4,
            sets: 2,
            loose_hits: 2,
        }
    );
}

// ============================================================================
// Local read cache
// ============================================================================

#[tokio::test]
async fn test_status_read_serves_next_get_once() {
    let Fixture { mut client, store, .. } = fixture();
    client.set("x", "small", Timeout::Default).await.unwrap();

    assert!(client.have("x").await.unwrap());
    assert_eq!(store.reads(), 1);

    assert_eq!(client.get("x").await.unwrap(), Some(CacheValue::from("small")));
    assert_eq!(store.reads(), 1);

    assert_eq!(client.get("x").await.unwrap(), Some(CacheValue::from("small")));
    assert_eq!(store.reads(), 2);
}

#[tokio::test]
async fn test_oversized_values_bypass_local_cache() {
    let Fixture { mut client, store, .. } = fixture_with(|b| {
        b.local_cache(LocalCacheConfig {
            item_size_limit: 64,
            ..LocalCacheConfig::default()
        })
    });
    client.set("big", "x".repeat(200), Timeout::Default).await.unwrap();

    assert!(client.have("big").await.unwrap());
    client.get("big").await.unwrap();
    assert_eq!(store.reads(), 2);
}

#[tokio::test]
async fn test_write_invalidates_local_copy() {
    let Fixture { mut client, .. } = fixture();
    client.set("x", 1, Timeout::Default).await.unwrap();

    assert!(client.have("x").await.unwrap());
    client.set("x", 2, Timeout::Default).await.unwrap();
    assert_eq!(client.get("x").await.unwrap(), Some(CacheValue::Int(2)));
}

#[tokio::test]
async fn test_disabled_local_cache_always_reads_backend() {
    let Fixture { mut client, store, .. } =
        fixture_with(|b| b.local_cache(LocalCacheConfig::disabled()));
    client.set("x", 1, Timeout::Default).await.unwrap();

    client.have("x").await.unwrap();
    client.get("x").await.unwrap();
    assert_eq!(store.reads(), 2);
}

// ============================================================================
// Arithmetic
// ============================================================================

#[tokio::test]
async fn test_identity_arithmetic_never_touches_backend() {
    let Fixture { mut client, store, .. } = fixture();

    client.inc("n", 0, Timeout::Default).await.unwrap();
    client.dec("n", 0, Timeout::Default).await.unwrap();
    client.mult("n", 1, Timeout::Default).await.unwrap();
    client.mult("n", 1.0, Timeout::Default).await.unwrap();

    assert_eq!(store.calls(), 0);
    assert!(client.errors().is_empty());
}

#[tokio::test]
async fn test_integer_arithmetic_stays_integral() {
    let Fixture { mut client, .. } = fixture();
    client.set("n", 10, Timeout::Default).await.unwrap();

    client.inc("n", 5, Timeout::Default).await.unwrap();
    client.dec("n", 3, Timeout::Default).await.unwrap();
    client.mult("n", 4, Timeout::Default).await.unwrap();
    assert_eq!(client.get("n").await.unwrap(), Some(CacheValue::Int(48)));

    client.div("n", 8, Timeout::Default).await.unwrap();
    assert_eq!(client.get("n").await.unwrap(), Some(CacheValue::Float(6.0)));
}

#[tokio::test]
async fn test_integer_overflow_promotes_to_float() {
    let Fixture { mut client, .. } = fixture();
    client.set("n", i64::MAX, Timeout::Default).await.unwrap();

    client.inc("n", 1, Timeout::Default).await.unwrap();
    assert!(matches!(client.get("n").await.unwrap(), Some(CacheValue::Float(_))));
}

#[tokio::test]
async fn test_arithmetic_on_missing_entry_is_noop() {
    let Fixture { mut client, store, .. } = fixture();
    client.set("a", 1, Timeout::Default).await.unwrap();
    let calls_before = store.calls();

    client.inc("missing", 1, Timeout::Default).await.unwrap();
    client.inc_many(&["a", "missing"], 1, Timeout::Default).await.unwrap();

    // Only the reads happened.
    assert_eq!(store.calls() - calls_before, 2);
    assert_eq!(client.get("a").await.unwrap(), Some(CacheValue::Int(1)));
    assert!(client.errors().is_empty());
}

#[tokio::test]
async fn test_arithmetic_uses_given_timeout() {
    let Fixture { mut client, clock, .. } = fixture();
    client.set("n", 1, seconds(100.0)).await.unwrap();

    client.inc("n", 1, seconds(2.0)).await.unwrap();
    clock.advance(Duration::from_secs(3));
    assert_eq!(client.get("n").await.unwrap(), None);
}

#[tokio::test]
async fn test_division_by_zero_silent_and_strict() {
    let Fixture { mut client, store, .. } = fixture();
    client.div("n", 0, Timeout::Default).await.unwrap();
    assert_eq!(client.errors(), &[CacheError::DivisionByZero]);
    assert_eq!(store.calls(), 0);

    assert_eq!(client.take_errors().len(), 1);
    assert!(client.errors().is_empty());

    let Fixture { mut client, .. } = strict();
    let result = client.div("n", 0.0, Timeout::Default).await;
    assert!(matches!(result, Err(CacheError::DivisionByZero)));
}

#[tokio::test]
async fn test_non_numeric_base_is_reported() {
    let Fixture { mut client, .. } = fixture();
    client.set("label", "text", Timeout::Default).await.unwrap();

    client.inc("label", 1, Timeout::Default).await.unwrap();
    assert!(matches!(client.errors(), [CacheError::NotNumeric { name }] if name == "label"));
    assert_eq!(client.get("label").await.unwrap(), Some(CacheValue::from("text")));
}

// ============================================================================
// Tags
// ============================================================================

#[tokio::test]
async fn test_tag_records_members() {
    let Fixture { mut client, .. } = fixture();

    client.tag("T");
    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 2, Timeout::Default).await.unwrap();
    client.set("a", 3, Timeout::Default).await.unwrap();
    client.untag();
    client.set("c", 4, Timeout::Default).await.unwrap();

    client.tag("T");
    assert_eq!(client.tag_members().await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_batch_writes_record_members() {
    let Fixture { mut client, .. } = fixture();

    client.tag("T");
    client
        .set_many(vec![("a", 1), ("b", 2)], Timeout::Default)
        .await
        .unwrap();
    client
        .add_many(vec![("c", 3), ("a", 4)], Timeout::Default)
        .await
        .unwrap();

    assert_eq!(client.tag_members().await.unwrap(), vec!["a", "b", "c"]);
    assert!(matches!(client.errors(), [CacheError::WriteFailure { name, .. }] if name == "a"));
}

#[tokio::test]
async fn test_index_traffic_is_not_counted() {
    let Fixture { mut client, .. } = fixture();

    client.tag("T").set("a", 1, Timeout::Default).await.unwrap();
    client.tag_members().await.unwrap();

    assert_eq!(client.stats(), CacheStats { hits: 0, sets: 1, loose_hits: 0 });
}

#[tokio::test]
async fn test_delete_by_tag_removes_members_and_index() {
    let Fixture { mut client, .. } = fixture();

    client.tag("T");
    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 2, Timeout::Default).await.unwrap();
    client.untag().set("c", 3, Timeout::Default).await.unwrap();

    client.tag("T").delete_by_tag().await.unwrap();

    assert_eq!(client.get("a").await.unwrap(), None);
    assert_eq!(client.get("b").await.unwrap(), None);
    assert_eq!(client.get("c").await.unwrap(), Some(CacheValue::Int(3)));
    assert!(client.tag_members().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_by_tag_overwrites_every_member() {
    let Fixture { mut client, .. } = fixture();

    client.tag("T");
    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 2, Timeout::Default).await.unwrap();
    client.set_by_tag("reset", Timeout::Default).await.unwrap();

    let fetched = client.get_by_tag().await.unwrap();
    assert_eq!(fetched["a"], Some(CacheValue::from("reset")));
    assert_eq!(fetched["b"], Some(CacheValue::from("reset")));
}

#[tokio::test]
async fn test_add_by_tag_refills_only_missing_members() {
    let Fixture { mut client, .. } = fixture();

    client.tag("T");
    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 2, Timeout::Default).await.unwrap();
    client.untag().delete("a").await.unwrap();

    client.tag("T").add_by_tag(0, Timeout::Default).await.unwrap();

    assert_eq!(client.get("a").await.unwrap(), Some(CacheValue::Int(0)));
    assert_eq!(client.get("b").await.unwrap(), Some(CacheValue::Int(2)));
    assert_eq!(client.errors().len(), 1);
}

#[tokio::test]
async fn test_arithmetic_by_tag_skips_missing_members() {
    let Fixture { mut client, .. } = fixture();

    client.tag("T");
    client.set("a", 1, Timeout::Default).await.unwrap();
    client.set("b", 10, Timeout::Default).await.unwrap();
    client.set("gone", 5, Timeout::Default).await.unwrap();
    client.untag().delete("gone").await.unwrap();

    client.tag("T");
    client.inc_by_tag(2, Timeout::Default).await.unwrap();
    client.mult_by_tag(3, Timeout::Default).await.unwrap();
    client.dec_by_tag(1, Timeout::Default).await.unwrap();
    client.div_by_tag(2, Timeout::Default).await.unwrap();

    let fetched = client.get_by_tag().await.unwrap();
    assert_eq!(fetched["a"], Some(CacheValue::Float(4.0)));
    assert_eq!(fetched["b"], Some(CacheValue::Float(17.5)));
    assert_eq!(fetched["gone"], None);
    assert!(client.errors().is_empty());
}

#[tokio::test]
async fn test_tag_scoped_operations_require_a_tag() {
    let Fixture { mut client, store, .. } = fixture();

    client.set_by_tag(1, Timeout::Default).await.unwrap();
    client.delete_by_tag().await.unwrap();
    assert!(client.get_by_tag().await.unwrap().is_empty());
    assert_eq!(client.errors().len(), 3);
    assert!(matches!(
        client.errors()[0],
        CacheError::UnsetTag { operation: "set" }
    ));
    assert_eq!(store.calls(), 0);

    let Fixture { mut client, .. } = strict();
    let result = client.inc_by_tag(1, Timeout::Default).await;
    assert!(matches!(result, Err(CacheError::UnsetTag { operation: "inc" })));
}

#[tokio::test]
async fn test_tag_index_outlives_its_members() {
    let Fixture { mut client, clock, .. } = fixture_with(|b| b.tag_timeout(60.0));

    client.tag("T");
    client.set("long", 1, seconds(7200.0)).await.unwrap();
    client.set("short", 2, seconds(5.0)).await.unwrap();

    clock.advance(Duration::from_secs(3600));
    assert_eq!(client.tag_members().await.unwrap(), vec!["long", "short"]);
    assert_eq!(client.get("long").await.unwrap(), Some(CacheValue::Int(1)));
}

#[tokio::test]
async fn test_multiple_tags_record_everywhere() {
    let Fixture { mut client, .. } = fixture();

    client.tag(vec!["left", "right"]);
    client.set("a", 1, Timeout::Default).await.unwrap();

    client.tag("left");
    assert_eq!(client.tag_members().await.unwrap(), vec!["a"]);
    client.tag("right");
    assert_eq!(client.tag_members().await.unwrap(), vec!["a"]);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_transport_failure_on_read_is_a_miss_in_silent_mode() {
    let Fixture { mut client, store, .. } = fixture();
    client.set("a", 1, Timeout::Default).await.unwrap();
    store.go_down();

    assert_eq!(client.get("a").await.unwrap(), None);
    assert!(matches!(client.errors(), [CacheError::Connection(_)]));
}

#[tokio::test]
async fn test_transport_failure_surfaces_in_strict_mode() {
    let Fixture { mut client, store, .. } = strict();
    store.go_down();

    assert!(matches!(client.get("a").await, Err(CacheError::Connection(_))));
    assert!(matches!(
        client.set("a", 1, Timeout::Default).await,
        Err(CacheError::Connection(_))
    ));
    assert!(client.errors().is_empty());
}

#[tokio::test]
async fn test_mode_can_change_mid_session() {
    let Fixture { mut client, .. } = fixture();

    client.div("n", 0, Timeout::Default).await.unwrap();
    client.set_mode(ErrorMode::Strict);
    assert_eq!(client.mode(), ErrorMode::Strict);
    assert!(client.div("n", 0, Timeout::Default).await.is_err());
    assert_eq!(client.errors().len(), 1);
}
