//! Integration tests: full proxy-to-probe scenarios with producer threads,
//! trigger parity across mutation paths, and codec round-trips over a
//! captured stream.

use std::sync::Arc;
use std::time::Duration;

use stream_probe::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ──────────────────── trigger fixtures ────────────────────

/// Normalizes every committed name to lowercase.
struct NormalizeNames;

impl EntryTrigger<String, String> for NormalizeNames {
    fn before_commit(&self, entry: &mut TriggerEntry<String, String>) -> Result<()> {
        let rewritten = entry.value().map(|value| value.to_lowercase());
        if let Some(value) = rewritten {
            entry.set_value(value);
        }
        Ok(())
    }
}

/// Vetoes any value containing whitespace.
struct RejectWhitespace;

impl EntryTrigger<String, String> for RejectWhitespace {
    fn before_commit(&self, entry: &mut TriggerEntry<String, String>) -> Result<()> {
        match entry.value() {
            Some(value) if value.contains(char::is_whitespace) => {
                Err(veto("whitespace in value"))
            }
            _ => Ok(()),
        }
    }
}

fn seeded_proxy(addr: &CacheAddress) -> InMemoryProxy<String, String> {
    let proxy = InMemoryProxy::new();
    proxy.ensure_cache(addr);
    proxy
        .register_trigger(addr, Arc::new(NormalizeNames))
        .expect("register trigger");
    proxy
}

// ──────────────────── proxy streaming scenarios ────────────────────

#[test]
fn proxied_entries_stream_across_threads_in_key_order() {
    init_tracing();
    let addr = CacheAddress::new("it-scope", "names");
    let proxy = seeded_proxy(&addr);
    for (key, value) in [("b", "Beta"), ("a", "Alpha"), ("c", "Gamma")] {
        proxy.put(&addr, key.into(), value.into()).expect("seed");
    }

    let probe: Arc<StreamProbe<(String, String), ProbeError>> = Arc::new(StreamProbe::new());
    proxy.stream_entries(&addr, probe.clone());

    assert!(probe.await_terminal(Duration::from_secs(30)));
    probe
        .assert_complete()
        .and_then(StreamProbe::assert_no_errors)
        .and_then(|p| p.assert_value_count(3))
        .expect("entry stream");
    // Values carry the trigger-normalized form, keys arrive ordered.
    assert_eq!(
        probe.values(),
        vec![
            ("a".to_string(), "alpha".to_string()),
            ("b".to_string(), "beta".to_string()),
            ("c".to_string(), "gamma".to_string()),
        ]
    );
}

#[test]
fn proxied_and_direct_mutations_observe_the_same_triggers() {
    init_tracing();
    let addr = CacheAddress::new("it-scope", "parity");
    let proxy = seeded_proxy(&addr);
    proxy
        .register_trigger(&addr, Arc::new(RejectWhitespace))
        .expect("register veto trigger");
    let handle = proxy.ensure_cache(&addr);

    // Rewrite parity: both paths commit the normalized value.
    proxy
        .put(&addr, "via-proxy".into(), "MiXeD".into())
        .expect("proxied put");
    handle
        .write()
        .put("direct".into(), "AlSo".into())
        .expect("direct put");
    assert_eq!(
        proxy.get(&addr, &"via-proxy".to_string()).expect("get"),
        Some("mixed".to_string())
    );
    assert_eq!(
        handle.read().get(&"direct".to_string()).cloned(),
        Some("also".to_string())
    );

    // Veto parity: both paths refuse the same mutation and change nothing.
    let proxied = proxy
        .put(&addr, "bad".into(), "has space".into())
        .expect_err("proxied veto");
    let direct = handle
        .write()
        .put("bad".into(), "has space".into())
        .expect_err("direct veto");
    assert_eq!(proxied.code(), "SPB-4101");
    assert_eq!(direct.code(), "SPB-4101");
    assert_eq!(proxy.get(&addr, &"bad".to_string()).expect("get"), None);
}

#[test]
fn discard_sink_satisfies_a_caller_that_needs_some_receiver() {
    init_tracing();
    let addr = CacheAddress::new("it-scope", "ignored");
    let proxy = seeded_proxy(&addr);
    proxy
        .put(&addr, "k".into(), "v".into())
        .expect("seed entry");

    // The scenario does not care about this stream's outcome at all.
    proxy.stream_entries(&addr, Arc::new(DiscardSink));
    // Unknown address: the discard sink swallows the error outcome too.
    proxy.stream_entries(&CacheAddress::new("it-scope", "ghost"), Arc::new(DiscardSink));
}

// ──────────────────── forwarding chain ────────────────────

#[test]
fn forwarding_probe_bridges_a_proxy_stream_to_a_downstream_receiver() {
    init_tracing();
    let addr = CacheAddress::new("it-scope", "bridge");
    let proxy = seeded_proxy(&addr);
    for (key, value) in [("one", "1"), ("two", "2")] {
        proxy.put(&addr, key.into(), value.into()).expect("seed");
    }

    let downstream: Arc<StreamProbe<(String, String), ProbeError>> = Arc::new(StreamProbe::new());
    let bridge: Arc<StreamProbe<(String, String), ProbeError>> =
        Arc::new(StreamProbe::forwarding(downstream.clone()));
    proxy.stream_entries(&addr, bridge.clone());

    assert!(bridge.await_terminal(Duration::from_secs(30)));
    // The bridge is transparent: the downstream saw the identical stream.
    assert_eq!(downstream.values(), bridge.values());
    downstream
        .assert_complete()
        .and_then(|p| p.assert_value_count(2))
        .expect("forwarded stream");
}

// ──────────────────── live feed scenarios ────────────────────

#[test]
fn live_feed_capture_with_error_outcome() {
    init_tracing();
    let probe: Arc<StreamProbe<u64, ProbeError>> = Arc::new(StreamProbe::new());
    let (feed, producer) = spawn_live::<u64, ProbeError>(probe.clone());

    feed.send(StreamEvent::Next(1)).expect("send");
    feed.send(StreamEvent::Next(2)).expect("send");
    feed.send(StreamEvent::Error(ProbeError::ChannelClosed {
        component: "upstream",
    }))
    .expect("terminal send");

    assert!(probe.await_terminal(Duration::from_secs(30)));
    producer.join().expect("producer exit");
    assert_eq!(probe.values(), vec![1, 2]);
    let cause = probe.first_error().expect("captured cause");
    assert_eq!(cause.code(), "SPB-4103");
    probe.assert_value_count(2).expect("both values captured");
}

// ──────────────────── codec over a captured stream ────────────────────

#[derive(Debug, Clone, PartialEq)]
struct AuditEvent {
    sequence: i64,
    actor: String,
    allowed: bool,
}

const F_SEQUENCE: u32 = 0;
const F_ACTOR: u32 = 1;
const F_ALLOWED: u32 = 2;

impl WireRecord for AuditEvent {
    fn write_fields(&self, writer: &mut dyn FieldWriter) -> Result<()> {
        writer.write_i64(F_SEQUENCE, self.sequence)?;
        writer.write_string(F_ACTOR, &self.actor)?;
        writer.write_bool(F_ALLOWED, self.allowed)?;
        Ok(())
    }

    fn read_fields(reader: &mut dyn FieldReader) -> Result<Self> {
        Ok(Self {
            sequence: reader.read_i64(F_SEQUENCE)?,
            actor: reader.read_string(F_ACTOR)?,
            allowed: reader.read_bool(F_ALLOWED)?,
        })
    }
}

#[test]
fn encoded_records_survive_a_proxied_stream_round_trip() {
    init_tracing();
    let events = vec![
        AuditEvent {
            sequence: 1,
            actor: "alice".into(),
            allowed: true,
        },
        AuditEvent {
            sequence: 2,
            actor: "bob".into(),
            allowed: false,
        },
    ];

    let addr = CacheAddress::new("it-scope", "audit");
    let proxy: InMemoryProxy<i64, FieldBuffer> = InMemoryProxy::new();
    proxy.ensure_cache(&addr);
    for event in &events {
        let buffer = FieldBuffer::encode(event).expect("encode");
        proxy.put(&addr, event.sequence, buffer).expect("seed");
    }

    let probe: Arc<StreamProbe<(i64, FieldBuffer), ProbeError>> = Arc::new(StreamProbe::new());
    proxy.stream_entries(&addr, probe.clone());

    assert!(probe.await_terminal(Duration::from_secs(30)));
    probe
        .assert_complete()
        .and_then(|p| p.assert_value_count(2))
        .expect("buffer stream");
    let decoded: Vec<AuditEvent> = probe
        .values()
        .into_iter()
        .map(|(_, buffer)| buffer.decode().expect("decode"))
        .collect();
    assert_eq!(decoded, events);
}
