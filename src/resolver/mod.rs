//! `ExtendedResolver` (C7): multi-upstream async dispatch with retries,
//! load balancing, and a whole-operation deadline.

pub mod config;

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

pub use config::ResolverConfig;

use crate::error::{Result, SentrySecError};

/// Wire-format query/response bytes. Encoding, EDNS assembly, and transport
/// (UDP/TCP/DoT/DoH) are external-collaborator concerns; this crate only
/// dispatches and retries opaque byte buffers.
pub type Query = Vec<u8>;
pub type Message = Vec<u8>;

/// How a child resolver handles a truncated (TC-bit) UDP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    Ignore,
    RetryTcp,
}

/// EDNS0 parameters a resolver attaches to outgoing queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsParams {
    pub udp_payload_size: u16,
    pub dnssec_ok: bool,
}

/// A TSIG key used to sign outgoing queries and verify signed responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsigKey {
    pub name: String,
    pub algorithm: String,
    pub secret: Vec<u8>,
}

/// Capability interface for a single lower-level DNS resolver.
///
/// The configuration setters are broadcast, not per-call: `ExtendedResolver`
/// forwards each one to every child resolver it composes (§6). They default
/// to a no-op so a resolver that doesn't care about a given knob (a test
/// double, a resolver with a fixed transport) isn't forced to implement it.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn send_async(&self, query: &Query) -> std::result::Result<Message, String>;

    fn set_port(&self, _port: u16) {}

    fn set_tcp_mode(&self, _tcp_mode: bool) {}

    fn set_truncation_policy(&self, _policy: TruncationPolicy) {}

    fn set_edns_params(&self, _params: EdnsParams) {}

    fn set_tsig_key(&self, _key: Option<TsigKey>) {}

    fn set_timeout(&self, _timeout: Duration) {}

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

struct ResolverEntry {
    handle: Arc<dyn Resolver>,
    failures: AtomicU32,
}

/// Composes N lower-level [`Resolver`] capabilities into one, dispatching
/// each query across them under a shared timeout, retry budget, and
/// ordering policy.
pub struct ExtendedResolver {
    resolvers: RwLock<Vec<Arc<ResolverEntry>>>,
    config: ResolverConfig,
    rotation: AtomicUsize,
}

impl ExtendedResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            resolvers: RwLock::new(Vec::new()),
            config,
            // Starts at 1 so the first query's snapshot begins its rotation
            // at index 1, not 0 — matches the documented rotation sequence
            // (r1, r2, r0, r1, r2, r0, ...) for a freshly built resolver.
            rotation: AtomicUsize::new(1),
        }
    }

    pub fn add(&self, resolver: Arc<dyn Resolver>) {
        self.resolvers.write().push(Arc::new(ResolverEntry {
            handle: resolver,
            failures: AtomicU32::new(0),
        }));
    }

    pub fn len(&self) -> usize {
        self.resolvers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the resolver at `index` (insertion order). Queries already
    /// in flight hold their own snapshot and are unaffected (§6).
    pub fn remove(&self, index: usize) -> Option<Arc<dyn Resolver>> {
        let mut guard = self.resolvers.write();
        if index < guard.len() {
            Some(guard.remove(index).handle.clone())
        } else {
            None
        }
    }

    /// Current failure counter for the resolver at `index` in insertion
    /// order, for test observability.
    pub fn failures_at(&self, index: usize) -> Option<u32> {
        self.resolvers
            .read()
            .get(index)
            .map(|e| e.failures.load(Ordering::Relaxed))
    }

    /// Broadcast a new destination port to every composed resolver.
    pub fn set_port(&self, port: u16) {
        for entry in self.resolvers.read().iter() {
            entry.handle.set_port(port);
        }
    }

    /// Broadcast TCP-only mode to every composed resolver.
    pub fn set_tcp_mode(&self, tcp_mode: bool) {
        for entry in self.resolvers.read().iter() {
            entry.handle.set_tcp_mode(tcp_mode);
        }
    }

    /// Broadcast a truncated-response policy to every composed resolver.
    pub fn set_truncation_policy(&self, policy: TruncationPolicy) {
        for entry in self.resolvers.read().iter() {
            entry.handle.set_truncation_policy(policy);
        }
    }

    /// Broadcast EDNS0 parameters to every composed resolver.
    pub fn set_edns_params(&self, params: EdnsParams) {
        for entry in self.resolvers.read().iter() {
            entry.handle.set_edns_params(params.clone());
        }
    }

    /// Broadcast a TSIG key (or its removal) to every composed resolver.
    pub fn set_tsig_key(&self, key: Option<TsigKey>) {
        for entry in self.resolvers.read().iter() {
            entry.handle.set_tsig_key(key.clone());
        }
    }

    /// Broadcast a per-send timeout to every composed resolver.
    pub fn set_timeout(&self, timeout: Duration) {
        for entry in self.resolvers.read().iter() {
            entry.handle.set_timeout(timeout);
        }
    }

    /// The whole-operation deadline `resolve` enforces across every
    /// resolver and retry, as opposed to any single child's own timeout.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    fn ordered_snapshot(&self) -> Vec<Arc<ResolverEntry>> {
        let guard = self.resolvers.read();
        let mut list: Vec<Arc<ResolverEntry>> = guard.clone();
        drop(guard);

        if list.is_empty() {
            return list;
        }

        if self.config.load_balance {
            let n = list.len();
            let start = self.rotation.fetch_add(1, Ordering::Relaxed) % n;
            list.rotate_left(start);
        } else {
            list.sort_by_key(|e| e.failures.load(Ordering::Relaxed));
        }
        list
    }

    /// Dispatch `query` across the resolver fleet per §4.6's retry
    /// algorithm, returning the first successful response or the last
    /// underlying error once every `(resolver, attempt)` slot or the
    /// deadline is exhausted.
    pub async fn resolve(&self, query: Query) -> Result<Message> {
        let query_id = Uuid::new_v4();
        let resolvers = self.ordered_snapshot();
        if resolvers.is_empty() {
            return Err(SentrySecError::NoResolvers);
        }

        let n = resolvers.len();
        let mut attempts = vec![0u32; n];
        let deadline = Instant::now() + self.config.timeout;
        let mut current = 0usize;
        let mut last_error = String::new();

        loop {
            if Instant::now() >= deadline {
                error!(%query_id, "deadline exceeded before any resolver succeeded");
                return Err(SentrySecError::Timeout { query_id });
            }

            attempts[current] += 1;
            trace!(%query_id, resolver = current, attempt = attempts[current], "dispatching");

            match resolvers[current].handle.send_async(&query).await {
                Ok(message) => {
                    decay_failures(&resolvers[current].failures);
                    debug!(%query_id, resolver = current, "query succeeded");
                    return Ok(message);
                }
                Err(err) => {
                    resolvers[current].failures.fetch_add(1, Ordering::Relaxed);
                    warn!(%query_id, resolver = current, error = %err, "resolver failed, advancing");
                    last_error = err;
                    current = (current + 1) % n;
                    if attempts[current] >= self.config.retries_per_resolver {
                        error!(%query_id, "all resolvers exhausted");
                        return Err(SentrySecError::AllResolversExhausted { query_id, last_error });
                    }
                    // Yield between attempts so a hot retry loop against an
                    // always-failing fleet can't starve the executor, and so
                    // the deadline check observes externally-advanced time.
                    tokio::task::yield_now().await;
                }
            }
        }
    }
}

/// `f := f > 0 ? floor(ln(f)) : 0`. Tolerates races from concurrent queries
/// touching the same counter — an occasional over- or under-decay is
/// acceptable and self-corrects on the next few successes/failures.
fn decay_failures(counter: &AtomicU32) {
    let prev = counter.load(Ordering::Relaxed);
    if prev == 0 {
        return;
    }
    let next = (prev as f64).ln().floor() as u32;
    counter.store(next, Ordering::Relaxed);
}
