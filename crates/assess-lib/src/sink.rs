//! Persistence sinks for per-VM assessment metrics
//!
//! The engine hands every completed VM set to a [`MetricsSink`]. Duplicate
//! submissions (same customer and document code) are a sink policy: either
//! overwrite with a warning or reject with a conflict.
//!
//! [`MemorySink`] is a bounded in-process store for single-instance
//! deployments and tests; it does not survive a restart.

use crate::error::SinkError;
use crate::models::{CustomerContext, SourceKind, VmRecord, VmSet};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Records per-VM metrics for later analytics
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Record a VM set; `Ok(Some(_))` carries a warning for the caller
    async fn record(
        &self,
        vms: &VmSet,
        assessment_id: &str,
        source: SourceKind,
        context: &CustomerContext,
    ) -> Result<Option<String>, SinkError>;
}

/// What a sink does with a repeated customer/document submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Overwrite,
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!("unknown duplicate policy: {}", other)),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Overwrite => f.write_str("overwrite"),
            DuplicatePolicy::Reject => f.write_str("reject"),
        }
    }
}

/// One recorded assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAssessment {
    pub assessment_id: String,
    pub source_type: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_code: Option<String>,
    pub recorded_at: i64,
    pub vms: Vec<VmRecord>,
}

/// Records kept by a [`MemorySink`] unless configured otherwise
pub const DEFAULT_SINK_CAPACITY: usize = 10_000;

/// Identity of a stored assessment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RecordKey {
    Document {
        customer_id: String,
        document_code: String,
    },
    /// Submissions without both customer and document code never collide
    Assessment(String),
}

impl RecordKey {
    fn new(assessment_id: &str, context: &CustomerContext) -> Self {
        match (&context.customer_id, &context.document_code) {
            (Some(customer), Some(code)) => RecordKey::Document {
                customer_id: customer.clone(),
                document_code: code.clone(),
            },
            _ => RecordKey::Assessment(assessment_id.to_string()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Document {
                customer_id,
                document_code,
            } => write!(f, "{}/{}", customer_id, document_code),
            RecordKey::Assessment(id) => f.write_str(id),
        }
    }
}

#[derive(Debug)]
struct Slot {
    /// Write order; the lowest is evicted first
    seq: u64,
    assessment: StoredAssessment,
}

/// In-process sink keyed by customer and document code.
///
/// Holds at most `capacity` assessments; the least recently written one is
/// evicted when a new key would exceed it.
#[derive(Debug)]
pub struct MemorySink {
    records: DashMap<RecordKey, Slot>,
    policy: DuplicatePolicy,
    capacity: usize,
    next_seq: AtomicU64,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl MemorySink {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self::with_capacity(policy, DEFAULT_SINK_CAPACITY)
    }

    /// A capacity of zero is treated as one
    pub fn with_capacity(policy: DuplicatePolicy, capacity: usize) -> Self {
        Self {
            records: DashMap::new(),
            policy,
            capacity: capacity.max(1),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a recorded assessment by id
    pub fn get(&self, assessment_id: &str) -> Option<StoredAssessment> {
        self.records
            .iter()
            .find(|entry| entry.value().assessment.assessment_id == assessment_id)
            .map(|entry| entry.value().assessment.clone())
    }

    fn slot(&self, assessment: StoredAssessment) -> Slot {
        Slot {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            assessment,
        }
    }

    /// Must not be called while holding an entry guard
    fn evict_overflow(&self) {
        while self.records.len() > self.capacity {
            let oldest = self
                .records
                .iter()
                .min_by_key(|entry| entry.value().seq)
                .map(|entry| entry.key().clone());
            let Some(key) = oldest else { break };
            if let Some((key, slot)) = self.records.remove(&key) {
                debug!(
                    key = %key,
                    assessment_id = %slot.assessment.assessment_id,
                    "Evicted oldest assessment metrics"
                );
            }
        }
    }
}

#[async_trait]
impl MetricsSink for MemorySink {
    async fn record(
        &self,
        vms: &VmSet,
        assessment_id: &str,
        source: SourceKind,
        context: &CustomerContext,
    ) -> Result<Option<String>, SinkError> {
        let key = RecordKey::new(assessment_id, context);
        let stored = StoredAssessment {
            assessment_id: assessment_id.to_string(),
            source_type: source,
            customer_id: context.customer_id.clone(),
            document_code: context.document_code.clone(),
            recorded_at: chrono::Utc::now().timestamp(),
            vms: vms.as_slice().to_vec(),
        };

        let outcome = match self.records.entry(key.clone()) {
            Entry::Occupied(mut existing) => match self.policy {
                DuplicatePolicy::Overwrite => {
                    existing.insert(self.slot(stored));
                    Ok(Some(format!("overwriting existing assessment for {}", key)))
                }
                DuplicatePolicy::Reject => Err(SinkError::Conflict {
                    customer_id: context.customer_id.clone().unwrap_or_default(),
                    document_code: context.document_code.clone().unwrap_or_default(),
                }),
            },
            Entry::Vacant(slot) => {
                debug!(key = %key, vms = vms.len(), "Recorded assessment metrics");
                slot.insert(self.slot(stored));
                Ok(None)
            }
        };

        self.evict_overflow();
        outcome
    }
}

/// Sink that records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl MetricsSink for NullSink {
    async fn record(
        &self,
        _vms: &VmSet,
        _assessment_id: &str,
        _source: SourceKind,
        _context: &CustomerContext,
    ) -> Result<Option<String>, SinkError> {
        Ok(None)
    }
}
