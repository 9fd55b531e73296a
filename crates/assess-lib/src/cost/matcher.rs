//! Best-fit instance selection
//!
//! Offers are stable-sorted by hourly price once, so the first offer that
//! covers a VM is the cheapest fit and equal prices keep catalog order.

use crate::models::{InstanceOffer, VmRecord};
use std::cmp::Ordering;
use tracing::debug;

/// Outcome of matching one VM against a catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// Cheapest offer covering the VM's demand
    BestFit(&'a InstanceOffer),
    /// The VM exceeds every offer; the most expensive one is used
    Fallback(&'a InstanceOffer),
}

impl<'a> Selection<'a> {
    pub fn offer(&self) -> &'a InstanceOffer {
        match self {
            Selection::BestFit(offer) | Selection::Fallback(offer) => offer,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Selection::Fallback(_))
    }
}

/// Selects the cheapest covering offer from a provider catalog
#[derive(Debug, Clone)]
pub struct BestFitMatcher {
    /// Ascending by cost; ties in catalog order
    offers: Vec<InstanceOffer>,
    /// Index of the first most-expensive offer
    fallback: Option<usize>,
}

impl BestFitMatcher {
    pub fn new(offers: &[InstanceOffer]) -> Self {
        let mut sorted: Vec<InstanceOffer> = offers
            .iter()
            .filter(|offer| {
                let priced = offer.cost_per_hour.is_finite() && offer.cost_per_hour >= 0.0;
                if !priced {
                    debug!(
                        instance_type = %offer.instance_type,
                        cost_per_hour = offer.cost_per_hour,
                        "Skipping offer without a usable price"
                    );
                }
                priced
            })
            .cloned()
            .collect();
        sorted.sort_by(|a, b| {
            a.cost_per_hour
                .partial_cmp(&b.cost_per_hour)
                .unwrap_or(Ordering::Equal)
        });

        let mut fallback: Option<usize> = None;
        for (i, offer) in sorted.iter().enumerate() {
            match fallback {
                Some(best) if offer.cost_per_hour <= sorted[best].cost_per_hour => {}
                _ => fallback = Some(i),
            }
        }

        Self {
            offers: sorted,
            fallback,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Offers in search order
    pub fn offers(&self) -> &[InstanceOffer] {
        &self.offers
    }

    /// Pick an offer for a VM; `None` only when the catalog is empty
    pub fn select(&self, vm: &VmRecord) -> Option<Selection<'_>> {
        if let Some(offer) = self.offers.iter().find(|offer| offer.fits(vm)) {
            return Some(Selection::BestFit(offer));
        }

        self.fallback.map(|i| Selection::Fallback(&self.offers[i]))
    }
}
