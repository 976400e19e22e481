//! Testing utilities for the scout workspace
//!
//! Deterministic fake existence check, fixture seeds and registries.

#![allow(missing_docs)]

use chrono::NaiveDate;
use dashmap::DashMap;
use scout_convention::{Convention, ConventionRegistry, PrefixRule};
use scout_core::{ExistenceCheck, ProbeOutcome, ProbeSession, ScoutConfig, SeedItem};
use std::collections::HashSet;
use std::time::Duration;

pub const BASE_URL: &str = "https://shop.example";

/// Scripted existence check that records every call
///
/// Locators are answered in this order: hanging, error, found, not found.
#[derive(Debug, Default)]
pub struct FakeExists {
    found: HashSet<String>,
    errors: HashSet<String>,
    hanging: HashSet<String>,
    latency: Duration,
    calls: DashMap<String, usize>,
}

impl FakeExists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every locator resolves
    pub fn found<I, S>(locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().with_found(locators)
    }

    #[must_use]
    pub fn with_found<I, S>(mut self, locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.found.extend(locators.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_errors<I, S>(mut self, locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.extend(locators.into_iter().map(Into::into));
        self
    }

    /// Locators whose check never completes
    #[must_use]
    pub fn with_hanging<I, S>(mut self, locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hanging.extend(locators.into_iter().map(Into::into));
        self
    }

    /// Simulated latency of every check
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self, locator: &str) -> usize {
        self.calls.get(locator).map_or(0, |c| *c)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }

    pub fn max_calls_per_locator(&self) -> usize {
        self.calls
            .iter()
            .map(|entry| *entry.value())
            .max()
            .unwrap_or(0)
    }

    pub fn called_locators(&self) -> HashSet<String> {
        self.calls.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[async_trait::async_trait]
impl ExistenceCheck for FakeExists {
    async fn exists(&self, locator: &str) -> ProbeOutcome {
        *self.calls.entry(locator.to_string()).or_insert(0) += 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.hanging.contains(locator) {
            std::future::pending::<()>().await;
        }
        if self.errors.contains(locator) {
            return ProbeOutcome::Error(format!("simulated failure for {locator}"));
        }
        if self.found.contains(locator) {
            ProbeOutcome::Found
        } else {
            ProbeOutcome::NotFound
        }
    }
}

pub fn default_registry() -> ConventionRegistry {
    ConventionRegistry::with_defaults(BASE_URL)
}

/// Registry where direct `{base}/{code}.jpg` for code `X1` equals
/// sequence `{base}/{prefix}{index}.jpg` for prefix `X`, index 1
pub fn colliding_registry() -> ConventionRegistry {
    ConventionRegistry::new(
        BASE_URL,
        vec![
            Convention::direct("photo", "{base}/{code}.jpg"),
            Convention::sequence("run", "{base}/{prefix}{index}.jpg", PrefixRule::Code)
                .with_pad_width(1),
        ],
    )
    .unwrap()
}

pub fn seed(id: &str) -> SeedItem {
    SeedItem::new(id, format!("{BASE_URL}/item/{id}"))
}

pub fn titled_seed(id: &str, title: &str) -> SeedItem {
    seed(id).with_title(title)
}

pub fn dated_seed(id: &str, year: i32, month: u32, day: u32) -> SeedItem {
    seed(id).with_observed_date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

/// Locator of item `index` of the default gallery run under `prefix`
pub fn gallery_locator(prefix: &str, index: u32) -> String {
    default_registry()
        .sequence("goods-gallery", prefix, index)
        .unwrap()
}

/// Locator of the default direct photo for `code`
pub fn photo_locator(code: &str) -> String {
    format!("{BASE_URL}/goods/{code}.jpg")
}

pub fn session(config: &ScoutConfig) -> ProbeSession {
    ProbeSession::from_config(config).unwrap()
}

pub fn session_with(registry: ConventionRegistry, config: &ScoutConfig) -> ProbeSession {
    ProbeSession::new(registry, config).unwrap()
}
