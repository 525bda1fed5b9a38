//! ABI dialect selection
//!
//! Some quantities exist under two mutually exclusive C library dialects. For
//! `struct dirent`, glibc always declares both the legacy type and its
//! large-file variant `dirent64`, while musl declares only the legacy one. The
//! generator extracts both candidates (a missing one is simply absent),
//! classifies the dialect from which are present and how they compare, and
//! bakes in the single value the detected dialect calls for.

use crate::splice::error::ExtractionError;
use tracing::debug;

/// Requirement on one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

impl Presence {
    fn admits(self, value: Option<u64>) -> bool {
        match self {
            Presence::Present => value.is_some(),
            Presence::Absent => value.is_none(),
        }
    }
}

/// Which candidate a rule bakes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Legacy,
    LargeFile,
}

/// The two extracted candidates for one logical quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Candidates {
    pub legacy: Option<u64>,
    pub large_file: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectRule {
    pub name: String,
    pub legacy: Presence,
    pub large_file: Presence,
    /// Require `legacy <= large_file` (both must then be present).
    pub ordered: bool,
    pub pick: Pick,
}

impl DialectRule {
    fn matches(&self, candidates: &Candidates) -> bool {
        if !self.legacy.admits(candidates.legacy) || !self.large_file.admits(candidates.large_file)
        {
            return false;
        }
        if !self.ordered {
            return true;
        }
        matches!(
            (candidates.legacy, candidates.large_file),
            (Some(legacy), Some(large)) if legacy <= large
        )
    }
}

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub dialect: String,
    pub value: u64,
}

/// Ordered set of dialect rules; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct DialectSelector {
    rules: Vec<DialectRule>,
}

impl DialectSelector {
    pub fn new(rules: Vec<DialectRule>) -> Self {
        Self { rules }
    }

    /// glibc- and musl-style rules.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            DialectRule {
                name: "gnu".into(),
                legacy: Presence::Present,
                large_file: Presence::Present,
                ordered: true,
                pick: Pick::LargeFile,
            },
            DialectRule {
                name: "musl".into(),
                legacy: Presence::Present,
                large_file: Presence::Absent,
                ordered: false,
                pick: Pick::Legacy,
            },
        ])
    }

    pub fn resolve(&self, candidates: Candidates) -> Result<Resolution, ExtractionError> {
        let unrecognized = || ExtractionError::UnrecognizedDialect {
            legacy: candidates.legacy,
            large_file: candidates.large_file,
        };

        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matches(&candidates))
            .ok_or_else(unrecognized)?;

        let value = match rule.pick {
            Pick::Legacy => candidates.legacy,
            Pick::LargeFile => candidates.large_file,
        }
        .ok_or_else(unrecognized)?;

        debug!(dialect = %rule.name, value, "resolved dialect");
        Ok(Resolution {
            dialect: rule.name.clone(),
            value,
        })
    }
}

impl Default for DialectSelector {
    fn default() -> Self {
        Self::with_defaults()
    }
}
