//! Last-write-wins derivation session.
//!
//! Every submitted configuration gets a generation number. A finished job
//! is only applied if no newer configuration was submitted in the meantime;
//! older results are discarded rather than merged.

use crate::config::DesignConfiguration;
use crate::derive::{DerivedTheme, derive_theme};
use crate::error::{ThemeError, ThemeResult};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`DerivationJob::run_async`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A pending derivation of one configuration.
#[derive(Debug, Clone)]
pub struct DerivationJob {
    generation: u64,
    config: DesignConfiguration,
}

impl DerivationJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &DesignConfiguration {
        &self.config
    }

    /// Derive synchronously.
    pub fn run(self) -> DerivationOutcome {
        DerivationOutcome {
            generation: self.generation,
            result: derive_theme(&self.config),
        }
    }

    /// Derive on whatever executor polls the returned future.
    pub fn run_async(self) -> BoxFuture<'static, DerivationOutcome> {
        Box::pin(async move { self.run() })
    }
}

/// A finished job, to be handed back to [`DerivationSession::accept`].
#[derive(Debug)]
pub struct DerivationOutcome {
    pub generation: u64,
    pub result: ThemeResult<DerivedTheme>,
}

/// What [`DerivationSession::accept`] did with an outcome.
#[derive(Debug)]
pub enum AcceptStatus {
    /// The theme is now active.
    Applied,
    /// A newer configuration was submitted; the result was dropped.
    Superseded,
    /// Derivation failed; the previous theme stays active.
    Rejected(ThemeError),
}

/// Tracks the active theme and the newest submitted configuration.
#[derive(Debug, Default)]
pub struct DerivationSession {
    latest: u64,
    active: Option<DerivedTheme>,
    active_generation: Option<u64>,
}

impl DerivationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new configuration, superseding any job still in flight.
    pub fn submit(&mut self, config: DesignConfiguration) -> DerivationJob {
        self.latest += 1;
        log::debug!("Submitted configuration '{}' as generation {}", config.name, self.latest);
        DerivationJob { generation: self.latest, config }
    }

    /// Apply a finished job if it is still the newest.
    pub fn accept(&mut self, outcome: DerivationOutcome) -> AcceptStatus {
        if outcome.generation != self.latest {
            log::debug!(
                "Discarding derivation {} superseded by {}",
                outcome.generation,
                self.latest
            );
            return AcceptStatus::Superseded;
        }
        match outcome.result {
            Ok(theme) => {
                log::info!("Applied theme generation {} ({} tokens)", outcome.generation, theme.tokens.len());
                self.active = Some(theme);
                self.active_generation = Some(outcome.generation);
                AcceptStatus::Applied
            }
            Err(err) => {
                log::warn!("Derivation {} rejected: {err}", outcome.generation);
                AcceptStatus::Rejected(err)
            }
        }
    }

    /// Submit, run and accept in one step.
    pub fn derive_now(&mut self, config: DesignConfiguration) -> AcceptStatus {
        let outcome = self.submit(config).run();
        self.accept(outcome)
    }

    pub fn active(&self) -> Option<&DerivedTheme> {
        self.active.as_ref()
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active_generation
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_result_applies() {
        let mut session = DerivationSession::new();
        let job = session.submit(DesignConfiguration::new("#6750a4"));
        assert!(matches!(session.accept(job.run()), AcceptStatus::Applied));
        assert_eq!(session.active_generation(), Some(1));
        assert!(session.active().unwrap().tokens.contains("color-primary"));
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut session = DerivationSession::new();
        let first = session.submit(DesignConfiguration::new("#6750a4"));
        let second = session.submit(DesignConfiguration::new("#0061a4"));

        let second_result = second.run();
        let expected = second_result.result.as_ref().unwrap().clone();
        assert!(matches!(session.accept(second_result), AcceptStatus::Applied));
        // The older job finishing late must not overwrite the newer theme.
        assert!(matches!(session.accept(first.run()), AcceptStatus::Superseded));
        assert_eq!(session.active(), Some(&expected));
    }

    #[test]
    fn test_superseded_before_either_finishes() {
        let mut session = DerivationSession::new();
        let first = session.submit(DesignConfiguration::new("#6750a4"));
        let _second = session.submit(DesignConfiguration::new("#0061a4"));
        assert!(matches!(session.accept(first.run()), AcceptStatus::Superseded));
        assert!(session.active().is_none());
    }

    #[test]
    fn test_rejection_keeps_previous_theme() {
        let mut session = DerivationSession::new();
        assert!(matches!(session.derive_now(DesignConfiguration::new("#6750a4")), AcceptStatus::Applied));
        let before = session.active().cloned();

        let mut bad = DesignConfiguration::new("#6750a4");
        bad.spacing.base_unit = -1.0;
        let status = session.derive_now(bad);
        assert!(matches!(status, AcceptStatus::Rejected(ThemeError::InvalidConfiguration(_))));
        assert_eq!(session.active().cloned(), before);
        assert_eq!(session.active_generation(), Some(1));
    }

    #[test]
    fn test_run_async() {
        let mut session = DerivationSession::new();
        let job = session.submit(DesignConfiguration::new("#6750a4"));
        let outcome = pollster::block_on(job.run_async());
        assert_eq!(outcome.generation, 1);
        assert!(matches!(session.accept(outcome), AcceptStatus::Applied));
    }
}
