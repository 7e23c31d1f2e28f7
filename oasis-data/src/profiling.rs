//! Load timing reports that compile to no-ops unless the `profiling` feature is enabled.

use crate::common::*;

#[cfg(feature = "profiling")]
lazy_static::lazy_static! {
    static ref PROFILING_CONFIG: ProfilingConfig = {
        match envy::prefixed("OASIS_").from_env::<ProfilingConfig>() {
            Ok(config) => config,
            Err(err) => {
                warn!("failed to read profiling environment variables, using defaults: {:?}", err);
                Default::default()
            }
        }
    };
    static ref REGISTERED_TIMINGS: dashmap::DashSet<&'static str> = dashmap::DashSet::new();
}

/// Options read from `OASIS_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingConfig {
    /// Comma separated names of the timings allowed to report. All timings report if unset.
    pub profiling_whitelist: Option<String>,
}

impl ProfilingConfig {
    pub fn allows(&self, name: &str) -> bool {
        match &self.profiling_whitelist {
            Some(list) => list.split(',').map(str::trim).any(|item| item == name),
            None => true,
        }
    }
}

#[cfg(feature = "profiling")]
#[derive(Debug)]
pub struct Timing {
    name: &'static str,
    instant: Instant,
    events: Vec<(&'static str, Duration)>,
}

#[cfg(not(feature = "profiling"))]
#[derive(Debug)]
pub struct Timing;

impl Timing {
    pub fn new(name: &'static str) -> Self {
        #[cfg(feature = "profiling")]
        {
            if REGISTERED_TIMINGS.insert(name) {
                info!("registered timing profile '{}'", name);
            }

            Self {
                name,
                instant: Instant::now(),
                events: vec![],
            }
        }

        #[cfg(not(feature = "profiling"))]
        {
            let _ = name;
            Self
        }
    }

    /// Record the time elapsed since the previous event.
    pub fn add_event(&mut self, name: &'static str) {
        #[cfg(feature = "profiling")]
        {
            self.events.push((name, self.instant.elapsed()));
            self.instant = Instant::now();
        }

        #[cfg(not(feature = "profiling"))]
        let _ = name;
    }

    pub fn report(&self) {
        #[cfg(feature = "profiling")]
        {
            if PROFILING_CONFIG.allows(self.name) {
                info!("profiling report for '{}'", self.name);
                self.events.iter().for_each(|(name, elapsed)| {
                    info!("- {}\t{:?}", name, elapsed);
                });
            }
        }
    }
}
