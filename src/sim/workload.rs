//! Workload files and synthetic workload generation.
//!
//! A workload is a TOML document with an optional `[scheduler]` table and
//! one `[[process]]` table per process:
//!
//! ```toml
//! [scheduler]
//! quantum1 = 4
//! quantum2 = 8
//!
//! [[process]]
//! id = "A"
//! arrival = 0
//! cpu_time = 10
//! priority = 1
//! ```

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::job::Job;
use crate::{
    core::{SchedError, Ticks},
    scheduler::SchedParams,
};

/// Why a workload could not be loaded or registered.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    #[error("parse error in {}: {source}", file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("malformed workload: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid workload: {0}")]
    Invalid(#[from] SchedError),

    #[error("failed to encode workload: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Scheduler parameters plus the processes to register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub scheduler: SchedParams,
    #[serde(default, rename = "process")]
    pub processes: Vec<Job>,
}

impl Workload {
    pub fn load(path: &Path) -> Result<Self, WorkloadError> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|source| WorkloadError::Parse {
            file: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, WorkloadError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, WorkloadError> {
        Ok(toml::to_string(self)?)
    }
}

/// Parameters for [`bernoulli`].
#[derive(Debug, Clone, Copy)]
pub struct BernoulliSpec {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub seed: u64,
}

/// At most one arrival per tick with probability `p_arrival`; each arrival
/// is short with probability `p_short` and gets a uniform priority class.
pub fn bernoulli(spec: BernoulliSpec, scheduler: SchedParams) -> Workload {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut processes = Vec::new();

    for t in 0..spec.ticks {
        if rng.random::<f64>() < spec.p_arrival {
            let cpu_time = if rng.random::<f64>() < spec.p_short {
                spec.short_ticks
            } else {
                spec.long_ticks
            };

            processes.push(Job {
                id: format!("P{}", processes.len()).into(),
                arrival: t,
                cpu_time,
                priority: rng.random_range(1..=3),
            });
        }
    }

    Workload {
        scheduler,
        processes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [scheduler]
        quantum1 = 2
        quantum2 = 3

        [[process]]
        id = "A"
        arrival = 0
        cpu_time = 10
        priority = 1

        [[process]]
        id = "B"
        arrival = 4
        cpu_time = 2
        priority = 3
    "#;

    fn spec(seed: u64) -> BernoulliSpec {
        BernoulliSpec {
            ticks: 200,
            p_arrival: 0.3,
            p_short: 0.5,
            short_ticks: 2,
            long_ticks: 9,
            seed,
        }
    }

    #[test]
    fn parses_scheduler_and_processes() {
        let workload = Workload::parse(SAMPLE).unwrap();
        assert_eq!(workload.scheduler, SchedParams::new(2, 3).unwrap());
        assert_eq!(workload.processes.len(), 2);
        assert_eq!(workload.processes[1].id, "B".into());
        assert_eq!(workload.processes[1].priority, 3);
    }

    #[test]
    fn scheduler_table_is_optional() {
        let workload = Workload::parse("[[process]]\nid = \"X\"\narrival = 1\ncpu_time = 1\npriority = 2\n")
            .unwrap();
        assert_eq!(workload.scheduler, SchedParams::default());
    }

    #[test]
    fn zero_quantum_fails_to_parse() {
        let err = Workload::parse("[scheduler]\nquantum1 = 0\n").unwrap_err();
        assert!(matches!(err, WorkloadError::Toml(_)), "{err:?}");
        assert!(err.to_string().contains("quantum 1"), "{err}");
    }

    #[test]
    fn load_reports_the_offending_file() {
        let path = std::env::temp_dir().join(format!("mlfq-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[[process]]\nid = \"A\"\npriority = \"high\"\n").unwrap();
        let err = Workload::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        match &err {
            WorkloadError::Parse { file, .. } => assert_eq!(file, &path),
            other => panic!("expected a parse error, got {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Workload::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, WorkloadError::Io(_)));
    }

    #[test]
    fn generation_is_seeded() {
        let a = bernoulli(spec(7), SchedParams::default());
        let b = bernoulli(spec(7), SchedParams::default());
        assert_eq!(a, b);
        assert!(!a.processes.is_empty());
        assert!(a.processes.iter().all(|j| (1..=3).contains(&j.priority)));
        assert!(a.processes.iter().all(|j| j.cpu_time == 2 || j.cpu_time == 9));
    }

    #[test]
    fn generated_workload_survives_toml() {
        let workload = bernoulli(spec(1), SchedParams::new(3, 5).unwrap());
        let text = workload.to_toml().unwrap();
        assert_eq!(Workload::parse(&text).unwrap(), workload);
    }
}
