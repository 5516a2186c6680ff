use serde::{Deserialize, Serialize};

use crate::core::{SchedError, Ticks};

pub const DEFAULT_QUANTUM1: Ticks = 4;
pub const DEFAULT_QUANTUM2: Ticks = 8;

/// Quanta for the two round-robin levels. Frozen for the length of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedParams")]
pub struct SchedParams {
    quantum1: Ticks,
    quantum2: Ticks,
}

#[derive(Deserialize)]
struct RawSchedParams {
    #[serde(default = "default_quantum1")]
    quantum1: Ticks,
    #[serde(default = "default_quantum2")]
    quantum2: Ticks,
}

fn default_quantum1() -> Ticks {
    DEFAULT_QUANTUM1
}

fn default_quantum2() -> Ticks {
    DEFAULT_QUANTUM2
}

impl TryFrom<RawSchedParams> for SchedParams {
    type Error = SchedError;

    fn try_from(raw: RawSchedParams) -> Result<Self, Self::Error> {
        Self::new(raw.quantum1, raw.quantum2)
    }
}

impl Default for SchedParams {
    fn default() -> Self {
        Self {
            quantum1: DEFAULT_QUANTUM1,
            quantum2: DEFAULT_QUANTUM2,
        }
    }
}

impl SchedParams {
    pub fn new(quantum1: Ticks, quantum2: Ticks) -> Result<Self, SchedError> {
        if quantum1 == 0 {
            return Err(SchedError::ZeroQuantum { which: 1 });
        }
        if quantum2 == 0 {
            return Err(SchedError::ZeroQuantum { which: 2 });
        }
        Ok(Self { quantum1, quantum2 })
    }

    pub fn quantum1(&self) -> Ticks {
        self.quantum1
    }

    pub fn quantum2(&self) -> Ticks {
        self.quantum2
    }

    /// Ticks without execution after which a level 4/5 process moves up.
    pub fn aging_threshold(&self) -> Ticks {
        self.quantum1 + self.quantum2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_tracks_quanta() {
        assert_eq!(SchedParams::default().aging_threshold(), 12);
        assert_eq!(SchedParams::new(2, 3).unwrap().aging_threshold(), 5);
    }

    #[test]
    fn zero_quanta_are_rejected() {
        assert_eq!(
            SchedParams::new(0, 3),
            Err(SchedError::ZeroQuantum { which: 1 })
        );
        assert_eq!(
            SchedParams::new(3, 0),
            Err(SchedError::ZeroQuantum { which: 2 })
        );
    }

    #[test]
    fn deserialization_validates() {
        let params: SchedParams = toml::from_str("quantum1 = 2").unwrap();
        assert_eq!(params.quantum1(), 2);
        assert_eq!(params.quantum2(), DEFAULT_QUANTUM2);

        assert!(toml::from_str::<SchedParams>("quantum2 = 0").is_err());
    }
}
