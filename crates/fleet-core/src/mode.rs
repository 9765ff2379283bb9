//! Runtime mode flags.
//!
//! Runs are labelled with a short mode string such as `"Mode011"`.  The three
//! characters after the `Mode` prefix are independent switches:
//!
//! | Position | `0`                          | `1`                        |
//! |----------|------------------------------|----------------------------|
//! | 4        | restricted chokepoint speeds | open chokepoint speeds     |
//! | 5        | reactive arbitration         | proactive arbitration      |
//! | 6        | no contention throttle       | throttle on contention     |
//!
//! The label is also used to name output directories, so `RunMode` displays
//! back to the same string it was parsed from.

use std::fmt;
use std::str::FromStr;

use crate::FleetError;

/// Edge-speed profile applied to the entry/exit chokepoints at start-up.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChokepointProfile {
    /// Chokepoint edges run at their reduced speed.
    Restricted,
    /// Chokepoint edges run at their nominal speed.
    #[default]
    Open,
}

/// When the Arbitrator substitutes a full parking target.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ArbitrationPolicy {
    /// Only once the vehicle is queueing in front of its target.
    Reactive,
    /// As soon as the target is full, provided the substitute is not.
    #[default]
    Proactive,
}

/// The three run-mode switches.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct RunMode {
    pub chokepoints: ChokepointProfile,
    pub arbitration: ArbitrationPolicy,
    pub throttle:    bool,
}

impl RunMode {
    const PREFIX: &'static str = "Mode";
}

impl FromStr for RunMode {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FleetError::InvalidMode(s.to_owned());

        let flags = s.trim().strip_prefix(Self::PREFIX).ok_or_else(invalid)?;
        let bits: Vec<bool> = flags
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(invalid()),
            })
            .collect::<Result<_, _>>()?;
        let [open, proactive, throttle] = bits[..] else {
            return Err(invalid());
        };

        Ok(Self {
            chokepoints: if open { ChokepointProfile::Open } else { ChokepointProfile::Restricted },
            arbitration: if proactive { ArbitrationPolicy::Proactive } else { ArbitrationPolicy::Reactive },
            throttle,
        })
    }
}

impl TryFrom<String> for RunMode {
    type Error = FleetError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RunMode> for String {
    fn from(mode: RunMode) -> String {
        mode.to_string()
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |b: bool| if b { '1' } else { '0' };
        write!(
            f,
            "{}{}{}{}",
            Self::PREFIX,
            bit(self.chokepoints == ChokepointProfile::Open),
            bit(self.arbitration == ArbitrationPolicy::Proactive),
            bit(self.throttle),
        )
    }
}
