//! Source separation quality metrics.
//!
//! Scores are computed upstream by the evaluation toolkit; this crate only
//! consumes them. The four BSS Eval metrics are:
//!
//! - **SDR**: signal-to-distortion ratio
//! - **SIR**: signal-to-interference ratio
//! - **ISR**: image-to-spatial distortion ratio
//! - **SAR**: signal-to-artifacts ratio
//!
//! All are expressed in dB, higher is better.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four BSS Eval metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Signal-to-distortion ratio.
    #[serde(rename = "SDR")]
    Sdr,
    /// Signal-to-interference ratio.
    #[serde(rename = "SIR")]
    Sir,
    /// Image-to-spatial distortion ratio.
    #[serde(rename = "ISR")]
    Isr,
    /// Signal-to-artifacts ratio.
    #[serde(rename = "SAR")]
    Sar,
}

impl Metric {
    /// Order in which rows are emitted when a track record is normalized.
    pub const NORMALIZE_ORDER: [Metric; 4] = [Self::Sdr, Self::Sar, Self::Isr, Self::Sir];

    /// Column order of the rendered summary.
    pub const DISPLAY_ORDER: [Metric; 4] = [Self::Sdr, Self::Sir, Self::Isr, Self::Sar];

    /// Key used for this metric in evaluation JSON and score tables.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sdr => "SDR",
            Self::Sir => "SIR",
            Self::Isr => "ISR",
            Self::Sar => "SAR",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SDR" => Ok(Self::Sdr),
            "SIR" => Ok(Self::Sir),
            "ISR" => Ok(Self::Isr),
            "SAR" => Ok(Self::Sar),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_roundtrip() {
        for metric in Metric::DISPLAY_ORDER {
            assert_eq!(metric.name().parse::<Metric>(), Ok(metric));
        }
        assert!("sdr".parse::<Metric>().is_err());
    }

    #[test]
    fn test_orders_cover_all_metrics() {
        let mut a = Metric::NORMALIZE_ORDER.to_vec();
        let mut b = Metric::DISPLAY_ORDER.to_vec();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(Metric::NORMALIZE_ORDER[1], Metric::Sar);
        assert_eq!(Metric::DISPLAY_ORDER[1], Metric::Sir);
    }

    #[test]
    fn test_metric_serde_uses_upper_case() {
        let json = serde_json::to_string(&Metric::Isr).unwrap();
        assert_eq!(json, "\"ISR\"");
    }
}
