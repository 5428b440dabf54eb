//! Weather severity classification.
//!
//! An ordered table of (predicate, label) rules evaluated top to bottom; the
//! first matching rule wins. All thresholds are strict `>` comparisons, so a
//! value equal to a threshold lands in the lower tier, and NaN inputs fail
//! every comparison and fall through to the lowest applicable tier.

use std::fmt;

use serde::Serialize;

use crate::models::CurrentConditions;

const VERY_HOT_C: f64 = 35.0;
const WARM_C: f64 = 25.0;
const COOL_C: f64 = 15.0;
const FREEZING_C: f64 = 0.0;
const STRONG_WIND_KMH: f64 = 20.0;
const HIGH_PRECIP_PCT: f64 = 70.0;

/// Human-readable classification of current weather harshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum SeverityLabel {
    VeryHotWindyWet,
    VeryHotWindy,
    VeryHotWet,
    VeryHotDry,
    WarmWindy,
    WarmWet,
    WarmFair,
    CoolWindyOrWet,
    CoolCalm,
    ColdWindy,
    ColdWet,
    ColdDry,
    Freezing,
}

impl SeverityLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLabel::VeryHotWindyWet => "very hot, strong wind, high precip chance",
            SeverityLabel::VeryHotWindy => "very hot, strong wind",
            SeverityLabel::VeryHotWet => "very hot, high precip chance",
            SeverityLabel::VeryHotDry => "very hot and dry",
            SeverityLabel::WarmWindy => "warm, strong wind",
            SeverityLabel::WarmWet => "warm, high precip chance",
            SeverityLabel::WarmFair => "warm and fair",
            SeverityLabel::CoolWindyOrWet => "cool, windy or rainy",
            SeverityLabel::CoolCalm => "cool and calm",
            SeverityLabel::ColdWindy => "cold and windy",
            SeverityLabel::ColdWet => "cold and rainy",
            SeverityLabel::ColdDry => "cold and dry",
            SeverityLabel::Freezing => "freezing, dress warmly",
        }
    }
}

impl From<SeverityLabel> for &'static str {
    fn from(label: SeverityLabel) -> Self {
        label.as_str()
    }
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Reading {
    temperature: f64,
    wind_speed: f64,
    precipitation_probability: f64,
}

impl Reading {
    fn windy(&self) -> bool {
        self.wind_speed > STRONG_WIND_KMH
    }

    fn wet(&self) -> bool {
        self.precipitation_probability > HIGH_PRECIP_PCT
    }
}

type Rule = (fn(&Reading) -> bool, SeverityLabel);

// Each temperature tier ends in a catch-all for that tier, so later rules only
// need the tier's lower bound.
const RULES: &[Rule] = &[
    (
        |r: &Reading| r.temperature > VERY_HOT_C && r.windy() && r.wet(),
        SeverityLabel::VeryHotWindyWet,
    ),
    (|r: &Reading| r.temperature > VERY_HOT_C && r.windy(), SeverityLabel::VeryHotWindy),
    (|r: &Reading| r.temperature > VERY_HOT_C && r.wet(), SeverityLabel::VeryHotWet),
    (|r: &Reading| r.temperature > VERY_HOT_C, SeverityLabel::VeryHotDry),
    (|r: &Reading| r.temperature > WARM_C && r.windy(), SeverityLabel::WarmWindy),
    (|r: &Reading| r.temperature > WARM_C && r.wet(), SeverityLabel::WarmWet),
    (|r: &Reading| r.temperature > WARM_C, SeverityLabel::WarmFair),
    (|r: &Reading| r.temperature > COOL_C && (r.windy() || r.wet()), SeverityLabel::CoolWindyOrWet),
    (|r: &Reading| r.temperature > COOL_C, SeverityLabel::CoolCalm),
    (|r: &Reading| r.temperature > FREEZING_C && r.windy(), SeverityLabel::ColdWindy),
    (|r: &Reading| r.temperature > FREEZING_C && r.wet(), SeverityLabel::ColdWet),
    (|r: &Reading| r.temperature > FREEZING_C, SeverityLabel::ColdDry),
];

/// Classify current conditions. Total over all `f64` inputs.
///
/// `wind_speed` is in km/h, `precipitation_probability` in percent.
pub fn classify(
    temperature: f64,
    wind_speed: f64,
    precipitation_probability: f64,
) -> SeverityLabel {
    let reading = Reading {
        temperature,
        wind_speed,
        precipitation_probability,
    };

    RULES
        .iter()
        .find(|(applies, _)| applies(&reading))
        .map(|&(_, label)| label)
        .unwrap_or(SeverityLabel::Freezing)
}

pub fn classify_conditions(current: &CurrentConditions) -> SeverityLabel {
    classify(
        current.temperature_c,
        current.wind_speed_kmh,
        current.precipitation_probability,
    )
}
