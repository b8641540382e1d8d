//! Intensity zones used to colour and label chart bars.
//!
//! Boundaries follow the Coggan power zones collapsed to six bands:
//! - Recovery: ≤ 55% FTP
//! - Endurance: 56-75% FTP
//! - Tempo: 76-90% FTP
//! - Threshold: 91-105% FTP
//! - VO2 Max: 106-120% FTP
//! - Anaerobic: > 120% FTP

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntensityZone {
    Recovery,
    Endurance,
    Tempo,
    Threshold,
    Vo2Max,
    Anaerobic,
}

impl IntensityZone {
    /// All zones from easiest to hardest, in legend order
    pub const ALL: [IntensityZone; 6] = [
        IntensityZone::Recovery,
        IntensityZone::Endurance,
        IntensityZone::Tempo,
        IntensityZone::Threshold,
        IntensityZone::Vo2Max,
        IntensityZone::Anaerobic,
    ];

    pub fn from_percent_ftp(percent_ftp: u32) -> Self {
        match percent_ftp {
            0..=55 => IntensityZone::Recovery,
            56..=75 => IntensityZone::Endurance,
            76..=90 => IntensityZone::Tempo,
            91..=105 => IntensityZone::Threshold,
            106..=120 => IntensityZone::Vo2Max,
            _ => IntensityZone::Anaerobic,
        }
    }

    /// Bar colour as RGB
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            IntensityZone::Recovery => (0x2E, 0x8B, 0x57),
            IntensityZone::Endurance => (0x41, 0x69, 0xE1),
            IntensityZone::Tempo => (0xFF, 0x8C, 0x00),
            IntensityZone::Threshold => (0xFF, 0x45, 0x00),
            IntensityZone::Vo2Max => (0xDC, 0x14, 0x3C),
            IntensityZone::Anaerobic => (0x8B, 0x00, 0x8B),
        }
    }

    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntensityZone::Recovery => "Recovery",
            IntensityZone::Endurance => "Endurance",
            IntensityZone::Tempo => "Tempo",
            IntensityZone::Threshold => "Threshold",
            IntensityZone::Vo2Max => "VO2 Max",
            IntensityZone::Anaerobic => "Anaerobic",
        }
    }

    /// Legend entry, e.g. `Tempo (76-90%)`
    pub fn legend_label(&self) -> String {
        let range = match self {
            IntensityZone::Recovery => "≤55%",
            IntensityZone::Endurance => "56-75%",
            IntensityZone::Tempo => "76-90%",
            IntensityZone::Threshold => "91-105%",
            IntensityZone::Vo2Max => "106-120%",
            IntensityZone::Anaerobic => ">120%",
        };
        format!("{} ({})", self.name(), range)
    }
}

impl std::fmt::Display for IntensityZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
