use std::collections::BTreeMap;

use serde::Serialize;

/// Fixed text used for every section when the load-bearing step fails.
pub const GENERIC_ERROR: &str = "An error occurred while processing the data.";

/// Named sections of a diagnostic report, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Voltage,
    Current,
    PowerFactor,
    Accessories,
    OperatingTime,
    FinalConclusion,
    NominalVoltage,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Voltage,
        Section::Current,
        Section::PowerFactor,
        Section::Accessories,
        Section::OperatingTime,
        Section::FinalConclusion,
        Section::NominalVoltage,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Section::Voltage => "voltage",
            Section::Current => "current",
            Section::PowerFactor => "power_factor",
            Section::Accessories => "accessories",
            Section::OperatingTime => "operating_time",
            Section::FinalConclusion => "final_conclusion",
            Section::NominalVoltage => "nominal_voltage",
        }
    }
}

/// Text findings for one report, keyed by section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticBundle {
    sections: BTreeMap<Section, String>,
}

impl DiagnosticBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle returned when the analysis cannot run at all: every analysis
    /// section carries `GENERIC_ERROR`, the nominal voltage is still echoed.
    pub fn degraded(nominal_voltage: Option<f64>) -> Self {
        let mut bundle = Self::new();
        for section in Section::ALL {
            if section != Section::NominalVoltage {
                bundle.insert(section, GENERIC_ERROR);
            }
        }
        bundle.insert(Section::NominalVoltage, echo_nominal_voltage(nominal_voltage));
        bundle
    }

    pub(crate) fn insert(&mut self, section: Section, text: impl Into<String>) {
        self.sections.insert(section, text.into());
    }

    pub fn get(&self, section: Section) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        self.sections.iter().map(|(s, t)| (*s, t.as_str()))
    }

    pub fn is_degraded(&self) -> bool {
        Section::ALL
            .iter()
            .filter(|s| **s != Section::NominalVoltage)
            .all(|s| self.get(*s) == Some(GENERIC_ERROR))
    }

    /// BLAKE3 digest over every section key and text, in section order.
    pub fn fingerprint(&self) -> String {
        let mut h = blake3::Hasher::new();
        for (section, text) in self.iter() {
            hash_str(&mut h, section.key());
            hash_str(&mut h, text);
        }
        h.finalize().to_hex().to_string()
    }
}

pub(crate) fn echo_nominal_voltage(nominal_voltage: Option<f64>) -> String {
    match nominal_voltage {
        Some(v) => format!("{v}"),
        None => "not informed".to_string(),
    }
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    let len = s.len() as u32;
    hasher.update(&len.to_le_bytes());
    hasher.update(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_bundle_echoes_nominal_voltage() {
        let bundle = DiagnosticBundle::degraded(Some(380.0));

        assert!(bundle.is_degraded());
        assert_eq!(bundle.get(Section::Current), Some(GENERIC_ERROR));
        assert_eq!(bundle.get(Section::NominalVoltage), Some("380"));
        assert_eq!(DiagnosticBundle::degraded(None).get(Section::NominalVoltage), Some("not informed"));
    }

    #[test]
    fn bundle_serializes_as_object_keyed_by_section() {
        let mut bundle = DiagnosticBundle::new();
        bundle.insert(Section::PowerFactor, "ok");
        bundle.insert(Section::NominalVoltage, "220");

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json, serde_json::json!({ "power_factor": "ok", "nominal_voltage": "220" }));
    }

    #[test]
    fn fingerprint_depends_on_text() {
        let mut a = DiagnosticBundle::new();
        a.insert(Section::Voltage, "x");
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.insert(Section::Voltage, "y");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
