use std::{collections::HashSet, io, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::MotorRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub client_id: i64,
    pub client_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotorSummary {
    pub motor_id: String,
    pub motor_description: String,
}

/// Client/motor registry backed by a comma-separated file with a header row.
///
/// Expected header columns (by name): client_id, client_name, motor_id,
/// motor_description, install_location, nominal_current, power_cv,
/// connection_type, nominal_voltage_v, tariff_group, contact_phone,
/// contact_email, installed_on, device_id, notes. Empty cells read as absent.
#[derive(Debug, Clone, Default)]
pub struct MotorRegistry {
    records: Vec<MotorRecord>,
}

impl MotorRegistry {
    /// Load the registry file. A file that does not exist yet is an empty registry.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "motor registry not found, starting empty");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to open motor registry {}", path.display()))
            }
        };

        let registry = Self::from_reader(file)
            .with_context(|| format!("failed to read motor registry {}", path.display()))?;
        tracing::info!(path = %path.display(), motors = registry.records.len(), "motor registry loaded");
        Ok(registry)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let records = rdr
            .deserialize::<MotorRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<MotorRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MotorRecord] {
        &self.records
    }

    /// Distinct clients, in order of first appearance.
    pub fn clients(&self) -> Vec<ClientSummary> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.client_id))
            .map(|r| ClientSummary {
                client_id: r.client_id,
                client_name: r.client_name.clone(),
            })
            .collect()
    }

    pub fn motors_for_client(&self, client_id: i64) -> Vec<MotorSummary> {
        self.records
            .iter()
            .filter(|r| r.client_id == client_id)
            .map(|r| MotorSummary {
                motor_id: r.motor_id.clone(),
                motor_description: r.motor_description.clone(),
            })
            .collect()
    }

    pub fn find_motor(&self, motor_id: &str) -> Option<&MotorRecord> {
        self.records.iter().find(|r| r.motor_id == motor_id)
    }
}
