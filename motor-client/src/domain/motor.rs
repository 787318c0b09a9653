use serde::{Deserialize, Serialize};

/// One row of the client/motor registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorRecord {
    pub client_id: i64,
    pub client_name: String,
    pub motor_id: String,
    pub motor_description: String,
    pub install_location: Option<String>,
    pub nominal_current: Option<f64>,
    pub power_cv: Option<f64>,
    pub connection_type: Option<String>,
    pub nominal_voltage_v: Option<f64>,
    pub tariff_group: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub installed_on: Option<String>,
    pub device_id: Option<String>,
    pub notes: Option<String>,
}

impl MotorRecord {
    /// Nameplate ratings for this motor; a missing voltage falls back to `default_voltage`.
    pub fn ratings(&self, default_voltage: f64) -> Ratings {
        Ratings {
            nominal_current: self.nominal_current,
            nominal_voltage: Some(self.nominal_voltage_v.unwrap_or(default_voltage)),
        }
    }
}

/// Nameplate current and voltage supplied with a report request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub nominal_current: Option<f64>,
    pub nominal_voltage: Option<f64>,
}

impl Ratings {
    pub fn new(nominal_current: Option<f64>, nominal_voltage: Option<f64>) -> Self {
        Self {
            nominal_current,
            nominal_voltage,
        }
    }

    pub fn valid_current(&self) -> Option<f64> {
        positive(self.nominal_current)
    }

    pub fn valid_voltage(&self) -> Option<f64> {
        positive(self.nominal_voltage)
    }
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}
