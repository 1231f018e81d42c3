//! Wire types exchanged with the motor backend.
//!
//! Only the payloads the console needs: login, status reads and the generic
//! `{success, message}` acknowledgement returned by motor commands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three motors on the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motor {
    Tilt,
    Rotary,
    Peristaltic,
}

impl fmt::Display for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Motor::Tilt => write!(f, "tilt"),
            Motor::Rotary => write!(f, "rotary"),
            Motor::Peristaltic => write!(f, "peristaltic"),
        }
    }
}

impl Motor {
    pub const ALL: [Motor; 3] = [Motor::Tilt, Motor::Rotary, Motor::Peristaltic];

    /// Parse a motor name, accepting a few aliases.
    pub fn from_str_loose(s: &str) -> Option<Motor> {
        match s.to_lowercase().trim() {
            "tilt" | "tilt-motor" => Some(Motor::Tilt),
            "rotary" | "rotate" | "rotary-motor" => Some(Motor::Rotary),
            "peristaltic" | "pump" | "peristaltic-motor" => Some(Motor::Peristaltic),
            _ => None,
        }
    }

    /// Status endpoint of this motor.
    pub fn status_path(&self) -> &'static str {
        match self {
            Motor::Tilt => "/tilt/status",
            Motor::Rotary => "/rotate/status",
            Motor::Peristaltic => "/peristaltic/status",
        }
    }

    /// Stop endpoint of this motor.
    pub fn stop_path(&self) -> &'static str {
        match self {
            Motor::Tilt => "/tilt/stop-tilt",
            Motor::Rotary => "/rotate/stop-rotate",
            Motor::Peristaltic => "/peristaltic/stop-rotate",
        }
    }
}

/// Response to `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Generic acknowledgement returned by motor commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

/// Response to `GET /{motor}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorStatus {
    pub status: String,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub is_moving: bool,
    #[serde(default)]
    pub initialized: bool,
}

/// One motor's entry in `GET /api/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorSummary {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_moving: bool,
    #[serde(default)]
    pub movement_type: Option<String>,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub initialized: bool,
}

/// Response to `GET /api/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralStatus {
    pub tilt: MotorSummary,
    pub rotary: MotorSummary,
    pub peristaltic: MotorSummary,
}

impl GeneralStatus {
    pub fn get(&self, motor: Motor) -> &MotorSummary {
        match motor {
            Motor::Tilt => &self.tilt,
            Motor::Rotary => &self.rotary,
            Motor::Peristaltic => &self.peristaltic,
        }
    }

    /// Motors currently moving.
    pub fn moving(&self) -> Vec<Motor> {
        Motor::ALL
            .into_iter()
            .filter(|m| self.get(*m).is_moving)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_status_from_backend_json() {
        let json = r#"{
            "tilt": {"status": "moving", "is_moving": true, "movement_type": "tilt", "position": 12.5, "initialized": true},
            "rotary": {"status": "idle", "is_moving": false, "movement_type": null, "position": null, "initialized": true},
            "peristaltic": {"status": null, "is_moving": false, "movement_type": null, "position": 0, "initialized": false}
        }"#;
        let status: GeneralStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.moving(), vec![Motor::Tilt]);
        assert_eq!(status.get(Motor::Tilt).position, Some(12.5));
        assert!(status.get(Motor::Peristaltic).status.is_none());
    }

    #[test]
    fn test_motor_aliases() {
        assert_eq!(Motor::from_str_loose("Rotate"), Some(Motor::Rotary));
        assert_eq!(Motor::from_str_loose("pump"), Some(Motor::Peristaltic));
        assert_eq!(Motor::from_str_loose("spindle"), None);
    }
}
