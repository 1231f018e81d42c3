//! Built-in route table for the lab motor console.
//!
//! Mirrors the pages the operator console ships with. Every page except the
//! login page requires a session; the tilt, rotary and peristaltic run pages
//! make up the motor-control set.

/// Default route table of the operator console.
pub const LAB_CONSOLE_YAML: &str = r#"# motorctl route table: lab-console
# The pages of the lab motor operator console.

console: lab-console-v1

description: >
  Operator console for the tilt, rotary and peristaltic motors. Entering a
  motor page from another page asks for confirmation first.

login: Login
dashboard: Dashboard
calibration: PeristalticMotorCalibration
run: PeristalticMotor

routes:
  - name: Login
    path: /login
    requires_auth: false

  - name: Dashboard
    path: /

  # -- Motor control pages --
  - name: TiltMotor
    path: /tilt-motor
    motor: true

  - name: RotaryMotor
    path: /rotary-motor
    motor: true

  - name: PeristalticMotor
    path: /peristaltic-motor
    motor: true

  # -- Peristaltic setup pages --
  - name: PeristalticMotorCalibration
    path: /peristaltic-motor-calibration

  - name: PeristalticMotorTubeConfigurations
    path: /peristaltic-motor-tube-configurations

  - name: MeasurementsHistory
    path: /measurements-history
"#;
