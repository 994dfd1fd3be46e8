//! Camera rig
//!
//! A first-person camera reduced to what the console reports: position,
//! horizontal/vertical angles and the derived forward vector.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::telemetry::{TelemetryKind, TelemetryMessage};

/// Vertical angle stays just short of straight up/down
const VERTICAL_LIMIT: f64 = FRAC_PI_2 - 0.0001;

/// Look input per second that steers the synthetic orbit
/// (0.5 rad/s at the default sensitivity)
const ORBIT_LOOK_INPUT: f64 = -500.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    position: [f64; 3],
    horizontal_angle: f64,
    vertical_angle: f64,
    /// Radians per unit of look input
    sensitivity: f64,
    /// Units per second
    speed: f64,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new([0.0, 9.0, 0.0])
    }
}

impl CameraRig {
    pub fn new(position: [f64; 3]) -> Self {
        Self {
            position,
            horizontal_angle: 0.0,
            vertical_angle: 0.0,
            sensitivity: 0.001,
            speed: 20.0,
        }
    }

    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    pub fn horizontal_angle(&self) -> f64 {
        self.horizontal_angle
    }

    pub fn vertical_angle(&self) -> f64 {
        self.vertical_angle
    }

    /// Unit forward vector: `(1, 0, 0)` pitched about Z, then yawed about Y
    pub fn forward(&self) -> [f64; 3] {
        let (sin_h, cos_h) = self.horizontal_angle.sin_cos();
        let (sin_v, cos_v) = self.vertical_angle.sin_cos();
        [cos_h * cos_v, sin_v, -sin_h * cos_v]
    }

    /// Apply a look input, e.g. mouse offset from the window centre
    pub fn look(&mut self, dx: f64, dy: f64) {
        self.vertical_angle =
            (self.vertical_angle - self.sensitivity * dy).clamp(-VERTICAL_LIMIT, VERTICAL_LIMIT);
        self.set_horizontal(self.horizontal_angle - self.sensitivity * dx);
    }

    /// Move along `direction` for `dt` seconds at the rig's speed.
    /// A zero direction leaves the rig in place.
    pub fn translate(&mut self, direction: [f64; 3], dt: f64) {
        let length = direction.iter().map(|c| c * c).sum::<f64>().sqrt();
        if length == 0.0 || !length.is_finite() {
            return;
        }

        let step = self.speed * dt / length;
        for (p, d) in self.position.iter_mut().zip(direction) {
            *p += d * step;
        }
    }

    /// Advance the synthetic orbit by `dt` seconds: a steady sideways look
    /// input, then a step forward
    pub fn advance(&mut self, dt: f64) {
        self.look(ORBIT_LOOK_INPUT * dt, 0.0);
        self.translate(self.forward(), dt);
    }

    fn set_horizontal(&mut self, angle: f64) {
        self.horizontal_angle = angle.rem_euclid(TAU);
    }

    /// `[x, y, z]` with two decimals
    pub fn position_readout(&self) -> String {
        format_vector(self.position)
    }

    pub fn forward_readout(&self) -> String {
        format_vector(self.forward())
    }

    /// `[H: h, V:v]` with two decimals
    pub fn angle_readout(&self) -> String {
        format!(
            "[H: {:.2}, V:{:.2}]",
            self.horizontal_angle, self.vertical_angle
        )
    }

    /// The three camera readouts as telemetry messages
    pub fn telemetry(&self) -> [TelemetryMessage; 3] {
        [
            TelemetryMessage::text(TelemetryKind::CameraPosition, self.position_readout()),
            TelemetryMessage::text(TelemetryKind::CameraForward, self.forward_readout()),
            TelemetryMessage::text(TelemetryKind::CameraAngle, self.angle_readout()),
        ]
    }
}

fn format_vector([x, y, z]: [f64; 3]) -> String {
    // Adding zero turns -0.0 into 0.0
    format!("[{:.2}, {:.2}, {:.2}]", x + 0.0, y + 0.0, z + 0.0)
}
