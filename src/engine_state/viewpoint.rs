//! The reference point the scheduler prioritizes around.

use cgmath::Point3;

/// Supplies the point that dirty chunks are prioritized by distance to.
///
/// Read once per [`EngineState::tick`](super::EngineState::tick).
pub trait ViewpointProvider {
    /// Current viewpoint in world space.
    fn viewpoint(&self) -> Point3<f32>;
}

impl ViewpointProvider for Point3<f32> {
    fn viewpoint(&self) -> Point3<f32> {
        *self
    }
}

/// A viewpoint circling the world's vertical axis. Each call to
/// [`OrbitViewpoint::advance`] moves it one `step` along the orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitViewpoint {
    /// Distance from the vertical axis
    pub radius: f32,
    /// Height above the origin
    pub height: f32,
    /// Current angle in radians
    pub angle: f32,
    /// Angle added by each `advance`
    pub step: f32,
}

impl OrbitViewpoint {
    /// Moves the viewpoint one step along its orbit.
    pub fn advance(&mut self) {
        self.angle = (self.angle + self.step) % std::f32::consts::TAU;
    }
}

impl ViewpointProvider for OrbitViewpoint {
    fn viewpoint(&self) -> Point3<f32> {
        Point3::new(
            self.radius * self.angle.cos(),
            self.height,
            self.radius * self.angle.sin(),
        )
    }
}
