pub mod math;

pub use math::{Mat22, Position, Rot, Sweep, Transform, Velocity};
