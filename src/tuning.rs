//! World tuning parameters.
//!
//! Every option here is read by the solver/broad-phase/TOI pipeline each
//! step; none are cached copies that can drift from what `World` holds.
//! Defaults follow the upstream Box2D/PlayRho constants (see DESIGN.md).

use crate::types::{Real, Vec2};

/// Simulation-wide tuning knobs, owned by `World` and readable by every
/// subsystem that needs a tolerance or iteration cap.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldConfig {
    pub gravity: Vec2,

    /// Broad-phase fat-AABB padding.
    pub aabb_extension: Real,
    /// Multiplier applied to a body's per-step displacement when
    /// predictively extending a fat AABB.
    pub aabb_displacement_multiplier: Real,

    pub min_vertex_radius: Real,
    pub max_vertex_radius: Real,

    pub linear_slop: Real,
    pub angular_slop: Real,

    pub max_linear_correction: Real,
    pub max_angular_correction: Real,

    /// Below this relative normal velocity, restitution does not apply.
    pub velocity_threshold: Real,

    pub max_sub_steps: u8,
    pub max_toi_iters: u8,
    pub max_toi_root_iters: u8,
    pub max_distance_iters: u8,

    pub toi_baumgarte: Real,
    pub baumgarte: Real,

    pub min_still_time_to_sleep: Real,
    pub linear_sleep_tolerance: Real,
    pub angular_sleep_tolerance: Real,

    /// Narrow-phase switch: when an edge is this many times longer than
    /// its vertex radius, prefer a face manifold over a circles manifold
    /// at a vertex-vertex corner, to avoid normal popping.
    pub max_circles_ratio: Real,

    pub do_warm_start: bool,
    pub allow_sleep: bool,
    pub continuous_physics: bool,
    pub sub_stepping: bool,
    pub auto_clear_forces: bool,

    pub velocity_iterations: u32,
    pub position_iterations: u32,

    /// Cap on bodies/contacts pulled into a single TOI mini-island.
    pub max_toi_contacts: u32,

    /// Maximum per-step translation/rotation before a body's motion is
    /// clamped (prevents numerical blow-up from bad input).
    pub max_translation: Real,
    pub max_rotation: Real,

    /// Body/joint handle-space ceiling (`2^16 - 2`).
    pub max_bodies: u32,
    pub max_joints: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -10.0),
            aabb_extension: 0.1,
            aabb_displacement_multiplier: 2.0,
            min_vertex_radius: 0.0,
            max_vertex_radius: 10.0,
            linear_slop: 0.005,
            angular_slop: 2.0 / 180.0 * std::f32::consts::PI,
            max_linear_correction: 0.2,
            max_angular_correction: 8.0 / 180.0 * std::f32::consts::PI,
            velocity_threshold: 1.0,
            max_sub_steps: 48,
            max_toi_iters: 20,
            max_toi_root_iters: 30,
            max_distance_iters: 20,
            toi_baumgarte: 0.75,
            baumgarte: 0.2,
            min_still_time_to_sleep: 0.5,
            linear_sleep_tolerance: 0.01,
            angular_sleep_tolerance: 2.0 / 180.0 * std::f32::consts::PI,
            max_circles_ratio: 8.0,
            do_warm_start: true,
            allow_sleep: true,
            continuous_physics: true,
            sub_stepping: false,
            auto_clear_forces: true,
            velocity_iterations: 8,
            position_iterations: 3,
            max_toi_contacts: 32,
            max_translation: 4.0,
            max_rotation: 0.5 * std::f32::consts::PI,
            max_bodies: (1 << 16) - 2,
            max_joints: (1 << 16) - 2,
        }
    }
}

/// Fluent builder for `WorldConfig`.
#[derive(Clone, Debug, Default)]
pub struct WorldConfigBuilder {
    cfg: WorldConfig,
}

impl WorldConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: WorldConfig::default(),
        }
    }

    pub fn gravity<V: Into<Vec2>>(mut self, g: V) -> Self {
        self.cfg.gravity = g.into();
        self
    }
    pub fn aabb_extension(mut self, v: Real) -> Self {
        self.cfg.aabb_extension = v;
        self
    }
    pub fn linear_slop(mut self, v: Real) -> Self {
        self.cfg.linear_slop = v;
        self
    }
    pub fn velocity_threshold(mut self, v: Real) -> Self {
        self.cfg.velocity_threshold = v;
        self
    }
    pub fn max_sub_steps(mut self, v: u8) -> Self {
        self.cfg.max_sub_steps = v;
        self
    }
    pub fn baumgarte(mut self, v: Real) -> Self {
        self.cfg.baumgarte = v;
        self
    }
    pub fn toi_baumgarte(mut self, v: Real) -> Self {
        self.cfg.toi_baumgarte = v;
        self
    }
    pub fn allow_sleep(mut self, flag: bool) -> Self {
        self.cfg.allow_sleep = flag;
        self
    }
    pub fn continuous_physics(mut self, flag: bool) -> Self {
        self.cfg.continuous_physics = flag;
        self
    }
    pub fn sub_stepping(mut self, flag: bool) -> Self {
        self.cfg.sub_stepping = flag;
        self
    }
    pub fn do_warm_start(mut self, flag: bool) -> Self {
        self.cfg.do_warm_start = flag;
        self
    }
    pub fn auto_clear_forces(mut self, flag: bool) -> Self {
        self.cfg.auto_clear_forces = flag;
        self
    }
    pub fn velocity_iterations(mut self, v: u32) -> Self {
        self.cfg.velocity_iterations = v;
        self
    }
    pub fn position_iterations(mut self, v: u32) -> Self {
        self.cfg.position_iterations = v;
        self
    }

    #[must_use]
    pub fn build(self) -> WorldConfig {
        self.cfg
    }
}
