//! Generator registry owned by the controller

use kinema_arbiter::PoseGenerator;
use kinema_core::{GeneratorKind, HandTrackingSource, Pose, Target};

use crate::{
    AlwaysDownGenerator, ArcadeStickGenerator, CarHandleGenerator, FaceTrackerGenerator,
    GamepadGenerator, HandTrackingGenerator, IdleSwayGenerator, InputConfig, LocomotionGenerator,
    MouseGenerator, PresentationGenerator, TypingGenerator,
};

/// One generator per kind, looked up by `GeneratorKind`
pub struct GeneratorSet {
    generators: Vec<Box<dyn PoseGenerator>>,
    idle_enabled: bool,
}

impl GeneratorSet {
    /// Full set of built-in generators
    pub fn new(config: &InputConfig) -> Self {
        let generators: Vec<Box<dyn PoseGenerator>> = vec![
            Box::new(TypingGenerator::new(config.typing)),
            Box::new(MouseGenerator::new(config.mouse)),
            Box::new(PresentationGenerator::new(config.presentation)),
            Box::new(GamepadGenerator::new(config.gamepad)),
            Box::new(ArcadeStickGenerator::new(config.arcade_stick)),
            Box::new(CarHandleGenerator::new(config.car_handle)),
            Box::new(HandTrackingGenerator::new(
                HandTrackingSource::Image,
                config.hand_tracking,
            )),
            Box::new(HandTrackingGenerator::new(
                HandTrackingSource::MediaPipe,
                config.hand_tracking,
            )),
            Box::new(FaceTrackerGenerator::new(config.face)),
            Box::new(IdleSwayGenerator::new(config.idle)),
            Box::new(AlwaysDownGenerator::new()),
            Box::new(LocomotionGenerator::new(config.locomotion)),
        ];
        Self {
            generators,
            idle_enabled: config.idle.enabled,
        }
    }

    /// Custom set; a later generator replaces an earlier one of the same kind
    pub fn from_generators(generators: Vec<Box<dyn PoseGenerator>>, idle_enabled: bool) -> Self {
        let mut set = Self {
            generators: Vec::with_capacity(generators.len()),
            idle_enabled,
        };
        for generator in generators {
            set.insert(generator);
        }
        set
    }

    pub fn insert(&mut self, generator: Box<dyn PoseGenerator>) {
        let kind = generator.kind();
        self.generators.retain(|g| g.kind() != kind);
        self.generators.push(generator);
    }

    pub fn get(&self, kind: GeneratorKind) -> Option<&dyn PoseGenerator> {
        self.generators
            .iter()
            .find(|g| g.kind() == kind)
            .map(|g| g.as_ref())
    }

    pub fn get_mut(&mut self, kind: GeneratorKind) -> Option<&mut Box<dyn PoseGenerator>> {
        self.generators.iter_mut().find(|g| g.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn PoseGenerator> {
        self.generators.iter().map(|g| g.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn PoseGenerator>> {
        self.generators.iter_mut()
    }

    /// Live pose of `kind` for `target`
    pub fn pose(&self, kind: GeneratorKind, target: Target) -> Option<Pose> {
        self.get(kind)?.pose(target)
    }

    pub fn kinds(&self) -> Vec<GeneratorKind> {
        self.generators.iter().map(|g| g.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Whether idle sway serves as the passive fallback
    pub fn idle_enabled(&self) -> bool {
        self.idle_enabled
    }

    pub fn set_idle_enabled(&mut self, enabled: bool) {
        self.idle_enabled = enabled;
    }
}
