//! Motion simulator - full controller driven frame by frame
//!
//! Scripted events go straight to the controller. Continuous face and hand
//! streams are re-sent every `tracker_interval` frames with seeded noise and
//! dropout, so a run is fully reproducible from its seed.

use kinema_core::{
    FaceSample, GeneratorKind, HandTrackingFrame, InputEvent, KinemaError, KinemaResult, Target,
};
use kinema_runtime::{IntegratedMotionController, MotionConfig, MotionFrame};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{InputJitter, RecordingSkeleton};

/// Nominal frame time; a power of two so elapsed times stay exact
pub const DEFAULT_DT: f32 = 1.0 / 64.0;

/// Deterministic frame loop around one controller and one rig
pub struct MotionSimulator {
    controller: IntegratedMotionController,
    rig: RecordingSkeleton,
    jitter: InputJitter,
    rng: StdRng,
    dt: f32,
    tracker_interval: usize,
    elapsed: f32,
    face: Option<FaceSample>,
    hands: Option<HandTrackingFrame>,
    history: Vec<MotionFrame>,
}

impl MotionSimulator {
    /// Controller with `config`, model already loaded on a humanoid rig
    pub fn new(config: MotionConfig, jitter: InputJitter, seed: u64) -> KinemaResult<Self> {
        let mut controller = IntegratedMotionController::new(config)?;
        let rig = RecordingSkeleton::humanoid();
        controller.on_model_loaded(&rig)?;
        Ok(Self {
            controller,
            rig,
            jitter,
            rng: StdRng::seed_from_u64(seed),
            dt: DEFAULT_DT,
            tracker_interval: 1,
            elapsed: 0.0,
            face: None,
            hands: None,
            history: Vec::new(),
        })
    }

    /// Default configuration, no jitter
    pub fn perfect() -> KinemaResult<Self> {
        Self::new(MotionConfig::default(), InputJitter::perfect(), 0)
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Send streamed tracker samples only every `frames` frames, as a camera
    /// slower than the render loop would
    pub fn with_tracker_interval(mut self, frames: usize) -> Self {
        self.tracker_interval = frames.max(1);
        self
    }

    pub fn controller(&self) -> &IntegratedMotionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut IntegratedMotionController {
        &mut self.controller
    }

    pub fn rig(&self) -> &RecordingSkeleton {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut RecordingSkeleton {
        &mut self.rig
    }

    /// Simulated seconds so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn history(&self) -> &[MotionFrame] {
        &self.history
    }

    pub fn last_frame(&self) -> Option<&MotionFrame> {
        self.history.last()
    }

    pub fn owner(&self, target: Target) -> Option<GeneratorKind> {
        self.controller.owner(target)
    }

    pub fn event(&mut self, event: InputEvent) {
        self.controller.handle_event(&event);
    }

    /// Key down immediately followed by key up
    pub fn press(&mut self, key: &str) {
        self.event(InputEvent::KeyDown { key: key.into() });
        self.event(InputEvent::KeyUp { key: key.into() });
    }

    /// Sample re-sent every frame until replaced; `None` stops the feed
    pub fn stream_face(&mut self, sample: Option<FaceSample>) {
        self.face = sample;
    }

    pub fn stream_hands(&mut self, frame: Option<HandTrackingFrame>) {
        self.hands = frame;
    }

    /// Run one frame
    pub fn step(&mut self) -> KinemaResult<MotionFrame> {
        let dt = self.jitter.frame_dt(self.dt, &mut self.rng);
        let tracker_frame = self.history.len() % self.tracker_interval == 0;

        if let Some(mut sample) = self.face.clone().filter(|_| tracker_frame) {
            if !self.jitter.drops(&mut self.rng) {
                sample.head_angles += self.jitter.angles(&mut self.rng);
                sample.head_position += self.jitter.position(&mut self.rng);
                self.controller.ingest_face_sample(sample);
            }
        }

        if let Some(mut frame) = self.hands.filter(|_| tracker_frame) {
            if !self.jitter.drops(&mut self.rng) {
                for hand in [frame.left.as_mut(), frame.right.as_mut()].into_iter().flatten() {
                    hand.wrist_position += self.jitter.position(&mut self.rng);
                }
                self.controller.ingest_hand_frame(frame);
            }
        }

        let frame = self
            .controller
            .tick(dt, &mut self.rig)?
            .ok_or_else(|| KinemaError::SkeletonError("no model loaded".into()))?;
        self.elapsed += dt;
        self.history.push(frame.clone());
        Ok(frame)
    }

    /// Run `frames` frames (at least one), returning the last
    pub fn run_frames(&mut self, frames: usize) -> KinemaResult<MotionFrame> {
        let mut last = self.step()?;
        for _ in 1..frames {
            last = self.step()?;
        }
        Ok(last)
    }

    /// Run for about `seconds` of nominal frame time
    pub fn run_for(&mut self, seconds: f32) -> KinemaResult<MotionFrame> {
        let frames = (seconds / self.dt).round() as usize;
        self.run_frames(frames)
    }

    /// Largest frame-to-frame position change of `target` over the history
    pub fn max_step(&self, target: Target) -> f32 {
        self.history
            .windows(2)
            .map(|w| w[0].pose(target).position.distance(w[1].pose(target).position))
            .fold(0.0, f32::max)
    }

    /// Frames at which the owner of `target` changed, with the new owner
    pub fn owner_changes(&self, target: Target) -> Vec<(usize, Option<GeneratorKind>)> {
        let mut changes = Vec::new();
        let mut previous = None;
        for (i, frame) in self.history.iter().enumerate() {
            let owner = frame.owner(target);
            if i == 0 || owner != previous {
                changes.push((i, owner));
            }
            previous = owner;
        }
        changes
    }
}
