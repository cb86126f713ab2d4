//! Pose generator interface

use kinema_core::{
    BodySuggestions, FaceSample, GeneratorKind, HandTrackingFrame, InputEvent, Pose, RestPose,
    Target,
};

use crate::RequestBus;

/// A source of candidate poses for one or more targets
///
/// Generators are driven once per frame by the controller: events and
/// tracking samples first, then `tick`, then `pose` for every target the
/// generator currently owns or is being blended away from.
pub trait PoseGenerator: Send {
    fn kind(&self) -> GeneratorKind;

    /// Targets this generator can produce a pose for
    fn targets(&self) -> &'static [Target];

    /// React to a device event, publishing ownership requests if relevant
    fn handle_event(&mut self, _event: &InputEvent, _bus: &mut RequestBus) {}

    /// React to the latest face tracker sample
    fn handle_face_sample(&mut self, _sample: &FaceSample, _bus: &mut RequestBus) {}

    /// React to a hand tracking frame
    fn handle_hand_frame(&mut self, _frame: &HandTrackingFrame, _bus: &mut RequestBus) {}

    /// Advance internal time-dependent state
    fn tick(&mut self, _dt: f32, _bus: &mut RequestBus) {}

    /// Current candidate pose for `target`
    fn pose(&self, target: Target) -> Option<Pose>;

    /// Whether the generator had valid input for `target` this frame
    fn is_fresh(&self, _target: Target) -> bool {
        true
    }

    /// Continuous generators keep a target while fresh; event-driven ones
    /// release it after the idle timeout without a new request
    fn is_continuous(&self) -> bool {
        false
    }

    /// An input for `target` is still held down, so an event-driven owner
    /// does not idle out
    fn is_holding(&self, _target: Target) -> bool {
        false
    }

    /// Add this frame's lean and offset proposals
    fn contribute(&self, _suggestions: &mut BodySuggestions) {}

    fn on_model_loaded(&mut self, _rest: &RestPose) {}

    fn on_model_unloaded(&mut self) {}
}
