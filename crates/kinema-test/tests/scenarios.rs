//! End-to-end motion scenarios

use std::time::Duration;

use glam::{Quat, Vec2, Vec3};
use kinema_arbiter::ArbiterState;
use kinema_core::{
    bones, FaceSample, GeneratorKind, HandSample, HandTrackingFrame, HandTrackingSource,
    InputEvent, KinemaError, MotionMode, MouseButton, Target,
};
use kinema_runtime::{IntegratedMotionController, MotionConfig};
use kinema_test::{InputJitter, MotionSimulator, RecordingSkeleton};
use kinema_transport::{encode_face_packet, FaceTrackerReceiver, LatestSlot};
use proptest::prelude::*;

fn right_hand_frame(source: HandTrackingSource) -> HandTrackingFrame {
    let mut frame = HandTrackingFrame::empty(source);
    frame.right = Some(HandSample {
        wrist_position: Vec3::new(0.3, 1.1, 0.35),
        wrist_rotation: Quat::IDENTITY,
        confidence: 0.9,
    });
    frame
}

#[test]
fn test_blend_completes_after_blend_duration() {
    let mut sim = MotionSimulator::perfect().unwrap();
    sim.run_frames(4).unwrap();

    sim.press("f");
    let frame = sim.run_frames(15).unwrap();
    assert_eq!(frame.state(Target::LeftHand), ArbiterState::Blending);

    let frame = sim.step().unwrap();
    assert_eq!(frame.state(Target::LeftHand), ArbiterState::Stable);
    let typing = sim
        .controller()
        .generators()
        .pose(GeneratorKind::Typing, Target::LeftHand)
        .unwrap();
    assert!(frame.pose(Target::LeftHand).abs_diff_eq(&typing, 1e-6));
}

#[test]
fn test_repeated_request_does_not_restart_blend() {
    let mut sim = MotionSimulator::perfect().unwrap();
    sim.run_frames(1).unwrap();
    sim.press("f");
    sim.run_frames(8).unwrap();
    let elapsed = sim.controller().arbiter(Target::LeftHand).blend_elapsed();
    let switches = sim.controller().arbiter(Target::LeftHand).switches();

    sim.press("d");
    sim.step().unwrap();
    let arbiter = sim.controller().arbiter(Target::LeftHand);
    assert_eq!(arbiter.switches(), switches);
    assert_eq!(arbiter.blend_elapsed(), elapsed + 1.0 / 64.0);
    assert_eq!(arbiter.since_request(), 1.0 / 64.0);
}

#[test]
fn test_mid_blend_retarget_is_continuous() {
    let mut sim = MotionSimulator::perfect().unwrap();
    sim.event(InputEvent::MouseMoved {
        position: Vec2::new(0.9, -0.8),
    });
    sim.run_frames(40).unwrap();
    assert_eq!(sim.owner(Target::RightHand), Some(GeneratorKind::Mouse));

    sim.press("j");
    let before = sim.run_frames(6).unwrap();
    assert_eq!(before.state(Target::RightHand), ArbiterState::Blending);

    // Mouse button mid-blend takes the hand back
    sim.event(InputEvent::MouseButton {
        button: MouseButton::Left,
        pressed: true,
    });
    let after = sim.step().unwrap();
    assert_eq!(after.owner(Target::RightHand), Some(GeneratorKind::Mouse));
    assert_eq!(after.state(Target::RightHand), ArbiterState::Blending);

    let jump = before
        .pose(Target::RightHand)
        .position
        .distance(after.pose(Target::RightHand).position);
    assert!(jump < 0.05, "jump {jump}");
}

#[test]
fn test_owner_ramps_stay_bounded_under_dropout() {
    let mut sim =
        MotionSimulator::new(MotionConfig::default(), InputJitter::unstable(), 11).unwrap();
    sim.stream_hands(Some(right_hand_frame(HandTrackingSource::MediaPipe)));
    for _ in 0..640 {
        sim.step().unwrap();
        for target in Target::ALL {
            let rate = sim.controller().ramp(target).apply_rate();
            assert!((0.0..=1.0).contains(&rate));
            assert!(sim.owner(target).is_some());
        }
    }
}

#[test]
fn test_no_lean_input_leaves_body_untouched() {
    let mut sim = MotionSimulator::perfect().unwrap();
    let frame = sim.run_for(1.0).unwrap();
    assert!(frame.body.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    assert_eq!(frame.body.offset, Vec3::ZERO);
    assert_eq!(frame.body.roll_rate, 0.0);

    let idle_body = sim
        .controller()
        .generators()
        .pose(GeneratorKind::Idle, Target::Body)
        .unwrap();
    assert!(frame.pose(Target::Body).abs_diff_eq(&idle_body, 1e-5));
}

#[test]
fn test_face_lean_converges() {
    let mut sim = MotionSimulator::perfect().unwrap();
    sim.stream_face(Some(FaceSample::detected(Vec3::new(0.0, 20.0, 8.0), Vec3::ZERO)));
    let early = sim.run_for(0.5).unwrap();
    let settled = sim.run_for(4.0).unwrap();
    let next = sim.step().unwrap();

    assert!(early.body.rotation.angle_between(Quat::IDENTITY) > 1e-3);
    assert!(settled.body.rotation.angle_between(next.body.rotation) < 1e-4);
    assert!(settled.body.roll_rate.abs() <= 1.0);
    assert!(sim.rig().roll_rate() != 0.0);
}

#[test]
fn test_typing_idle_typing_with_independent_hands() {
    let mut sim = MotionSimulator::perfect().unwrap();
    let frame = sim.step().unwrap();
    for target in Target::ALL {
        assert_eq!(frame.owner(target), Some(GeneratorKind::Idle));
    }

    // Left hand types at t0
    sim.press("f");
    let frame = sim.step().unwrap();
    assert_eq!(frame.owner(Target::LeftHand), Some(GeneratorKind::Typing));
    assert_eq!(frame.owner(Target::RightHand), Some(GeneratorKind::Idle));

    // Right hand types at t0 + 1s
    sim.run_frames(63).unwrap();
    sim.press("j");
    let frame = sim.step().unwrap();
    assert_eq!(frame.owner(Target::RightHand), Some(GeneratorKind::Typing));
    assert_eq!(frame.state(Target::LeftHand), ArbiterState::Stable);

    // Left hand has been quiet for 2s, right hand for 1s
    let frame = sim.run_frames(63).unwrap();
    assert_eq!(frame.owner(Target::LeftHand), Some(GeneratorKind::Typing));
    let frame = sim.step().unwrap();
    assert_eq!(frame.owner(Target::LeftHand), Some(GeneratorKind::Idle));
    assert_eq!(frame.state(Target::LeftHand), ArbiterState::Blending);
    assert_eq!(frame.owner(Target::RightHand), Some(GeneratorKind::Typing));

    let frame = sim.run_frames(16).unwrap();
    assert_eq!(frame.state(Target::LeftHand), ArbiterState::Stable);

    // Next key press blends back in over 0.25s
    sim.press("f");
    let frame = sim.run_frames(15).unwrap();
    assert_eq!(frame.owner(Target::LeftHand), Some(GeneratorKind::Typing));
    assert_eq!(frame.state(Target::LeftHand), ArbiterState::Blending);
    let frame = sim.step().unwrap();
    assert_eq!(frame.state(Target::LeftHand), ArbiterState::Stable);

    let left = sim.owner_changes(Target::LeftHand);
    let right = sim.owner_changes(Target::RightHand);
    assert_eq!(left.len(), 4);
    assert_eq!(right.len(), 2);
}

#[test]
fn test_standing_only_then_tracking_resumes() {
    let mut sim = MotionSimulator::perfect().unwrap();
    sim.stream_hands(Some(right_hand_frame(HandTrackingSource::MediaPipe)));
    sim.run_for(0.5).unwrap();
    assert_eq!(sim.owner(Target::RightHand), Some(GeneratorKind::MediaPipeHand));

    sim.controller_mut().set_motion_mode(MotionMode::StandingOnly);
    let frame = sim.run_for(1.0).unwrap();
    assert_eq!(frame.owner(Target::RightHand), Some(GeneratorKind::AlwaysDown));
    assert_eq!(frame.owner(Target::LeftHand), Some(GeneratorKind::AlwaysDown));

    sim.controller_mut().set_motion_mode(MotionMode::Default);
    let frame = sim.run_for(1.0).unwrap();
    assert_eq!(frame.owner(Target::RightHand), Some(GeneratorKind::MediaPipeHand));
    assert_eq!(frame.owner(Target::LeftHand), Some(GeneratorKind::Idle));
}

#[test]
fn test_slow_tracker_keeps_hand_and_reaches_raw_pose() {
    let mut sim = MotionSimulator::perfect().unwrap().with_tracker_interval(3);
    let frame = right_hand_frame(HandTrackingSource::MediaPipe);
    let raw = sim.controller().rest_pose().unwrap().chest.position
        + frame.right.unwrap().wrist_position;
    sim.stream_hands(Some(frame));
    let last = sim.run_for(5.0).unwrap();

    let changes = sim.owner_changes(Target::RightHand);
    assert!(changes.len() <= 2, "owner flapped: {changes:?}");
    assert_eq!(last.owner(Target::RightHand), Some(GeneratorKind::MediaPipeHand));
    assert_eq!(last.owner(Target::LeftHand), Some(GeneratorKind::Idle));
    assert_eq!(sim.controller().ramp(Target::RightHand).apply_rate(), 1.0);

    let distance = last.pose(Target::RightHand).position.distance(raw);
    assert!(distance < 0.01, "distance to raw wrist {distance}");
}

#[test]
fn test_lost_hand_falls_back_to_idle() {
    let mut sim = MotionSimulator::perfect().unwrap();
    sim.stream_hands(Some(right_hand_frame(HandTrackingSource::Image)));
    sim.run_for(0.5).unwrap();
    assert_eq!(sim.owner(Target::RightHand), Some(GeneratorKind::ImageHand));

    sim.stream_hands(None);
    let frame = sim.run_for(1.0).unwrap();
    assert_eq!(frame.owner(Target::RightHand), Some(GeneratorKind::Idle));
    assert!(frame.pose(Target::RightHand).is_finite());
}

#[test]
fn test_non_finite_samples_are_dropped() {
    let mut sim = MotionSimulator::perfect().unwrap();
    sim.run_frames(1).unwrap();
    sim.event(InputEvent::MouseMoved {
        position: Vec2::new(f32::NAN, 0.0),
    });
    sim.controller_mut()
        .ingest_face_sample(FaceSample::detected(Vec3::splat(f32::INFINITY), Vec3::ZERO));
    let frame = sim.run_frames(8).unwrap();

    assert_eq!(frame.owner(Target::RightHand), Some(GeneratorKind::Idle));
    assert_eq!(frame.owner(Target::HeadLookAt), Some(GeneratorKind::Idle));
    for target in Target::ALL {
        assert!(frame.pose(target).is_finite());
    }
}

#[test]
fn test_model_reload_cycle() {
    let mut controller = IntegratedMotionController::new(MotionConfig::default()).unwrap();
    let broken = RecordingSkeleton::humanoid().without_bone(bones::HIPS);
    assert!(matches!(
        controller.on_model_loaded(&broken),
        Err(KinemaError::MissingBone(_))
    ));

    let mut rig = RecordingSkeleton::humanoid();
    controller.on_model_loaded(&rig).unwrap();
    assert!(controller.tick(1.0 / 64.0, &mut rig).unwrap().is_some());
    controller.on_model_unloaded();
    assert!(controller.tick(1.0 / 64.0, &mut rig).unwrap().is_none());

    controller.on_model_loaded(&rig).unwrap();
    let frame = controller.tick(1.0 / 64.0, &mut rig).unwrap().unwrap();
    assert_eq!(frame.owner(Target::Body), Some(GeneratorKind::Idle));
}

#[tokio::test]
async fn test_udp_face_feed_drives_head() {
    let receiver = FaceTrackerReceiver::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = receiver.local_addr();
    let slot = LatestSlot::new();
    let handle = receiver.spawn(slot.clone());

    let mut controller = IntegratedMotionController::new(MotionConfig::default()).unwrap();
    let mut rig = RecordingSkeleton::humanoid();
    controller.on_model_loaded(&rig).unwrap();
    controller.attach_face_feed(slot);

    let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let packet = encode_face_packet(&FaceSample::detected(Vec3::new(0.0, 25.0, 0.0), Vec3::ZERO));

    let mut owner = None;
    for _ in 0..200 {
        sender.send_to(packet.as_bytes(), addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let frame = controller.tick(1.0 / 64.0, &mut rig).unwrap().unwrap();
        owner = frame.owner(Target::HeadLookAt);
        if owner == Some(GeneratorKind::FaceTracker) {
            break;
        }
    }
    assert_eq!(owner, Some(GeneratorKind::FaceTracker));
    assert!(controller.stats().face_samples > 0);
    assert!(handle.stats().decoded > 0);
    handle.shutdown();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_jittered_runs_stay_finite(seed in any::<u64>()) {
        let mut sim =
            MotionSimulator::new(MotionConfig::default(), InputJitter::unstable(), seed).unwrap();
        let face = FaceSample::detected(Vec3::new(-10.0, 30.0, 5.0), Vec3::new(0.05, 0.0, 0.0));
        sim.stream_face(Some(face));
        sim.stream_hands(Some(right_hand_frame(HandTrackingSource::Image)));
        sim.press("f");
        sim.run_for(3.0).unwrap();

        for frame in sim.history() {
            for target in Target::ALL {
                prop_assert!(frame.pose(target).is_finite());
                prop_assert!(frame.owner(target).is_some());
            }
            prop_assert!(frame.body.roll_rate.abs() <= 1.0);
        }
    }
}
