use std::cell::RefCell;
use std::rc::Rc;

use vizij_motion_core::{
    generators::EaseSpec, Animation, AnimationOptions, AnimationState, Config, Easing, Generator,
    GeneratorKind, Hooks, KeyframesParams, ManualClock, MotionError, PlayState, RepeatType,
    SpringParams,
};

type Log = Rc<RefCell<Vec<String>>>;

fn linear(duration_ms: f64) -> GeneratorKind {
    GeneratorKind::Keyframes(KeyframesParams {
        duration: duration_ms,
        ease: EaseSpec::Single(Easing::Linear),
        times: None,
    })
}

fn recording_hooks(log: &Log) -> Hooks<f64> {
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    Hooks::new()
        .on_play(move || a.borrow_mut().push("play".into()))
        .on_stop(move || b.borrow_mut().push("stop".into()))
        .on_complete(move || c.borrow_mut().push("complete".into()))
        .on_update(move |v| d.borrow_mut().push(format!("update:{v}")))
}

/// Paused 0 → 100 linear tween on `clock`.
fn tween_on(clock: &ManualClock, duration_ms: f64, hooks: Hooks<f64>) -> Animation<f64> {
    let options = AnimationOptions::new(vec![0.0, 100.0])
        .with_generator(linear(duration_ms))
        .with_driver(clock.factory())
        .paused();
    Animation::new(options, hooks).expect("valid options")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn autoplay_starts_the_driver() {
    let clock = ManualClock::starting_at(50.0);
    let options = AnimationOptions::new(vec![0.0, 100.0])
        .with_generator(linear(1000.0))
        .with_driver(clock.factory());
    let mut anim = Animation::new(options, Hooks::new()).expect("valid options");
    assert_eq!(anim.state(), PlayState::Running);
    assert_eq!(clock.running_drivers(), 1);
    clock.advance(500.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(50.0, false)));
}

#[test]
fn callbacks_fire_in_order() {
    let clock = ManualClock::new();
    let log: Log = Rc::default();
    let mut anim = tween_on(&clock, 1000.0, recording_hooks(&log));

    anim.play();
    clock.advance(500.0);
    anim.frame();
    clock.advance(500.0);
    anim.frame();
    anim.stop();

    assert_eq!(
        *log.borrow(),
        vec!["play", "update:50", "update:100", "complete", "stop"]
    );
}

#[test]
fn finished_future_resolves_and_rearms_on_replay() {
    let clock = ManualClock::new();
    let mut anim = tween_on(&clock, 200.0, Hooks::new());
    let first = anim.finished();

    anim.play();
    clock.advance(200.0);
    let last = anim.frame().expect("running");
    assert!(last.done);
    assert_eq!(anim.state(), PlayState::Finished);
    assert!(first.is_resolved());
    pollster::block_on(first.clone());

    // Replay restarts from the beginning with a fresh signal.
    anim.play();
    let second = anim.finished();
    assert!(!second.is_resolved());
    assert_eq!(anim.frame(), Some(AnimationState::new(0.0, false)));
    clock.advance(200.0);
    anim.frame();
    pollster::block_on(second);
    assert!(first.is_resolved());
}

#[test]
fn pause_holds_time_until_resumed() {
    let clock = ManualClock::new();
    let mut anim = tween_on(&clock, 1000.0, Hooks::new());
    anim.play();
    clock.advance(300.0);
    anim.frame();

    anim.pause();
    assert_eq!(anim.state(), PlayState::Paused);
    clock.advance(500.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(30.0, false)));
    assert!(approx(anim.time(), 0.3));

    anim.play();
    assert_eq!(anim.frame(), Some(AnimationState::new(30.0, false)));
    clock.advance(700.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(100.0, true)));
}

#[test]
fn paused_animation_never_completes() {
    let clock = ManualClock::new();
    let log: Log = Rc::default();
    let mut anim = tween_on(&clock, 100.0, recording_hooks(&log));
    anim.play();
    anim.pause();
    anim.set_time(5.0);
    clock.advance(1000.0);
    let state = anim.frame().expect("driver held while paused");
    assert!(state.done);
    assert_eq!(anim.state(), PlayState::Paused);
    assert!(!log.borrow().contains(&"complete".to_string()));
}

#[test]
fn scrubbing_reads_back() {
    let clock = ManualClock::new();
    let mut anim = tween_on(&clock, 1000.0, Hooks::new());

    // Before play: stored as hold time.
    anim.set_time(0.25);
    assert!(approx(anim.time(), 0.25));

    anim.play();
    clock.advance(200.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(45.0, false)));

    // While running: start time is rebased.
    anim.set_time(0.7);
    assert!(approx(anim.time(), 0.7));
    assert_eq!(anim.frame(), Some(AnimationState::new(70.0, false)));

    // While paused: hold time moves.
    anim.pause();
    anim.set_time(0.1);
    assert!(approx(anim.time(), 0.1));
    assert_eq!(anim.frame(), Some(AnimationState::new(10.0, false)));
}

#[test]
fn speed_change_keeps_displayed_time() {
    let clock = ManualClock::new();
    let mut anim = tween_on(&clock, 1000.0, Hooks::new());
    anim.play();
    clock.advance(400.0);
    anim.frame();

    anim.set_speed(2.0);
    assert_eq!(anim.speed(), 2.0);
    assert!(approx(anim.time(), 0.4));
    anim.frame();
    assert!(approx(anim.time(), 0.4));

    clock.advance(100.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(60.0, false)));
}

#[test]
fn negative_speed_plays_backwards_to_start() {
    let clock = ManualClock::new();
    let mut anim = tween_on(&clock, 1000.0, Hooks::new());
    anim.play();
    clock.advance(600.0);
    anim.frame();

    anim.set_speed(-1.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(60.0, false)));
    clock.advance(100.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(50.0, false)));
    clock.advance(500.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(0.0, true)));
    assert_eq!(anim.state(), PlayState::Finished);
}

#[test]
fn reverse_playback_clamps_start_to_total_duration() {
    let clock = ManualClock::new();
    let mut anim = tween_on(&clock, 1000.0, Hooks::new());
    anim.play();
    anim.set_speed(-1.0);

    // Scrubbed past the end: the next tick pulls the start back so playback
    // resumes from the last frame.
    anim.set_time(1.5);
    assert_eq!(anim.frame(), Some(AnimationState::new(100.0, false)));
    assert!(approx(anim.time(), 1.0), "{}", anim.time());

    clock.advance(250.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(75.0, false)));
    clock.advance(750.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(0.0, true)));
    assert_eq!(anim.state(), PlayState::Finished);
}

#[test]
fn reverse_playback_delay_sits_past_the_end() {
    let clock = ManualClock::new();
    let options = AnimationOptions::new(vec![0.0, 100.0])
        .with_generator(linear(1000.0))
        .with_delay(500.0)
        .with_driver(clock.factory())
        .paused();
    let mut anim = Animation::new(options, Hooks::new()).expect("valid options");
    anim.play();
    clock.advance(1200.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(70.0, false)));

    // Backwards, the delay is added on top of the elapsed time, so 700ms
    // lands inside the delay window beyond the total duration.
    anim.set_speed(-1.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(0.0, false)));
    assert_eq!(anim.state(), PlayState::Running);

    clock.advance(300.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(90.0, false)));
    clock.advance(900.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(0.0, true)));
    assert_eq!(anim.state(), PlayState::Finished);
}

#[test]
fn sampling_does_not_move_the_play_start() {
    let clock = ManualClock::starting_at(5000.0);
    let mut anim = tween_on(&clock, 1000.0, Hooks::new());
    assert_eq!(anim.sample(250.0), AnimationState::new(25.0, false));

    anim.play();
    assert_eq!(anim.frame(), Some(AnimationState::new(0.0, false)));
    assert_eq!(anim.state(), PlayState::Running);
    clock.advance(250.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(25.0, false)));
}

#[test]
fn cancel_reports_cancel_frame_then_resets() {
    let clock = ManualClock::new();
    let log: Log = Rc::default();
    let mut anim = tween_on(&clock, 1000.0, recording_hooks(&log));
    let pending = anim.finished();

    anim.play();
    clock.advance(400.0);
    anim.frame();
    anim.cancel();

    assert_eq!(
        *log.borrow(),
        vec!["play", "update:40", "update:0"],
        "cancel re-samples at the recorded start"
    );
    assert_eq!(anim.state(), PlayState::Idle);
    assert_eq!(anim.time(), 0.0);
    assert_eq!(clock.running_drivers(), 0);
    assert_eq!(anim.frame(), None);
    assert!(pending.is_resolved());
    assert!(!anim.finished().is_resolved());

    // Cancelled animations can play again.
    anim.play();
    clock.advance(100.0);
    assert_eq!(anim.frame(), Some(AnimationState::new(10.0, false)));
}

#[test]
fn stop_is_permanent_and_idempotent() {
    let clock = ManualClock::new();
    let log: Log = Rc::default();
    let mut anim = tween_on(&clock, 1000.0, recording_hooks(&log));
    anim.play();
    anim.stop();
    anim.stop();
    anim.play();

    assert_eq!(*log.borrow(), vec!["play", "stop"]);
    assert_eq!(anim.state(), PlayState::Idle);
    assert_eq!(clock.running_drivers(), 0);
    assert_eq!(anim.frame(), None);
}

#[test]
fn stop_before_play_skips_callback() {
    let clock = ManualClock::new();
    let log: Log = Rc::default();
    let mut anim = tween_on(&clock, 1000.0, recording_hooks(&log));
    anim.stop();
    anim.play();
    assert!(log.borrow().is_empty());
    assert_eq!(anim.state(), PlayState::Idle);
}

#[test]
fn complete_jumps_to_end_on_next_frame() {
    let clock = ManualClock::new();
    let log: Log = Rc::default();
    let mut anim = tween_on(&clock, 1000.0, recording_hooks(&log));
    anim.play();
    clock.advance(100.0);
    anim.frame();

    anim.complete();
    assert_eq!(anim.state(), PlayState::Finished);
    assert_eq!(anim.frame(), Some(AnimationState::new(100.0, true)));
    assert_eq!(log.borrow().last().map(String::as_str), Some("complete"));
    assert!(anim.finished().is_resolved());
}

#[test]
fn spring_runs_until_settled() {
    let clock = ManualClock::new();
    let options = AnimationOptions::new(vec![0.0, 100.0])
        .with_generator(GeneratorKind::Spring(SpringParams::default()))
        .with_driver(clock.factory());
    let mut anim = Animation::new(options, Hooks::new()).expect("valid options");

    let mut frames = 0;
    while anim.state() == PlayState::Running {
        clock.advance(16.0);
        anim.frame();
        frames += 1;
        assert!(frames < 1000, "spring never settled");
    }
    assert_eq!(anim.state(), PlayState::Finished);
    // First 16ms frame inside the rest thresholds.
    assert!(approx(anim.time(), 1.056), "{}", anim.time());
}

#[test]
fn config_changes_duration_resolution() {
    let options = AnimationOptions::new(vec![0.0, 100.0])
        .with_generator(GeneratorKind::Spring(SpringParams::default()))
        .with_repeat(1, RepeatType::Loop)
        .paused();
    let config = Config {
        duration_step_ms: 500.0,
        ..Config::default()
    };
    let mut anim = Animation::with_config(options, Hooks::new(), config).expect("valid options");
    assert!(approx(anim.duration(), 1.5));
}

struct OwnClock {
    authoritative: bool,
}

impl Generator<f64> for OwnClock {
    fn next(&mut self, elapsed_ms: f64) -> AnimationState<f64> {
        AnimationState::new(elapsed_ms, elapsed_ms >= 1500.0)
    }

    fn calculated_duration(&self) -> Option<f64> {
        Some(1000.0)
    }

    fn set_calculated_duration(&mut self, _duration_ms: f64) {}

    fn reports_own_completion(&self) -> bool {
        self.authoritative
    }
}

#[test]
fn controller_duration_wins_unless_generator_is_authoritative() {
    let build = |authoritative| {
        Animation::from_generators(
            AnimationOptions::new(vec![0.0]).paused(),
            Hooks::new(),
            Config::default(),
            Box::new(OwnClock { authoritative }),
            None,
        )
        .expect("valid generator")
    };
    assert!(build(false).sample(1200.0).done);
    assert!(!build(true).sample(1200.0).done);
    assert!(build(true).sample(1500.0).done);
}

#[test]
fn construction_errors() {
    let empty = Animation::new(AnimationOptions::<f64>::new(vec![]), Hooks::new());
    assert_eq!(empty.err(), Some(MotionError::EmptyKeyframes));

    let no_mirror = Animation::from_generators(
        AnimationOptions::new(vec![0.0, 1.0]).with_repeat(1, RepeatType::Mirror),
        Hooks::new(),
        Config::default(),
        Box::new(OwnClock { authoritative: false }),
        None,
    );
    assert!(matches!(
        no_mirror.err(),
        Some(MotionError::InvalidParameter { name: "repeatType", .. })
    ));

    let bad_delay = Animation::new(
        AnimationOptions::new(vec![0.0, 1.0]).with_delay(f64::NAN),
        Hooks::new(),
    );
    assert!(bad_delay.is_err());
}
