use cosmos_dsp::{
    dsp::{ClockMultiplier, EnvelopeStage},
    engine::{ControlMessage, Engine, EngineConfig},
    sequencing::Scale,
};

const SAMPLE_RATE: f32 = 48_000.0;

fn engine(config: EngineConfig) -> Engine {
    Engine::new(&config).expect("valid config")
}

/// Render frames until the engine has seen `ticks` ticks, returning how many frames that took.
fn run_until_ticks(engine: &mut Engine, ticks: u64) -> usize {
    let mut frames = 0;
    while engine.ticks() < ticks {
        engine.next_frame();
        frames += 1;
        assert!(frames < 10_000_000, "clock never reached {ticks} ticks");
    }
    frames
}

#[test]
fn first_step_sounds_on_the_first_sample_after_start() {
    let mut engine = engine(EngineConfig::new(SAMPLE_RATE).with_bpm(120.0));
    engine.apply(ControlMessage::TogglePrimaryStep(0));
    engine.start();

    let frames = run_until_ticks(&mut engine, 1);
    assert_eq!(frames, 1);
    assert_eq!(engine.amp_envelope().stage(), EnvelopeStage::Attack);
    assert!(engine.amp_envelope().level() > 0.0);
}

#[test]
fn ticks_are_spaced_by_the_clock_period() {
    let mut engine = engine(EngineConfig::new(SAMPLE_RATE).with_bpm(120.0));
    engine.start();
    run_until_ticks(&mut engine, 1);

    // 2 Hz at unity
    let frames = run_until_ticks(&mut engine, 2) as i64;
    assert!((frames - 24_000).abs() <= 1, "got {frames}");

    // x2
    engine.apply(ControlMessage::SetMultiplier(ClockMultiplier::from_index(6)));
    run_until_ticks(&mut engine, 3);
    let frames = run_until_ticks(&mut engine, 4) as i64;
    assert!((frames - 12_000).abs() <= 1, "got {frames}");
}

#[test]
fn tempo_change_takes_effect_without_restart() {
    let mut engine = engine(EngineConfig::new(SAMPLE_RATE).with_bpm(120.0));
    engine.start();
    run_until_ticks(&mut engine, 1);
    engine.apply(ControlMessage::SetBpm(240.0));
    run_until_ticks(&mut engine, 2);
    let frames = run_until_ticks(&mut engine, 3) as i64;
    assert!((frames - 12_000).abs() <= 1, "got {frames}");
}

#[test]
fn active_secondary_step_restarts_primary_and_pitch() {
    let mut engine = engine(
        EngineConfig::new(SAMPLE_RATE)
            .with_bpm(999.0)
            .with_steps(8, 2, 8),
    );
    engine.apply(ControlMessage::ToggleSecondaryStep(0));
    engine.start();

    for tick in 1..=16u64 {
        run_until_ticks(&mut engine, tick);
        let expected = if tick % 2 == 1 { 0 } else { 1 };
        assert_eq!(engine.secondary().current_step(), expected);
        assert_eq!(engine.primary().current_step(), expected, "tick {tick}");
        assert_eq!(engine.pitch().current_step(), expected, "tick {tick}");
    }
}

#[test]
fn secondary_reset_works_from_mid_pattern() {
    let mut engine = engine(
        EngineConfig::new(SAMPLE_RATE)
            .with_bpm(999.0)
            .with_steps(8, 6, 8),
    );
    engine.apply(ControlMessage::ToggleSecondaryStep(5));
    engine.start();

    run_until_ticks(&mut engine, 5);
    assert_eq!(engine.primary().current_step(), 4);

    // Tick 6 would put primary on step 5; the secondary step lands there first.
    run_until_ticks(&mut engine, 6);
    assert_eq!(engine.secondary().current_step(), 5);
    assert_eq!(engine.primary().current_step(), 0);
    assert_eq!(engine.pitch().current_step(), 0);

    run_until_ticks(&mut engine, 7);
    assert_eq!(engine.primary().current_step(), 1);
}

#[test]
fn secondary_step_armed_while_running_resets_from_current_position() {
    let mut engine = engine(
        EngineConfig::new(SAMPLE_RATE)
            .with_bpm(999.0)
            .with_steps(8, 8, 5),
    );
    engine.start();
    run_until_ticks(&mut engine, 4);
    assert_eq!(engine.primary().current_step(), 3);
    assert_eq!(engine.pitch().current_step(), 3);

    engine.apply(ControlMessage::ToggleSecondaryStep(4));
    run_until_ticks(&mut engine, 5);
    assert_eq!(engine.primary().current_step(), 0);
    assert_eq!(engine.pitch().current_step(), 0);

    run_until_ticks(&mut engine, 6);
    assert_eq!(engine.primary().current_step(), 1);
    assert_eq!(engine.pitch().current_step(), 1);
}

#[test]
fn tracks_of_different_lengths_wrap_independently() {
    let mut engine = engine(
        EngineConfig::new(SAMPLE_RATE)
            .with_bpm(999.0)
            .with_steps(3, 5, 4),
    );
    engine.start();

    for tick in 1..=20u64 {
        run_until_ticks(&mut engine, tick);
        let position = (tick - 1) as usize;
        assert_eq!(engine.primary().current_step(), position % 3);
        assert_eq!(engine.secondary().current_step(), position % 5);
        assert_eq!(engine.pitch().current_step(), position % 4);
    }
}

#[test]
fn stopped_engine_does_not_tick() {
    let mut engine = engine(EngineConfig::new(SAMPLE_RATE).with_bpm(999.0));
    for _ in 0..48_000 {
        engine.next_frame();
    }
    assert_eq!(engine.ticks(), 0);

    engine.start();
    run_until_ticks(&mut engine, 3);
    engine.stop();
    for _ in 0..48_000 {
        engine.next_frame();
    }
    assert_eq!(engine.ticks(), 3);
}

#[test]
fn restart_begins_again_at_step_zero() {
    let mut engine = engine(EngineConfig::new(SAMPLE_RATE).with_bpm(999.0));
    engine.start();
    run_until_ticks(&mut engine, 5);
    assert_eq!(engine.primary().current_step(), 4);

    engine.apply(ControlMessage::ToggleTransport);
    engine.apply(ControlMessage::ToggleTransport);
    let ticks = engine.ticks();
    engine.next_frame();
    assert_eq!(engine.ticks(), ticks + 1);
    assert_eq!(engine.primary().current_step(), 0);
}

#[test]
fn oscillator_follows_the_pitch_track() {
    let mut engine = engine(
        EngineConfig::new(SAMPLE_RATE)
            .with_bpm(999.0)
            .with_key(3, Scale::Chromatic)
            .with_steps(2, 8, 2),
    );
    engine.apply(ControlMessage::TogglePrimaryStep(0));
    engine.apply(ControlMessage::TogglePrimaryStep(1));
    engine.apply(ControlMessage::SetNote { step: 0, note: 48 }); // A4
    engine.apply(ControlMessage::SetNote { step: 1, note: 60 }); // A5
    engine.start();

    run_until_ticks(&mut engine, 1);
    assert!((engine.oscillator().frequency() - 440.0).abs() < 1e-2);
    run_until_ticks(&mut engine, 2);
    assert!((engine.oscillator().frequency() - 880.0).abs() < 1e-2);

    // One octave up by transpose, heard on the next trigger
    engine.apply(ControlMessage::SetTranspose(12));
    run_until_ticks(&mut engine, 3);
    assert!((engine.oscillator().frequency() - 880.0).abs() < 1e-2);
}

#[test]
fn output_stays_bounded_under_heavy_modulation() {
    let mut engine = engine(
        EngineConfig::new(SAMPLE_RATE)
            .with_bpm(999.0)
            .with_filter_env_depth(20_000.0)
            .with_amp_envelope(0.001, 0.05),
    );
    for step in 0..8 {
        engine.apply(ControlMessage::TogglePrimaryStep(step));
    }
    engine.apply(ControlMessage::SetFilterQ(10.0));
    engine.start();

    let mut left = vec![0.0; 1024];
    let mut right = vec![0.0; 1024];
    for _ in 0..100 {
        engine.process_block(&mut left, &mut right);
        assert!(left.iter().chain(&right).all(|s| s.is_finite()));
    }
    assert!(engine.snapshot().peak > 0.0);
}
