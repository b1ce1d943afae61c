//! Animation driver against the reference simulator
//!
//! Each frame is compared with a single-shot transform at the same angle:
//! restoring captured amplitudes must be indistinguishable from encoding
//! the source again.

use qblur_core::animation::{AnimationDriver, AnimationPhase, AnimationSettings, FrameBuffers, TickStatus};
use qblur_core::effects::{Effect, QubitSelection};
use qblur_core::transform::{blur_in_place, transform_in_place};
use qblur_core::{BlurConfig, Mesh, SampleGrid, StateVectorSimulator};

fn assert_grids_close(a: &SampleGrid, b: &SampleGrid) {
    for (x, y) in a.values().iter().zip(b.values()) {
        assert!((x - y).abs() < 1e-9, "{} vs {}", x, y);
    }
}

fn source() -> SampleGrid {
    SampleGrid::from_values(6, 2, vec![1.0, -2.0, 4.0, 0.5, 3.0, 3.0, -1.0, 2.0, 0.0, 8.0, 2.5, -0.5]).unwrap()
}

#[test]
fn test_each_frame_matches_single_shot() -> qblur_core::Result<()> {
    let settings = AnimationSettings {
        start_angle: 0.05,
        end_angle: 0.45,
        duration_secs: 2.0,
        reverse: false,
        max_qubits: 24,
    };
    let source = source();
    let mut target = source.clone();
    let mut buffers = FrameBuffers::new();
    let mut driver: AnimationDriver = AnimationDriver::new(settings, Effect::blur(0.0));
    driver.start(&source, &mut buffers)?;

    loop {
        let status = driver.tick(0.5, &mut buffers, &mut target)?;

        let mut expected = source.clone();
        blur_in_place(&mut expected, driver.current_angle(), 24)?;
        assert_grids_close(&target, &expected);

        if status == TickStatus::Done {
            break;
        }
    }
    assert_eq!(driver.frame(), 4);
    assert_eq!(driver.current_angle(), 0.45);
    Ok(())
}

#[test]
fn test_swept_effect_keeps_its_structure() -> qblur_core::Result<()> {
    let effect = Effect::Sequence(vec![
        Effect::PartialRotation {
            angle: 0.0,
            selection: QubitSelection::half(),
        },
        Effect::ControlledRotationFraction {
            angle: 0.0,
            modulo: 2,
            control_remainder: 0,
            target_remainder: 1,
        },
    ]);
    let settings = AnimationSettings {
        start_angle: 0.0,
        end_angle: 1.0,
        duration_secs: 1.0,
        reverse: false,
        max_qubits: 24,
    };

    let source = source();
    let mut target = source.clone();
    let mut buffers = FrameBuffers::new();
    let mut driver: AnimationDriver = AnimationDriver::new(settings, effect.clone());
    driver.start(&source, &mut buffers)?;
    assert_eq!(driver.tick(1.0, &mut buffers, &mut target)?, TickStatus::Done);

    let mut expected = source.clone();
    transform_in_place::<StateVectorSimulator, _>(&mut expected, &effect.with_angle(1.0), 24)?;
    assert_grids_close(&target, &expected);
    Ok(())
}

#[test]
fn test_buffers_are_reused_between_runs() -> qblur_core::Result<()> {
    let config = BlurConfig {
        duration_secs: 0.5,
        ..Default::default()
    };
    let mesh = Mesh::plane("plane", 4, 4, 1.0);
    let mut target = mesh.clone();
    let mut buffers = FrameBuffers::with_capacity(64);
    let mut driver: AnimationDriver = AnimationDriver::new(config.animation_settings(), Effect::blur(0.0));

    for _ in 0..3 {
        driver.start(&mesh, &mut buffers)?;
        let original = buffers.original().as_ptr();
        while driver.tick(0.1, &mut buffers, &mut target)? == TickStatus::Running {}
        assert_eq!(buffers.original().as_ptr(), original);
        assert_eq!(driver.phase(), AnimationPhase::Done);
    }
    Ok(())
}

#[test]
fn test_restart_after_cancel() -> qblur_core::Result<()> {
    let source = source();
    let mut target = source.clone();
    let mut buffers = FrameBuffers::new();
    let mut driver: AnimationDriver = AnimationDriver::new(AnimationSettings::default(), Effect::blur(0.0));

    driver.start(&source, &mut buffers)?;
    driver.tick(1.0, &mut buffers, &mut target)?;
    driver.cancel();
    assert!(!driver.is_active());

    driver.start(&source, &mut buffers)?;
    assert_eq!(driver.progress(), 0.0);
    assert_eq!(driver.frame(), 0);
    assert_eq!(driver.tick(0.0, &mut buffers, &mut target)?, TickStatus::Running);
    // Zero elapsed time renders the start angle, which is the identity.
    assert_grids_close(&target, &source);
    Ok(())
}
