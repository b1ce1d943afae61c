//! Animate a blur over a plane mesh and print how far the vertices drift.
//!
//! Run with:
//! ```bash
//! QBLUR_TRACING_PROFILE=performance cargo run -p qblur-core --example mesh_animation
//! ```

use qblur_core::{BlurConfig, BlurSession, Mesh, TickStatus};
use qblur_tracing::{init_global_tracing, TracingConfig};

fn max_displacement(a: &Mesh, b: &Mesh) -> f64 {
    a.vertices
        .iter()
        .zip(&b.vertices)
        .flat_map(|(p, q)| (0..3).map(move |axis| (p[axis] - q[axis]).abs()))
        .fold(0.0, f64::max)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_global_tracing(&TracingConfig::from_env())?;

    let config = BlurConfig {
        duration_secs: 1.0,
        reverse: true,
        ..BlurConfig::from_env()?
    };
    println!("=== Quantum Blur Mesh Animation ===\n");
    println!("config: {:?}\n", config);

    let plane = Mesh::plane("plane", 8, 8, 2.0);
    let mut session = BlurSession::new(config)?;
    session.set_input_mesh(plane.clone());
    session.set_target(plane.clone());

    let single = session.transform_mesh()?;
    println!(
        "single shot: '{}' moved vertices by up to {:.4}",
        single.name,
        max_displacement(single, &plane)
    );

    session.start_animation()?;
    let frame_time = 1.0 / 10.0;
    let mut frame = 0;
    loop {
        let status = session.tick(frame_time)?;
        frame += 1;
        if let Some(target) = session.target() {
            println!(
                "frame {:>2} {:?}: max displacement {:.4}",
                frame,
                session.animation_phase(),
                max_displacement(target, &plane)
            );
        }
        if status == TickStatus::Done {
            break;
        }
    }

    Ok(())
}
