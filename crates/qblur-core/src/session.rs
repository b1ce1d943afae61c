//! Host-facing blur session
//!
//! Holds the meshes a host wires up (an input mesh, a target mesh that the
//! animation writes into, and the output of the last single-shot blur)
//! together with a [`BlurConfig`]. Operations that need a mesh that was not
//! provided fail with [`Error::MissingCollaborator`] and change nothing.

use qblur_tracing::perf_span;

use crate::animation::{AnimationDriver, AnimationPhase, FrameBuffers, TickStatus};
use crate::config::BlurConfig;
use crate::effects::Effect;
use crate::error::{Error, Result};
use crate::mesh::{transform_mesh, Mesh};

#[derive(Debug)]
pub struct BlurSession {
    config: BlurConfig,
    effect: Effect,
    input_mesh: Option<Mesh>,
    target: Option<Mesh>,
    output_mesh: Option<Mesh>,
    animation: AnimationDriver,
    buffers: FrameBuffers,
}

impl BlurSession {
    /// Session with no meshes attached. The config is validated here so a
    /// bad config is reported once, up front.
    pub fn new(config: BlurConfig) -> Result<Self> {
        config.validate()?;
        let effect = Effect::blur(config.rotation);
        Ok(Self {
            config,
            animation: AnimationDriver::new(config.animation_settings(), effect.clone()),
            effect,
            input_mesh: None,
            target: None,
            output_mesh: None,
            buffers: FrameBuffers::new(),
        })
    }

    /// Replace the blur rotation with another gate sequence. Its angle is
    /// swept by the animation.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.animation = AnimationDriver::new(self.config.animation_settings(), effect.clone());
        self.effect = effect;
        self
    }

    pub fn config(&self) -> &BlurConfig {
        &self.config
    }

    pub fn set_input_mesh(&mut self, mesh: Mesh) {
        self.input_mesh = Some(mesh);
    }

    pub fn set_target(&mut self, mesh: Mesh) {
        self.target = Some(mesh);
    }

    pub fn input_mesh(&self) -> Option<&Mesh> {
        self.input_mesh.as_ref()
    }

    pub fn target(&self) -> Option<&Mesh> {
        self.target.as_ref()
    }

    /// Result of the last [`transform_mesh`](Self::transform_mesh)
    pub fn output_mesh(&self) -> Option<&Mesh> {
        self.output_mesh.as_ref()
    }

    pub fn animation_phase(&self) -> AnimationPhase {
        self.animation.phase()
    }

    /// Blur the input mesh once with the configured rotation. The result
    /// becomes the output mesh and, when a target is attached, replaces the
    /// target's vertex positions.
    pub fn transform_mesh(&mut self) -> Result<&Mesh> {
        let _span = perf_span!("session_transform");
        let input = self.input_mesh.as_ref().ok_or_else(|| missing("input mesh"))?;

        let effect = self.effect.with_angle(self.config.rotation);
        let output = transform_mesh(input, &effect, self.config.max_qubits)?;
        if let Some(target) = self.target.as_mut() {
            target.vertices.clone_from(&output.vertices);
        }
        Ok(self.output_mesh.insert(output))
    }

    /// Start animating the target from the input mesh's positions.
    pub fn start_animation(&mut self) -> Result<()> {
        let input = self.input_mesh.as_ref().ok_or_else(|| missing("input mesh"))?;
        let target = self.target.as_mut().ok_or_else(|| missing("target mesh"))?;

        self.animation.start(input, &mut self.buffers)?;
        target.vertices.clone_from(&input.vertices);
        Ok(())
    }

    /// Advance the animation by `elapsed` seconds.
    pub fn tick(&mut self, elapsed: f64) -> Result<TickStatus> {
        let target = self.target.as_mut().ok_or_else(|| missing("target mesh"))?;
        self.animation.tick(elapsed, &mut self.buffers, target)
    }

    /// Stop the animation; the target keeps its last frame.
    pub fn cancel_animation(&mut self) {
        self.animation.cancel();
    }

    /// Play the finished animation back to the start rotation.
    pub fn reverse_animation(&mut self) -> Result<()> {
        self.animation.request_reverse()
    }
}

fn missing(what: &str) -> Error {
    tracing::error!(collaborator = what, "blur session is missing a collaborator");
    Error::MissingCollaborator(what.to_string())
}
