use anyhow::Context;
use log::{debug, error, info, warn};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{Key, NamedKey},
    window::Window,
    window::WindowBuilder,
};

use call_gradient::{
    backend::{RenderBackend, WgpuBackend},
    buffer::VertexBuffer,
    config::{self, SpinnerConfig},
    error::RenderError,
    gradient::{CallState, Gradient},
    pipeline::DrawPipeline,
    rotation::RotationState,
};

struct Application {
    // declared before the window: the surface inside must drop first
    pipeline: DrawPipeline<WgpuBackend>,
    vertex_buffer: VertexBuffer<wgpu::Buffer>,
    rotation: RotationState,
    gradient: Gradient,
    last_frame: instant::Instant,
    window: Window,
}

impl Application {
    async fn new(event_loop: &EventLoop<()>, spinner: SpinnerConfig) -> anyhow::Result<Self> {
        let window = WindowBuilder::new()
            .with_title(config::WINDOW_TITLE)
            .with_resizable(true)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config::WINDOW_WIDTH,
                config::WINDOW_HEIGHT,
            ))
            .build(event_loop)
            .context("failed to open the window")?;

        let size = window.inner_size();
        let backend = WgpuBackend::new(&window, spinner.topology, spinner.blur_sigma).await?;
        let pipeline = DrawPipeline::new(backend, spinner.framing(size.width, size.height));

        let gradient = Gradient::new(spinner.initial_state);
        let vertex_buffer = VertexBuffer::new(gradient.colors().quad())?;

        Ok(Application {
            pipeline,
            vertex_buffer,
            rotation: RotationState::new(spinner.angular_velocity),
            gradient,
            last_frame: instant::Instant::now(),
            window,
        })
    }

    fn run(&mut self, event_loop: EventLoop<()>) -> anyhow::Result<()> {
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run(move |event, elwt| match event {
            Event::WindowEvent {
                window_id,
                ref event,
            } if window_id == self.window.id() => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key: Key::Named(NamedKey::Escape),
                            ..
                        },
                    ..
                } => {
                    self.pipeline.dispose();
                    elwt.exit();
                }

                WindowEvent::KeyboardInput { event, .. } => self.input(event),

                WindowEvent::Resized(physical_size) => {
                    self.resize(*physical_size);
                }

                WindowEvent::RedrawRequested => self.redraw(elwt),

                _ => (),
            },

            // keep spinning
            Event::AboutToWait => self.window.request_redraw(),

            _ => (),
        })?;

        Ok(())
    }

    fn input(&mut self, event: &KeyEvent) {
        if event.repeat || !event.state.is_pressed() {
            return;
        }

        let state = match &event.logical_key {
            Key::Character(c) if c == "1" => CallState::InitiatingCall,
            Key::Character(c) if c == "2" => CallState::CallEstablished,
            Key::Character(c) if c == "3" => CallState::WeakSignal,
            _ => return,
        };
        info!("call state: {:?}", state);
        self.gradient.set_state(state);
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if let Some(backend) = self.pipeline.backend_mut() {
            backend.resize(new_size.width, new_size.height);
        }
        self.pipeline
            .framing_mut()
            .projection
            .resize(new_size.width, new_size.height);

        self.window.request_redraw();
    }

    fn redraw(&mut self, elwt: &EventLoopWindowTarget<()>) {
        let now = instant::Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        // new colors mean a new buffer, the old one is freed once the GPU is done with it
        if self.gradient.tick(delta_time) {
            match VertexBuffer::new(self.gradient.colors().quad()) {
                Ok(buffer) => self.vertex_buffer = buffer,
                Err(e) => warn!("keeping previous colors: {}", e),
            }
        }

        match self
            .pipeline
            .render_frame(&mut self.vertex_buffer, &mut self.rotation, delta_time)
        {
            Ok(()) => {}
            // Reconfigure the surface if lost or outdated
            Err(RenderError::Surface(wgpu::SurfaceError::Lost))
            | Err(RenderError::Surface(wgpu::SurfaceError::Outdated)) => {
                if let Some(backend) = self.pipeline.backend_mut() {
                    backend.reconfigure();
                }
            }
            // The system is out of memory, we should probably quit
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                error!("out of GPU memory, exiting");
                self.pipeline.dispose();
                elwt.exit();
            }
            // minimized, nothing to draw into
            Err(RenderError::PipelineUnavailable) => {
                let ready = self.pipeline.backend().is_some_and(|b| b.is_ready());
                debug!("skipped frame, backend ready: {}", ready);
            }
            // Timeout should be resolved by the next frame
            Err(e) => warn!("{}", e),
        }

        debug!(
            "frame {:.3}ms, angle {:.3}rad",
            now.elapsed().as_secs_f64() * 1000.0,
            self.rotation.current_angle()
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new().context("failed to create the event loop")?;
    let mut application = pollster::block_on(Application::new(
        &event_loop,
        SpinnerConfig::default(),
    ))?;
    info!("press 1, 2 or 3 to switch the call state, Esc to quit");

    application.run(event_loop)
}
