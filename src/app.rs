//! Window and frame loop.
//!
//! One cooperative loop driven by the display refresh: each redraw runs the
//! scene tick (rain advance, then camera pose), re-uploads the rain buffer
//! if it changed, and renders. Resize events mutate projection state between
//! frames; last write wins, no synchronization needed.

use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::gpu::GpuState;
use crate::scene::Scene;
use crate::time::Time;

pub struct App {
    scene: Scene,
    time: Time,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
}

impl App {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            time: Time::new(),
            window: None,
            gpu_state: None,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        let (elapsed, delta, fps_refreshed) = self.time.update();
        if fps_refreshed {
            info!("{:.1} fps, z={:.1}", self.time.fps(), self.scene.flight.z());
        }

        let pose = self.scene.tick(elapsed);
        gpu_state.upload_rain(&mut self.scene.rain);

        match gpu_state.render(&pose, elapsed, delta) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => gpu_state.resize(winit::dpi::PhysicalSize {
                width: gpu_state.config.width,
                height: gpu_state.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => error!("render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("neondrift")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    error!("failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.window = Some(window.clone());

            match pollster::block_on(GpuState::new(window, &self.scene.city, &self.scene.rain)) {
                Ok(gpu_state) => self.gpu_state = Some(gpu_state),
                Err(e) => {
                    error!("GPU initialization failed: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}
