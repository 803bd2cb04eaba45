//! Application event loop.
//!
//! [`run`] opens the window (or binds the page canvas on the web), sets up
//! the GPU context and the [`Portfolio`], starts one fetch per project model
//! and then drives the scene from winit events.
//!
//! # Lifecycle
//!
//! Each frame:
//! 1. Drain camera commands queued by the host page
//! 2. Advance the portfolio (idle motion, camera, cosmetic animation)
//! 3. Upload camera, light and instance data
//! 4. Draw every visible mesh and present
//!
//! Model fetches run concurrently (on the tokio runtime natively, with
//! `spawn_local` on the web) and come back as [`FlowEvent::ModelLoaded`].

use std::{fmt::Debug, iter, sync::Arc};

use instant::Instant;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::{PortfolioConfig, ProjectId},
    context::Context,
    host,
    portfolio::Portfolio,
    resources::{ModelAsset, load_model_gltf},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
type Host = host::NativeHost;
#[cfg(target_arch = "wasm32")]
type Host = host::WebHost;

/// GPU context, scene and host bundle; exists once initialisation finished.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    portfolio: Portfolio,
    host: Host,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let config = PortfolioConfig::load().await;
        let size = window.inner_size();
        let portfolio = Portfolio::new(config, size.width.max(1), size.height.max(1));
        let ctx = Context::new(
            window.clone(),
            &portfolio.camera,
            &portfolio.projection,
            &portfolio.world.lighting,
            portfolio.config.clear_colour(),
        )
        .await?;

        #[cfg(not(target_arch = "wasm32"))]
        let host = host::NativeHost::new(Some(window));
        #[cfg(target_arch = "wasm32")]
        let host = host::WebHost::new();

        Ok(Self {
            ctx,
            portfolio,
            host,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.portfolio.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    /// Advances the scene by `dt` seconds and uploads what changed.
    fn update(&mut self, dt: f32) {
        for command in host::drain_commands() {
            log::info!("Camera command {:?}", command);
            self.portfolio.command(command);
        }
        self.portfolio.tick(dt);

        let ctx = &mut self.ctx;
        ctx.camera
            .write(&ctx.queue, &self.portfolio.camera, &self.portfolio.projection);
        ctx.light.write(&ctx.queue, &self.portfolio.world.lighting);
        ctx.scene.prepare(&ctx.device, &ctx.queue, &self.portfolio.world);
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(t) | wgpu::CurrentSurfaceTexture::Suboptimal(t) => t,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.ctx.pipeline);
            self.ctx.scene.draw(
                &mut render_pass,
                &self.ctx.camera.bind_group,
                &self.ctx.light.bind_group,
            );
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(anyhow::Result<Box<AppState>>),
    ModelLoaded {
        project: ProjectId,
        result: anyhow::Result<ModelAsset>,
    },
    #[allow(dead_code)]
    Exit,
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(state) => f
                .debug_tuple("Initialized")
                .field(&state.as_ref().map(|_| "AppState"))
                .finish(),
            Self::ModelLoaded { project, result } => f
                .debug_struct("ModelLoaded")
                .field("project", project)
                .field("ok", &result.is_ok())
                .finish(),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            last_time: Instant::now(),
        })
    }

    /// Takes over a freshly built state and starts every model fetch.
    fn start(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.portfolio.begin_loading(&mut state.host);

        for (project, path) in state.portfolio.model_requests() {
            let proxy = self.proxy.clone();
            let fetch = async move {
                let result = load_model_gltf(&path).await;
                if proxy
                    .send_event(FlowEvent::ModelLoaded { project, result })
                    .is_err()
                {
                    log::warn!("Event loop closed before model for project {} arrived", project);
                }
            };
            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(fetch);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(fetch);
        }

        state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(state);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Portfolio");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
                }
                None => log::error!("No #{} element on the page, creating a detached canvas", CANVAS_ID),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.start(state),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = init_future.await.map(Box::new);
                if proxy.send_event(FlowEvent::Initialized(state)).is_err() {
                    log::error!("Event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(Ok(state)) => {
                // This is the message from our wasm `spawn_local`
                self.start(*state);
            }
            FlowEvent::Initialized(Err(e)) => {
                log::error!("App initialization failed: {:#}", e);
                event_loop.exit();
            }
            FlowEvent::ModelLoaded { project, result } => {
                let Some(state) = &mut self.state else {
                    log::warn!("Model for project {} arrived before initialization", project);
                    return;
                };
                state.portfolio.model_loaded(project, result, &mut state.host);
            }
            FlowEvent::Exit => {
                log::info!("Exit requested");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if let Some(focus) = state.portfolio.window_event(&event, &mut state.host) {
            log::debug!("Moving the camera to project {}", focus.project);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.update(dt.as_secs_f32());

                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the scene and blocks until the window closes. On the web this
/// returns once the event loop has been handed to the browser.
pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        use anyhow::Context as _;
        console_log::init_with_level(log::Level::Info).context("Could not initialize logger")?;
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop)?;

    #[cfg(not(target_arch = "wasm32"))]
    event_loop.run_app(&mut app)?;

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }

    Ok(())
}

/// Entry point when loaded as a wasm module.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
