use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use renderer::{ErrorPolicy, QuadRenderer, RendererOptions, TextureSource};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::cli::Args;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let options = RendererOptions {
        texture: TextureSource {
            path: args.image.clone(),
            expected_size: args.image_size,
        },
        policy: if args.strict {
            ErrorPolicy::Strict
        } else {
            ErrorPolicy::BestEffort
        },
    };
    tracing::info!(image = %args.image.display(), policy = ?options.policy, "starting quadview");

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(args.size.0, args.size.1);
    let window = WindowBuilder::new()
        .with_title("Quadview")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create preview window")?;
    let window = Arc::new(window);

    let initial_size = window.inner_size();
    let mut renderer = QuadRenderer::new(window.as_ref(), initial_size, options)?;
    if !renderer.initialize(initial_size.width, initial_size.height) {
        anyhow::bail!("surface initialization failed");
    }
    window.request_redraw();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            if !renderer.initialize(new_size.width, new_size.height) {
                                tracing::error!("surface re-initialization failed; exiting");
                                elwt.exit();
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            renderer.render_frame();
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Schedule the next frame once winit is about to wait again.
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
