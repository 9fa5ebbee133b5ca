use crate::assets::LoadedAssets;
use crate::config;
use crate::core::clock::{TICK_INTERVAL, TickTimer};
use crate::core::gfx::Frame;
use crate::core::gfx::present::Presenter;
use crate::core::input::{self, InputEvent};
use crate::screens::{Screen, ScreenAction, ended, paused, running, splash};
use log::{error, info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::Window;

// Splash renders before the track document (and thus the real viewport
// size) is known.
const SPLASH_FRAME: (u32, u32) = (320, 240);
const WINDOW_SIZE: (u32, u32) = (960, 720);

/// Screen flow and simulation state, kept apart from the window/presenter
/// shell so transitions stay testable.
struct AppState {
    screen: Screen,
    splash: splash::State,
    running: Option<running::State>,
    ended: Option<ended::State>,
    ticker: TickTimer,
}

pub struct App {
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    frame: Frame,
    assets: Option<LoadedAssets>,
    state: AppState,
}

impl App {
    fn new(track_path: PathBuf, atlas_path: PathBuf, image_path: PathBuf) -> Self {
        let mut ticker = TickTimer::new(TICK_INTERVAL);
        ticker.arm(Instant::now());
        Self {
            window: None,
            presenter: None,
            frame: Frame::new(SPLASH_FRAME.0, SPLASH_FRAME.1),
            assets: None,
            state: AppState {
                screen: Screen::Splash,
                splash: splash::init(track_path, atlas_path, image_path),
                running: None,
                ended: None,
                ticker,
            },
        }
    }

    /// Screen transition: cancel the outgoing tick timer, move the state
    /// machine, arm exactly one new timer. No two timers ever own the frame.
    fn handle_action(&mut self, action: ScreenAction, event_loop: &ActiveEventLoop) {
        let target = match action {
            ScreenAction::None => return,
            ScreenAction::Exit => {
                info!("exit requested; shutting down");
                event_loop.exit();
                return;
            }
            ScreenAction::Navigate(target) => target,
        };

        let from = self.state.screen;
        self.state.ticker.cancel();

        match (from, target) {
            (Screen::Splash, Screen::Running) => {
                let Some((cfg, assets)) = splash::take_loaded(&mut self.state.splash) else {
                    // The readiness flags gate this path; reaching here
                    // without documents is a logic error worth surfacing.
                    warn!("start signal accepted before loading finished; ignoring");
                    self.state.ticker.arm(Instant::now());
                    return;
                };
                let render = cfg.render;
                match running::init(cfg) {
                    Ok(state) => {
                        self.frame = Frame::new(render.width, render.height);
                        self.assets = Some(assets);
                        self.state.running = Some(state);
                    }
                    Err(e) => {
                        error!("simulation failed to initialize: {e}");
                        self.state.ticker.arm(Instant::now());
                        return;
                    }
                }
            }
            (Screen::Ended, Screen::Running) => {
                if let Some(running_state) = &mut self.state.running {
                    running::restart(running_state);
                }
            }
            (_, Screen::Ended) => {
                if let Some(running_state) = &self.state.running {
                    let ctx = &running_state.ctx;
                    let laps = if running_state.finished {
                        ctx.lap.current_lap
                    } else {
                        ctx.lap.current_lap.saturating_sub(1)
                    };
                    self.state.ended = Some(ended::init(laps, !running_state.finished));
                }
            }
            _ => {}
        }

        info!("screen transition {from:?} -> {target:?}");
        self.state.screen = target;
        self.state.ticker.arm(Instant::now());
    }

    fn route_input_event(&mut self, event_loop: &ActiveEventLoop, ev: InputEvent) {
        let action = match self.state.screen {
            Screen::Splash => splash::handle_input(&self.state.splash, &ev),
            Screen::Running => match &mut self.state.running {
                Some(state) => running::handle_input(state, &ev),
                None => ScreenAction::None,
            },
            Screen::Paused => paused::handle_input(&ev),
            Screen::Ended => ended::handle_input(&ev),
        };
        self.handle_action(action, event_loop);
    }

    fn tick_and_render(&mut self, event_loop: &ActiveEventLoop) {
        let ticks = self.state.ticker.ticks_due(Instant::now());

        let action = match self.state.screen {
            Screen::Splash => splash::update(&mut self.state.splash, ticks),
            Screen::Running => match &mut self.state.running {
                Some(state) => running::update(state, ticks),
                None => ScreenAction::None,
            },
            Screen::Ended => match &mut self.state.ended {
                Some(state) => ended::update(state, ticks),
                None => ScreenAction::None,
            },
            // Paused idles until an input arrives.
            Screen::Paused => ScreenAction::None,
        };
        self.handle_action(action, event_loop);

        match (self.state.screen, &self.state.running, &self.assets) {
            (Screen::Splash, ..) => splash::draw(&self.state.splash, &mut self.frame),
            (Screen::Running, Some(state), Some(assets)) => {
                running::draw(state, &mut self.frame, assets);
            }
            (Screen::Paused, Some(state), Some(assets)) => {
                paused::draw(state, &mut self.frame, assets);
            }
            (Screen::Ended, ..) => {
                if let Some(state) = &self.state.ended {
                    ended::draw(state, &mut self.frame);
                }
            }
            _ => {}
        }

        if let Some(presenter) = &mut self.presenter
            && let Err(e) = presenter.present(&self.frame)
        {
            error!("failed to present frame: {e}");
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title("overdrive")
            .with_inner_size(PhysicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1));
        match event_loop.create_window(attributes) {
            Ok(window) => {
                let window = Arc::new(window);
                match Presenter::new(window.clone()) {
                    Ok(presenter) => self.presenter = Some(presenter),
                    Err(e) => {
                        error!("failed to create presentation surface: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                self.window = Some(window);
            }
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref().cloned() else {
            return;
        };
        if window_id != window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("close requested; shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if let Some(ev) = input::map_key_event(&key_event) {
                    self.route_input_event(event_loop, ev);
                }
            }
            WindowEvent::RedrawRequested => self.tick_and_render(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

pub fn run(track_path: PathBuf) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(
        track_path,
        PathBuf::from(config::DEFAULT_ATLAS_PATH),
        PathBuf::from(config::DEFAULT_ATLAS_IMAGE_PATH),
    );
    event_loop.run_app(&mut app)?;
    Ok(())
}
