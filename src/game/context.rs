use crate::config::TrackConfig;
use crate::game::colors::ColorScheme;
use crate::game::control::{ControlAction, ControlSignal, Direction, SoundToggle};
use crate::game::lap::{LAP_RESET_POSITION, LapInfo, LapOutcome, OutboundEvent, OutboundEvents};
use crate::game::projection;
use crate::game::road::LaneSettings;
use crate::game::track::Track;
use crate::game::vehicle::Vehicle;
use log::info;
use std::error::Error;

/// What a tick asks of the state machine that owns this context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Continue,
    Pause,
    Quit,
    RaceOver,
}

/// All mutable simulation state plus the immutable track and render
/// configuration, stepped exactly once per tick. Nothing here touches a
/// rendering surface, so the whole loop is testable headless.
pub struct SimulationContext {
    pub config: TrackConfig,
    pub track: Track,
    pub scheme: ColorScheme,
    pub lanes: LaneSettings,
    pub vehicle: Vehicle,
    pub lap: LapInfo,
    pub muted: bool,
    /// Direction requested this tick, feeding the finish-line guide arrow
    /// and the faced vehicle sprite.
    pub direction: Direction,
    pub last_delta: f64,
    pub event_names: OutboundEvents,
    events: Vec<OutboundEvent>,
}

impl SimulationContext {
    pub fn new(config: TrackConfig) -> Result<Self, Box<dyn Error>> {
        let track = Track::from_defs(&config.track);
        let scheme = ColorScheme::from_doc(&config.track_colors)?;
        let lanes = LaneSettings {
            num_lanes: config.num_lanes,
            lane_width: config.lane_width,
        };
        let vehicle = Vehicle::from_tuning(config.controllable_vehicle);
        let lap = LapInfo::new(config.lap_number);
        Ok(Self {
            config,
            track,
            scheme,
            lanes,
            vehicle,
            lap,
            muted: false,
            direction: Direction::Straight,
            last_delta: 0.0,
            event_names: OutboundEvents::default(),
            events: Vec::new(),
        })
    }

    /// Fresh vehicle and lap state for a restart; track, colors and tuning
    /// are immutable for the simulation's lifetime.
    pub fn restart(&mut self) {
        self.vehicle.reset();
        self.lap = LapInfo::new(self.config.lap_number);
        self.direction = Direction::Straight;
        self.last_delta = 0.0;
        info!("simulation restarted with configured vehicle defaults");
    }

    /// One simulation tick driven by one control signal.
    pub fn step(&mut self, signal: &ControlSignal) -> TickResult {
        match signal.action {
            ControlAction::Quit => return TickResult::Quit,
            ControlAction::Pause => return TickResult::Pause,
            _ => {}
        }
        if let Some(toggle) = signal.sound {
            self.muted = matches!(toggle, SoundToggle::Mute);
        }
        self.direction = signal.direction;

        self.last_delta = projection::last_delta(
            &self.track,
            self.config.track_segment_size,
            self.vehicle.position,
            self.vehicle.posx,
        );
        self.vehicle.apply_tick(signal, self.last_delta);

        let absolute_index =
            Track::absolute_index(self.vehicle.position, self.config.track_segment_size);
        match self.lap.on_tick(
            absolute_index,
            self.track.len(),
            self.config.render.depth_of_field,
        ) {
            LapOutcome::Continue => TickResult::Continue,
            LapOutcome::NewLap => {
                self.vehicle.position = LAP_RESET_POSITION;
                self.vehicle.posx = 0.0;
                self.events.push(OutboundEvent {
                    name: self.event_names.new_lap.clone(),
                    lap: self.lap.current_lap,
                });
                info!("lap {} started", self.lap.current_lap);
                TickResult::Continue
            }
            LapOutcome::Finished => TickResult::RaceOver,
        }
    }

    /// Drains queued outbound notifications for the external collaborator.
    pub fn drain_events(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.events)
    }
}
