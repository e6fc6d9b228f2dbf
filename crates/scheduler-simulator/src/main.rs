//! Headless simulator for the scheduler card.
//!
//! Renders a [`SchedulerCard`] into an off-screen `SimulatorDisplay`, plays a
//! scripted touch session against it and writes a PNG after every step. A fake
//! backend drains the plan outbox, applies each command and answers with the
//! refreshed plan list, the way the remote-call layer would.
//!
//! # Arguments
//!
//! | Flag          | Effect                                                 |
//! |---------------|--------------------------------------------------------|
//! | `--german`    | Render German labels                                   |
//! | `--out <DIR>` | Frame directory (default `target/scheduler-simulator`) |
//!
//! Set `RUST_LOG=info` to follow the session.

use std::path::PathBuf;

use clap::Parser;
use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use log::{error, info, warn};
use thiserror::Error;

use scheduler_ui::model::{PlanRecord, TimeOfDay, Weekday, WeekdaySet};
use scheduler_ui::pages::constants::SOC_STEP_PERCENT;
use scheduler_ui::pages::{Page, PlanCommand, PlanOutbox, SchedulerCard};
use scheduler_ui::ui::{Action, Drawable, PageEvent, TouchEvent, TouchPoint};
use scheduler_ui::{Locale, WidgetConfig, WidgetError};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 320;
const DISPLAY_HEIGHT_PX: u32 = 480;

/// Virtual time advanced per simulated frame.
const FRAME_MS: u64 = 16;

/// Frames allowed for a wheel to debounce and settle.
const SETTLE_FRAMES: usize = 40;

/// Finger movement between two drag samples.
const DRAG_STEP_PX: i32 = 8;

// ---------------------------------------------------------------------------
// Errors and options
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
enum SimError {
    #[error("widget error: {0}")]
    Widget(WidgetError),
    #[error("no control emits {0:?}")]
    MissingControl(Action),
    #[error("{0} is not open")]
    MissingWidget(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("png error: {0}")]
    Png(String),
}

/// Scripted scheduler card session rendered to PNG frames.
#[derive(Parser)]
#[command(name = "scheduler-simulator", version, about)]
struct Options {
    /// Render German labels.
    #[arg(long)]
    german: bool,

    /// Directory the frames are written to.
    #[arg(long, default_value = "target/scheduler-simulator")]
    out: PathBuf,
}

impl Options {
    fn locale(&self) -> Locale {
        if self.german {
            Locale::German
        } else {
            Locale::English
        }
    }
}

// ---------------------------------------------------------------------------
// Fake backend
// ---------------------------------------------------------------------------

/// Stand-in for the remote plan service.
struct FakeBackend {
    plans: Vec<PlanRecord>,
}

impl FakeBackend {
    fn seeded() -> Self {
        let workdays = PlanRecord::new_default(1);

        let mut weekend = PlanRecord::new_default(2).with_soc(60);
        weekend.time = TimeOfDay::new(9, 30).unwrap_or(TimeOfDay::MIDNIGHT);
        weekend.weekdays = WeekdaySet::WEEKEND;

        let mut nightly = PlanRecord::new_default(3).with_soc(100);
        nightly.time = TimeOfDay::new(22, 45).unwrap_or(TimeOfDay::MIDNIGHT);
        nightly.weekdays = WeekdaySet::ALL;
        nightly.active = false;

        Self {
            plans: vec![workdays, weekend, nightly],
        }
    }

    fn apply(&mut self, command: PlanCommand) -> Result<(), String> {
        match command {
            PlanCommand::Fetch => {}
            PlanCommand::Add {
                time,
                soc,
                weekdays,
                active,
            } => {
                let plan_index = u8::try_from(self.plans.len() + 1)
                    .map_err(|_| "plan list is full".to_string())?;
                self.plans.push(PlanRecord {
                    plan_index,
                    time,
                    soc,
                    weekdays,
                    active,
                });
            }
            PlanCommand::Edit(plan) => *self.slot(plan.plan_index)? = plan,
            PlanCommand::Delete { plan_index } => {
                self.slot(plan_index)?;
                self.plans.remove(plan_index as usize - 1);
            }
            PlanCommand::SetActive { plan_index, active } => {
                self.slot(plan_index)?.active = active
            }
        }

        for (i, plan) in self.plans.iter_mut().enumerate() {
            plan.plan_index = u8::try_from(i + 1).unwrap_or(u8::MAX);
        }
        Ok(())
    }

    fn slot(&mut self, plan_index: u8) -> Result<&mut PlanRecord, String> {
        let count = self.plans.len();
        (plan_index as usize)
            .checked_sub(1)
            .and_then(|i| self.plans.get_mut(i))
            .ok_or_else(|| format!("plan {} not found ({} plans)", plan_index, count))
    }
}

fn remote_message(message: &str) -> heapless::String<64> {
    let mut out = heapless::String::new();
    for c in message.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Scripted session
// ---------------------------------------------------------------------------

fn touch_point(point: Point) -> TouchPoint {
    TouchPoint::new(point.x.max(0) as u16, point.y.max(0) as u16)
}

struct Session<'a> {
    card: SchedulerCard<'a>,
    outbox: &'a PlanOutbox,
    backend: FakeBackend,
    display: SimulatorDisplay<Rgb565>,
    out_dir: PathBuf,
    clock_ms: u64,
    frame: usize,
}

impl Session<'_> {
    fn tick(&mut self) {
        self.clock_ms += FRAME_MS;
        Page::update(&mut self.card, Instant::from_millis(self.clock_ms));
    }

    fn settle(&mut self) {
        for _ in 0..SETTLE_FRAMES {
            self.tick();
        }
    }

    fn touch(&mut self, event: TouchEvent) {
        if let Some(action) = Page::handle_touch(&mut self.card, event) {
            info!("Touch → action {:?}", action);
        }
        self.tick();
    }

    fn tap(&mut self, target: Point) {
        let point = touch_point(target);
        self.touch(TouchEvent::Press(point));
        self.touch(TouchEvent::Release(point));
    }

    fn tap_control(&mut self, action: Action) -> Result<(), SimError> {
        let bounds = self
            .card
            .control_bounds(action)
            .ok_or(SimError::MissingControl(action))?;
        self.tap(bounds.center());
        Ok(())
    }

    fn drag(&mut self, from: Point, delta_y: i32) {
        let mut point = from;
        self.touch(TouchEvent::Press(touch_point(point)));
        for _ in 0..delta_y.abs() / DRAG_STEP_PX {
            point.y += delta_y.signum() * DRAG_STEP_PX;
            self.touch(TouchEvent::Drag(touch_point(point)));
        }
        self.touch(TouchEvent::Release(touch_point(point)));
    }

    fn scroll(&mut self, at: Point, delta_y: i32) {
        self.touch(TouchEvent::Scroll {
            point: touch_point(at),
            delta_y,
        });
    }

    /// Drain the outbox into the backend and push the refreshed list back.
    fn pump(&mut self) -> Result<(), SimError> {
        let mut applied = 0;
        while let Ok(command) = self.outbox.try_receive() {
            let bytes = command.to_bytes().map_err(SimError::Widget)?;
            let decoded = PlanCommand::from_bytes(&bytes).map_err(SimError::Widget)?;
            info!("Backend ← {:?} ({} bytes)", decoded, bytes.len());

            match self.backend.apply(decoded) {
                Ok(()) => applied += 1,
                Err(message) => {
                    warn!("Backend rejected command: {}", message);
                    let event = PageEvent::RemoteError(remote_message(&message));
                    Page::on_event(&mut self.card, &event);
                }
            }
        }

        if applied > 0 {
            let event = PageEvent::PlansFetched(self.backend.plans.clone());
            Page::on_event(&mut self.card, &event);
        }
        Ok(())
    }

    fn snapshot(&mut self, label: &str) -> Result<(), SimError> {
        let _ = self.display.clear(Rgb565::BLACK);
        if let Err(e) = Page::draw_page(&self.card, &mut self.display) {
            error!("Draw error: {:?}", e);
        }
        Page::mark_clean(&mut self.card);

        self.frame += 1;
        let path = self.out_dir.join(format!("{:02}-{}.png", self.frame, label));
        self.display
            .to_rgb_output_image(&OutputSettingsBuilder::new().build())
            .save_png(&path)
            .map_err(|e| SimError::Png(e.to_string()))?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    fn picker_wheels(&self) -> Result<(Rectangle, Rectangle), SimError> {
        self.card
            .time_picker()
            .and_then(|picker| picker.wheels())
            .map(|(hours, minutes)| (hours.bounds(), minutes.bounds()))
            .ok_or(SimError::MissingWidget("time picker wheels"))
    }
}

fn run() -> Result<(), SimError> {
    let options = Options::parse();
    std::fs::create_dir_all(&options.out)?;

    let config = WidgetConfig::default().with_locale(options.locale());
    let extent = config.item_extent_px as i32;
    let bounds = Rectangle::new(
        Point::zero(),
        Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX),
    );

    let outbox = PlanOutbox::new();
    let card =
        SchedulerCard::new(bounds, config, outbox.sender()).map_err(SimError::Widget)?;
    let mut session = Session {
        card,
        outbox: &outbox,
        backend: FakeBackend::seeded(),
        display: SimulatorDisplay::new(bounds.size),
        out_dir: options.out,
        clock_ms: 0,
        frame: 0,
    };

    // Activation queues the first fetch
    Page::on_activate(&mut session.card);
    session.snapshot("loading")?;
    session.pump()?;
    session.snapshot("plans")?;

    info!("Editing the first plan");
    session.tap_control(Action::EditPlan(0))?;
    session.snapshot("editor")?;

    let trigger = session
        .card
        .time_picker()
        .map(|picker| picker.bounds())
        .ok_or(SimError::MissingWidget("time picker"))?;
    session.tap(trigger.center());
    session.tick();

    // Two rows up on the hours, three rows on the minutes
    let (hours, minutes) = session.picker_wheels()?;
    session.drag(hours.center(), -2 * extent);
    session.settle();
    for _ in 0..3 {
        session.scroll(minutes.center(), extent);
    }
    session.settle();
    session.snapshot("picker")?;

    let (_, confirm) = session
        .card
        .time_picker()
        .and_then(|picker| picker.button_bounds())
        .ok_or(SimError::MissingWidget("time picker buttons"))?;
    session.tap(confirm.center());

    info!("Adding Saturday");
    let selector = session
        .card
        .weekday_selector()
        .map(|selector| selector.bounds())
        .ok_or(SimError::MissingWidget("weekday selector"))?;
    session.tap(selector.center());
    session.snapshot("flyout")?;

    let saturday = session
        .card
        .weekday_selector()
        .map(|selector| selector.row_bounds(Weekday::SATURDAY))
        .ok_or(SimError::MissingWidget("weekday selector"))?;
    session.tap(saturday.center());
    session.tap(Point::new(
        DISPLAY_WIDTH_PX as i32 - 4,
        DISPLAY_HEIGHT_PX as i32 - 10,
    ));

    session.tap_control(Action::AdjustSoc(SOC_STEP_PERCENT))?;
    session.snapshot("edited")?;

    session.tap_control(Action::SaveEdit)?;
    session.pump()?;
    session.snapshot("saved")?;

    info!("Toggling the weekend plan and adding a new one");
    session.tap_control(Action::TogglePlan(1))?;
    session.pump()?;
    session.tap_control(Action::AddPlan)?;
    session.pump()?;

    info!("Deleting the new plan");
    let last = session.card.plans().len().saturating_sub(1) as u8;
    session.tap_control(Action::DeletePlan(last))?;
    session.snapshot("delete-armed")?;
    session.tap_control(Action::DeletePlan(last))?;
    session.pump()?;
    session.snapshot("final")?;

    for plan in session.card.plans() {
        info!(
            "Plan {}: {} at {}% ({})",
            plan.plan_index,
            plan.time,
            plan.soc,
            if plan.active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting scheduler simulator");
    info!("Display: {}×{}", DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX);

    if let Err(e) = run() {
        error!("Simulator failed: {}", e);
        std::process::exit(1);
    }

    info!("Simulator exiting");
}
