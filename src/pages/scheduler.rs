// src/pages/scheduler.rs
//! Scheduler card listing recurring charge plans
//!
//! Each plan is a read-only row with status toggle, edit and delete buttons.
//! Deleting takes two presses on the same button.
//! Editing swaps the row for an inline editor holding a weekday selector, a
//! time picker, charge target steppers and an active toggle. Every change to
//! a plan leaves the card as a [`PlanCommand`] in the outbox; the plan list
//! itself is only replaced when the backend reports it through
//! [`PageEvent::PlansFetched`].

use alloc::vec::Vec;
use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use embassy_time::Instant;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoTextStyle, iso_8859_1::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::model::{MAX_SOC, PlanRecord, TimeOfDay, WeekdaySet};
use crate::pages::constants::*;
use crate::pages::page::Page;
use crate::summary::summarize;
use crate::ui::core::{Action, Drawable, PageEvent, TouchEvent, TouchResult, Touchable};
use crate::ui::pointer::PointerHub;
use crate::ui::styling::{ButtonVariant, Style, Theme};
use crate::ui::widgets::{TimePicker, WeekdaySelector};
use crate::ui::Button;

/// Commands the outbox can hold before the card reports it as full.
pub const OUTBOX_CAPACITY: usize = 8;

/// Rows the card keeps; plan indices are a `u8` on the wire.
pub const MAX_PLANS: usize = u8::MAX as usize;

/// Queue of plan changes waiting for the remote-call layer.
pub type PlanOutbox = Channel<CriticalSectionRawMutex, PlanCommand, OUTBOX_CAPACITY>;

/// Sending half of a [`PlanOutbox`] held by the card.
pub type PlanSender<'a> = Sender<'a, CriticalSectionRawMutex, PlanCommand, OUTBOX_CAPACITY>;

/// A request to the backend plan list. Plan indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanCommand {
    /// Ask for the current list, answered with [`PageEvent::PlansFetched`]
    Fetch,
    Add {
        time: TimeOfDay,
        soc: u8,
        weekdays: WeekdaySet,
        active: bool,
    },
    Edit(PlanRecord),
    Delete {
        plan_index: u8,
    },
    SetActive {
        plan_index: u8,
        active: bool,
    },
}

impl PlanCommand {
    /// Encode for the wire with postcard.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WidgetError> {
        postcard::to_allocvec(self).map_err(|_| WidgetError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WidgetError> {
        postcard::from_bytes(bytes).map_err(|_| WidgetError::Decode)
    }
}

/// Working copy of a plan next to the values it started from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDraft {
    original: PlanRecord,
    draft: PlanRecord,
}

impl EditDraft {
    pub fn new(plan: PlanRecord) -> Self {
        Self {
            original: plan,
            draft: plan,
        }
    }

    pub fn original(&self) -> &PlanRecord {
        &self.original
    }

    pub fn draft(&self) -> &PlanRecord {
        &self.draft
    }

    /// Compares the editable fields one by one.
    pub fn has_changes(&self) -> bool {
        self.draft.time != self.original.time
            || self.draft.soc != self.original.soc
            || self.draft.weekdays != self.original.weekdays
            || self.draft.active != self.original.active
    }
}

/// Buttons of one read-only plan row.
struct PlanRow {
    bounds: Rectangle,
    toggle: Button,
    edit: Button,
    delete: Button,
}

impl PlanRow {
    fn buttons(&self) -> [&Button; 3] {
        [&self.toggle, &self.edit, &self.delete]
    }

    fn buttons_mut(&mut self) -> [&mut Button; 3] {
        [&mut self.toggle, &mut self.edit, &mut self.delete]
    }
}

/// Inline editor replacing the row being edited.
struct PlanEditor {
    index: usize,
    bounds: Rectangle,
    draft: EditDraft,
    weekdays: WeekdaySelector,
    time: TimePicker,
    soc_down: Button,
    soc_up: Button,
    active: Button,
    save: Button,
    cancel: Button,
    delete: Button,
}

impl PlanEditor {
    fn buttons(&self) -> [&Button; 6] {
        [
            &self.soc_down,
            &self.soc_up,
            &self.active,
            &self.save,
            &self.cancel,
            &self.delete,
        ]
    }

    fn buttons_mut(&mut self) -> [&mut Button; 6] {
        [
            &mut self.soc_down,
            &mut self.soc_up,
            &mut self.active,
            &mut self.save,
            &mut self.cancel,
            &mut self.delete,
        ]
    }
}

fn first_action<'b>(buttons: impl IntoIterator<Item = &'b mut Button>, event: TouchEvent) -> Option<Action> {
    let mut action = None;
    for button in buttons {
        if let TouchResult::Action(a) = button.handle_touch(event) {
            action.get_or_insert(a);
        }
    }
    action
}

fn draw_text<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    text: &str,
    position: Point,
    color: Rgb565,
    alignment: Alignment,
) -> Result<(), D::Error> {
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(text, position, MonoTextStyle::new(&FONT_6X10, color), text_style)
        .draw(display)?;
    Ok(())
}

pub struct SchedulerCard<'a> {
    bounds: Rectangle,
    config: WidgetConfig,
    theme: Theme,
    plans: Vec<PlanRecord>,
    rows: Vec<PlanRow>,
    editor: Option<PlanEditor>,
    add_button: Button,
    error: Option<heapless::String<64>>,
    loading: bool,
    /// Row whose delete button has been pressed once
    pending_delete: Option<usize>,
    hub: PointerHub,
    outbox: PlanSender<'a>,
    dirty: bool,
}

impl<'a> SchedulerCard<'a> {
    pub fn new(
        bounds: Rectangle,
        config: WidgetConfig,
        outbox: PlanSender<'a>,
    ) -> Result<Self, WidgetError> {
        config.validate()?;

        let add_button = Button::new(Rectangle::zero(), "", Action::AddPlan);

        let mut card = Self {
            bounds,
            config,
            theme: Theme::default(),
            plans: Vec::new(),
            rows: Vec::new(),
            editor: None,
            add_button,
            error: None,
            loading: false,
            pending_delete: None,
            hub: PointerHub::new(),
            outbox,
            dirty: true,
        };
        card.layout();
        Ok(card)
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.layout();
        self
    }

    pub fn plans(&self) -> &[PlanRecord] {
        &self.plans
    }

    /// Row currently open in the editor.
    pub fn editing(&self) -> Option<usize> {
        self.editor.as_ref().map(|e| e.index)
    }

    pub fn edit_draft(&self) -> Option<&EditDraft> {
        self.editor.as_ref().map(|e| &e.draft)
    }

    pub fn time_picker(&self) -> Option<&TimePicker> {
        self.editor.as_ref().map(|e| &e.time)
    }

    pub fn weekday_selector(&self) -> Option<&WeekdaySelector> {
        self.editor.as_ref().map(|e| &e.weekdays)
    }

    /// Bounds of the visible button that emits `action`.
    pub fn control_bounds(&self, action: Action) -> Option<Rectangle> {
        let editing = self.editing();
        let editor_buttons = self.editor.iter().flat_map(|e| e.buttons());
        let row_buttons = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| editing != Some(*i))
            .flat_map(|(_, row)| row.buttons());

        editor_buttons
            .chain(row_buttons)
            .chain(core::iter::once(&self.add_button))
            .find(|button| button.action() == action)
            .map(|button| button.bounds())
    }

    /// Last reported failure, shown at the bottom of the card.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True between a fetch request and the backend's answer.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Row waiting for the second delete press.
    pub fn pending_delete(&self) -> Option<usize> {
        self.pending_delete
    }

    /// Request the current plan list from the backend.
    pub fn fetch_plans(&mut self) -> Result<(), WidgetError> {
        self.send(PlanCommand::Fetch)?;
        self.loading = true;
        self.dirty = true;
        Ok(())
    }

    /// Replace the plan list with what the backend reported.
    ///
    /// Plans are renumbered by position and anything past [`MAX_PLANS`] is
    /// dropped. An open editor survives only while its row still holds the
    /// plan it was opened on.
    pub fn set_plans(&mut self, mut plans: Vec<PlanRecord>) {
        if plans.len() > MAX_PLANS {
            warn!("Backend sent {} plans, keeping the first {}", plans.len(), MAX_PLANS);
            plans.truncate(MAX_PLANS);
        }
        for (i, plan) in plans.iter_mut().enumerate() {
            plan.plan_index = u8::try_from(i + 1).unwrap_or(u8::MAX);
        }
        self.plans = plans;
        self.loading = false;
        self.pending_delete = None;

        if let Some(editor) = self.editor.as_ref()
            && self.plans.get(editor.index) != Some(editor.draft.original())
        {
            debug!("Plan under edit changed on the backend");
            self.cancel_edit();
        }

        self.layout();
        debug!("Scheduler card shows {} plans", self.plans.len());
    }

    /// Open the editor on one row, discarding any other open draft.
    pub fn start_edit(&mut self, index: usize) -> Result<(), WidgetError> {
        let Some(plan) = self.plans.get(index).copied() else {
            warn!("No plan at row {} to edit", index);
            return Ok(());
        };

        self.cancel_edit();
        let mut editor = self.build_editor(index, plan)?;
        editor.weekdays.attach(&mut self.hub)?;
        self.editor = Some(editor);
        self.layout();
        debug!("Editing plan #{}", plan.plan_index);
        Ok(())
    }

    /// Close the editor without sending anything.
    pub fn cancel_edit(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            editor.weekdays.detach(&mut self.hub);
            self.layout();
            debug!("Edit of row {} closed", editor.index);
        }
    }

    /// Send the draft if it differs from the original, then close the editor.
    ///
    /// The editor stays open when the outbox is full.
    pub fn save_edit(&mut self) -> Result<(), WidgetError> {
        let Some(editor) = self.editor.as_ref() else {
            return Ok(());
        };

        if editor.draft.has_changes() {
            let plan = *editor.draft.draft();
            self.send(PlanCommand::Edit(plan))?;
        } else {
            debug!("Nothing to save for row {}", editor.index);
        }
        self.cancel_edit();
        Ok(())
    }

    /// Flip the active flag of a row.
    pub fn toggle_active(&mut self, index: usize) -> Result<(), WidgetError> {
        let Some(plan) = self.plans.get(index) else {
            return Ok(());
        };
        let command = PlanCommand::SetActive {
            plan_index: plan.plan_index,
            active: !plan.active,
        };
        self.send(command)
    }

    /// Send the delete for a row right away.
    ///
    /// Closes an editor on that row or any row below it, since their
    /// positions shift once the backend drops the plan.
    pub fn delete_plan(&mut self, index: usize) -> Result<(), WidgetError> {
        let Some(plan) = self.plans.get(index) else {
            return Ok(());
        };
        let command = PlanCommand::Delete {
            plan_index: plan.plan_index,
        };
        self.send(command)?;

        if self.editing().is_some_and(|editing| editing >= index) {
            self.cancel_edit();
        }
        Ok(())
    }

    /// Arm the delete of a row, or send it if that row is already armed.
    pub fn request_delete(&mut self, index: usize) -> Result<(), WidgetError> {
        if index >= self.plans.len() {
            return Ok(());
        }
        if self.pending_delete == Some(index) {
            self.disarm_delete();
            return self.delete_plan(index);
        }

        debug!("Delete of row {} armed", index);
        self.pending_delete = Some(index);
        self.layout();
        Ok(())
    }

    fn disarm_delete(&mut self) {
        if self.pending_delete.take().is_some() {
            self.layout();
        }
    }

    /// Request a new plan with the default values.
    pub fn add_plan(&mut self) -> Result<(), WidgetError> {
        let Ok(plan_index) = u8::try_from(self.plans.len() + 1) else {
            warn!("Plan list is full, not adding another");
            return Ok(());
        };
        let plan = PlanRecord::new_default(plan_index);
        self.send(PlanCommand::Add {
            time: plan.time,
            soc: plan.soc,
            weekdays: plan.weekdays,
            active: plan.active,
        })
    }

    /// Set the draft charge target, clamped to 0..=100.
    pub fn set_soc(&mut self, soc: u8) {
        self.edit_draft_with(|plan| plan.soc = soc.min(MAX_SOC));
    }

    pub fn set_active(&mut self, active: bool) {
        self.edit_draft_with(|plan| plan.active = active);
    }

    pub fn set_time(&mut self, time: TimeOfDay) {
        self.edit_draft_with(|plan| plan.time = time);
    }

    pub fn set_weekdays(&mut self, weekdays: WeekdaySet) {
        self.edit_draft_with(|plan| plan.weekdays = weekdays);
    }

    /// Merge a widget or button action into the card state.
    pub fn apply_action(&mut self, action: Action) -> Result<(), WidgetError> {
        if !matches!(action, Action::DeletePlan(_)) {
            self.disarm_delete();
        }
        match action {
            Action::TimeChanged(time) => self.set_time(time),
            Action::WeekdaysChanged(weekdays) => self.set_weekdays(weekdays),
            Action::EditPlan(index) => self.start_edit(index as usize)?,
            Action::TogglePlan(index) => self.toggle_active(index as usize)?,
            Action::DeletePlan(index) => self.request_delete(index as usize)?,
            Action::AddPlan => self.add_plan()?,
            Action::SaveEdit => self.save_edit()?,
            Action::CancelEdit => self.cancel_edit(),
            Action::AdjustSoc(step) => {
                if let Some(soc) = self.edit_draft().map(|d| d.draft().soc) {
                    self.set_soc(soc.saturating_add_signed(step));
                }
            }
            Action::ToggleDraftActive => {
                if let Some(active) = self.edit_draft().map(|d| d.draft().active) {
                    self.set_active(!active);
                }
            }
            Action::OpenTimePicker | Action::Confirm | Action::Dismiss => {}
        }
        Ok(())
    }

    fn edit_draft_with(&mut self, change: impl FnOnce(&mut PlanRecord)) {
        let labels = self.config.locale.labels();
        let Some(editor) = self.editor.as_mut() else {
            return;
        };

        change(&mut editor.draft.draft);
        let draft = editor.draft.draft;
        editor.weekdays.set_value(draft.weekdays);
        editor.time.set_value(draft.time);
        editor
            .active
            .set_label(if draft.active { labels.active } else { labels.inactive });
        editor.save.set_enabled(editor.draft.has_changes());
        self.dirty = true;
    }

    fn send(&mut self, command: PlanCommand) -> Result<(), WidgetError> {
        match self.outbox.try_send(command) {
            Ok(()) => {
                debug!("Queued {:?}", command);
                Ok(())
            }
            Err(_) => {
                warn!("Plan outbox full, dropping {:?}", command);
                self.report(WidgetError::OutboxFull);
                Err(WidgetError::OutboxFull)
            }
        }
    }

    fn report(&mut self, error: WidgetError) {
        let mut message = heapless::String::new();
        write!(message, "{}", error).ok();
        self.error = Some(message);
        self.dirty = true;
    }

    fn content_x(&self) -> i32 {
        self.bounds.top_left.x + CARD_MARGIN_PX as i32
    }

    fn content_width(&self) -> u32 {
        self.bounds.size.width.saturating_sub(2 * CARD_MARGIN_PX)
    }

    fn viewport_height(&self) -> u32 {
        (self.bounds.top_left.y + self.bounds.size.height as i32).max(0) as u32
    }

    /// Top edge of row `index`, accounting for an open editor above it.
    fn row_top(&self, index: usize) -> i32 {
        let editing = self.editing();
        let mut y = self.bounds.top_left.y + (CARD_MARGIN_PX + TITLE_ROW_HEIGHT_PX) as i32;
        for i in 0..index {
            let height = if editing == Some(i) {
                EDITOR_HEIGHT_PX
            } else {
                PLAN_ROW_HEIGHT_PX
            };
            y += (height + ROW_GAP_PX) as i32;
        }
        y
    }

    fn layout(&mut self) {
        let rows = (0..self.plans.len())
            .map(|i| self.build_row(i, &self.plans[i], self.row_top(i)))
            .collect();
        self.rows = rows;

        let add_bounds = Rectangle::new(
            Point::new(self.content_x(), self.row_top(self.plans.len())),
            Size::new(self.content_width(), CONTROL_HEIGHT_PX),
        );
        self.add_button = self.button(
            add_bounds,
            self.config.locale.labels().add_plan,
            Action::AddPlan,
        );

        let delete_label = self.delete_label(self.editing());
        if let Some(editor) = self.editor.as_mut() {
            editor.delete.set_label(delete_label);
        }
        self.dirty = true;
    }

    fn delete_label(&self, index: Option<usize>) -> &'static str {
        let labels = self.config.locale.labels();
        if index.is_some() && index == self.pending_delete {
            labels.confirm_delete
        } else {
            labels.delete
        }
    }

    fn button(&self, bounds: Rectangle, label: &str, action: Action) -> Button {
        Button::new(bounds, label, action)
            .with_palette(self.theme.palette)
            .with_border_radius(self.theme.border_radius.control)
    }

    fn build_row(&self, index: usize, plan: &PlanRecord, top: i32) -> PlanRow {
        let labels = self.config.locale.labels();
        let pad = self.theme.spacing.gap as i32;
        let x = self.content_x();
        let width = self.content_width();
        let bounds = Rectangle::new(Point::new(x, top), Size::new(width, PLAN_ROW_HEIGHT_PX));

        let button_y = top + (PLAN_ROW_HEIGHT_PX - CONTROL_HEIGHT_PX) as i32 - pad;
        let right = x + width as i32 - pad;
        let action_size = Size::new(ACTION_BUTTON_WIDTH_PX, CONTROL_HEIGHT_PX);
        let row = index as u8;

        let (status, variant) = if plan.active {
            (labels.active, ButtonVariant::Primary)
        } else {
            (labels.inactive, ButtonVariant::Outline)
        };
        let toggle = self
            .button(
                Rectangle::new(
                    Point::new(x + pad, button_y),
                    Size::new(STATUS_BUTTON_WIDTH_PX, CONTROL_HEIGHT_PX),
                ),
                status,
                Action::TogglePlan(row),
            )
            .with_variant(variant);

        let delete_x = right - ACTION_BUTTON_WIDTH_PX as i32;
        let delete = self
            .button(
                Rectangle::new(Point::new(delete_x, button_y), action_size),
                self.delete_label(Some(index)),
                Action::DeletePlan(row),
            )
            .with_variant(ButtonVariant::Danger);
        let edit = self.button(
            Rectangle::new(
                Point::new(delete_x - pad - ACTION_BUTTON_WIDTH_PX as i32, button_y),
                action_size,
            ),
            labels.edit,
            Action::EditPlan(row),
        );

        PlanRow {
            bounds,
            toggle,
            edit,
            delete,
        }
    }

    fn build_editor(&self, index: usize, plan: PlanRecord) -> Result<PlanEditor, WidgetError> {
        let labels = self.config.locale.labels();
        let pad = self.theme.spacing.gap;
        let x = self.content_x();
        let width = self.content_width();
        let top = self.row_top(index);
        let bounds = Rectangle::new(Point::new(x, top), Size::new(width, EDITOR_HEIGHT_PX));

        let column = width.saturating_sub(3 * pad) / 2;
        let left = x + pad as i32;
        let right = left + (column + pad) as i32;
        let row_a = top + 42;
        let row_b = top + 96;
        let row_c = top + (EDITOR_HEIGHT_PX - CONTROL_HEIGHT_PX - pad) as i32;
        let step_size = Size::new(STEP_BUTTON_WIDTH_PX, CONTROL_HEIGHT_PX);
        let action_size = Size::new(ACTION_BUTTON_WIDTH_PX, CONTROL_HEIGHT_PX);

        let mut weekdays = WeekdaySelector::new(
            Rectangle::new(Point::new(left, row_a), Size::new(column, CONTROL_HEIGHT_PX)),
            self.viewport_height(),
            self.config,
        )
        .with_theme(self.theme);
        weekdays.set_value(plan.weekdays);

        let mut time = TimePicker::new(
            Rectangle::new(
                Point::new(right, row_a),
                Size::new(TIME_TRIGGER_WIDTH_PX, CONTROL_HEIGHT_PX),
            ),
            self.bounds,
            self.config,
        )?
        .with_theme(self.theme);
        time.set_value(plan.time);

        let soc_down = self.button(
            Rectangle::new(Point::new(left, row_b), step_size),
            "-",
            Action::AdjustSoc(-SOC_STEP_PERCENT),
        );
        let soc_up = self.button(
            Rectangle::new(
                Point::new(left + (column - STEP_BUTTON_WIDTH_PX) as i32, row_b),
                step_size,
            ),
            "+",
            Action::AdjustSoc(SOC_STEP_PERCENT),
        );
        let active = self.button(
            Rectangle::new(
                Point::new(right, row_b),
                Size::new(STATUS_BUTTON_WIDTH_PX, CONTROL_HEIGHT_PX),
            ),
            if plan.active { labels.active } else { labels.inactive },
            Action::ToggleDraftActive,
        );

        let mut save = self
            .button(
                Rectangle::new(Point::new(left, row_c), action_size),
                labels.save,
                Action::SaveEdit,
            )
            .with_variant(ButtonVariant::Primary);
        save.set_enabled(false);
        let cancel = self.button(
            Rectangle::new(
                Point::new(left + (ACTION_BUTTON_WIDTH_PX + pad) as i32, row_c),
                action_size,
            ),
            labels.cancel,
            Action::CancelEdit,
        );
        let delete = self
            .button(
                Rectangle::new(
                    Point::new(
                        x + (width - pad - ACTION_BUTTON_WIDTH_PX) as i32,
                        row_c,
                    ),
                    action_size,
                ),
                self.delete_label(Some(index)),
                Action::DeletePlan(index as u8),
            )
            .with_variant(ButtonVariant::Danger);

        Ok(PlanEditor {
            index,
            bounds,
            draft: EditDraft::new(plan),
            weekdays,
            time,
            soc_down,
            soc_up,
            active,
            save,
            cancel,
            delete,
        })
    }

    /// Find the action a touch maps to. The open time picker is modal, the
    /// weekday flyout comes next since it floats over the rows below it.
    fn route_touch(&mut self, event: TouchEvent) -> Option<Action> {
        if let Some(editor) = self.editor.as_mut() {
            if editor.time.is_open() {
                return match editor.time.handle_touch(event) {
                    TouchResult::Action(action) => Some(action),
                    _ => None,
                };
            }

            match editor.weekdays.handle_touch(event) {
                TouchResult::Action(action) => return Some(action),
                TouchResult::Handled => return None,
                TouchResult::NotHandled => {}
            }

            match editor.time.handle_touch(event) {
                TouchResult::Action(action) => return Some(action),
                TouchResult::Handled if matches!(event, TouchEvent::Press(_)) => return None,
                _ => {}
            }

            if let Some(action) = first_action(editor.buttons_mut(), event) {
                return Some(action);
            }
        }

        let editing = self.editing();
        let mut action = None;
        for (i, row) in self.rows.iter_mut().enumerate() {
            if editing == Some(i) {
                continue;
            }
            if let Some(a) = first_action(row.buttons_mut(), event) {
                action.get_or_insert(a);
            }
        }
        if let TouchResult::Action(a) = self.add_button.handle_touch(event) {
            action.get_or_insert(a);
        }
        action
    }

    fn draw_row<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
        row: &PlanRow,
        plan: &PlanRecord,
    ) -> Result<(), D::Error> {
        let palette = &self.theme.palette;
        let labels = self.config.locale.labels();
        let pad = self.theme.spacing.gap as i32;
        let top = row.bounds.top_left.y;
        let left = row.bounds.top_left.x + pad;
        let right = row.bounds.top_left.x + row.bounds.size.width as i32 - pad;
        let middle = row.bounds.center().x;

        self.draw_panel(display, row.bounds)?;

        let mut title = heapless::String::<16>::new();
        write!(title, "{} #{}", labels.plan, plan.plan_index).ok();
        draw_text(display, &title, Point::new(left, top + 14), palette.text_primary, Alignment::Left)?;

        let status = if plan.active { labels.active } else { labels.inactive };
        let status_color = if plan.active {
            palette.primary
        } else {
            palette.text_secondary
        };
        draw_text(display, status, Point::new(right, top + 14), status_color, Alignment::Right)?;

        let dim = palette.text_secondary;
        draw_text(display, labels.weekdays_field, Point::new(left, top + 32), dim, Alignment::Left)?;
        draw_text(display, labels.time_field, Point::new(middle, top + 32), dim, Alignment::Center)?;
        draw_text(display, labels.soc_field, Point::new(right, top + 32), dim, Alignment::Right)?;

        let summary = summarize(plan.weekdays, self.config.locale);
        let mut soc = heapless::String::<8>::new();
        write!(soc, "{}%", plan.soc).ok();
        let value = palette.text_primary;
        draw_text(display, &summary, Point::new(left, top + 46), value, Alignment::Left)?;
        draw_text(display, &plan.time.to_label(), Point::new(middle, top + 46), value, Alignment::Center)?;
        draw_text(display, &soc, Point::new(right, top + 46), value, Alignment::Right)?;

        for button in row.buttons() {
            button.draw(display)?;
        }
        Ok(())
    }

    fn draw_editor<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
        editor: &PlanEditor,
    ) -> Result<(), D::Error> {
        let palette = &self.theme.palette;
        let labels = self.config.locale.labels();
        let top = editor.bounds.top_left.y;
        let left = editor.weekdays.bounds().top_left.x;
        let right = editor.active.bounds().top_left.x;
        let dim = palette.text_secondary;

        self.draw_panel(display, editor.bounds)?;

        let mut title = heapless::String::<16>::new();
        write!(title, "{} #{}", labels.plan, editor.draft.draft().plan_index).ok();
        draw_text(display, &title, Point::new(left, top + 14), palette.text_primary, Alignment::Left)?;

        draw_text(display, labels.weekdays_field, Point::new(left, top + 32), dim, Alignment::Left)?;
        draw_text(display, labels.time_field, Point::new(right, top + 32), dim, Alignment::Left)?;
        draw_text(display, labels.soc_field, Point::new(left, top + 86), dim, Alignment::Left)?;
        draw_text(display, labels.status_field, Point::new(right, top + 86), dim, Alignment::Left)?;

        let between = Rectangle::with_corners(
            editor.soc_down.bounds().top_left,
            editor.soc_up.bounds().bottom_right().unwrap_or(editor.soc_up.bounds().top_left),
        );
        let mut soc = heapless::String::<8>::new();
        write!(soc, "{}%", editor.draft.draft().soc).ok();
        draw_text(display, &soc, between.center(), palette.text_primary, Alignment::Center)?;

        for button in editor.buttons() {
            button.draw(display)?;
        }
        Ok(())
    }

    fn draw_panel<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
        bounds: Rectangle,
    ) -> Result<(), D::Error> {
        let radius = self.theme.border_radius.control;
        RoundedRectangle::with_equal_corners(bounds, Size::new(radius, radius))
            .into_styled(Style::panel(&self.theme.palette).to_primitive_style())
            .draw(display)?;
        Ok(())
    }
}

impl Page for SchedulerCard<'_> {
    fn title(&self) -> &str {
        self.config.locale.labels().title
    }

    fn on_activate(&mut self) {
        if let Some(editor) = self.editor.as_mut()
            && let Err(e) = editor.weekdays.attach(&mut self.hub)
        {
            warn!("Weekday selector could not attach: {}", e);
        }
        if let Err(e) = self.fetch_plans() {
            warn!("Plan fetch not sent: {}", e);
        }
        self.dirty = true;
    }

    fn on_deactivate(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.weekdays.detach(&mut self.hub);
            editor.time.cancel();
        }
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        if let TouchEvent::Press(point) = event {
            self.hub.publish(point);
            if let Some(editor) = self.editor.as_mut()
                && editor.weekdays.process_outside(&mut self.hub)
            {
                self.dirty = true;
            }
        }

        let action = self.route_touch(event);
        self.dirty = true;

        if action.is_none() && matches!(event, TouchEvent::Press(_)) {
            self.disarm_delete();
        }
        let action = action?;
        if let Err(e) = self.apply_action(action) {
            warn!("Scheduler action {:?} failed: {}", action, e);
        }
        Some(action)
    }

    fn update(&mut self, now: Instant) {
        if let Some(editor) = self.editor.as_mut() {
            editor.time.update(now);
            if editor.time.is_dirty() {
                self.dirty = true;
            }
        }
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match event {
            PageEvent::PlansFetched(plans) => {
                self.error = None;
                self.set_plans(plans.clone());
                true
            }
            PageEvent::RemoteError(message) => {
                warn!("Remote call failed: {}", message);
                self.loading = false;
                self.error = Some(message.clone());
                self.dirty = true;
                true
            }
        }
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let palette = &self.theme.palette;
        let labels = self.config.locale.labels();
        let left = self.content_x();

        self.bounds
            .into_styled(PrimitiveStyle::with_fill(palette.background))
            .draw(display)?;

        let title_y = self.bounds.top_left.y + (CARD_MARGIN_PX + TITLE_ROW_HEIGHT_PX / 2) as i32;
        draw_text(display, labels.title, Point::new(left, title_y), palette.text_primary, Alignment::Left)?;

        if self.loading {
            let right = left + self.content_width() as i32;
            draw_text(display, labels.loading, Point::new(right, title_y), palette.text_secondary, Alignment::Right)?;
        } else if self.plans.is_empty() {
            let y = self.row_top(0) + (PLAN_ROW_HEIGHT_PX / 2) as i32;
            draw_text(display, labels.no_plans, Point::new(left, y), palette.text_secondary, Alignment::Left)?;
        }

        let editing = self.editing();
        for (i, (row, plan)) in self.rows.iter().zip(self.plans.iter()).enumerate() {
            if editing != Some(i) {
                self.draw_row(display, row, plan)?;
            }
        }
        if let Some(editor) = self.editor.as_ref() {
            self.draw_editor(display, editor)?;
        }
        self.add_button.draw(display)?;

        if let Some(error) = self.error.as_ref() {
            let y = self.bounds.top_left.y + self.bounds.size.height as i32
                - (ERROR_LINE_HEIGHT_PX / 2) as i32;
            draw_text(display, error, Point::new(left, y), palette.error, Alignment::Left)?;
        }

        // Floating parts go last so they cover the rows
        if let Some(editor) = self.editor.as_ref() {
            editor.weekdays.draw(display)?;
            editor.time.draw(display)?;
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Weekday;
    use crate::ui::core::TouchPoint;
    use alloc::vec;
    use embedded_graphics::mock_display::MockDisplay;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn touch(p: Point) -> TouchPoint {
        TouchPoint::new(p.x as u16, p.y as u16)
    }

    fn sample_plans() -> Vec<PlanRecord> {
        vec![
            PlanRecord {
                plan_index: 7,
                time: TimeOfDay::new(6, 30).unwrap(),
                soc: 80,
                weekdays: WeekdaySet::WORKDAYS,
                active: true,
            },
            PlanRecord {
                plan_index: 9,
                time: TimeOfDay::new(9, 0).unwrap(),
                soc: 60,
                weekdays: WeekdaySet::WEEKEND,
                active: false,
            },
        ]
    }

    fn card(outbox: &PlanOutbox) -> SchedulerCard<'_> {
        let mut card = SchedulerCard::new(
            Rectangle::new(Point::zero(), Size::new(320, 480)),
            WidgetConfig::default(),
            outbox.sender(),
        )
        .unwrap();
        card.set_plans(sample_plans());
        card
    }

    fn drain(outbox: &PlanOutbox) -> Vec<PlanCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = outbox.try_receive() {
            commands.push(command);
        }
        commands
    }

    fn press(card: &mut SchedulerCard<'_>, p: Point) -> Option<Action> {
        let action = card.handle_touch(TouchEvent::Press(touch(p)));
        card.handle_touch(TouchEvent::Release(touch(p)));
        action
    }

    #[test]
    fn plans_are_renumbered_by_position() {
        let outbox = PlanOutbox::new();
        let card = card(&outbox);
        let indices: Vec<u8> = card.plans().iter().map(|p| p.plan_index).collect();
        assert_eq!(indices, [1, 2]);
    }

    #[test]
    fn draft_tracks_changes_field_by_field() {
        let plan = sample_plans()[0];
        let mut draft = EditDraft::new(plan);
        assert!(!draft.has_changes());

        draft.draft.soc = 90;
        assert!(draft.has_changes());
        draft.draft.soc = plan.soc;
        assert!(!draft.has_changes());

        draft.draft.weekdays = WeekdaySet::ALL;
        assert!(draft.has_changes());
    }

    #[test]
    fn cancel_edit_sends_nothing() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        card.start_edit(0).unwrap();
        card.set_soc(95);
        assert!(card.edit_draft().unwrap().has_changes());

        card.cancel_edit();
        assert_eq!(card.editing(), None);
        assert!(drain(&outbox).is_empty());
        assert_eq!(card.plans()[0].soc, 80);
        assert_eq!(card.hub.listener_count(), 0);
    }

    #[test]
    fn save_sends_edited_plan() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        card.start_edit(1).unwrap();
        card.apply_action(Action::TimeChanged(TimeOfDay::new(10, 15).unwrap()))
            .unwrap();
        card.apply_action(Action::AdjustSoc(SOC_STEP_PERCENT)).unwrap();
        card.apply_action(Action::ToggleDraftActive).unwrap();
        card.save_edit().unwrap();

        let expected = PlanRecord {
            plan_index: 2,
            time: TimeOfDay::new(10, 15).unwrap(),
            soc: 65,
            weekdays: WeekdaySet::WEEKEND,
            active: true,
        };
        assert_eq!(drain(&outbox), [PlanCommand::Edit(expected)]);
        assert_eq!(card.editing(), None);
    }

    #[test]
    fn save_without_changes_only_closes() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        card.start_edit(0).unwrap();
        card.save_edit().unwrap();
        assert_eq!(card.editing(), None);
        assert!(drain(&outbox).is_empty());
    }

    #[test]
    fn soc_is_clamped() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.start_edit(0).unwrap();

        card.set_soc(250);
        assert_eq!(card.edit_draft().unwrap().draft().soc, 100);
        card.apply_action(Action::AdjustSoc(SOC_STEP_PERCENT)).unwrap();
        assert_eq!(card.edit_draft().unwrap().draft().soc, 100);
    }

    #[test]
    fn row_commands_use_one_based_indices() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        card.toggle_active(1).unwrap();
        card.delete_plan(0).unwrap();
        card.add_plan().unwrap();

        assert_eq!(
            drain(&outbox),
            [
                PlanCommand::SetActive {
                    plan_index: 2,
                    active: true,
                },
                PlanCommand::Delete { plan_index: 1 },
                PlanCommand::Add {
                    time: TimeOfDay::new(7, 0).unwrap(),
                    soc: 80,
                    weekdays: WeekdaySet::WORKDAYS,
                    active: true,
                },
            ]
        );
    }

    #[test]
    fn unknown_rows_are_ignored() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        card.start_edit(5).unwrap();
        card.toggle_active(5).unwrap();
        assert_eq!(card.editing(), None);
        assert!(drain(&outbox).is_empty());
    }

    #[test]
    fn full_outbox_is_reported() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        for _ in 0..OUTBOX_CAPACITY {
            card.toggle_active(0).unwrap();
        }
        assert_eq!(card.toggle_active(0), Err(WidgetError::OutboxFull));
        assert_eq!(card.error(), Some("plan outbox is full"));
    }

    #[test]
    fn fetched_plans_clear_error_and_close_stale_editor() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.start_edit(1).unwrap();

        let mut message = heapless::String::new();
        message.push_str("timeout").unwrap();
        assert!(card.on_event(&PageEvent::RemoteError(message)));
        assert_eq!(card.error(), Some("timeout"));

        let first = vec![sample_plans()[0]];
        assert!(card.on_event(&PageEvent::PlansFetched(first)));
        assert_eq!(card.error(), None);
        assert_eq!(card.plans().len(), 1);
        assert_eq!(card.editing(), None);
    }

    fn three_plans() -> Vec<PlanRecord> {
        let mut plans = sample_plans();
        plans.push(PlanRecord {
            plan_index: 3,
            time: TimeOfDay::new(22, 45).unwrap(),
            soc: 100,
            weekdays: WeekdaySet::ALL,
            active: true,
        });
        plans
    }

    #[test]
    fn editor_closes_when_its_row_holds_another_plan() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.set_plans(three_plans());
        card.start_edit(1).unwrap();

        // The first plan disappears, the third slides into row 1
        let shifted = three_plans()[1..].to_vec();
        card.on_event(&PageEvent::PlansFetched(shifted));
        assert_eq!(card.editing(), None);

        card.set_soc(42);
        card.save_edit().unwrap();
        assert!(drain(&outbox).is_empty());
    }

    #[test]
    fn editor_survives_unrelated_refresh() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.set_plans(three_plans());
        card.start_edit(1).unwrap();
        card.set_soc(40);

        let mut refreshed = three_plans();
        refreshed[2].active = false;
        card.set_plans(refreshed);
        assert_eq!(card.editing(), Some(1));
        assert_eq!(card.edit_draft().unwrap().draft().soc, 40);
    }

    #[test]
    fn deleting_a_row_above_closes_the_editor() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.set_plans(three_plans());

        card.start_edit(1).unwrap();
        card.delete_plan(2).unwrap();
        assert_eq!(card.editing(), Some(1));

        card.delete_plan(0).unwrap();
        assert_eq!(card.editing(), None);
        assert_eq!(
            drain(&outbox),
            [
                PlanCommand::Delete { plan_index: 3 },
                PlanCommand::Delete { plan_index: 1 },
            ]
        );
    }

    #[test]
    fn activation_fetches_and_shows_loading() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        assert!(!card.is_loading());

        card.on_activate();
        assert!(card.is_loading());
        assert_eq!(drain(&outbox), [PlanCommand::Fetch]);

        card.on_event(&PageEvent::PlansFetched(sample_plans()));
        assert!(!card.is_loading());

        card.fetch_plans().unwrap();
        let mut message = heapless::String::new();
        message.push_str("unreachable").unwrap();
        card.on_event(&PageEvent::RemoteError(message));
        assert!(!card.is_loading());
    }

    #[test]
    fn delete_needs_a_second_press() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        let delete = card.control_bounds(Action::DeletePlan(1)).unwrap().center();
        assert_eq!(press(&mut card, delete), Some(Action::DeletePlan(1)));
        assert_eq!(card.pending_delete(), Some(1));
        assert_eq!(card.rows[1].delete.label(), "Sure?");
        assert!(drain(&outbox).is_empty());

        assert_eq!(press(&mut card, delete), Some(Action::DeletePlan(1)));
        assert_eq!(card.pending_delete(), None);
        assert_eq!(drain(&outbox), [PlanCommand::Delete { plan_index: 2 }]);
    }

    #[test]
    fn other_press_disarms_delete() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        card.apply_action(Action::DeletePlan(0)).unwrap();
        assert_eq!(card.pending_delete(), Some(0));

        // Empty card space
        press(&mut card, Point::new(316, 470));
        assert_eq!(card.pending_delete(), None);
        assert_eq!(card.rows[0].delete.label(), "Delete");

        // Arming one row and then pressing another only arms the second
        card.apply_action(Action::DeletePlan(0)).unwrap();
        card.apply_action(Action::DeletePlan(1)).unwrap();
        assert_eq!(card.pending_delete(), Some(1));
        card.apply_action(Action::TogglePlan(0)).unwrap();
        assert_eq!(card.pending_delete(), None);
        assert_eq!(drain(&outbox), [PlanCommand::SetActive { plan_index: 1, active: false }]);
    }

    #[test]
    fn editor_delete_button_relabels_when_armed() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.start_edit(0).unwrap();

        card.apply_action(Action::DeletePlan(0)).unwrap();
        assert_eq!(card.editor.as_ref().unwrap().delete.label(), "Sure?");
        card.apply_action(Action::DeletePlan(0)).unwrap();
        assert_eq!(card.editing(), None);
        assert_eq!(drain(&outbox), [PlanCommand::Delete { plan_index: 1 }]);
    }

    #[test]
    fn plan_list_is_capped() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        let plan = sample_plans()[0];
        card.set_plans(vec![plan; MAX_PLANS + 45]);
        assert_eq!(card.plans().len(), MAX_PLANS);
        assert_eq!(card.plans().last().map(|p| p.plan_index), Some(u8::MAX));

        card.add_plan().unwrap();
        assert!(drain(&outbox).is_empty());
    }

    #[test]
    fn touch_session_edits_weekdays_and_saves() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);

        let edit = card.control_bounds(Action::EditPlan(0)).unwrap().center();
        assert_eq!(press(&mut card, edit), Some(Action::EditPlan(0)));
        assert_eq!(card.editing(), Some(0));

        let trigger = card.editor.as_ref().unwrap().weekdays.bounds().center();
        assert_eq!(press(&mut card, trigger), None);
        assert!(card.editor.as_ref().unwrap().weekdays.is_open());

        let saturday = card
            .weekday_selector()
            .unwrap()
            .row_bounds(Weekday::SATURDAY)
            .center();
        let expected = WeekdaySet::from_days(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            press(&mut card, saturday),
            Some(Action::WeekdaysChanged(expected))
        );

        // A press on empty card space closes the flyout and changes nothing
        assert_eq!(press(&mut card, Point::new(316, 470)), None);
        assert!(!card.editor.as_ref().unwrap().weekdays.is_open());
        assert_eq!(card.edit_draft().unwrap().draft().weekdays, expected);

        let save = card.control_bounds(Action::SaveEdit).unwrap().center();
        assert_eq!(press(&mut card, save), Some(Action::SaveEdit));

        let mut plan = card.plans()[0];
        plan.weekdays = expected;
        assert_eq!(drain(&outbox), [PlanCommand::Edit(plan)]);
    }

    #[test]
    fn time_picker_is_modal_inside_editor() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.start_edit(0).unwrap();

        let trigger = card.editor.as_ref().unwrap().time.bounds().center();
        assert_eq!(press(&mut card, trigger), None);
        card.update(at(0));
        assert!(card.editor.as_ref().unwrap().time.is_open());

        // The row below the editor is hidden behind the overlay
        let toggle = card.rows[1].toggle.bounds().top_left + Point::new(2, 2);
        assert!(!card.editor.as_ref().unwrap().time.content_bounds().unwrap().contains(toggle));
        press(&mut card, toggle);
        assert!(drain(&outbox).is_empty());
        assert!(!card.editor.as_ref().unwrap().time.is_open());
    }

    #[test]
    fn deactivate_releases_pointer_listener() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.start_edit(0).unwrap();
        assert_eq!(card.hub.listener_count(), 1);

        card.on_deactivate();
        assert_eq!(card.hub.listener_count(), 0);
        assert!(!card.weekday_selector().unwrap().is_attached());
        card.on_activate();
        assert_eq!(card.hub.listener_count(), 1);
        assert!(card.weekday_selector().unwrap().is_attached());
    }

    #[test]
    fn command_survives_postcard() {
        let command = PlanCommand::Edit(sample_plans()[1]);
        let bytes = command.to_bytes().unwrap();
        assert_eq!(PlanCommand::from_bytes(&bytes), Ok(command));
        assert_eq!(PlanCommand::from_bytes(&[0xff]), Err(WidgetError::Decode));
    }

    #[test]
    fn dirty_card_reports_its_bounds() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.mark_clean();
        assert!(card.dirty_regions().is_empty());

        card.mark_dirty();
        let regions = card.dirty_regions();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounds, card.bounds());
    }

    #[test]
    fn draws_without_error() {
        let outbox = PlanOutbox::new();
        let mut card = card(&outbox);
        card.start_edit(0).unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        display.set_allow_overdraw(true);
        display.set_allow_out_of_bounds_drawing(true);
        card.draw_page(&mut display).unwrap();
        assert!(!display.affected_area().is_zero_sized());
    }
}
