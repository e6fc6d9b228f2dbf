// src/pages/mod.rs
pub mod constants;
pub mod page;
pub mod scheduler;

pub use page::Page;
pub use scheduler::{
    EditDraft, OUTBOX_CAPACITY, PlanCommand, PlanOutbox, PlanSender, SchedulerCard,
};
