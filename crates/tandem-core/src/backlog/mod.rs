//! The shared backlog: grammar, epic ownership and task completion.
//!
//! The backlog is a markdown file of epics and checkbox tasks that several
//! agents edit. Every write goes through [`TaskMutator`], which holds the
//! `backlog` lock for the whole read-modify-write.

mod grammar;
mod mutator;
mod ownership;

pub use grammar::{
    epic_number, normalize_task_id, Backlog, EpicHeader, EpicProgress, TaskKind, TaskLine,
};
pub use mutator::{complete_task, Completion, MarkDone, TaskMutator};
pub use ownership::{
    check, check_with_policy, resolve, OwnershipCheck, OwnershipDecision, OwnershipPolicy,
};
