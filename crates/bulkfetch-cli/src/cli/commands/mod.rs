//! CLI command handlers.

mod list;
mod run;

pub use list::run_list;
pub use run::run_fetch;

#[cfg(test)]
pub(crate) use list::{entry_state, EntryState};
#[cfg(test)]
pub(crate) use run::{exit_code, format_event};
