//! Console state container.
//!
//! All mutable UI state lives in one [`ConsoleState`] value. It only changes
//! through [`reduce`], a pure function of `(state, event)` that returns the
//! next state plus the side effects the front-end should perform.
//!
//! - `state`: `ConsoleState`, `BusyState`
//! - `event`: `ConsoleEvent`, `ActionOutcome`
//! - `effect`: `ConsoleEffect`, `Notice`
//! - `reducer`: `reduce`, `Transition`

mod effect;
mod event;
mod reducer;
mod state;

pub use effect::{ConsoleEffect, Notice, NoticeLevel};
pub use event::{ActionOutcome, ConsoleEvent};
pub use reducer::{Transition, reduce};
pub use state::{BusyState, ConsoleState};
