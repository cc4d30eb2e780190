//! Typed records of the plot corpus and the per-session selection.

pub mod character;
pub mod conflict;
pub mod plotto;
pub mod record;
pub mod selection;
