pub mod report;

pub use report::{render_outcome, JsonOut, OutcomeReport};
