//! The six specialist agents (spec.md §4.5).

mod critic;
mod editor;
mod fact_checker;
mod publisher;
mod researcher;
mod writer;

pub use critic::Critic;
pub use editor::Editor;
pub use fact_checker::FactChecker;
pub use publisher::{page_name, publish};
pub use researcher::Researcher;
pub use writer::Writer;
