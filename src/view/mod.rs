//! Section view models and the single-active-section protocol

mod controller;
mod coordinator;
mod loader;
mod model;
mod section;

pub use controller::{PullOutcome, ViewController};
pub use coordinator::SectionCoordinator;
pub use loader::SectionLoader;
pub use model::{DashboardView, SectionData, ViewState, ViewStatus};
pub use section::{Section, UnknownSection};
