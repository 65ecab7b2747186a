mod bootstrap;
pub use self::bootstrap::{BootstrapStatic, Element, ElementType, Event, Team};

mod fixture;
pub use self::fixture::Fixture;

mod element_summary;
pub use self::element_summary::{ElementHistory, ElementSummary};

mod picks;
pub use self::picks::{EntryHistory, Pick, Picks};
