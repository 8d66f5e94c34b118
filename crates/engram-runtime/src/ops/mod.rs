mod close;

pub use close::{CloseOutcome, CloseReport, CloseRequest, CloseService};
