pub mod diff;

pub use diff::execute_diff;
