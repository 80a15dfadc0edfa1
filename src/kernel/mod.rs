pub mod analytics;
pub mod dashboard;
pub mod epoch;
pub mod event;
pub mod job;
pub mod registry;
pub mod report;
pub mod session;
