pub mod eligibility;
pub mod mirror;
pub mod odds;
pub mod orchestrator;
pub mod sync;
