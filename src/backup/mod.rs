pub mod agent;
pub mod executor;
pub mod history;
pub mod outcome;
pub mod run;
pub mod task;
