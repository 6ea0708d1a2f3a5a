pub mod cards;
pub mod credential;
pub mod dashboard;
pub mod illustrate;
pub mod quiz;
pub mod report;
pub mod say;
pub mod seed;
pub mod speak;
pub mod topics;
