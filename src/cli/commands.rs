pub mod audit;
pub mod aws;
pub mod output;
pub mod report;
