pub mod analytics;
pub mod clock;
pub mod error;
pub mod practice_stats;
pub mod quick_links;
pub mod rollover;
pub mod tracker;
pub mod validation;
