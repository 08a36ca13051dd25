pub mod daily_record;
pub mod day;
pub mod practice;
pub mod quick_link;
pub mod task;
