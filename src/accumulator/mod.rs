mod category;
mod machine;

pub use category::{StatusCategory, is_start_trigger};
pub use machine::{JobAccumulator, JobState};
