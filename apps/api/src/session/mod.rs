// Draft steps that precede an analysis: job context and resume staging.

pub mod handlers;
