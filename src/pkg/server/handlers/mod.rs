pub mod probes;
pub mod resumes;
