pub mod resumes;
