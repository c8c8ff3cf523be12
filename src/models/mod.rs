pub mod answer;
pub mod question;
pub mod student;
pub mod student_answer;
pub mod taken_test;
pub mod test;
pub mod user;
