pub mod auth_dto;
pub mod student_dto;
pub mod teacher_dto;
