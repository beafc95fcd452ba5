pub mod alunos;
pub mod auth;
pub mod cursos;
pub mod records;
pub mod seed;
