pub mod check_ins;
pub mod health;
