pub mod health;
pub mod municipalities;
pub mod operator;
pub mod users;
