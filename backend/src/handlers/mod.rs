pub mod auth;
pub mod calendar;
pub mod habits;
pub mod health;
pub mod home;
pub mod journal;
pub mod moods;
