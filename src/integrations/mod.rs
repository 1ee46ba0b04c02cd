pub mod google;
pub mod reminders;
