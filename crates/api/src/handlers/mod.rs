pub mod ads;
pub mod billing;
pub mod media;
pub mod results;
pub mod selections;
pub mod sessions;
pub mod users;
