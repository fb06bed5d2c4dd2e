pub mod google_login_button;
pub mod guards;
pub mod header;
pub mod loading;
