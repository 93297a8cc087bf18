pub mod user;

pub use user::{FriendRequest, NewUser, UpdateUser, User};
