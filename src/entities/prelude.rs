pub use super::carbon_credits::Entity as CarbonCredits;
pub use super::gardens::Entity as Gardens;
pub use super::notifications::Entity as Notifications;
pub use super::submissions::Entity as Submissions;
pub use super::transactions::Entity as Transactions;
pub use super::users::Entity as Users;
