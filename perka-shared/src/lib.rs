pub mod models;
pub mod pii;

pub use models::activation::ActivationRecord;
pub use models::member::SubscriptionStatus;
pub use models::partner::{Coordinates, Partner, WeeklySchedule};
pub use pii::Masked;
