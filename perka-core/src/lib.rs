pub mod providers;

pub use providers::{
    ActivationRepository, DevicePosition, FeedbackReceipt, LocationError, LocationProvider,
    PartnerProvider, SubscriptionProvider,
};
