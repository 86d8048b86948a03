pub mod periods;
pub mod subscriptions;
pub mod validation;
