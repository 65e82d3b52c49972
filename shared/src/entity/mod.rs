pub mod signals;
pub mod parameter_versions;
pub mod heartbeat;
