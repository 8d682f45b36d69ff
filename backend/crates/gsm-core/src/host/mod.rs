pub mod launcher;
pub mod resource_sampler;
pub mod signaller;
