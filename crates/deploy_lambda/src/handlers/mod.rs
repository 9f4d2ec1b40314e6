pub mod decider;
pub mod entry;
pub mod permissions;
pub mod provisioner;
pub mod trigger;
pub mod updater;

#[cfg(test)]
pub(crate) mod fakes;
