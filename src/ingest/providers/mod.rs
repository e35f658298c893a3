pub mod hyperion;

pub use hyperion::HyperionProvider;
