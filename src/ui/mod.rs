pub mod icons;
pub mod view;

pub use view::GenerationView;
