pub mod upgrade;

mod recipes;

pub use recipes::RecipeCollection;
pub use upgrade::{UpgradableList, UpgradableMap};
