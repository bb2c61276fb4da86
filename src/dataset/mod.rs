pub mod folder;
pub mod split;

pub use folder::{load_image_folder, LabeledImages, IMAGE_EXTENSIONS};
pub use split::{train_test_split, Split};
