pub mod animation;
pub mod batch;
pub mod export;
pub mod inspect;
pub mod loose_folder;
pub mod palette;
