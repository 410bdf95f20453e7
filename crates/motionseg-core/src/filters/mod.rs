pub mod area_resize;
pub mod gaussian_blur;
