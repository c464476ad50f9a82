use image::{DynamicImage, GrayImage};
use imageproc::filter::separable_filter_equal;

/// Convert image to single-channel luminance.
///
/// Uses the luma weights of `image` (Rec. 709), not a plain channel average.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Normalised 1-D Gaussian kernel of odd length `size`.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with an explicit odd kernel size.
///
/// Borders are clamped to the nearest edge pixel. A kernel size of 1 returns
/// an unchanged copy.
pub fn smooth(img: &GrayImage, kernel_size: u32, sigma: f32) -> GrayImage {
    if kernel_size <= 1 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    separable_filter_equal(img, &gaussian_kernel(kernel_size, sigma))
}
