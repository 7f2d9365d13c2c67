use viewkit_core::ViewportSize;
use winit::dpi::PhysicalSize;

#[inline]
pub fn viewport_from_physical(size: PhysicalSize<u32>) -> ViewportSize {
    ViewportSize::new(size.width, size.height)
}
