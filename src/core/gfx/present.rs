use crate::core::gfx::Frame;
use log::info;
use std::error::Error;
use std::num::NonZeroU32;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Presents the fixed-size simulation frame on the window surface with an
/// integer nearest-neighbor upscale and letterboxing. The display scale is
/// independent of the render size, which stays whatever the track
/// configuration asked for.
pub struct Presenter {
    _context: softbuffer::Context<Arc<Window>>,
    surface: softbuffer::Surface<Arc<Window>, Arc<Window>>,
    window_size: PhysicalSize<u32>,
}

impl Presenter {
    pub fn new(window: Arc<Window>) -> Result<Self, Box<dyn Error>> {
        info!("Initializing softbuffer presentation surface...");
        let window_size = window.inner_size();
        let context = softbuffer::Context::new(window.clone())?;
        let surface = softbuffer::Surface::new(&context, window)?;
        Ok(Self {
            _context: context,
            surface,
            window_size,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.window_size = PhysicalSize::new(width, height);
    }

    pub fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn Error>> {
        let PhysicalSize { width, height } = self.window_size;
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Ok(());
        };
        self.surface.resize(w, h)?;
        let mut buffer = self.surface.buffer_mut()?;

        let scale = (width / frame.width().max(1))
            .min(height / frame.height().max(1))
            .max(1);
        let dst_w = (frame.width() * scale).min(width);
        let dst_h = (frame.height() * scale).min(height);
        let off_x = (width - dst_w) / 2;
        let off_y = (height - dst_h) / 2;

        buffer.fill(0);
        let src = frame.pixels();
        for dy in 0..dst_h {
            let sy = (dy / scale) as usize * frame.width() as usize;
            let row = ((off_y + dy) * width + off_x) as usize;
            for dx in 0..dst_w {
                buffer[row + dx as usize] = src[sy + (dx / scale) as usize];
            }
        }

        buffer.present()?;
        Ok(())
    }
}
