// SPDX-License-Identifier: MPL-2.0
//! Widget for rendering video frames.
//!
//! Renders decoded RGBA frames through Iced's Image widget. A new
//! `image::Handle` is created whenever the frame changes; the canvas itself
//! holds no decoding state.

use iced::widget::{container, image, Container};
use iced::{ContentFit, Element, Length};
use std::sync::Arc;

use crate::ui::styles;

/// Video frame widget.
pub struct VideoCanvas<Message> {
    /// Current frame as image handle.
    frame_handle: Option<image::Handle>,

    /// Frame dimensions.
    width: u32,
    height: u32,

    _phantom: std::marker::PhantomData<Message>,
}

impl<Message> VideoCanvas<Message> {
    /// Creates a new, empty video canvas.
    pub fn new() -> Self {
        Self {
            frame_handle: None,
            width: 0,
            height: 0,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Updates the displayed frame.
    ///
    /// Takes ownership of the Arc's pixel data when this is the last
    /// reference, otherwise clones.
    pub fn set_frame(&mut self, rgba_data: Arc<Vec<u8>>, width: u32, height: u32) {
        let data = Arc::try_unwrap(rgba_data).unwrap_or_else(|arc| (*arc).clone());
        let handle = image::Handle::from_rgba(width, height, data);

        self.frame_handle = Some(handle);
        self.width = width;
        self.height = height;
    }

    /// Clears the current frame and releases memory.
    pub fn clear(&mut self) {
        self.frame_handle = None;
        self.width = 0;
        self.height = 0;
    }

    /// Returns true if the canvas has a frame to display.
    pub fn has_frame(&self) -> bool {
        self.frame_handle.is_some()
    }

    /// Returns the dimensions of the current frame, if any.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_handle.as_ref().map(|_| (self.width, self.height))
    }

    /// Renders the current frame, letterboxed into the available space.
    pub fn view(&self) -> Element<'_, Message> {
        if let Some(handle) = &self.frame_handle {
            let img = image::Image::new(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill);

            img.into()
        } else {
            // No frame yet, hold the stage with an empty surface
            let placeholder: Container<'_, Message> = container(iced::widget::text(""))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(styles::container::stage);

            placeholder.into()
        }
    }
}

impl<Message> Default for VideoCanvas<Message> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_starts_empty() {
        let canvas: VideoCanvas<()> = VideoCanvas::new();
        assert!(!canvas.has_frame());
        assert_eq!(canvas.frame_size(), None);
    }

    #[test]
    fn set_frame_updates_dimensions() {
        let mut canvas: VideoCanvas<()> = VideoCanvas::new();
        let rgba_data = Arc::new(vec![0u8; 1920 * 1080 * 4]);

        canvas.set_frame(rgba_data, 1920, 1080);

        assert!(canvas.has_frame());
        assert_eq!(canvas.frame_size(), Some((1920, 1080)));
    }

    #[test]
    fn shared_frame_data_is_cloned_not_stolen() {
        let mut canvas: VideoCanvas<()> = VideoCanvas::new();
        let rgba_data = Arc::new(vec![255u8; 10 * 10 * 4]);
        let keep_alive = Arc::clone(&rgba_data);

        canvas.set_frame(rgba_data, 10, 10);

        assert_eq!(keep_alive.len(), 400);
        assert!(canvas.has_frame());
    }

    #[test]
    fn clear_removes_the_frame() {
        let mut canvas: VideoCanvas<()> = VideoCanvas::new();
        canvas.set_frame(Arc::new(vec![255u8; 10 * 10 * 4]), 10, 10);
        assert!(canvas.has_frame());

        canvas.clear();
        assert!(!canvas.has_frame());
        assert_eq!(canvas.frame_size(), None);
    }

    #[test]
    fn default_creates_empty_canvas() {
        let canvas: VideoCanvas<()> = VideoCanvas::default();
        assert!(!canvas.has_frame());
    }
}
