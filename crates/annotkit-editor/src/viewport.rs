//! Viewport transform between image-space and screen pixels.
//!
//! ```text
//! screen = image * zoom + pan
//! image  = (screen - pan) / zoom
//! ```
//!
//! Zoom and pan are view state only and never pass through the undo history.

use annotkit_core::{Point, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use annotkit_settings::EditorConfig;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    image_width: f64,
    image_height: f64,
    view_width: f64,
    view_height: f64,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
}

impl Viewport {
    /// Viewport at 100% with the image at the origin. The widget size starts
    /// equal to the image size until [`set_view_size`](Self::set_view_size) or
    /// [`fit_to_view`](Self::fit_to_view) says otherwise.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            image_width: f64::from(image_width),
            image_height: f64::from(image_height),
            view_width: f64::from(image_width),
            view_height: f64::from(image_height),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
        }
    }

    /// Take zoom limits and step from configuration.
    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.min_zoom = config.min_zoom;
        self.max_zoom = config.max_zoom;
        self.zoom_step = config.zoom_step;
        self.zoom = config.clamp_zoom(self.zoom);
        self
    }

    /// Current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Pan offset in screen pixels.
    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
    }

    /// Widget size in screen pixels.
    pub fn view_size(&self) -> (f64, f64) {
        (self.view_width, self.view_height)
    }

    /// Record the widget size (typically on resize).
    pub fn set_view_size(&mut self, width: f64, height: f64) {
        self.view_width = width;
        self.view_height = height;
    }

    fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    pub fn image_to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.zoom + self.pan_x,
            image.y * self.zoom + self.pan_y,
        )
    }

    /// Convert an image-space length to screen pixels.
    pub fn to_screen_length(&self, length: f64) -> f64 {
        length * self.zoom
    }

    /// Convert a screen length to image-space units.
    pub fn to_image_length(&self, length: f64) -> f64 {
        length / self.zoom
    }

    /// Zoom by `factor` keeping the image point under `cursor` fixed on screen.
    ///
    /// The resulting zoom is clamped; the anchor holds for the clamped value.
    pub fn zoom_at_cursor(&mut self, cursor: Point, factor: f64) {
        let anchor = self.screen_to_image(cursor);
        self.zoom = self.clamp(self.zoom * factor);
        self.pan_x = cursor.x - anchor.x * self.zoom;
        self.pan_y = cursor.y - anchor.y * self.zoom;
    }

    fn view_center(&self) -> Point {
        Point::new(self.view_width / 2.0, self.view_height / 2.0)
    }

    /// Multiply zoom by the zoom step, anchored at the view center.
    pub fn zoom_in(&mut self) {
        self.zoom_at_cursor(self.view_center(), self.zoom_step);
    }

    /// Divide zoom by the zoom step, anchored at the view center.
    pub fn zoom_out(&mut self) {
        self.zoom_at_cursor(self.view_center(), 1.0 / self.zoom_step);
    }

    /// Set an absolute zoom level (clamped), anchored at the view center.
    pub fn zoom_to(&mut self, level: f64) {
        let factor = self.clamp(level) / self.zoom;
        self.zoom_at_cursor(self.view_center(), factor);
    }

    /// Zoom so the whole image fits a widget of the given size, centered.
    pub fn fit_to_view(&mut self, view_width: f64, view_height: f64) {
        self.set_view_size(view_width, view_height);
        if self.image_width <= 0.0 || self.image_height <= 0.0 {
            return;
        }
        let zoom_x = view_width / self.image_width;
        let zoom_y = view_height / self.image_height;
        self.zoom = self.clamp(zoom_x.min(zoom_y));
        self.center_image();
    }

    /// 100% zoom with the image centered in the current view.
    pub fn reset_zoom(&mut self) {
        self.zoom = self.clamp(1.0);
        self.center_image();
    }

    fn center_image(&mut self) {
        self.pan_x = (self.view_width - self.image_width * self.zoom) / 2.0;
        self.pan_y = (self.view_height - self.image_height * self.zoom) / 2.0;
    }

    /// Pans by a delta amount in screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.0}% | Pan: ({:.1}, {:.1})",
            self.zoom * 100.0,
            self.pan_x,
            self.pan_y
        )
    }
}
