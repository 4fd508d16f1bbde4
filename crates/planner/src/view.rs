/// Camera controls of whatever renders the globe.
pub trait GlobeView {
    /// Return to the default camera position.
    fn reset_view(&mut self);
    fn zoom_in(&mut self);
    fn zoom_out(&mut self);
}

/// A view with no camera; used by headless drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessView;

impl GlobeView for HeadlessView {
    fn reset_view(&mut self) {}
    fn zoom_in(&mut self) {}
    fn zoom_out(&mut self) {}
}

#[cfg(test)]
pub(crate) mod recording {
    use super::GlobeView;

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    pub struct RecordingView {
        pub resets: usize,
        /// Net zoom steps; positive is closer.
        pub zoom: i32,
    }

    impl GlobeView for RecordingView {
        fn reset_view(&mut self) {
            self.resets += 1;
            self.zoom = 0;
        }

        fn zoom_in(&mut self) {
            self.zoom += 1;
        }

        fn zoom_out(&mut self) {
            self.zoom -= 1;
        }
    }
}
