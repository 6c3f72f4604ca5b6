//! Host output interfaces.
//!
//! The core never opens a window or an audio device; it hands finished
//! pixels and samples to whatever the host connected. Both traits are
//! object-safe so [`System`](crate::System) stores them as trait objects
//! rather than generics, matching the "peer reference" design: the host
//! owns the sink, the core only borrows it for the call.

/// Receives pixels as the PPU emits them, one at a time, in raster order.
pub trait FrameSink {
    /// Called once per emitted pixel with its screen coordinate and
    /// resolved RGB color.
    fn set_pixel(&mut self, x: u8, y: u8, rgb: (u8, u8, u8));

    /// Called once a full frame (all 256x240 pixels) has been delivered.
    /// The default does nothing; a host with a double-buffered display
    /// can use this to present the just-filled buffer.
    fn render(&mut self) {}
}

/// Receives audio samples as the APU mixer produces them.
pub trait AudioSink {
    /// Called once per mixed sample.
    fn queue_sample(&mut self, sample: f32);

    /// Called when the host should flush queued samples to its audio
    /// device. The default does nothing.
    fn play(&mut self) {}
}
