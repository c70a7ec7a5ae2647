//! Conversion session: owns the current grid and the last source image.
//!
//! The encoded bytes are kept for re-sampling at another size budget, and the
//! small per-cell sample buffer is kept so a ramp change only re-quantizes.
//!
//! Every request is stamped with a [`Ticket`]. Only the newest ticket may
//! replace the current grid, so a slow conversion that finishes after a later
//! one is dropped instead of overwriting it.

use std::sync::Arc;

use image::RgbaImage;
use log::debug;

use crate::export::{export_bitmap, face::GlyphFace, ExportOptions};
use crate::{Conversion, GlyphRamp, Pipeline, RenderError, SampleBuffer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Clone, Debug)]
struct SourceRef {
    bytes: Arc<[u8]>,
    /// Samples of `bytes` at `max_size`, once known.
    samples: Option<Arc<SampleBuffer>>,
    ramp: GlyphRamp,
    max_size: u16,
}

/// A conversion that can run away from the session, e.g. on a worker thread.
#[derive(Clone, Debug)]
pub struct Request {
    ticket: Ticket,
    source: SourceRef,
    pipeline: Pipeline,
}

impl Request {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn run(self) -> Completed {
        let mut source = self.source;
        let result = match source.samples.clone() {
            Some(samples) => Ok(self.pipeline.quantize(&samples, &source.ramp)),
            None => match self.pipeline.sample_bytes(&source.bytes, source.max_size) {
                Ok(samples) => {
                    let conversion = self.pipeline.quantize(&samples, &source.ramp);
                    source.samples = Some(Arc::new(samples));
                    Ok(conversion)
                },
                Err(err) => Err(err),
            },
        };
        Completed { ticket: self.ticket, source, result }
    }
}

#[derive(Debug)]
pub struct Completed {
    ticket: Ticket,
    source: SourceRef,
    result: Result<Conversion, RenderError>,
}

impl Completed {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pipeline: Pipeline,
    issued: u64,
    current: Option<Conversion>,
    last_source: Option<SourceRef>,
}

impl Session {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline, ..Self::default() }
    }

    pub fn current(&self) -> Option<&Conversion> {
        self.current.as_ref()
    }

    /// True once a conversion has succeeded, i.e. `regenerate` has something to work on.
    pub fn has_source(&self) -> bool {
        self.last_source.is_some()
    }

    /// Size budget of the last successful conversion.
    pub fn max_size(&self) -> Option<u16> {
        self.last_source.as_ref().map(|source| source.max_size)
    }

    pub fn request(
        &mut self,
        bytes: impl Into<Arc<[u8]>>,
        ramp: &GlyphRamp,
        max_size: u16,
    ) -> Request {
        let source = SourceRef { bytes: bytes.into(), samples: None, ramp: ramp.clone(), max_size };
        self.issue(source)
    }

    /// Same samples as the last successful conversion, new ramp. Nothing is decoded.
    pub fn regenerate_request(&mut self, ramp: &GlyphRamp) -> Result<Request, RenderError> {
        let mut source = self.last_source.clone().ok_or(RenderError::NoSourceImage)?;
        source.ramp = ramp.clone();
        Ok(self.issue(source))
    }

    /// Same image and ramp as the last successful conversion, new size budget.
    pub fn resize_request(&mut self, max_size: u16) -> Result<Request, RenderError> {
        let mut source = self.last_source.clone().ok_or(RenderError::NoSourceImage)?;
        source.max_size = max_size;
        source.samples = None;
        Ok(self.issue(source))
    }

    fn issue(&mut self, source: SourceRef) -> Request {
        self.issued += 1;
        Request { ticket: Ticket(self.issued), source, pipeline: self.pipeline.clone() }
    }

    /// Applies a finished request.
    ///
    /// Returns `Ok(None)` when a newer request has been issued since; the
    /// result is discarded whether it succeeded or not. A failed newest
    /// request leaves the current grid and last source untouched.
    pub fn complete(&mut self, completed: Completed) -> Result<Option<&Conversion>, RenderError> {
        if completed.ticket != Ticket(self.issued) {
            debug!(
                "dropping stale conversion {:?}, latest is {:?}",
                completed.ticket,
                Ticket(self.issued)
            );
            return Ok(None);
        }

        let conversion = completed.result?;
        debug!(
            "conversion {:?} is current: {}x{} cells",
            completed.ticket, conversion.grid.width, conversion.grid.height
        );
        self.last_source = Some(completed.source);
        Ok(Some(&*self.current.insert(conversion)))
    }

    pub fn convert(
        &mut self,
        bytes: impl Into<Arc<[u8]>>,
        ramp: &GlyphRamp,
        max_size: u16,
    ) -> Result<&Conversion, RenderError> {
        let completed = self.request(bytes, ramp, max_size).run();
        self.complete(completed)?.ok_or(RenderError::NoSourceImage)
    }

    pub fn regenerate(&mut self, ramp: &GlyphRamp) -> Result<&Conversion, RenderError> {
        let completed = self.regenerate_request(ramp)?.run();
        self.complete(completed)?.ok_or(RenderError::NoSourceImage)
    }

    pub fn resize(&mut self, max_size: u16) -> Result<&Conversion, RenderError> {
        let completed = self.resize_request(max_size)?.run();
        self.complete(completed)?.ok_or(RenderError::NoSourceImage)
    }

    /// Rasterizes the current grid. Nothing is cached.
    pub fn export(
        &self,
        options: &ExportOptions,
        face: &dyn GlyphFace,
    ) -> Result<RgbaImage, RenderError> {
        let current = self.current.as_ref().ok_or(RenderError::NoSourceImage)?;
        export_bitmap(&current.grid, options, face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BitmapFace, ErrorKind};
    use image::{DynamicImage, ImageOutputFormat, Rgba};

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image).write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn regenerate_without_source_fails() {
        let mut session = Session::default();
        let err = session.regenerate(&GlyphRamp::standard()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSourceImage);
        assert!(session.current().is_none());
    }

    #[test]
    fn export_without_grid_fails() {
        let session = Session::default();
        let err = session.export(&ExportOptions::default(), &BitmapFace).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSourceImage);
    }

    #[test]
    fn failed_conversion_keeps_previous_grid() {
        let mut session = Session::default();
        let first =
            session.convert(png(8, 8, [255; 4]), &GlyphRamp::standard(), 60).unwrap().clone();

        let err = session.convert(b"nope".to_vec(), &GlyphRamp::binary(), 60).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
        assert_eq!(session.current(), Some(&first));

        // The failed request did not replace the remembered source either.
        let again = session.regenerate(&GlyphRamp::standard()).unwrap();
        assert_eq!(again, &first);
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut session = Session::default();
        let older = session.request(png(4, 4, [0, 0, 0, 255]), &GlyphRamp::standard(), 10);
        let newer = session.request(png(4, 4, [255; 4]), &GlyphRamp::standard(), 10);
        assert!(older.ticket() < newer.ticket());

        let newest = session.complete(newer.run()).unwrap().cloned();
        assert!(newest.is_some());

        assert!(session.complete(older.run()).unwrap().is_none());
        assert_eq!(session.current(), newest.as_ref());
        assert!(session.current().unwrap().plain_text.chars().all(|ch| ch == '@' || ch == '\n'));
    }

    #[test]
    fn stale_failures_are_dropped_too() {
        let mut session = Session::default();
        let broken = session.request(b"garbage".to_vec(), &GlyphRamp::standard(), 10);
        let good = session.request(png(2, 2, [255; 4]), &GlyphRamp::standard(), 10);

        assert!(session.complete(good.run()).unwrap().is_some());
        assert!(session.complete(broken.run()).unwrap().is_none());
    }

    #[test]
    fn regenerate_requantizes_cached_samples() {
        let mut session = Session::default();
        session.convert(png(30, 10, [90, 180, 30, 255]), &GlyphRamp::standard(), 60).unwrap();
        let cached = session.last_source.as_ref().and_then(|source| source.samples.clone());
        let cached = cached.unwrap();

        let request = session.regenerate_request(&GlyphRamp::binary()).unwrap();
        let reused = request.source.samples.clone().unwrap();
        assert!(Arc::ptr_eq(&cached, &reused));

        let regenerated = session.complete(request.run()).unwrap().unwrap();
        assert_eq!(regenerated.dimensions(), cached.dimensions());
        assert!(regenerated.grid.cells.iter().all(|cell| cell.fg == [90, 180, 30]));
    }

    #[test]
    fn resize_reuses_image_and_ramp() {
        let mut session = Session::default();
        session.convert(png(40, 20, [255; 4]), &GlyphRamp::binary(), 60).unwrap();
        assert_eq!(session.max_size(), Some(60));

        let resized = session.resize(150).unwrap();
        assert_eq!(resized.grid.width, 150);
        assert!(resized.plain_text.chars().all(|ch| ch == '1' || ch == '\n'));
        assert_eq!(session.max_size(), Some(150));
        let samples = session.last_source.as_ref().and_then(|source| source.samples.as_ref());
        assert_eq!(samples.map(|samples| samples.width), Some(150));
    }
}
